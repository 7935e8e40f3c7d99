// src/models/expenses.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Expense {
    pub id: Uuid,
    #[schema(example = "Compra de esmaltes")]
    pub descricao: String,
    #[schema(example = "50.00")]
    pub valor: Decimal,
    #[schema(example = "produtos")]
    pub categoria: String,
    #[schema(value_type = String, format = Date, example = "2025-01-20")]
    pub data: NaiveDate,
    pub observacoes: Option<String>,
    pub criado_em: DateTime<Utc>,
}

fn validate_valor(valor: &Decimal) -> Result<(), ValidationError> {
    let max = Decimal::from(1_000_000);
    if *valor <= Decimal::ZERO || *valor > max {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser positivo e no máximo 1.000.000.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ExpensePayload {
    #[validate(length(min = 3, max = 255, message = "Descrição deve ter entre 3 e 255 caracteres."))]
    pub descricao: String,

    #[validate(custom(function = "validate_valor"))]
    #[schema(example = "50.00")]
    pub valor: Decimal,

    #[validate(length(min = 2, max = 100, message = "Categoria deve ter entre 2 e 100 caracteres."))]
    #[schema(example = "produtos")]
    pub categoria: String,

    #[schema(example = "2025-01-20")]
    pub data: String,

    #[validate(length(max = 500, message = "Observações muito longas."))]
    pub observacoes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateExpensePayload {
    pub id: Uuid,
    #[serde(flatten)]
    #[validate(nested)]
    pub dados: ExpensePayload,
}

/// Janela de datas aceita em `?period=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
pub enum ExpensePeriod {
    #[serde(rename = "7")]
    Days7,
    #[default]
    #[serde(rename = "30")]
    Days30,
    #[serde(rename = "90")]
    Days90,
    #[serde(rename = "365")]
    Days365,
    #[serde(rename = "all")]
    All,
}

impl ExpensePeriod {
    /// Primeiro dia incluído no filtro, contando a partir de `today`.
    pub fn start_date(self, today: NaiveDate) -> Option<NaiveDate> {
        let days = match self {
            ExpensePeriod::Days7 => 7,
            ExpensePeriod::Days30 => 30,
            ExpensePeriod::Days90 => 90,
            ExpensePeriod::Days365 => 365,
            ExpensePeriod::All => return None,
        };
        today.checked_sub_days(chrono::Days::new(days))
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ExpenseListQuery {
    #[serde(default)]
    #[param(value_type = Option<String>, example = "30")]
    pub period: ExpensePeriod,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ExpenseIdQuery {
    pub id: Option<Uuid>,
}
