// src/models/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Service {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Corte Feminino")]
    pub nome_servico: String,
    pub descricao: Option<String>,
    #[schema(example = "80.00")]
    pub preco: Decimal,
    #[schema(example = 60)]
    pub duracao_minutos: i32,
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O preço não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ServicePayload {
    #[validate(length(min = 2, max = 100, message = "O nome deve ter entre 2 e 100 caracteres."))]
    #[schema(example = "Manicure")]
    pub nome_servico: String,

    #[validate(length(max = 500, message = "Descrição muito longa."))]
    pub descricao: Option<String>,

    #[validate(custom(function = "validate_non_negative"))]
    #[schema(example = "35.00")]
    pub preco: Decimal,

    #[validate(range(min = 5, max = 600, message = "Duração deve ficar entre 5 e 600 minutos."))]
    #[schema(example = 45)]
    pub duracao_minutos: i32,
}
