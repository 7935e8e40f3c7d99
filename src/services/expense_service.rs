// src/services/expense_service.rs

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, validation::parse_date},
    db::{expense_repo::ExpenseRecord, ExpenseRepository},
    models::expenses::{Expense, ExpensePayload, ExpensePeriod},
};

fn to_record(payload: ExpensePayload) -> Result<ExpenseRecord, AppError> {
    payload.validate()?;
    Ok(ExpenseRecord {
        descricao: payload.descricao.trim().to_string(),
        valor: payload.valor.round_dp(2),
        categoria: payload.categoria.trim().to_string(),
        data: parse_date(&payload.data)?,
        observacoes: payload
            .observacoes
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty()),
    })
}

#[derive(Clone)]
pub struct ExpenseService {
    repo: ExpenseRepository,
}

impl ExpenseService {
    pub fn new(repo: ExpenseRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, period: ExpensePeriod, today: NaiveDate) -> Result<Vec<Expense>, AppError> {
        self.repo.list_since(period.start_date(today)).await
    }

    pub async fn create(&self, payload: ExpensePayload) -> Result<Expense, AppError> {
        let record = to_record(payload)?;
        let expense = self.repo.create(&record).await?;
        tracing::info!(despesa_id = %expense.id, categoria = %expense.categoria, "Despesa registrada");
        Ok(expense)
    }

    pub async fn update(&self, id: Uuid, payload: ExpensePayload) -> Result<Expense, AppError> {
        let record = to_record(payload)?;
        self.repo
            .update(id, &record)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Despesa".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Despesa".to_string()));
        }
        tracing::info!(despesa_id = %id, "Despesa removida");
        Ok(())
    }
}
