// src/db/expense_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{expenses::Expense, reports::ExpenseEntry},
};

/// Campos já validados e convertidos de uma despesa.
#[derive(Debug, Clone)]
pub struct ExpenseRecord {
    pub descricao: String,
    pub valor: Decimal,
    pub categoria: String,
    pub data: NaiveDate,
    pub observacoes: Option<String>,
}

#[derive(Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_since(&self, since: Option<NaiveDate>) -> Result<Vec<Expense>, AppError> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, descricao, valor, categoria, data, observacoes, criado_em
            FROM despesas
            WHERE ($1::date IS NULL OR data >= $1)
            ORDER BY data DESC, criado_em DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(expenses)
    }

    pub async fn create(&self, record: &ExpenseRecord) -> Result<Expense, AppError> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO despesas (descricao, valor, categoria, data, observacoes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, descricao, valor, categoria, data, observacoes, criado_em
            "#,
        )
        .bind(&record.descricao)
        .bind(record.valor)
        .bind(&record.categoria)
        .bind(record.data)
        .bind(record.observacoes.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(expense)
    }

    pub async fn update(&self, id: Uuid, record: &ExpenseRecord) -> Result<Option<Expense>, AppError> {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE despesas
            SET descricao = $1, valor = $2, categoria = $3, data = $4, observacoes = $5
            WHERE id = $6
            RETURNING id, descricao, valor, categoria, data, observacoes, criado_em
            "#,
        )
        .bind(&record.descricao)
        .bind(record.valor)
        .bind(&record.categoria)
        .bind(record.data)
        .bind(record.observacoes.as_deref())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(expense)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM despesas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn entries_between(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ExpenseEntry>, AppError> {
        let entries = sqlx::query_as::<_, ExpenseEntry>(
            r#"
            SELECT valor, categoria, data
            FROM despesas
            WHERE ($1::date IS NULL OR data >= $1)
              AND ($2::date IS NULL OR data <= $2)
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
