// src/db/availability_repo.rs

use chrono::NaiveTime;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::staff::AvailabilityBlock};

#[derive(Clone)]
pub struct AvailabilityRepository {
    pool: PgPool,
}

impl AvailabilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_employee(&self, funcionario_id: Uuid) -> Result<Vec<AvailabilityBlock>, AppError> {
        let blocks = sqlx::query_as::<_, AvailabilityBlock>(
            r#"
            SELECT id, funcionario_id, dia_semana, hora_inicio, hora_fim
            FROM disponibilidades
            WHERE funcionario_id = $1
            ORDER BY dia_semana ASC, hora_inicio ASC
            "#,
        )
        .bind(funcionario_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(blocks)
    }

    pub async fn list_all(&self) -> Result<Vec<AvailabilityBlock>, AppError> {
        let blocks = sqlx::query_as::<_, AvailabilityBlock>(
            r#"
            SELECT id, funcionario_id, dia_semana, hora_inicio, hora_fim
            FROM disponibilidades
            ORDER BY funcionario_id, dia_semana ASC, hora_inicio ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(blocks)
    }

    /// Bloqueios do funcionário num dia da semana (0 = domingo).
    pub async fn blocks_for_day<'e, E>(
        &self,
        executor: E,
        funcionario_id: Uuid,
        dia_semana: i16,
    ) -> Result<Vec<AvailabilityBlock>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let blocks = sqlx::query_as::<_, AvailabilityBlock>(
            r#"
            SELECT id, funcionario_id, dia_semana, hora_inicio, hora_fim
            FROM disponibilidades
            WHERE funcionario_id = $1 AND dia_semana = $2
            ORDER BY hora_inicio ASC
            "#,
        )
        .bind(funcionario_id)
        .bind(dia_semana)
        .fetch_all(executor)
        .await?;
        Ok(blocks)
    }

    pub async fn create(
        &self,
        funcionario_id: Uuid,
        dia_semana: i16,
        hora_inicio: NaiveTime,
        hora_fim: NaiveTime,
    ) -> Result<AvailabilityBlock, AppError> {
        let block = sqlx::query_as::<_, AvailabilityBlock>(
            r#"
            INSERT INTO disponibilidades (funcionario_id, dia_semana, hora_inicio, hora_fim)
            VALUES ($1, $2, $3, $4)
            RETURNING id, funcionario_id, dia_semana, hora_inicio, hora_fim
            "#,
        )
        .bind(funcionario_id)
        .bind(dia_semana)
        .bind(hora_inicio)
        .bind(hora_fim)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound("Funcionário".to_string());
                }
            }
            e.into()
        })?;
        Ok(block)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AvailabilityBlock>, AppError> {
        let block = sqlx::query_as::<_, AvailabilityBlock>(
            "SELECT id, funcionario_id, dia_semana, hora_inicio, hora_fim FROM disponibilidades WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(block)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM disponibilidades WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
