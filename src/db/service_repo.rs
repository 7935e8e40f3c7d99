// src/db/service_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::contains_pattern,
    models::catalog::{Service, ServicePayload},
};

#[derive(Clone)]
pub struct ServiceRepository {
    pool: PgPool,
}

impl ServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Service>, AppError> {
        let services = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, nome_servico, descricao, preco, duracao_minutos
            FROM servicos
            ORDER BY nome_servico ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Service>, AppError> {
        let service = sqlx::query_as::<_, Service>(
            "SELECT id, nome_servico, descricao, preco, duracao_minutos FROM servicos WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    /// Primeiro serviço cujo nome contém o termo (sem diferenciar maiúsculas).
    pub async fn find_first_by_name(&self, term: &str) -> Result<Option<Service>, AppError> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, nome_servico, descricao, preco, duracao_minutos
            FROM servicos
            WHERE nome_servico ILIKE $1
            ORDER BY nome_servico ASC
            LIMIT 1
            "#,
        )
        .bind(contains_pattern(term))
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    pub async fn first(&self) -> Result<Option<Service>, AppError> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, nome_servico, descricao, preco, duracao_minutos
            FROM servicos
            ORDER BY nome_servico ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    pub async fn create(&self, payload: &ServicePayload) -> Result<Service, AppError> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO servicos (nome_servico, descricao, preco, duracao_minutos)
            VALUES ($1, $2, $3, $4)
            RETURNING id, nome_servico, descricao, preco, duracao_minutos
            "#,
        )
        .bind(payload.nome_servico.trim())
        .bind(payload.descricao.as_deref())
        .bind(payload.preco.round_dp(2))
        .bind(payload.duracao_minutos)
        .fetch_one(&self.pool)
        .await?;
        Ok(service)
    }

    pub async fn update(&self, id: Uuid, payload: &ServicePayload) -> Result<Option<Service>, AppError> {
        let service = sqlx::query_as::<_, Service>(
            r#"
            UPDATE servicos
            SET nome_servico = $1, descricao = $2, preco = $3, duracao_minutos = $4
            WHERE id = $5
            RETURNING id, nome_servico, descricao, preco, duracao_minutos
            "#,
        )
        .bind(payload.nome_servico.trim())
        .bind(payload.descricao.as_deref())
        .bind(payload.preco.round_dp(2))
        .bind(payload.duracao_minutos)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    /// Retorna `false` se o serviço não existia.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM servicos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::Conflict(
                            "Serviço possui agendamentos e não pode ser removido.".to_string(),
                        );
                    }
                }
                e.into()
            })?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM servicos")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Preços por serviço, para os relatórios.
    pub async fn prices(&self) -> Result<Vec<(Uuid, String, Decimal)>, AppError> {
        let rows = sqlx::query_as::<_, (Uuid, String, Decimal)>(
            "SELECT id, nome_servico, preco FROM servicos ORDER BY nome_servico ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
