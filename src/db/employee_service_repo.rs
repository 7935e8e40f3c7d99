// src/db/employee_service_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::contains_pattern,
    models::staff::Employee,
};

// Tabela de junção funcionario_servicos
#[derive(Clone)]
pub struct EmployeeServiceRepository {
    pool: PgPool,
}

impl EmployeeServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn service_ids_for(&self, funcionario_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT servico_id FROM funcionario_servicos WHERE funcionario_id = $1 ORDER BY servico_id",
        )
        .bind(funcionario_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// Todos os pares (funcionário, serviço), para montar a listagem de funcionários.
    pub async fn all_pairs(&self) -> Result<Vec<(Uuid, Uuid)>, AppError> {
        let pairs = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT funcionario_id, servico_id FROM funcionario_servicos",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(pairs)
    }

    pub async fn is_eligible(&self, funcionario_id: Uuid, servico_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM funcionario_servicos
                WHERE funcionario_id = $1 AND servico_id = $2
            )
            "#,
        )
        .bind(funcionario_id)
        .bind(servico_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Funcionários habilitados para o serviço, opcionalmente filtrados pelo nome.
    pub async fn eligible_employees(
        &self,
        servico_id: Uuid,
        name_term: Option<&str>,
    ) -> Result<Vec<Employee>, AppError> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT u.id, u.nome, u.telefone
            FROM users u
            JOIN funcionario_servicos fs ON fs.funcionario_id = u.id
            WHERE fs.servico_id = $1
              AND u.tipo_usuario = 'funcionario'
              AND ($2::text IS NULL OR u.nome ILIKE $2)
            ORDER BY u.nome ASC
            "#,
        )
        .bind(servico_id)
        .bind(name_term.map(contains_pattern))
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    /// Substitui todo o conjunto de serviços do funcionário.
    /// Deve rodar dentro de uma transação.
    pub async fn replace_for_employee(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        funcionario_id: Uuid,
        servico_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM funcionario_servicos WHERE funcionario_id = $1")
            .bind(funcionario_id)
            .execute(&mut **tx)
            .await?;

        if !servico_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO funcionario_servicos (funcionario_id, servico_id)
                SELECT $1, UNNEST($2::uuid[])
                "#,
            )
            .bind(funcionario_id)
            .bind(servico_ids)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::ResourceNotFound("Serviço".to_string());
                    }
                }
                e.into()
            })?;
        }

        Ok(())
    }
}
