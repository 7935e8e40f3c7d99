// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{auth::User, staff::Employee},
    services::auth::CredentialStore,
};

const USER_COLUMNS: &str = "id, nome, email, senha, tipo_usuario, telefone, criado_em";

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    /// Troca a senha armazenada (usado na migração texto puro -> bcrypt).
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET senha = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_employee<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, nome, telefone
            FROM users
            WHERE id = $1 AND tipo_usuario = 'funcionario'
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(employee)
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, nome, telefone
            FROM users
            WHERE tipo_usuario = 'funcionario'
            ORDER BY nome ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    pub async fn count_employees(&self) -> Result<i64, AppError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE tipo_usuario = 'funcionario'")
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        UserRepository::find_by_email(self, email).await
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        UserRepository::update_password(self, id, password_hash).await
    }
}

#[cfg(test)]
mod tests {
    const SCHEMA: &str = include_str!("../../migrations/20250101000000_schema_inicial.sql");

    #[test]
    fn email_uniqueness_matches_case_insensitive_lookup() {
        assert!(SCHEMA.contains("CREATE UNIQUE INDEX users_email_lower_key ON users (LOWER(email));"));
        assert!(!SCHEMA.contains("UNIQUE (email)"));
    }
}
