// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_usuario", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Admin,
    Funcionario,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    #[schema(example = "Maria Souza")]
    pub nome: String,
    #[schema(example = "maria@salao.com")]
    pub email: String,

    // Hash bcrypt, ou texto puro em contas antigas ainda não migradas
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub senha: String,

    pub tipo_usuario: UserType,
    pub telefone: Option<String>,
    pub criado_em: DateTime<Utc>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "admin@salao.com")]
    pub email: String,
    // Contas antigas têm senhas curtas em texto puro
    #[validate(length(min = 3, max = 100, message = "A senha deve ter entre 3 e 100 caracteres."))]
    pub password: String,
}

/// Conteúdo assinado do cookie `session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    pub tipo_usuario: UserType,
    /// Emissão em segundos desde a época Unix
    #[serde(rename = "issuedAt")]
    pub issued_at: i64,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.tipo_usuario == UserType::Admin
    }

    /// Admin acessa tudo; funcionário só o que é dele.
    pub fn can_act_for(&self, funcionario_id: Uuid) -> bool {
        self.is_admin() || self.id == funcionario_id
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub user: SessionUser,
}
