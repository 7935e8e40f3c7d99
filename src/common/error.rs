use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::appointments::AppointmentStatus;

// Taxonomia de erros da aplicação. Cada variante vira um status HTTP e uma
// mensagem genérica; o detalhe interno só vai para o log.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Dados inválidos: {0}")]
    InvalidInput(String),

    #[error("Horário fora do expediente")]
    OutsideBusinessHours,

    #[error("Nenhum serviço cadastrado")]
    NoServicesConfigured,

    #[error("Nenhum funcionário habilitado para o serviço")]
    NoEligibleEmployee,

    #[error("Funcionário não habilitado para o serviço")]
    EmployeeNotEnabled,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Sessão inválida ou ausente")]
    Unauthenticated,

    #[error("Credencial do webhook inválida")]
    InvalidWebhookCredentials,

    #[error("Sem permissão")]
    Forbidden,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Funcionário indisponível no horário")]
    EmployeeUnavailable,

    #[error("Horário já reservado")]
    SlotTaken,

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Muitas tentativas")]
    RateLimited,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidInput(_)
            | AppError::OutsideBusinessHours
            | AppError::NoServicesConfigured
            | AppError::NoEligibleEmployee
            | AppError::EmployeeNotEnabled => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::Unauthenticated
            | AppError::InvalidWebhookCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmployeeUnavailable
            | AppError::SlotTaken
            | AppError::InvalidTransition { .. }
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::DatabaseError(_)
            | AppError::BcryptError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Rejeições dos extratores do axum seguem o mesmo formato { "error": ... }
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(format!("JSON inválido: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(format!("Parâmetros inválidos: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::InvalidInput("Identificador inválido na URL.".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::InvalidInput(message) => message,
            AppError::OutsideBusinessHours => {
                "Horário fora do expediente (08:00 às 20:00).".to_string()
            }
            AppError::NoServicesConfigured => "Nenhum serviço cadastrado.".to_string(),
            AppError::NoEligibleEmployee => {
                "Nenhum funcionário habilitado para este serviço.".to_string()
            }
            AppError::EmployeeNotEnabled => {
                "Funcionário não habilitado para este serviço.".to_string()
            }
            AppError::InvalidCredentials => "E-mail ou senha inválidos.".to_string(),
            AppError::Unauthenticated => "Não autenticado.".to_string(),
            AppError::InvalidWebhookCredentials => "Não autorizado.".to_string(),
            AppError::Forbidden => "Sem permissão.".to_string(),
            AppError::ResourceNotFound(resource) => format!("{} não encontrado.", resource),
            AppError::EmployeeUnavailable => {
                "Funcionário indisponível neste horário.".to_string()
            }
            AppError::SlotTaken => "Horário já reservado.".to_string(),
            AppError::InvalidTransition { from, to } => {
                format!("Não é possível alterar o status de '{}' para '{}'.", from, to)
            }
            AppError::Conflict(message) => message,
            AppError::RateLimited => {
                "Muitas tentativas. Tente novamente em instantes.".to_string()
            }

            // Erros internos: o detalhe vai para o log, nunca para o cliente.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("senha=segredo123 em tabela users"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Ocorreu um erro inesperado.");
        assert!(!body.to_string().contains("segredo123"));
    }

    #[tokio::test]
    async fn conflicts_map_to_409() {
        assert_eq!(AppError::SlotTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::EmployeeUnavailable.status_code(), StatusCode::CONFLICT);

        let response = AppError::InvalidTransition {
            from: AppointmentStatus::Cancelado,
            to: AppointmentStatus::Confirmado,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("cancelado"));
    }

    #[test]
    fn taxonomy_status_codes() {
        assert_eq!(AppError::OutsideBusinessHours.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::EmployeeNotEnabled.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::ResourceNotFound("Agendamento".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }
}
