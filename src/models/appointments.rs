// src/models/appointments.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Status ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_agendamento", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pendente,
    Confirmado,
    Concluido,
    Cancelado,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pendente => "pendente",
            AppointmentStatus::Confirmado => "confirmado",
            AppointmentStatus::Concluido => "concluido",
            AppointmentStatus::Cancelado => "cancelado",
        }
    }

    /// Tabela de transições permitidas. Repetir o status atual é aceito
    /// (não altera nada).
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;

        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pendente, Confirmado) | (Pendente, Cancelado) | (Confirmado, Concluido) | (Confirmado, Cancelado)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Concluido | AppointmentStatus::Cancelado)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Linhas ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    #[schema(example = "João Silva")]
    pub cliente_nome: String,
    #[schema(example = "11999999999")]
    pub cliente_telefone: String,
    pub funcionario_id: Uuid,
    pub servico_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2025-01-20")]
    pub data_agendamento: NaiveDate,
    #[schema(value_type = String, example = "14:00:00")]
    pub hora_agendamento: NaiveTime,
    pub status: AppointmentStatus,
    pub pago: bool,
    pub criado_em: DateTime<Utc>,
}

/// Agendamento com os nomes do serviço e do funcionário, para listagens e relatórios.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AppointmentDetail {
    pub id: Uuid,
    pub cliente_nome: String,
    pub cliente_telefone: String,
    pub funcionario_id: Uuid,
    pub funcionario_nome: String,
    pub servico_id: Uuid,
    pub nome_servico: String,
    #[schema(example = "80.00")]
    pub preco: Decimal,
    #[schema(value_type = String, format = Date)]
    pub data_agendamento: NaiveDate,
    #[schema(value_type = String)]
    pub hora_agendamento: NaiveTime,
    pub status: AppointmentStatus,
    pub pago: bool,
}

/// Dados já resolvidos e validados, prontos para inserir.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub cliente_nome: String,
    pub cliente_telefone: String,
    pub funcionario_id: Uuid,
    pub servico_id: Uuid,
    pub data_agendamento: NaiveDate,
    pub hora_agendamento: NaiveTime,
    pub status: AppointmentStatus,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAppointmentPayload {
    #[validate(length(min = 3, max = 100, message = "Nome do cliente deve ter entre 3 e 100 caracteres."))]
    pub cliente_nome: String,
    #[schema(example = "(11) 99999-9999")]
    pub cliente_telefone: String,
    pub funcionario_id: Uuid,
    pub servico_id: Uuid,
    #[schema(example = "2025-01-20")]
    pub data_agendamento: String,
    #[schema(example = "14:00")]
    pub hora_agendamento: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentPayload {
    pub appointment_id: Uuid,
    pub status: Option<AppointmentStatus>,
    pub pago: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentPayload {
    pub appointment_id: Uuid,
    pub pago: bool,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AppointmentListQuery {
    /// Filtra por data (YYYY-MM-DD)
    pub data: Option<String>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AvailableTimesQuery {
    pub funcionario_id: Uuid,
    pub data: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableTimesResponse {
    pub horarios: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateAppointmentResponse {
    pub success: bool,
    pub data: Appointment,
}

#[cfg(test)]
mod tests {
    use super::AppointmentStatus::*;

    #[test]
    fn transition_table() {
        assert!(Pendente.can_transition_to(Confirmado));
        assert!(Pendente.can_transition_to(Cancelado));
        assert!(!Pendente.can_transition_to(Concluido));

        assert!(Confirmado.can_transition_to(Concluido));
        assert!(Confirmado.can_transition_to(Cancelado));
        assert!(!Confirmado.can_transition_to(Pendente));

        assert!(!Concluido.can_transition_to(Cancelado));
        assert!(!Concluido.can_transition_to(Pendente));

        assert!(!Cancelado.can_transition_to(Pendente));
        assert!(!Cancelado.can_transition_to(Confirmado));
        assert!(!Cancelado.can_transition_to(Concluido));
    }

    #[test]
    fn repeating_the_status_is_a_no_op() {
        assert!(Cancelado.can_transition_to(Cancelado));
        assert!(Concluido.can_transition_to(Concluido));
    }
}
