// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::appointments::AppointmentDetail;

#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "perfil", rename_all = "lowercase")]
pub enum DashboardSummary {
    Admin {
        agendamentos_hoje: Vec<AppointmentDetail>,
        total_funcionarios: i64,
        total_servicos: i64,
        total_pendentes: i64,
    },
    Funcionario {
        agendamentos_hoje: Vec<AppointmentDetail>,
        proximos_agendamentos: i64,
        total_confirmados: i64,
    },
}
