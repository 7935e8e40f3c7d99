// src/models/reports.rs

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::appointments::AppointmentStatus;

// --- Linhas brutas usadas nas agregações ---

/// Agendamento com o preço do serviço, como vem do banco para os relatórios.
#[derive(Debug, Clone, FromRow)]
pub struct PricedAppointment {
    pub funcionario_id: Uuid,
    pub servico_id: Uuid,
    pub cliente_telefone: String,
    pub data_agendamento: NaiveDate,
    pub hora_agendamento: NaiveTime,
    pub status: AppointmentStatus,
    pub pago: bool,
    pub preco: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct ExpenseEntry {
    pub valor: Decimal,
    pub categoria: String,
    pub data: NaiveDate,
}

// --- Parâmetros ---

/// `?period=week|month|all` dos relatórios por funcionário e por serviço.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Week,
    #[default]
    Month,
    All,
}

impl ReportPeriod {
    pub fn start_date(self, today: NaiveDate) -> Option<NaiveDate> {
        let days = match self {
            ReportPeriod::Week => 7,
            ReportPeriod::Month => 30,
            ReportPeriod::All => return None,
        };
        today.checked_sub_days(chrono::Days::new(days))
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ReportPeriodQuery {
    #[serde(default)]
    #[param(value_type = Option<String>, example = "month")]
    pub period: ReportPeriod,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    #[param(example = "2025-01-01")]
    pub start_date: Option<String>,
    #[param(example = "2025-01-31")]
    pub end_date: Option<String>,
}

// --- Respostas ---

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServicePerformance {
    pub id: Uuid,
    pub nome_servico: String,
    pub preco: Decimal,
    pub total_vendas: u32,
    pub receita_total: Decimal,
    pub cancelamentos: u32,
    #[schema(example = "75.00")]
    pub taxa_conversao: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeRevenue {
    pub id: Uuid,
    pub nome: String,
    pub total_atendimentos: u32,
    pub faturamento_realizado: Decimal,
    pub faturamento_pendente: Decimal,
    pub cancelamentos: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyProfit {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfitAnalysis {
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    /// Percentual sobre a receita
    pub profit_margin: Decimal,
    pub expenses_by_category: BTreeMap<String, Decimal>,
    pub daily_data: Vec<DailyProfit>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BusinessMetrics {
    pub clientes_atendidos: u32,
    pub total_atendimentos: u32,
    pub ticket_medio: Decimal,
    pub total_cancelamentos: u32,
    #[schema(example = "12.50")]
    pub taxa_cancelamento: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeakHour {
    pub hora: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeakDay {
    #[schema(example = "Sábado")]
    pub dia_semana: String,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessMetricsReport {
    pub metrics: BusinessMetrics,
    pub peak_hours: Vec<PeakHour>,
    pub peak_days: Vec<PeakDay>,
}
