// src/services/report_service.rs
//
// Relatórios gerenciais. As linhas vêm do banco já filtradas por período e a
// agregação é feita em memória (volume de um único salão).

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Timelike};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        validation::parse_date,
    },
    db::{AppointmentRepository, ExpenseRepository, ServiceRepository, UserRepository},
    models::{
        appointments::{AppointmentDetail, AppointmentStatus},
        expenses::ExpensePeriod,
        reports::{
            BusinessMetrics, BusinessMetricsReport, DailyProfit, EmployeeRevenue, ExpenseEntry, PeakDay,
            PeakHour, PricedAppointment, ProfitAnalysis, ReportPeriod, ServicePerformance,
        },
        staff::Employee,
    },
};

pub const CSV_HEADER: &str = "Data,Hora,Cliente,Telefone,Serviço,Funcionário,Valor,Status,Pago";

const DAY_NAMES: [&str; 7] = ["Domingo", "Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado"];

const METRICS_WINDOW_DAYS: u64 = 30;
const DAILY_CHART_DAYS: u64 = 30;
const TOP_PEAK_HOURS: usize = 5;

/// `part / total` em percentual com duas casas; "0.00" quando não há base.
pub fn percent(part: u32, total: u32) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    let value = Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(total);
    format!("{:.2}", value.round_dp(2))
}

pub fn service_performance(
    services: &[(Uuid, String, Decimal)],
    appointments: &[PricedAppointment],
) -> Vec<ServicePerformance> {
    let mut report: Vec<ServicePerformance> = services
        .iter()
        .map(|(id, nome, preco)| {
            let mine = appointments.iter().filter(|a| a.servico_id == *id);
            let (mut total, mut vendas, mut cancelamentos) = (0u32, 0u32, 0u32);
            for a in mine {
                total += 1;
                match a.status {
                    AppointmentStatus::Concluido => vendas += 1,
                    AppointmentStatus::Cancelado => cancelamentos += 1,
                    _ => {}
                }
            }
            ServicePerformance {
                id: *id,
                nome_servico: nome.clone(),
                preco: *preco,
                total_vendas: vendas,
                receita_total: *preco * Decimal::from(vendas),
                cancelamentos,
                taxa_conversao: percent(vendas, total),
            }
        })
        .collect();

    report.sort_by(|a, b| b.receita_total.cmp(&a.receita_total));
    report
}

pub fn employee_revenue(employees: &[Employee], appointments: &[PricedAppointment]) -> Vec<EmployeeRevenue> {
    let mut report: Vec<EmployeeRevenue> = employees
        .iter()
        .map(|employee| {
            let mut row = EmployeeRevenue {
                id: employee.id,
                nome: employee.nome.clone(),
                total_atendimentos: 0,
                faturamento_realizado: Decimal::ZERO,
                faturamento_pendente: Decimal::ZERO,
                cancelamentos: 0,
            };
            for a in appointments.iter().filter(|a| a.funcionario_id == employee.id) {
                match (a.status, a.pago) {
                    (AppointmentStatus::Concluido, true) => {
                        row.total_atendimentos += 1;
                        row.faturamento_realizado += a.preco;
                    }
                    (AppointmentStatus::Concluido, false) => {
                        row.total_atendimentos += 1;
                        row.faturamento_pendente += a.preco;
                    }
                    (AppointmentStatus::Confirmado, _) => row.faturamento_pendente += a.preco,
                    (AppointmentStatus::Cancelado, _) => row.cancelamentos += 1,
                    (AppointmentStatus::Pendente, _) => {}
                }
            }
            row
        })
        .collect();

    report.sort_by(|a, b| b.faturamento_realizado.cmp(&a.faturamento_realizado));
    report
}

/// Receita = agendamentos pagos. `daily_data` cobre os últimos 30 dias até `today`.
pub fn profit_analysis(
    appointments: &[PricedAppointment],
    expenses: &[ExpenseEntry],
    today: NaiveDate,
) -> ProfitAnalysis {
    let paid: Vec<&PricedAppointment> = appointments.iter().filter(|a| a.pago).collect();

    let total_revenue: Decimal = paid.iter().map(|a| a.preco).sum();
    let total_expenses: Decimal = expenses.iter().map(|e| e.valor).sum();
    let net_profit = total_revenue - total_expenses;
    let profit_margin = if total_revenue.is_zero() {
        Decimal::ZERO
    } else {
        (net_profit * Decimal::ONE_HUNDRED / total_revenue).round_dp(2)
    };

    let mut expenses_by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    for e in expenses {
        *expenses_by_category.entry(e.categoria.clone()).or_default() += e.valor;
    }

    let mut revenue_by_day: HashMap<NaiveDate, Decimal> = HashMap::new();
    for a in &paid {
        *revenue_by_day.entry(a.data_agendamento).or_default() += a.preco;
    }
    let mut expenses_by_day: HashMap<NaiveDate, Decimal> = HashMap::new();
    for e in expenses {
        *expenses_by_day.entry(e.data).or_default() += e.valor;
    }

    let daily_data = (0..DAILY_CHART_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(chrono::Days::new(back)))
        .map(|date| {
            let revenue = revenue_by_day.get(&date).copied().unwrap_or_default();
            let expenses = expenses_by_day.get(&date).copied().unwrap_or_default();
            DailyProfit {
                date,
                revenue,
                expenses,
                profit: revenue - expenses,
            }
        })
        .collect();

    ProfitAnalysis {
        total_revenue,
        total_expenses,
        net_profit,
        profit_margin,
        expenses_by_category,
        daily_data,
    }
}

pub fn business_metrics(appointments: &[PricedAppointment]) -> BusinessMetricsReport {
    let completed: Vec<&PricedAppointment> = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Concluido)
        .collect();
    let cancelled = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Cancelado)
        .count() as u32;

    let clientes: HashSet<&str> = completed.iter().map(|a| a.cliente_telefone.as_str()).collect();
    let total_atendimentos = completed.len() as u32;
    let ticket_medio = if completed.is_empty() {
        Decimal::ZERO
    } else {
        (completed.iter().map(|a| a.preco).sum::<Decimal>() / Decimal::from(total_atendimentos)).round_dp(2)
    };

    let mut by_hour: BTreeMap<u32, u32> = BTreeMap::new();
    let mut by_day: BTreeMap<u32, u32> = BTreeMap::new();
    for a in &completed {
        *by_hour.entry(a.hora_agendamento.hour()).or_default() += 1;
        *by_day.entry(a.data_agendamento.weekday().num_days_from_sunday()).or_default() += 1;
    }

    // Empates ficam na ordem crescente de hora/dia (sort estável sobre o BTreeMap)
    let mut peak_hours: Vec<PeakHour> = by_hour
        .into_iter()
        .map(|(hora, total)| PeakHour { hora, total })
        .collect();
    peak_hours.sort_by(|a, b| b.total.cmp(&a.total));
    peak_hours.truncate(TOP_PEAK_HOURS);

    let mut peak_days: Vec<(u32, u32)> = by_day.into_iter().collect();
    peak_days.sort_by(|a, b| b.1.cmp(&a.1));
    let peak_days = peak_days
        .into_iter()
        .map(|(day, total)| PeakDay {
            dia_semana: DAY_NAMES[day as usize % 7].to_string(),
            total,
        })
        .collect();

    BusinessMetricsReport {
        metrics: BusinessMetrics {
            clientes_atendidos: clientes.len() as u32,
            total_atendimentos,
            ticket_medio,
            total_cancelamentos: cancelled,
            taxa_cancelamento: percent(cancelled, appointments.len() as u32),
        },
        peak_hours,
        peak_days,
    }
}

/// Campo CSV entre aspas, com aspas internas duplicadas.
pub fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn financial_csv(rows: &[AppointmentDetail]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for r in rows {
        lines.push(
            [
                r.data_agendamento.format("%Y-%m-%d").to_string(),
                r.hora_agendamento.format("%H:%M").to_string(),
                csv_quote(&r.cliente_nome),
                csv_quote(&r.cliente_telefone),
                csv_quote(&r.nome_servico),
                csv_quote(&r.funcionario_nome),
                format!("{:.2}", r.preco),
                r.status.to_string(),
                if r.pago { "Sim" } else { "Não" }.to_string(),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

#[derive(Clone)]
pub struct ReportService {
    appointment_repo: AppointmentRepository,
    expense_repo: ExpenseRepository,
    service_repo: ServiceRepository,
    user_repo: UserRepository,
}

impl ReportService {
    pub fn new(
        appointment_repo: AppointmentRepository,
        expense_repo: ExpenseRepository,
        service_repo: ServiceRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            appointment_repo,
            expense_repo,
            service_repo,
            user_repo,
        }
    }

    pub async fn financial_csv(&self, start: Option<&str>, end: Option<&str>) -> Result<String, AppError> {
        let start = start.filter(|s| !s.trim().is_empty()).map(parse_date).transpose()?;
        let end = end.filter(|s| !s.trim().is_empty()).map(parse_date).transpose()?;
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(AppError::InvalidInput(
                    "A data inicial deve ser anterior à final.".to_string(),
                ));
            }
        }
        let rows = self.appointment_repo.completed_detailed_between(start, end).await?;
        Ok(financial_csv(&rows))
    }

    pub async fn service_performance(
        &self,
        period: ReportPeriod,
        today: NaiveDate,
    ) -> Result<Vec<ServicePerformance>, AppError> {
        let services = self.service_repo.prices().await?;
        let appointments = self.appointment_repo.priced_since(period.start_date(today)).await?;
        Ok(service_performance(&services, &appointments))
    }

    pub async fn employee_revenue(
        &self,
        period: ReportPeriod,
        today: NaiveDate,
    ) -> Result<Vec<EmployeeRevenue>, AppError> {
        let employees = self.user_repo.list_employees().await?;
        let appointments = self.appointment_repo.priced_since(period.start_date(today)).await?;
        Ok(employee_revenue(&employees, &appointments))
    }

    pub async fn profit_analysis(&self, period: ExpensePeriod, today: NaiveDate) -> Result<ProfitAnalysis, AppError> {
        let since = period.start_date(today);
        let appointments = self.appointment_repo.priced_since(since).await?;
        let expenses = self.expense_repo.entries_between(since, None).await?;
        Ok(profit_analysis(&appointments, &expenses, today))
    }

    pub async fn business_metrics(&self, today: NaiveDate) -> Result<BusinessMetricsReport, AppError> {
        let since = today.checked_sub_days(chrono::Days::new(METRICS_WINDOW_DAYS));
        let appointments = self.appointment_repo.priced_since(since).await?;
        Ok(business_metrics(&appointments))
    }
}
