// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    common::{error::AppError, validation::today},
    config::AppState,
    middleware::auth::AdminUser,
    models::{
        expenses::ExpenseListQuery,
        reports::{
            BusinessMetricsReport, DateRangeQuery, EmployeeRevenue, ProfitAnalysis, ReportPeriodQuery,
            ServicePerformance,
        },
    },
};

fn csv_filename(date: chrono::NaiveDate) -> String {
    format!("attachment; filename=\"relatorio-financeiro-{}.csv\"", date.format("%Y-%m-%d"))
}

// GET /api/reports/financial
#[utoipa::path(
    get,
    path = "/api/reports/financial",
    tag = "Reports",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "CSV dos atendimentos concluídos", body = String, content_type = "text/csv"),
        (status = 400, description = "Datas inválidas")
    ),
    security(("session_cookie" = []))
)]
pub async fn financial_report(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Query(query), _): WithRejection<Query<DateRangeQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let csv = app_state
        .report_service
        .financial_csv(query.start_date.as_deref(), query.end_date.as_deref())
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, csv_filename(today())),
        ],
        csv,
    ))
}

// GET /api/reports/service-performance
#[utoipa::path(
    get,
    path = "/api/reports/service-performance",
    tag = "Reports",
    params(ReportPeriodQuery),
    responses((status = 200, description = "Desempenho por serviço", body = Vec<ServicePerformance>)),
    security(("session_cookie" = []))
)]
pub async fn service_performance(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Query(query), _): WithRejection<Query<ReportPeriodQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.report_service.service_performance(query.period, today()).await?;
    Ok(Json(report))
}

// GET /api/reports/employee-revenue
#[utoipa::path(
    get,
    path = "/api/reports/employee-revenue",
    tag = "Reports",
    params(ReportPeriodQuery),
    responses((status = 200, description = "Faturamento por funcionário", body = Vec<EmployeeRevenue>)),
    security(("session_cookie" = []))
)]
pub async fn employee_revenue(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Query(query), _): WithRejection<Query<ReportPeriodQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.report_service.employee_revenue(query.period, today()).await?;
    Ok(Json(report))
}

// GET /api/reports/profit-analysis
#[utoipa::path(
    get,
    path = "/api/reports/profit-analysis",
    tag = "Reports",
    params(ExpenseListQuery),
    responses((status = 200, description = "Receita, despesas e lucro", body = ProfitAnalysis)),
    security(("session_cookie" = []))
)]
pub async fn profit_analysis(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Query(query), _): WithRejection<Query<ExpenseListQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.report_service.profit_analysis(query.period, today()).await?;
    Ok(Json(report))
}

// GET /api/reports/business-metrics
#[utoipa::path(
    get,
    path = "/api/reports/business-metrics",
    tag = "Reports",
    responses((status = 200, description = "Métricas dos últimos 30 dias", body = BusinessMetricsReport)),
    security(("session_cookie" = []))
)]
pub async fn business_metrics(
    State(app_state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.report_service.business_metrics(today()).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn csv_attachment_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(
            csv_filename(date),
            "attachment; filename=\"relatorio-financeiro-2025-01-09.csv\""
        );
    }
}
