// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Webhook ---
        handlers::webhook::receive_booking,
        handlers::webhook::usage,

        // --- Appointments ---
        handlers::appointments::list_appointments,
        handlers::appointments::create_appointment,
        handlers::appointments::available_times,
        handlers::appointments::update_appointment,
        handlers::appointments::update_payment,

        // --- Services ---
        handlers::catalog::list_services,
        handlers::catalog::create_service,
        handlers::catalog::update_service,
        handlers::catalog::delete_service,

        // --- Employees ---
        handlers::employees::list_employees,
        handlers::employees::get_employee_services,
        handlers::employees::replace_employee_services,

        // --- Availability ---
        handlers::availability::list_blocks,
        handlers::availability::create_block,
        handlers::availability::delete_block,

        // --- Expenses ---
        handlers::expenses::list_expenses,
        handlers::expenses::create_expense,
        handlers::expenses::update_expense,
        handlers::expenses::delete_expense,

        // --- Reports ---
        handlers::reports::financial_report,
        handlers::reports::service_performance,
        handlers::reports::employee_revenue,
        handlers::reports::profit_analysis,
        handlers::reports::business_metrics,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserType,
            models::auth::User,
            models::auth::SessionUser,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Webhook ---
            models::webhook::RawWebhookPayload,
            models::webhook::WebhookResponse,

            // --- Appointments ---
            models::appointments::AppointmentStatus,
            models::appointments::Appointment,
            models::appointments::AppointmentDetail,
            models::appointments::CreateAppointmentPayload,
            models::appointments::UpdateAppointmentPayload,
            models::appointments::UpdatePaymentPayload,
            models::appointments::AvailableTimesResponse,
            models::appointments::UpdateAppointmentResponse,

            // --- Catálogo e equipe ---
            models::catalog::Service,
            models::catalog::ServicePayload,
            models::staff::Employee,
            models::staff::EmployeeWithServices,
            models::staff::UpdateEmployeeServicesPayload,
            models::staff::AvailabilityBlock,
            models::staff::CreateAvailabilityPayload,

            // --- Expenses ---
            models::expenses::Expense,
            models::expenses::ExpensePayload,
            models::expenses::UpdateExpensePayload,
            models::expenses::ExpensePeriod,

            // --- Reports ---
            models::reports::ReportPeriod,
            models::reports::ServicePerformance,
            models::reports::EmployeeRevenue,
            models::reports::DailyProfit,
            models::reports::ProfitAnalysis,
            models::reports::BusinessMetrics,
            models::reports::PeakHour,
            models::reports::PeakDay,
            models::reports::BusinessMetricsReport,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Login por cookie de sessão"),
        (name = "Webhook", description = "Entrada de agendamentos vindos do WhatsApp"),
        (name = "Appointments", description = "Agenda do salão"),
        (name = "Services", description = "Catálogo de serviços"),
        (name = "Employees", description = "Funcionários e serviços habilitados"),
        (name = "Availability", description = "Bloqueios semanais de agenda"),
        (name = "Expenses", description = "Despesas do salão"),
        (name = "Reports", description = "Relatórios gerenciais"),
        (name = "Dashboard", description = "Resumo do dia")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session"))),
        );
        components.add_security_scheme(
            "webhook_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-api-key"))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_booking_routes_and_schemes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/webhook/whatsapp"));
        assert!(doc.paths.paths.contains_key("/api/appointments/available-times"));
        assert!(doc.paths.paths.contains_key("/api/reports/financial"));

        let schemes = &doc.components.expect("components").security_schemes;
        assert!(schemes.contains_key("session_cookie"));
        assert!(schemes.contains_key("webhook_key"));
    }
}
