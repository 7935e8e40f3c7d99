//src/main.rs

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    common::logging::init_tracing();

    let app_state = AppState::new()
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let addr = app_state.config.bind_addr.clone();
    let app = build_router(app_state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    // ConnectInfo alimenta o ClientIp quando não há proxy na frente
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}

pub fn build_router(app_state: AppState) -> Router {
    // Públicas (o webhook confere a própria chave)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::get_me));

    let webhook_routes = Router::new().route(
        "/whatsapp",
        post(handlers::webhook::receive_booking).get(handlers::webhook::usage),
    );

    let appointment_routes = Router::new()
        .route(
            "/api/appointments",
            get(handlers::appointments::list_appointments).post(handlers::appointments::create_appointment),
        )
        .route("/api/appointments/available-times", get(handlers::appointments::available_times))
        .route("/api/appointments/update", patch(handlers::appointments::update_appointment))
        .route("/api/appointments/payment", patch(handlers::appointments::update_payment));

    let catalog_routes = Router::new()
        .route(
            "/api/services",
            get(handlers::catalog::list_services).post(handlers::catalog::create_service),
        )
        .route(
            "/api/services/{id}",
            put(handlers::catalog::update_service).delete(handlers::catalog::delete_service),
        );

    let staff_routes = Router::new()
        .route("/api/employees", get(handlers::employees::list_employees))
        .route("/api/employee-services", post(handlers::employees::replace_employee_services))
        .route(
            "/api/employee-services/{employee_id}",
            get(handlers::employees::get_employee_services),
        )
        .route(
            "/api/availability",
            get(handlers::availability::list_blocks).post(handlers::availability::create_block),
        )
        .route("/api/availability/{id}", delete(handlers::availability::delete_block));

    let expense_routes = Router::new().route(
        "/api/expenses",
        get(handlers::expenses::list_expenses)
            .post(handlers::expenses::create_expense)
            .put(handlers::expenses::update_expense)
            .delete(handlers::expenses::delete_expense),
    );

    let report_routes = Router::new()
        .route("/financial", get(handlers::reports::financial_report))
        .route("/service-performance", get(handlers::reports::service_performance))
        .route("/employee-revenue", get(handlers::reports::employee_revenue))
        .route("/profit-analysis", get(handlers::reports::profit_analysis))
        .route("/business-metrics", get(handlers::reports::business_metrics));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/dashboard", get(handlers::dashboard::get_summary))
        .nest("/api/auth", auth_routes)
        .nest("/api/webhook", webhook_routes)
        .nest("/api/reports", report_routes)
        .merge(appointment_routes)
        .merge(catalog_routes)
        .merge(staff_routes)
        .merge(expense_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
