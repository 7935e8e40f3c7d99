// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AdminUser, AuthenticatedUser},
    models::catalog::{Service, ServicePayload},
};

// GET /api/services
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Services",
    responses((status = 200, description = "Serviços em ordem alfabética", body = Vec<Service>)),
    security(("session_cookie" = []))
)]
pub async fn list_services(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let services = app_state.catalog_service.list().await?;
    Ok(Json(services))
}

// POST /api/services
#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Services",
    request_body = ServicePayload,
    responses(
        (status = 201, description = "Serviço criado", body = Service),
        (status = 400, description = "Dados inválidos")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Json(payload), _): WithRejection<Json<ServicePayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let service = app_state.catalog_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

// PUT /api/services/{id}
#[utoipa::path(
    put,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    request_body = ServicePayload,
    responses(
        (status = 200, description = "Serviço atualizado", body = Service),
        (status = 404, description = "Serviço não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_service(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<ServicePayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let service = app_state.catalog_service.update(id, payload).await?;
    Ok(Json(service))
}

// DELETE /api/services/{id}
#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses(
        (status = 200, description = "Serviço removido"),
        (status = 404, description = "Serviço não encontrado"),
        (status = 409, description = "Serviço possui agendamentos")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_service(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.catalog_service.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
