// src/handlers/availability.rs

use axum::{
    extract::{Path, Query, State},
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
    middleware::auth::AuthenticatedUser,
    models::staff::{AvailabilityBlock, AvailabilityQuery, CreateAvailabilityPayload},
};

// GET /api/availability
#[utoipa::path(
    get,
    path = "/api/availability",
    tag = "Availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Bloqueios de agenda (funcionário vê só os próprios)", body = Vec<AvailabilityBlock>)
    ),
    security(("session_cookie" = []))
)]
pub async fn list_blocks(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Query(query), _): WithRejection<Query<AvailabilityQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let blocks = app_state.staff_service.list_blocks(&user, query.funcionario_id).await?;
    Ok(Json(blocks))
}

// POST /api/availability
#[utoipa::path(
    post,
    path = "/api/availability",
    tag = "Availability",
    request_body = CreateAvailabilityPayload,
    responses(
        (status = 201, description = "Bloqueio criado", body = AvailabilityBlock),
        (status = 400, description = "Horários ou dia da semana inválidos"),
        (status = 403, description = "Bloqueio na agenda de outro funcionário"),
        (status = 404, description = "Funcionário inexistente")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_block(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreateAvailabilityPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let block = app_state.staff_service.create_block(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

// DELETE /api/availability/{id}
#[utoipa::path(
    delete,
    path = "/api/availability/{id}",
    tag = "Availability",
    params(("id" = Uuid, Path, description = "ID do bloqueio")),
    responses(
        (status = 200, description = "Bloqueio removido"),
        (status = 403, description = "Bloqueio de outro funcionário"),
        (status = 404, description = "Bloqueio não encontrado")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_block(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.staff_service.delete_block(&user, id).await?;
    Ok(Json(json!({ "success": true })))
}
