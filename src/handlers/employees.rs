// src/handlers/employees.rs

use axum::{
    extract::{Path, State},
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
    models::staff::{EmployeeWithServices, UpdateEmployeeServicesPayload},
};

// GET /api/employees
#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    responses(
        (status = 200, description = "Funcionários com os serviços habilitados", body = Vec<EmployeeWithServices>),
        (status = 403, description = "Apenas admin")
    ),
    security(("session_cookie" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let employees = app_state.staff_service.list_employees().await?;
    Ok(Json(employees))
}

// GET /api/employee-services/{employee_id}
#[utoipa::path(
    get,
    path = "/api/employee-services/{employee_id}",
    tag = "Employees",
    params(("employee_id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 200, description = "IDs dos serviços habilitados", body = Vec<Uuid>),
        (status = 403, description = "Consulta de outro funcionário")
    ),
    security(("session_cookie" = []))
)]
pub async fn get_employee_services(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Path(employee_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let ids = app_state.staff_service.services_of(&user, employee_id).await?;
    Ok(Json(ids))
}

// POST /api/employee-services
#[utoipa::path(
    post,
    path = "/api/employee-services",
    tag = "Employees",
    request_body = UpdateEmployeeServicesPayload,
    responses(
        (status = 200, description = "Conjunto de serviços substituído"),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Funcionário ou serviço inexistente")
    ),
    security(("session_cookie" = []))
)]
pub async fn replace_employee_services(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateEmployeeServicesPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let ids = app_state.staff_service.replace_services(payload).await?;
    Ok(Json(json!({ "success": true, "serviceIds": ids })))
}
