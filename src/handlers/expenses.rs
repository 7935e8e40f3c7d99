// src/handlers/expenses.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::json;

use crate::{
    common::{error::AppError, validation::today},
    config::AppState,
    middleware::auth::AdminUser,
    models::expenses::{Expense, ExpenseIdQuery, ExpenseListQuery, ExpensePayload, UpdateExpensePayload},
};

// GET /api/expenses
#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    params(ExpenseListQuery),
    responses(
        (status = 200, description = "Despesas do período, mais recentes primeiro", body = Vec<Expense>),
        (status = 403, description = "Apenas admin")
    ),
    security(("session_cookie" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Query(query), _): WithRejection<Query<ExpenseListQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let expenses = app_state.expense_service.list(query.period, today()).await?;
    Ok(Json(expenses))
}

// POST /api/expenses
#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = ExpensePayload,
    responses(
        (status = 201, description = "Despesa registrada", body = Expense),
        (status = 400, description = "Dados inválidos")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Json(payload), _): WithRejection<Json<ExpensePayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let expense = app_state.expense_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

// PUT /api/expenses
#[utoipa::path(
    put,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = UpdateExpensePayload,
    responses(
        (status = 200, description = "Despesa atualizada", body = Expense),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_expense(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateExpensePayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let expense = app_state.expense_service.update(payload.id, payload.dados).await?;
    Ok(Json(expense))
}

// DELETE /api/expenses?id=
#[utoipa::path(
    delete,
    path = "/api/expenses",
    tag = "Expenses",
    params(ExpenseIdQuery),
    responses(
        (status = 200, description = "Despesa removida"),
        (status = 400, description = "id ausente"),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    WithRejection(Query(query), _): WithRejection<Query<ExpenseIdQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let id = query
        .id
        .ok_or_else(|| AppError::InvalidInput("Informe o id da despesa.".to_string()))?;
    app_state.expense_service.delete(id).await?;
    Ok(Json(json!({ "success": true })))
}
