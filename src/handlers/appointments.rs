// src/handlers/appointments.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::appointments::{
        Appointment, AppointmentDetail, AppointmentListQuery, AvailableTimesQuery, AvailableTimesResponse,
        CreateAppointmentPayload, UpdateAppointmentPayload, UpdateAppointmentResponse, UpdatePaymentPayload,
    },
};

// GET /api/appointments
#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Appointments",
    params(AppointmentListQuery),
    responses(
        (status = 200, description = "Agendamentos (funcionário vê só os próprios)", body = Vec<AppointmentDetail>),
        (status = 401, description = "Não autenticado")
    ),
    security(("session_cookie" = []))
)]
pub async fn list_appointments(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Query(query), _): WithRejection<Query<AppointmentListQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let appointments = app_state.appointment_service.list(&user, &query).await?;
    Ok((StatusCode::OK, Json(appointments)))
}

// POST /api/appointments
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    request_body = CreateAppointmentPayload,
    responses(
        (status = 201, description = "Agendamento criado como confirmado", body = Appointment),
        (status = 400, description = "Dados inválidos ou funcionário não habilitado"),
        (status = 403, description = "Funcionário agendando para outro"),
        (status = 404, description = "Serviço ou funcionário inexistente"),
        (status = 409, description = "Horário bloqueado ou já reservado")
    ),
    security(("session_cookie" = []))
)]
pub async fn create_appointment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreateAppointmentPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = app_state.appointment_service.create(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

// GET /api/appointments/available-times
#[utoipa::path(
    get,
    path = "/api/appointments/available-times",
    tag = "Appointments",
    params(AvailableTimesQuery),
    responses(
        (status = 200, description = "Horários livres de 30 em 30 minutos", body = AvailableTimesResponse),
        (status = 400, description = "Data inválida")
    ),
    security(("session_cookie" = []))
)]
pub async fn available_times(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Query(query), _): WithRejection<Query<AvailableTimesQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let horarios = app_state
        .appointment_service
        .available_times(&user, query.funcionario_id, &query.data)
        .await?;
    Ok(Json(AvailableTimesResponse { horarios }))
}

// PATCH /api/appointments/update
#[utoipa::path(
    patch,
    path = "/api/appointments/update",
    tag = "Appointments",
    request_body = UpdateAppointmentPayload,
    responses(
        (status = 200, description = "Agendamento atualizado", body = UpdateAppointmentResponse),
        (status = 403, description = "Agendamento de outro funcionário"),
        (status = 404, description = "Agendamento não encontrado"),
        (status = 409, description = "Transição de status não permitida")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_appointment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateAppointmentPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let data = app_state
        .appointment_service
        .update(&user, payload.appointment_id, payload.status, payload.pago)
        .await?;
    Ok(Json(UpdateAppointmentResponse { success: true, data }))
}

// PATCH /api/appointments/payment
#[utoipa::path(
    patch,
    path = "/api/appointments/payment",
    tag = "Appointments",
    request_body = UpdatePaymentPayload,
    responses(
        (status = 200, description = "Pagamento atualizado", body = UpdateAppointmentResponse),
        (status = 404, description = "Agendamento não encontrado"),
        (status = 409, description = "Agendamento cancelado ou pagamento já concluído")
    ),
    security(("session_cookie" = []))
)]
pub async fn update_payment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    WithRejection(Json(payload), _): WithRejection<Json<UpdatePaymentPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let data = app_state
        .appointment_service
        .update(&user, payload.appointment_id, None, Some(payload.pago))
        .await?;
    Ok(Json(UpdateAppointmentResponse { success: true, data }))
}
