// src/handlers/webhook.rs

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::{
    common::{error::AppError, logging::redact},
    config::AppState,
    middleware::auth::{authorize_webhook, ClientIp, WEBHOOK_KEY_HEADER},
    models::webhook::{BookingRequest, RawWebhookPayload, WebhookInput, WebhookResponse},
};

// POST /api/webhook/whatsapp
#[utoipa::path(
    post,
    path = "/api/webhook/whatsapp",
    tag = "Webhook",
    request_body(content = RawWebhookPayload, description = "Também aceito como query string"),
    responses(
        (status = 201, description = "Agendamento criado como pendente", body = WebhookResponse),
        (status = 400, description = "Campos ausentes, inválidos ou fora do expediente"),
        (status = 401, description = "Chave do webhook inválida"),
        (status = 409, description = "Funcionário indisponível ou horário já reservado"),
        (status = 429, description = "Muitas requisições")
    ),
    security(("webhook_key" = []))
)]
pub async fn receive_booking(
    State(app_state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if !app_state.webhook_limiter.check(&ip).await {
        return Err(AppError::RateLimited);
    }
    authorize_webhook(&app_state, &headers)?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        if let Ok(value) = serde_json::from_slice::<Value>(&body) {
            tracing::debug!(payload = %redact(&value), "Corpo do webhook");
        }
    }

    let Query(query) = Query::<RawWebhookPayload>::try_from_uri(&uri)?;
    let input = WebhookInput::from_parts(query, &body)?;
    let transport = input.transport();

    let request = BookingRequest::try_from(input).inspect_err(|e| {
        tracing::info!(transporte = transport, motivo = %e, "Webhook recusado na validação");
    })?;

    let appointment = app_state.booking_service.book_from_webhook(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(WebhookResponse {
            success: true,
            message: "Agendamento criado com sucesso".to_string(),
            id: appointment.id,
            status: appointment.status,
        }),
    ))
}

// GET /api/webhook/whatsapp
#[utoipa::path(
    get,
    path = "/api/webhook/whatsapp",
    tag = "Webhook",
    responses(
        (status = 200, description = "Documento de uso do webhook"),
        (status = 401, description = "Chave do webhook inválida (produção)")
    ),
    security(("webhook_key" = []))
)]
pub async fn usage(State(app_state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, AppError> {
    if app_state.config.is_production() {
        authorize_webhook(&app_state, &headers)?;
    }
    Ok(Json(usage_document()))
}

fn usage_document() -> Value {
    json!({
        "endpoint": "/api/webhook/whatsapp",
        "method": "POST",
        "auth": format!("Header '{}: <chave>' ou 'Authorization: Bearer <chave>'", WEBHOOK_KEY_HEADER),
        "transport": "Query string ou corpo JSON (o corpo tem prioridade)",
        "required": {
            "cliente_nome": "Nome do cliente (3 a 100 caracteres)",
            "cliente_telefone": "Telefone com DDD (10 ou 11 dígitos, +55 opcional)",
            "data_agendamento": "YYYY-MM-DD",
            "hora_agendamento": "HH:MM, H:MM, HH:MM:SS ou H:MM:SS, entre 08:00 e 19:59"
        },
        "optional": {
            "servico_id": "UUID do serviço",
            "servico_nome": "Parte do nome do serviço",
            "funcionario_id": "UUID do funcionário",
            "funcionario_nome": "Parte do nome do funcionário habilitado para o serviço"
        },
        "aliases": {
            "cliente_nome": ["nome_cliente", "nome_do_cliente", "cliente", "nome"],
            "cliente_telefone": ["telefone_cliente", "telefone_do_cliente", "telefone", "celular", "whatsapp"],
            "data_agendamento": ["data_do_agendamento", "data", "dia"],
            "hora_agendamento": ["hora_do_agendamento", "horario_agendamento", "horario", "hora"],
            "funcionario_nome": ["nome_funcionario", "nome_do_funcionario", "funcionario", "profissional"],
            "funcionario_id": ["id_funcionario", "profissional_id"],
            "servico_nome": ["nome_do_servico", "servico", "procedimento"],
            "servico_id": ["id_servico"]
        },
        "example": {
            "cliente_nome": "Maria Souza",
            "cliente_telefone": "(11) 99999-9999",
            "data_agendamento": "2025-01-21",
            "hora_agendamento": "14:00",
            "servico_nome": "Corte",
            "funcionario_nome": "Ana"
        },
        "responses": {
            "201": "Agendamento criado (status pendente)",
            "400": "Campos ausentes ou inválidos, horário fora do expediente, funcionário não habilitado",
            "401": "Chave inválida",
            "409": "Funcionário indisponível ou horário já reservado",
            "429": "Muitas requisições"
        }
    })
}
