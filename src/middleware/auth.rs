// src/middleware/auth.rs

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};
use subtle::ConstantTimeEq;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::SessionUser,
    services::session::SESSION_COOKIE,
};

pub const WEBHOOK_KEY_HEADER: &str = "x-api-key";

// Extrator para obter o usuário da sessão diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub SessionUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(SESSION_COOKIE).ok_or(AppError::Unauthenticated)?;

        let user = app_state.auth_service.sessions().verify(cookie.value())?;
        Ok(AuthenticatedUser(user))
    }
}

/// Sessão válida de um usuário `admin`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub SessionUser);

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!(usuario_id = %user.id, "Acesso negado a rota de admin");
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

/// IP de origem. Com `TRUST_PROXY` ligado usa x-forwarded-for / x-real-ip;
/// sem ele, só o endereço da conexão TCP. Na falta de ambos, "unknown".
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientIp(resolve_client_ip(
            &parts.headers,
            peer,
            app_state.config.trust_proxy,
        )))
    }
}

pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let from_header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let forwarded = if trust_proxy {
        from_header("x-forwarded-for").or_else(|| from_header("x-real-ip"))
    } else {
        None
    };

    forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Confere a chave do webhook (`x-api-key` ou `Authorization: Bearer`).
/// Sem chave configurada, só libera fora de produção.
pub fn authorize_webhook(app_state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = app_state.config.webhook_api_key.as_deref() else {
        if app_state.config.is_production() {
            tracing::error!("WEBHOOK_API_KEY não configurada em produção; webhook recusado");
            return Err(AppError::InvalidWebhookCredentials);
        }
        return Ok(());
    };

    let presented = headers
        .get(WEBHOOK_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            headers
                .typed_get::<Authorization<Bearer>>()
                .map(|auth| auth.token().to_string())
        })
        .ok_or(AppError::InvalidWebhookCredentials)?;

    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        tracing::warn!("Chave do webhook inválida");
        Err(AppError::InvalidWebhookCredentials)
    }
}
