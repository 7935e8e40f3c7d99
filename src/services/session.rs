// src/services/session.rs
//
// Cookie de sessão assinado: base64url(JSON) + "." + base64url(HMAC-SHA256).

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{
    common::error::AppError,
    models::auth::{SessionUser, User},
};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_MAX_AGE_DAYS: i64 = 7;

// Tolerância para relógios levemente adiantados
const CLOCK_SKEW_SECS: i64 = 60;

#[derive(Clone)]
pub struct SessionService {
    secret: Arc<[u8]>,
}

impl SessionService {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Arc::from(secret.as_bytes()),
        }
    }

    fn mac(&self) -> Result<HmacSha256, AppError> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("Chave HMAC inválida: {}", e)))
    }

    pub fn issue(&self, user: &User) -> Result<(SessionUser, String), AppError> {
        let session = SessionUser {
            id: user.id,
            nome: user.nome.clone(),
            email: user.email.clone(),
            tipo_usuario: user.tipo_usuario,
            issued_at: Utc::now().timestamp(),
        };
        let token = self.sign(&session)?;
        Ok((session, token))
    }

    pub fn sign(&self, session: &SessionUser) -> Result<String, AppError> {
        let json = serde_json::to_vec(session).map_err(anyhow::Error::from)?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", payload, signature))
    }

    /// Valida assinatura (tempo constante) e validade de 7 dias.
    pub fn verify(&self, token: &str) -> Result<SessionUser, AppError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<SessionUser, AppError> {
        let (payload, signature) = token.split_once('.').ok_or(AppError::Unauthenticated)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AppError::Unauthenticated)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AppError::Unauthenticated)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AppError::Unauthenticated)?;
        let session: SessionUser =
            serde_json::from_slice(&json).map_err(|_| AppError::Unauthenticated)?;

        let max_age = SESSION_MAX_AGE_DAYS * 24 * 60 * 60;
        if session.issued_at > now + CLOCK_SKEW_SECS || now - session.issued_at > max_age {
            return Err(AppError::Unauthenticated);
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserType;
    use uuid::Uuid;

    const SECRET: &str = "uma-chave-secreta-com-mais-de-32-caracteres";

    fn session(issued_at: i64) -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            nome: "Maria".into(),
            email: "maria@salao.com".into(),
            tipo_usuario: UserType::Admin,
            issued_at,
        }
    }

    #[test]
    fn signed_cookie_verifies() {
        let service = SessionService::new(SECRET);
        let original = session(Utc::now().timestamp());
        let token = service.sign(&original).unwrap();

        assert_eq!(service.verify(&token).unwrap(), original);
    }

    #[test]
    fn payload_carries_issued_at_in_camel_case() {
        let service = SessionService::new(SECRET);
        let token = service.sign(&session(1_700_000_000)).unwrap();
        let payload = token.split('.').next().unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();

        assert_eq!(json["issuedAt"], 1_700_000_000);
        assert_eq!(json["tipo_usuario"], "admin");
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let service = SessionService::new(SECRET);
        let mut original = session(Utc::now().timestamp());
        original.tipo_usuario = UserType::Funcionario;
        let token = service.sign(&original).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let mut forged = original.clone();
        forged.tipo_usuario = UserType::Admin;
        forged.nome = "Intrusa".into();
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

        let result = service.verify(&format!("{}.{}", forged_payload, signature));
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = SessionService::new(SECRET).sign(&session(Utc::now().timestamp())).unwrap();
        let other = SessionService::new("outra-chave-secreta-com-mais-de-32-caracteres");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn expired_and_future_sessions_are_rejected() {
        let service = SessionService::new(SECRET);
        let now = 1_800_000_000;

        let old = service.sign(&session(now - 8 * 24 * 60 * 60)).unwrap();
        assert!(service.verify_at(&old, now).is_err());

        let future = service.sign(&session(now + 3600)).unwrap();
        assert!(service.verify_at(&future, now).is_err());

        let fresh = service.sign(&session(now - 6 * 24 * 60 * 60)).unwrap();
        assert!(service.verify_at(&fresh, now).is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        let service = SessionService::new(SECRET);
        assert!(service.verify("").is_err());
        assert!(service.verify("abc").is_err());
        assert!(service.verify("abc.def").is_err());
    }
}
