// src/services/auth.rs

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use bcrypt::{hash, verify};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{SessionUser, User},
    services::{rate_limit::RateLimiter, session::SessionService},
};

/// Acesso às credenciais usado pelo login.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Comparação sem diferenciar maiúsculas.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError>;
}

// Hash de referência para gastar o mesmo tempo quando o e-mail não existe
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash("senha-inexistente", bcrypt::DEFAULT_COST).ok());

/// Resultado da conferência de senha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Valid,
    /// Senha certa, mas guardada em texto puro: precisa virar hash.
    ValidNeedsRehash,
    Invalid,
}

pub fn is_bcrypt_hash(stored: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"].iter().any(|p| stored.starts_with(p)) && stored.len() == 60
}

/// Confere a senha informada contra o valor armazenado.
/// Hash bcrypt só é conferido pelo bcrypt; texto puro usa comparação em tempo constante.
pub fn check_password(stored: &str, input: &str) -> Result<PasswordCheck, AppError> {
    if is_bcrypt_hash(stored) {
        return Ok(if verify(input, stored)? {
            PasswordCheck::Valid
        } else {
            PasswordCheck::Invalid
        });
    }

    // ct_eq já devolve falso para tamanhos diferentes
    if bool::from(stored.as_bytes().ct_eq(input.as_bytes())) {
        Ok(PasswordCheck::ValidNeedsRehash)
    } else {
        Ok(PasswordCheck::Invalid)
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    sessions: SessionService,
    login_limiter: Arc<dyn RateLimiter>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        sessions: SessionService,
        login_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            users,
            sessions,
            login_limiter,
        }
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    /// Devolve o usuário da sessão e o valor assinado do cookie.
    pub async fn login_user(
        &self,
        client_ip: &str,
        email: &str,
        password: &str,
    ) -> Result<(SessionUser, String), AppError> {
        if !self.login_limiter.check(client_ip).await {
            return Err(AppError::RateLimited);
        }

        let email = email.trim();
        let Some(user) = self.users.find_by_email(email).await? else {
            self.burn_verify_time(password).await;
            return Err(AppError::InvalidCredentials);
        };

        let password_clone = password.to_owned();
        let stored_clone = user.senha.clone();

        // bcrypt é custoso, roda fora do executor
        let outcome = tokio::task::spawn_blocking(move || check_password(&stored_clone, &password_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        match outcome {
            PasswordCheck::Invalid => {
                tracing::info!(usuario_id = %user.id, "Tentativa de login com senha incorreta");
                return Err(AppError::InvalidCredentials);
            }
            PasswordCheck::ValidNeedsRehash => self.upgrade_password(&user.id, password).await?,
            PasswordCheck::Valid => {}
        }

        tracing::info!(usuario_id = %user.id, tipo = ?user.tipo_usuario, "Login realizado");
        self.sessions.issue(&user)
    }

    // E-mail inexistente paga o mesmo custo de um bcrypt verify
    async fn burn_verify_time(&self, password: &str) {
        let password_clone = password.to_owned();
        let _ = tokio::task::spawn_blocking(move || {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify(&password_clone, dummy);
            }
        })
        .await;
    }

    async fn upgrade_password(&self, user_id: &Uuid, password: &str) -> Result<(), AppError> {
        let password_clone = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        self.users.update_password(*user_id, &hashed).await?;
        tracing::info!(usuario_id = %user_id, "Senha legada migrada para bcrypt");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use parking_lot::Mutex;

    use crate::{models::auth::UserType, services::rate_limit::InMemoryRateLimiter};

    /// Tabela `users` em memória; guarda cada senha gravada.
    #[derive(Default)]
    struct FakeCredentials {
        users: Mutex<Vec<User>>,
        writes: Mutex<Vec<String>>,
    }

    impl FakeCredentials {
        fn with_user(email: &str, senha: &str) -> Self {
            let store = Self::default();
            store.users.lock().push(User {
                id: Uuid::new_v4(),
                nome: "Ana Lima".into(),
                email: email.into(),
                senha: senha.into(),
                tipo_usuario: UserType::Funcionario,
                telefone: None,
                criado_em: Utc::now(),
            });
            store
        }

        fn stored_password(&self) -> String {
            self.users.lock()[0].senha.clone()
        }
    }

    #[async_trait]
    impl CredentialStore for FakeCredentials {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
            Ok(self
                .users
                .lock()
                .iter()
                .find(|u| u.email.to_lowercase() == email.to_lowercase())
                .cloned())
        }

        async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
            let mut users = self.users.lock();
            let user = users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(|| AppError::ResourceNotFound("Usuário".into()))?;
            user.senha = password_hash.to_string();
            self.writes.lock().push(password_hash.to_string());
            Ok(())
        }
    }

    fn auth_with(store: Arc<FakeCredentials>) -> AuthService {
        AuthService::new(
            store,
            SessionService::new(&"k".repeat(40)),
            Arc::new(InMemoryRateLimiter::new(10, Duration::from_secs(60))),
        )
    }

    #[tokio::test]
    async fn plaintext_login_is_persisted_as_bcrypt_and_then_verified_as_hash() {
        let store = Arc::new(FakeCredentials::with_user("ana@salao.com", "123"));
        let auth = auth_with(store.clone());

        let (session, token) = auth.login_user("10.0.0.1", "Ana@Salao.com", "123").await.unwrap();
        assert_eq!(session.email, "ana@salao.com");
        assert_eq!(auth.sessions().verify(&token).unwrap().id, session.id);

        let stored = store.stored_password();
        assert!(stored.starts_with("$2b$"));
        assert_eq!(stored.len(), 60);
        assert!(is_bcrypt_hash(&stored));
        assert_eq!(check_password(&stored, "123").unwrap(), PasswordCheck::Valid);

        // Segundo login já passa pelo bcrypt e não regrava a senha
        auth.login_user("10.0.0.1", "ana@salao.com", "123").await.unwrap();
        assert_eq!(store.writes.lock().len(), 1);
        assert_eq!(store.stored_password(), stored);

        // O texto puro antigo não vale mais como comparação direta
        let err = auth.login_user("10.0.0.1", "ana@salao.com", &stored).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn wrong_password_does_not_touch_the_stored_value() {
        let store = Arc::new(FakeCredentials::with_user("ana@salao.com", "123"));
        let auth = auth_with(store.clone());

        let err = auth.login_user("10.0.0.1", "ana@salao.com", "1234").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert_eq!(store.stored_password(), "123");
        assert!(store.writes.lock().is_empty());
    }

    #[tokio::test]
    async fn unknown_email_gets_the_same_answer_as_a_wrong_password() {
        let store = Arc::new(FakeCredentials::with_user("ana@salao.com", "123"));
        let auth = auth_with(store.clone());

        // Gera o hash de referência antes de medir
        assert!(DUMMY_HASH.as_deref().is_some_and(is_bcrypt_hash));

        let started = std::time::Instant::now();
        let err = auth.login_user("10.0.0.1", "ninguem@salao.com", "123").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
        // Um verify com custo padrão nunca sai em poucos milissegundos
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(store.writes.lock().is_empty());
    }

    #[tokio::test]
    async fn login_is_rate_limited_per_ip() {
        let store = Arc::new(FakeCredentials::with_user("ana@salao.com", "123"));
        let auth = AuthService::new(
            store,
            SessionService::new(&"k".repeat(40)),
            Arc::new(InMemoryRateLimiter::new(1, Duration::from_secs(60))),
        );

        assert!(auth.login_user("10.0.0.1", "ana@salao.com", "errada").await.is_err());
        let err = auth.login_user("10.0.0.1", "ana@salao.com", "123").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited));
        assert!(auth.login_user("10.0.0.2", "ana@salao.com", "123").await.is_ok());
    }

    #[test]
    fn plaintext_match_asks_for_rehash() {
        assert_eq!(
            check_password("123", "123").unwrap(),
            PasswordCheck::ValidNeedsRehash
        );
        assert_eq!(check_password("123", "1234").unwrap(), PasswordCheck::Invalid);
        assert_eq!(check_password("abc", "ABC").unwrap(), PasswordCheck::Invalid);
    }

    #[test]
    fn bcrypt_hash_is_verified_by_bcrypt_only() {
        let stored = hash("segredo", 4).unwrap();
        assert!(is_bcrypt_hash(&stored));
        assert_eq!(check_password(&stored, "segredo").unwrap(), PasswordCheck::Valid);
        assert_eq!(check_password(&stored, "errada").unwrap(), PasswordCheck::Invalid);
        // Digitar o próprio hash não passa como texto puro
        assert_eq!(check_password(&stored, &stored).unwrap(), PasswordCheck::Invalid);
    }

    #[test]
    fn rehashed_password_is_then_verified_as_hash() {
        let upgraded = hash("123", 4).unwrap();
        assert_eq!(check_password(&upgraded, "123").unwrap(), PasswordCheck::Valid);
    }

    #[test]
    fn prefix_alone_is_not_a_hash() {
        assert!(!is_bcrypt_hash("$2b$curta"));
        assert_eq!(
            check_password("$2b$curta", "$2b$curta").unwrap(),
            PasswordCheck::ValidNeedsRehash
        );
    }
}
