// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AppointmentRepository, AvailabilityRepository, EmployeeServiceRepository, ExpenseRepository,
        PgBookingStore, ServiceRepository, UserRepository,
    },
    services::{
        appointment_service::AppointmentService,
        auth::AuthService,
        booking_service::BookingService,
        catalog_service::CatalogService,
        dashboard_service::DashboardService,
        expense_service::ExpenseService,
        rate_limit::{InMemoryRateLimiter, RateLimiter},
        report_service::ReportService,
        session::SessionService,
        staff_service::StaffService,
    },
};

pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

/// Configuração lida do ambiente (e do `.env`, se houver).
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub webhook_api_key: Option<String>,
    pub app_env: AppEnv,
    pub bind_addr: String,
    /// Só com proxy reverso na frente: libera x-forwarded-for / x-real-ip
    pub trust_proxy: bool,
    pub login_rate_limit: u32,
    pub login_rate_window: Duration,
    pub webhook_rate_limit: u32,
    pub webhook_rate_window: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let number = |key: &str, default: u64| -> anyhow::Result<u64> {
            match var(key) {
                Some(v) => v
                    .parse::<u64>()
                    .with_context(|| format!("{} deve ser um número inteiro", key)),
                None => Ok(default),
            }
        };

        let flag = |key: &str| -> anyhow::Result<bool> {
            match var(key).map(|v| v.to_lowercase()).as_deref() {
                None | Some("false") | Some("0") | Some("no") => Ok(false),
                Some("true") | Some("1") | Some("yes") => Ok(true),
                Some(other) => Err(anyhow!("{} deve ser true ou false, recebido: {}", key, other)),
            }
        };

        let database_url = var("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL deve ser definida"))?;

        let session_secret = var("SESSION_SECRET").ok_or_else(|| anyhow!("SESSION_SECRET deve ser definido"))?;
        if session_secret.chars().count() < MIN_SESSION_SECRET_LEN {
            return Err(anyhow!(
                "SESSION_SECRET deve ter pelo menos {} caracteres",
                MIN_SESSION_SECRET_LEN
            ));
        }

        let app_env = match var("APP_ENV").as_deref() {
            Some("development") | Some("dev") => AppEnv::Development,
            Some("production") | Some("prod") | None => AppEnv::Production,
            Some(other) => return Err(anyhow!("APP_ENV desconhecido: {}", other)),
        };

        Ok(Self {
            database_url,
            session_secret,
            webhook_api_key: var("WEBHOOK_API_KEY"),
            app_env,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            trust_proxy: flag("TRUST_PROXY")?,
            login_rate_limit: number("LOGIN_RATE_LIMIT", 5)? as u32,
            login_rate_window: Duration::from_secs(number("LOGIN_RATE_WINDOW_SECS", 60)?),
            webhook_rate_limit: number("WEBHOOK_RATE_LIMIT", 30)? as u32,
            webhook_rate_window: Duration::from_secs(number("WEBHOOK_RATE_WINDOW_SECS", 60)?),
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub booking_service: BookingService,
    pub appointment_service: AppointmentService,
    pub catalog_service: CatalogService,
    pub staff_service: StaffService,
    pub expense_service: ExpenseService,
    pub report_service: ReportService,
    pub dashboard_service: DashboardService,
    pub webhook_limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::build(db_pool, config))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn build(db_pool: PgPool, config: Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let service_repo = ServiceRepository::new(db_pool.clone());
        let employee_service_repo = EmployeeServiceRepository::new(db_pool.clone());
        let availability_repo = AvailabilityRepository::new(db_pool.clone());
        let appointment_repo = AppointmentRepository::new(db_pool.clone());
        let expense_repo = ExpenseRepository::new(db_pool.clone());

        let login_limiter: Arc<dyn RateLimiter> = Arc::new(InMemoryRateLimiter::new(
            config.login_rate_limit,
            config.login_rate_window,
        ));
        let webhook_limiter: Arc<dyn RateLimiter> = Arc::new(InMemoryRateLimiter::new(
            config.webhook_rate_limit,
            config.webhook_rate_window,
        ));

        let sessions = SessionService::new(&config.session_secret);
        let auth_service = AuthService::new(Arc::new(user_repo.clone()), sessions, login_limiter);

        let booking_service = BookingService::new(Arc::new(PgBookingStore::new(db_pool.clone())));
        let appointment_service =
            AppointmentService::new(appointment_repo.clone(), booking_service.clone(), db_pool.clone());
        let catalog_service = CatalogService::new(service_repo.clone());
        let staff_service = StaffService::new(
            user_repo.clone(),
            employee_service_repo,
            availability_repo,
            db_pool.clone(),
        );
        let expense_service = ExpenseService::new(expense_repo.clone());
        let report_service = ReportService::new(
            appointment_repo.clone(),
            expense_repo,
            service_repo.clone(),
            user_repo.clone(),
        );
        let dashboard_service = DashboardService::new(appointment_repo, user_repo, service_repo);

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            booking_service,
            appointment_service,
            catalog_service,
            staff_service,
            expense_service,
            report_service,
            dashboard_service,
            webhook_limiter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    const SECRET: &str = "uma-chave-secreta-com-mais-de-32-caracteres";

    #[test]
    fn defaults_apply() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/salao"), ("SESSION_SECRET", SECRET)]).unwrap();
        assert!(config.is_production());
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.login_rate_limit, 5);
        assert_eq!(config.login_rate_window, Duration::from_secs(60));
        assert_eq!(config.webhook_rate_limit, 30);
        assert!(config.webhook_api_key.is_none());
        assert!(!config.trust_proxy);
    }

    #[test]
    fn trust_proxy_flag_is_parsed() {
        let base = [("DATABASE_URL", "postgres://localhost/salao"), ("SESSION_SECRET", SECRET)];
        let with = |value: &'static str| {
            let mut vars = base.to_vec();
            vars.push(("TRUST_PROXY", value));
            config_from(&vars)
        };
        assert!(with("true").unwrap().trust_proxy);
        assert!(with("1").unwrap().trust_proxy);
        assert!(!with("false").unwrap().trust_proxy);
        assert!(with("talvez").is_err());
    }

    #[test]
    fn short_session_secret_is_refused() {
        let err = config_from(&[("DATABASE_URL", "postgres://localhost/salao"), ("SESSION_SECRET", "curta")])
            .err()
            .unwrap();
        assert!(err.to_string().contains("SESSION_SECRET"));
    }

    #[test]
    fn missing_database_url_is_refused() {
        assert!(config_from(&[("SESSION_SECRET", SECRET)]).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/salao"),
            ("SESSION_SECRET", SECRET),
            ("APP_ENV", "development"),
            ("WEBHOOK_API_KEY", "chave"),
            ("LOGIN_RATE_LIMIT", "10"),
        ])
        .unwrap();
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.webhook_api_key.as_deref(), Some("chave"));
        assert_eq!(config.login_rate_limit, 10);

        assert!(config_from(&[
            ("DATABASE_URL", "postgres://localhost/salao"),
            ("SESSION_SECRET", SECRET),
            ("LOGIN_RATE_LIMIT", "muitos"),
        ])
        .is_err());
    }
}
