// src/services/rate_limit.rs

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use parking_lot::Mutex;

/// Limitador de tentativas por chave (normalmente o IP de origem).
/// Injetado no `AppState` para poder trocar por uma implementação
/// compartilhada entre instâncias.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// `true` se a requisição pode seguir.
    async fn check(&self, key: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Janela fixa em memória. Zera quando o processo reinicia.
pub struct InMemoryRateLimiter {
    max_requests: u32,
    window: Duration,
    entries: Mutex<HashMap<String, Window>>,
}

// Acima disso, entradas vencidas são descartadas a cada verificação
const PURGE_THRESHOLD: usize = 1024;

impl InMemoryRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock();

        if entries.len() > PURGE_THRESHOLD {
            entries.retain(|_, w| now < w.reset_at);
        }

        match entries.get_mut(key) {
            Some(w) if now < w.reset_at => {
                if w.count >= self.max_requests {
                    return false;
                }
                w.count += 1;
                true
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> bool {
        let allowed = self.check_at(key, Instant::now());
        if !allowed {
            tracing::warn!(chave = %key, "Limite de tentativas atingido");
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_after_limit_within_window() {
        let limiter = InMemoryRateLimiter::new(5, Duration::from_secs(60));
        for _ in 0..5 {
            assert!(limiter.check("10.0.0.1").await);
        }
        assert!(!limiter.check("10.0.0.1").await);
        // Outra origem tem o próprio contador
        assert!(limiter.check("10.0.0.2").await);
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = InMemoryRateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at("ip", start));
        assert!(limiter.check_at("ip", start));
        assert!(!limiter.check_at("ip", start + Duration::from_secs(30)));
        assert!(limiter.check_at("ip", start + Duration::from_secs(61)));
    }

    #[test]
    fn expired_entries_are_purged() {
        let limiter = InMemoryRateLimiter::new(1, Duration::from_secs(1));
        let start = Instant::now();
        for i in 0..=PURGE_THRESHOLD {
            limiter.check_at(&format!("ip-{}", i), start);
        }
        limiter.check_at("novo", start + Duration::from_secs(5));
        assert_eq!(limiter.entries.lock().len(), 1);
    }
}
