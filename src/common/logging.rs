// src/common/logging.rs

use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

// Chaves que nunca podem aparecer em claro nos logs
const SENSITIVE_KEYS: &[&str] = &["authorization", "session", "cookie", "x-api-key"];

// Qualquer chave que contenha um destes trechos também é mascarada
// (cobre os apelidos do webhook: telefone_cliente, celular, whatsapp...)
const SENSITIVE_FRAGMENTS: &[&str] = &[
    "senha", "password", "token", "secret", "email", "telefone", "phone", "celular", "whatsapp",
];

const MAX_DEPTH: usize = 4;

/// Inicializa o subscriber do `tracing`. O nível vem de `RUST_LOG` (padrão `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Retorna uma cópia do valor com os campos sensíveis mascarados.
pub fn redact(value: &Value) -> Value {
    redact_at(value, 0)
}

fn redact_at(value: &Value, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return Value::String("[Truncated]".into());
    }

    match value {
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| redact_at(item, depth + 1)).collect())
        }
        Value::Object(map) => {
            let redacted: Map<String, Value> = map
                .iter()
                .map(|(key, nested)| {
                    if is_sensitive(key) {
                        (key.clone(), Value::String("[REDACTED]".into()))
                    } else {
                        (key.clone(), redact_at(nested, depth + 1))
                    }
                })
                .collect();
            Value::Object(redacted)
        }
        other => other.clone(),
    }
}

fn is_sensitive(key: &str) -> bool {
    let key = key.to_lowercase();
    SENSITIVE_KEYS.contains(&key.as_str()) || SENSITIVE_FRAGMENTS.iter().any(|f| key.contains(f))
}

/// Mantém só os 4 últimos dígitos do telefone.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "****".into();
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("****{}", tail)
}
