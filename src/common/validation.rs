// src/common/validation.rs
//
// Validadores e normalizadores usados pelos handlers e pelo webhook.

use chrono::{Local, NaiveDate, NaiveTime, Timelike};

use crate::common::error::AppError;

// Expediente do salão: [08:00, 20:00)
pub const OPENING_HOUR: u32 = 8;
pub const CLOSING_HOUR: u32 = 20;

/// Normaliza `HH:MM`, `H:MM`, `HH:MM:SS` ou `H:MM:SS` para `HH:MM`.
/// Minutos e segundos precisam ter dois dígitos.
pub fn normalize_time(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }

    let hours = parts[0];
    if hours.is_empty() || hours.len() > 2 || !hours.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    if hours > 23 {
        return None;
    }

    let minutes = two_digit_field(parts[1], 59)?;
    if parts.len() == 3 {
        two_digit_field(parts[2], 59)?;
    }

    Some(format!("{:02}:{:02}", hours, minutes))
}

fn two_digit_field(field: &str, max: u32) -> Option<u32> {
    if field.len() != 2 || !field.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: u32 = field.parse().ok()?;
    (value <= max).then_some(value)
}

/// Converte o horário já normalizado em `NaiveTime`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, AppError> {
    let normalized = normalize_time(raw).ok_or_else(|| {
        AppError::InvalidInput("Horário inválido (use HH:MM).".to_string())
    })?;
    NaiveTime::parse_from_str(&normalized, "%H:%M")
        .map_err(|_| AppError::InvalidInput("Horário inválido (use HH:MM).".to_string()))
}

pub fn ensure_business_hours(time: NaiveTime) -> Result<(), AppError> {
    if time.hour() < OPENING_HOUR || time.hour() >= CLOSING_HOUR {
        return Err(AppError::OutsideBusinessHours);
    }
    Ok(())
}

/// Data corrente no fuso do servidor, base dos filtros por período.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Datas no formato `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    let shape_ok = raw.len() == 10
        && raw.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(AppError::InvalidInput("Data inválida (use YYYY-MM-DD).".to_string()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput("Data inválida (use YYYY-MM-DD).".to_string()))
}

/// Telefone brasileiro: 10 ou 11 dígitos, com ou sem o código do país (55).
/// Retorna só os dígitos.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if (digits.len() == 12 || digits.len() == 13) && digits.starts_with("55") {
        digits.drain(..2);
    }
    (10..=11).contains(&digits.len()).then_some(digits)
}

/// Detecta variáveis de template que a automação não expandiu
/// (ex.: `{{ $json.nome }}`, `={{...}}`).
pub fn has_unresolved_placeholder(value: &str) -> bool {
    value.contains("{{") || value.contains("}}") || value.contains("$json") || value.contains("$node")
}
