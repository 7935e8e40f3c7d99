// src/models/webhook.rs
//
// Entrada do webhook de agendamento (WhatsApp / n8n). O payload chega solto,
// por query string ou corpo JSON, e é normalizado em um `BookingRequest`
// antes de qualquer consulta ao banco.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::{
    error::AppError,
    validation::{
        ensure_business_hours, has_unresolved_placeholder, normalize_phone, parse_date, parse_time,
    },
};

/// Campos como enviados pela automação. Aceita os nomes canônicos e os
/// apelidos em português que o construtor de fluxos costuma gerar.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct RawWebhookPayload {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        alias = "nome_cliente",
        alias = "nome_do_cliente",
        alias = "cliente",
        alias = "nome"
    )]
    pub cliente_nome: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        alias = "telefone_cliente",
        alias = "telefone_do_cliente",
        alias = "telefone",
        alias = "celular",
        alias = "whatsapp"
    )]
    pub cliente_telefone: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        alias = "data_do_agendamento",
        alias = "data",
        alias = "dia"
    )]
    pub data_agendamento: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        alias = "hora_do_agendamento",
        alias = "horario_agendamento",
        alias = "horario",
        alias = "hora"
    )]
    pub hora_agendamento: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        alias = "nome_funcionario",
        alias = "nome_do_funcionario",
        alias = "funcionario",
        alias = "profissional"
    )]
    pub funcionario_nome: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        alias = "id_funcionario",
        alias = "profissional_id"
    )]
    pub funcionario_id: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        alias = "nome_do_servico",
        alias = "servico",
        alias = "procedimento"
    )]
    pub servico_nome: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", alias = "id_servico")]
    pub servico_id: Option<String>,
}

// Aceita texto, números e booleanos como texto; `null` vira ausente.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientVisitor;

    impl<'de> de::Visitor<'de> for LenientVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("texto, número ou nulo")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_owned()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(LenientVisitor)
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}

/// As duas formas de transporte aceitas pelo webhook.
#[derive(Debug, Clone)]
pub enum WebhookInput {
    QueryParams(RawWebhookPayload),
    JsonBody(RawWebhookPayload),
}

impl WebhookInput {
    /// O corpo JSON, quando presente, tem prioridade sobre a query string.
    pub fn from_parts(query: RawWebhookPayload, body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(WebhookInput::QueryParams(query));
        }

        let payload: RawWebhookPayload = serde_json::from_slice(body)
            .map_err(|_| AppError::InvalidInput("JSON inválido no corpo da requisição.".to_string()))?;
        Ok(WebhookInput::JsonBody(payload))
    }

    pub fn transport(&self) -> &'static str {
        match self {
            WebhookInput::QueryParams(_) => "query",
            WebhookInput::JsonBody(_) => "json",
        }
    }

    fn into_raw(self) -> RawWebhookPayload {
        match self {
            WebhookInput::QueryParams(raw) | WebhookInput::JsonBody(raw) => raw,
        }
    }
}

/// Pedido de agendamento canônico, já validado.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub cliente_nome: String,
    /// Só dígitos
    pub cliente_telefone: String,
    pub data_agendamento: NaiveDate,
    /// Já normalizada para HH:MM
    pub hora_agendamento: NaiveTime,
    pub funcionario_id: Option<Uuid>,
    pub funcionario_nome: Option<String>,
    pub servico_id: Option<Uuid>,
    pub servico_nome: Option<String>,
}

impl TryFrom<WebhookInput> for BookingRequest {
    type Error = AppError;

    fn try_from(input: WebhookInput) -> Result<Self, Self::Error> {
        let raw = input.into_raw();

        let fields = [
            ("cliente_nome", &raw.cliente_nome),
            ("cliente_telefone", &raw.cliente_telefone),
            ("data_agendamento", &raw.data_agendamento),
            ("hora_agendamento", &raw.hora_agendamento),
            ("funcionario_nome", &raw.funcionario_nome),
            ("funcionario_id", &raw.funcionario_id),
            ("servico_nome", &raw.servico_nome),
            ("servico_id", &raw.servico_id),
        ];
        for (name, value) in fields {
            if value.as_deref().is_some_and(has_unresolved_placeholder) {
                return Err(AppError::InvalidInput(format!(
                    "O campo {} contém uma variável de template não resolvida.",
                    name
                )));
            }
        }

        let cliente_nome = required(&raw.cliente_nome, "cliente_nome")?;
        let telefone = required(&raw.cliente_telefone, "cliente_telefone")?;
        let data = required(&raw.data_agendamento, "data_agendamento")?;
        let hora = required(&raw.hora_agendamento, "hora_agendamento")?;

        let nome_len = cliente_nome.chars().count();
        if !(3..=100).contains(&nome_len) {
            return Err(AppError::InvalidInput(
                "Nome do cliente deve ter entre 3 e 100 caracteres.".to_string(),
            ));
        }

        let cliente_telefone = normalize_phone(telefone)
            .ok_or_else(|| AppError::InvalidInput("Telefone inválido.".to_string()))?;
        let data_agendamento = parse_date(data)?;
        let hora_agendamento = parse_time(hora)?;
        ensure_business_hours(hora_agendamento)?;

        Ok(BookingRequest {
            cliente_nome: cliente_nome.to_string(),
            cliente_telefone,
            data_agendamento,
            hora_agendamento,
            funcionario_id: optional_uuid(&raw.funcionario_id),
            funcionario_nome: optional_name(&raw.funcionario_nome)?,
            servico_id: optional_uuid(&raw.servico_id),
            servico_nome: optional_name(&raw.servico_nome)?,
        })
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::InvalidInput(format!("Campo obrigatório ausente: {}.", field))),
    }
}

// Id malformado é tratado como ausente: a resolução cai para o nome.
fn optional_uuid(value: &Option<String>) -> Option<Uuid> {
    value.as_deref().and_then(|v| Uuid::parse_str(v.trim()).ok())
}

fn optional_name(value: &Option<String>) -> Result<Option<String>, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if v.chars().count() > 100 => {
            Err(AppError::InvalidInput("Nome muito longo (máximo 100 caracteres).".to_string()))
        }
        Some(v) if !v.is_empty() => Ok(Some(v.to_string())),
        _ => Ok(None),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookResponse {
    pub success: bool,
    #[schema(example = "Agendamento criado com sucesso")]
    pub message: String,
    pub id: Uuid,
    pub status: crate::models::appointments::AppointmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn base() -> serde_json::Value {
        json!({
            "cliente_nome": "João Silva",
            "cliente_telefone": "(11) 99999-9999",
            "data_agendamento": "2025-01-21",
            "hora_agendamento": "14:00"
        })
    }

    #[test]
    fn json_body_and_query_normalize_identically() {
        let from_body = WebhookInput::from_parts(RawWebhookPayload::default(), &body(base())).unwrap();
        assert_eq!(from_body.transport(), "json");

        let query = RawWebhookPayload {
            cliente_nome: Some("João Silva".into()),
            cliente_telefone: Some("(11) 99999-9999".into()),
            data_agendamento: Some("2025-01-21".into()),
            hora_agendamento: Some("14:00".into()),
            ..Default::default()
        };
        let from_query = WebhookInput::from_parts(query, b"").unwrap();
        assert_eq!(from_query.transport(), "query");

        let a = BookingRequest::try_from(from_body).unwrap();
        let b = BookingRequest::try_from(from_query).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cliente_telefone, "11999999999");
    }

    #[test]
    fn accepts_portuguese_aliases_and_numbers() {
        let payload = json!({
            "nome_cliente": "Ana Paula",
            "telefone": 11988887777u64,
            "data": "2025-01-21",
            "horario": "9:30:00",
            "profissional": "Carla",
            "servico": "Escova"
        });
        let input = WebhookInput::from_parts(RawWebhookPayload::default(), &body(payload)).unwrap();
        let req = BookingRequest::try_from(input).unwrap();
        assert_eq!(req.cliente_nome, "Ana Paula");
        assert_eq!(req.cliente_telefone, "11988887777");
        assert_eq!(req.hora_agendamento, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(req.funcionario_nome.as_deref(), Some("Carla"));
        assert_eq!(req.servico_nome.as_deref(), Some("Escova"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = WebhookInput::from_parts(RawWebhookPayload::default(), b"{ cliente_nome: ").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn missing_or_blank_required_fields_are_rejected() {
        let mut payload = base();
        payload["cliente_telefone"] = json!("   ");
        let input = WebhookInput::from_parts(RawWebhookPayload::default(), &body(payload)).unwrap();
        let err = BookingRequest::try_from(input).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m.contains("cliente_telefone")));

        let mut payload = base();
        payload.as_object_mut().unwrap().remove("data_agendamento");
        let input = WebhookInput::from_parts(RawWebhookPayload::default(), &body(payload)).unwrap();
        assert!(BookingRequest::try_from(input).is_err());
    }

    #[test]
    fn template_placeholders_are_rejected() {
        let mut payload = base();
        payload["servico_nome"] = json!("{{ $json.servico }}");
        let input = WebhookInput::from_parts(RawWebhookPayload::default(), &body(payload)).unwrap();
        let err = BookingRequest::try_from(input).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m.contains("servico_nome")));
    }

    #[test]
    fn out_of_hours_time_is_rejected() {
        for hora in ["07:59", "20:00", "22:15:00"] {
            let mut payload = base();
            payload["hora_agendamento"] = json!(hora);
            let input = WebhookInput::from_parts(RawWebhookPayload::default(), &body(payload)).unwrap();
            assert!(matches!(BookingRequest::try_from(input), Err(AppError::OutsideBusinessHours)));
        }
    }

    #[test]
    fn badly_shaped_time_is_rejected() {
        let mut payload = base();
        payload["hora_agendamento"] = json!("9:5");
        let input = WebhookInput::from_parts(RawWebhookPayload::default(), &body(payload)).unwrap();
        assert!(matches!(BookingRequest::try_from(input), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn invalid_uuid_is_treated_as_absent() {
        let mut payload = base();
        payload["servico_id"] = json!("nao-e-uuid");
        payload["funcionario_id"] = json!(null);
        let input = WebhookInput::from_parts(RawWebhookPayload::default(), &body(payload)).unwrap();
        let req = BookingRequest::try_from(input).unwrap();
        assert_eq!(req.servico_id, None);
        assert_eq!(req.funcionario_id, None);
    }
}
