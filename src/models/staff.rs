// src/models/staff.rs
//
// Funcionários, habilitação por serviço e bloqueios de agenda.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    #[schema(example = "Ana Lima")]
    pub nome: String,
    pub telefone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeWithServices {
    #[serde(flatten)]
    pub employee: Employee,
    pub servico_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeServicesPayload {
    pub employee_id: Uuid,

    #[serde(default)]
    #[validate(length(max = 50, message = "Muitos serviços selecionados."))]
    pub service_ids: Vec<Uuid>,
}

/// Janela semanal em que o funcionário NÃO atende.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AvailabilityBlock {
    pub id: Uuid,
    pub funcionario_id: Uuid,
    /// 0 = domingo ... 6 = sábado
    #[schema(example = 2)]
    pub dia_semana: i16,
    #[schema(value_type = String, example = "09:00:00")]
    pub hora_inicio: NaiveTime,
    #[schema(value_type = String, example = "12:00:00")]
    pub hora_fim: NaiveTime,
}

impl AvailabilityBlock {
    /// O intervalo é fechado no início e aberto no fim.
    pub fn covers(&self, time: NaiveTime) -> bool {
        time >= self.hora_inicio && time < self.hora_fim
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAvailabilityPayload {
    /// Só o admin pode bloquear a agenda de outro funcionário
    pub funcionario_id: Option<Uuid>,

    #[validate(range(min = 0, max = 6, message = "Dia da semana deve ficar entre 0 e 6."))]
    pub dia_semana: i16,

    #[schema(example = "09:00")]
    pub hora_inicio: String,

    #[schema(example = "12:00")]
    pub hora_fim: String,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AvailabilityQuery {
    pub funcionario_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_interval_is_half_open() {
        let t = |s: &str| NaiveTime::parse_from_str(s, "%H:%M").unwrap();
        let block = AvailabilityBlock {
            id: Uuid::new_v4(),
            funcionario_id: Uuid::new_v4(),
            dia_semana: 2,
            hora_inicio: t("09:00"),
            hora_fim: t("12:00"),
        };
        assert!(block.covers(t("09:00")));
        assert!(block.covers(t("11:59")));
        assert!(!block.covers(t("12:00")));
        assert!(!block.covers(t("08:59")));
    }
}
