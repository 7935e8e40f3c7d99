// src/services/appointment_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        validation::{normalize_phone, parse_date, parse_time},
    },
    db::{appointment_repo::AppointmentFilter, AppointmentRepository},
    models::{
        appointments::{
            Appointment, AppointmentDetail, AppointmentListQuery, AppointmentStatus,
            CreateAppointmentPayload,
        },
        auth::SessionUser,
    },
    services::booking_service::{BookingService, DirectBooking},
};

/// Calcula o novo (status, pago) a partir do estado atual.
/// `concluido` marca como pago; agendamento cancelado não muda mais o pagamento;
/// pagamento de atendimento concluído não é desfeito.
pub fn plan_update(
    current: &Appointment,
    status: Option<AppointmentStatus>,
    pago: Option<bool>,
) -> Result<(AppointmentStatus, bool), AppError> {
    if status.is_none() && pago.is_none() {
        return Err(AppError::InvalidInput(
            "Informe o novo status ou o pagamento.".to_string(),
        ));
    }

    let next_status = status.unwrap_or(current.status);
    if !current.status.can_transition_to(next_status) {
        return Err(AppError::InvalidTransition {
            from: current.status,
            to: next_status,
        });
    }

    let mut next_pago = pago.unwrap_or(current.pago);
    if next_status == AppointmentStatus::Concluido && current.status != AppointmentStatus::Concluido {
        next_pago = true;
    }

    if next_status.is_terminal() && next_pago != current.pago {
        match next_status {
            AppointmentStatus::Cancelado => {
                return Err(AppError::Conflict(
                    "Agendamento cancelado não pode ter o pagamento alterado.".to_string(),
                ));
            }
            AppointmentStatus::Concluido if !next_pago => {
                return Err(AppError::Conflict(
                    "Pagamento de atendimento concluído não pode ser desfeito.".to_string(),
                ));
            }
            _ => {}
        }
    }

    Ok((next_status, next_pago))
}

#[derive(Clone)]
pub struct AppointmentService {
    repo: AppointmentRepository,
    booking: BookingService,
    pool: PgPool,
}

impl AppointmentService {
    pub fn new(repo: AppointmentRepository, booking: BookingService, pool: PgPool) -> Self {
        Self { repo, booking, pool }
    }

    pub async fn list(
        &self,
        user: &SessionUser,
        query: &AppointmentListQuery,
    ) -> Result<Vec<AppointmentDetail>, AppError> {
        let data = query.data.as_deref().map(parse_date).transpose()?;
        let filter = AppointmentFilter {
            funcionario_id: (!user.is_admin()).then_some(user.id),
            data,
            status: query.status,
        };
        self.repo.list_detailed(&filter).await
    }

    pub async fn create(
        &self,
        user: &SessionUser,
        payload: CreateAppointmentPayload,
    ) -> Result<Appointment, AppError> {
        payload.validate()?;

        if !user.can_act_for(payload.funcionario_id) {
            return Err(AppError::Forbidden);
        }

        let cliente_telefone = normalize_phone(&payload.cliente_telefone)
            .ok_or_else(|| AppError::InvalidInput("Telefone inválido.".to_string()))?;

        self.booking
            .book_direct(DirectBooking {
                cliente_nome: payload.cliente_nome.trim().to_string(),
                cliente_telefone,
                funcionario_id: payload.funcionario_id,
                servico_id: payload.servico_id,
                data_agendamento: parse_date(&payload.data_agendamento)?,
                hora_agendamento: parse_time(&payload.hora_agendamento)?,
            })
            .await
    }

    pub async fn available_times(
        &self,
        user: &SessionUser,
        funcionario_id: Uuid,
        data: &str,
    ) -> Result<Vec<String>, AppError> {
        if !user.can_act_for(funcionario_id) {
            return Err(AppError::Forbidden);
        }
        let data = parse_date(data)?;
        self.booking.available_times(funcionario_id, data).await
    }

    /// Altera status e/ou pagamento com a linha travada até o commit.
    pub async fn update(
        &self,
        user: &SessionUser,
        appointment_id: Uuid,
        status: Option<AppointmentStatus>,
        pago: Option<bool>,
    ) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_for_update(&mut *tx, appointment_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Agendamento".to_string()))?;

        if !user.can_act_for(current.funcionario_id) {
            return Err(AppError::Forbidden);
        }

        let (next_status, next_pago) = plan_update(&current, status, pago)?;
        if next_status == current.status && next_pago == current.pago {
            return Ok(current);
        }

        let updated = self
            .repo
            .update_status_and_payment(&mut *tx, appointment_id, next_status, next_pago)
            .await?;
        tx.commit().await?;

        tracing::info!(
            agendamento_id = %appointment_id,
            usuario_id = %user.id,
            de = %current.status,
            para = %updated.status,
            pago = updated.pago,
            "Agendamento atualizado"
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use AppointmentStatus::*;

    fn appointment(status: AppointmentStatus, pago: bool) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            cliente_nome: "Maria Souza".into(),
            cliente_telefone: "11999999999".into(),
            funcionario_id: Uuid::new_v4(),
            servico_id: Uuid::new_v4(),
            data_agendamento: NaiveDate::from_ymd_opt(2025, 1, 21).unwrap(),
            hora_agendamento: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            status,
            pago,
            criado_em: Utc::now(),
        }
    }

    #[test]
    fn completing_marks_as_paid() {
        let current = appointment(Confirmado, false);
        assert_eq!(plan_update(&current, Some(Concluido), None).unwrap(), (Concluido, true));
        assert_eq!(
            plan_update(&current, Some(Concluido), Some(false)).unwrap(),
            (Concluido, true)
        );
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let err = plan_update(&appointment(Pendente, false), Some(Concluido), None).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { from: Pendente, to: Concluido }));

        let err = plan_update(&appointment(Cancelado, false), Some(Confirmado), None).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[test]
    fn completed_can_only_become_paid() {
        let current = appointment(Concluido, false);
        assert_eq!(plan_update(&current, None, Some(true)).unwrap(), (Concluido, true));

        let paid = appointment(Concluido, true);
        assert!(matches!(
            plan_update(&paid, None, Some(false)),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn cancelled_payment_is_frozen() {
        let current = appointment(Cancelado, false);
        assert!(matches!(
            plan_update(&current, None, Some(true)),
            Err(AppError::Conflict(_))
        ));
        // Repetir o mesmo valor não altera nada
        assert_eq!(plan_update(&current, Some(Cancelado), Some(false)).unwrap(), (Cancelado, false));
    }

    #[test]
    fn pending_payment_can_be_toggled() {
        let current = appointment(Pendente, false);
        assert_eq!(plan_update(&current, None, Some(true)).unwrap(), (Pendente, true));
        assert_eq!(plan_update(&current, Some(Confirmado), None).unwrap(), (Confirmado, false));
    }

    #[test]
    fn empty_update_is_invalid() {
        let err = plan_update(&appointment(Pendente, false), None, None).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
