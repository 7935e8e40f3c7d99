// src/db/appointment_repo.rs

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        appointments::{Appointment, AppointmentDetail, AppointmentStatus, NewAppointment},
        reports::PricedAppointment,
    },
};

const APPOINTMENT_COLUMNS: &str = "id, cliente_nome, cliente_telefone, funcionario_id, servico_id, \
     data_agendamento, hora_agendamento, status, pago, criado_em";

const DETAIL_SELECT: &str = r#"
    SELECT a.id, a.cliente_nome, a.cliente_telefone,
           a.funcionario_id, u.nome AS funcionario_nome,
           a.servico_id, s.nome_servico, s.preco,
           a.data_agendamento, a.hora_agendamento, a.status, a.pago
    FROM agendamentos a
    JOIN users u ON u.id = a.funcionario_id
    JOIN servicos s ON s.id = a.servico_id
"#;

/// Filtros opcionais da listagem de agendamentos.
#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub funcionario_id: Option<Uuid>,
    pub data: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Trava a linha até o fim da transação.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {} FROM agendamentos WHERE id = $1 FOR UPDATE",
            APPOINTMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(appointment)
    }

    /// `true` se já existe agendamento ativo (não cancelado) no horário.
    pub async fn slot_taken<'e, E>(
        &self,
        executor: E,
        funcionario_id: Uuid,
        data: NaiveDate,
        hora: NaiveTime,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM agendamentos
                WHERE funcionario_id = $1
                  AND data_agendamento = $2
                  AND hora_agendamento = $3
                  AND status <> 'cancelado'
            )
            "#,
        )
        .bind(funcionario_id)
        .bind(data)
        .bind(hora)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    pub async fn insert<'e, E>(&self, executor: E, new: &NewAppointment) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Appointment>(&format!(
            r#"
            INSERT INTO agendamentos
                (cliente_nome, cliente_telefone, funcionario_id, servico_id,
                 data_agendamento, hora_agendamento, status, pago)
            VALUES ($1, $2, $3, $4, $5, $6, $7, false)
            RETURNING {}
            "#,
            APPOINTMENT_COLUMNS
        ))
        .bind(&new.cliente_nome)
        .bind(&new.cliente_telefone)
        .bind(new.funcionario_id)
        .bind(new.servico_id)
        .bind(new.data_agendamento)
        .bind(new.hora_agendamento)
        .bind(new.status)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("agendamentos_slot_unico") {
                    return AppError::SlotTaken;
                }
            }
            e.into()
        })
    }

    pub async fn update_status_and_payment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: AppointmentStatus,
        pago: bool,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Appointment>(&format!(
            "UPDATE agendamentos SET status = $1, pago = $2 WHERE id = $3 RETURNING {}",
            APPOINTMENT_COLUMNS
        ))
        .bind(status)
        .bind(pago)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Agendamento".to_string()))
    }

    pub async fn list_detailed(&self, filter: &AppointmentFilter) -> Result<Vec<AppointmentDetail>, AppError> {
        let sql = format!(
            r#"{}
            WHERE ($1::uuid IS NULL OR a.funcionario_id = $1)
              AND ($2::date IS NULL OR a.data_agendamento = $2)
              AND ($3::status_agendamento IS NULL OR a.status = $3)
            ORDER BY a.data_agendamento DESC, a.hora_agendamento ASC
            "#,
            DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, AppointmentDetail>(&sql)
            .bind(filter.funcionario_id)
            .bind(filter.data)
            .bind(filter.status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Horários já ocupados por agendamentos ativos do funcionário na data.
    pub async fn booked_times(&self, funcionario_id: Uuid, data: NaiveDate) -> Result<Vec<NaiveTime>, AppError> {
        let times = sqlx::query_scalar::<_, NaiveTime>(
            r#"
            SELECT hora_agendamento FROM agendamentos
            WHERE funcionario_id = $1
              AND data_agendamento = $2
              AND status <> 'cancelado'
            "#,
        )
        .bind(funcionario_id)
        .bind(data)
        .fetch_all(&self.pool)
        .await?;
        Ok(times)
    }

    /// Agendamentos com preço desde `since` (todos, se `None`).
    pub async fn priced_since(&self, since: Option<NaiveDate>) -> Result<Vec<PricedAppointment>, AppError> {
        let rows = sqlx::query_as::<_, PricedAppointment>(
            r#"
            SELECT a.funcionario_id, a.servico_id, a.cliente_telefone,
                   a.data_agendamento, a.hora_agendamento, a.status, a.pago, s.preco
            FROM agendamentos a
            JOIN servicos s ON s.id = a.servico_id
            WHERE ($1::date IS NULL OR a.data_agendamento >= $1)
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Agendamentos concluídos num intervalo de datas, para a exportação CSV.
    pub async fn completed_detailed_between(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<AppointmentDetail>, AppError> {
        let sql = format!(
            r#"{}
            WHERE a.status = 'concluido'
              AND ($1::date IS NULL OR a.data_agendamento >= $1)
              AND ($2::date IS NULL OR a.data_agendamento <= $2)
            ORDER BY a.data_agendamento DESC, a.hora_agendamento DESC
            "#,
            DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, AppointmentDetail>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn count_by_status(
        &self,
        funcionario_id: Option<Uuid>,
        status: AppointmentStatus,
    ) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM agendamentos
            WHERE status = $1 AND ($2::uuid IS NULL OR funcionario_id = $2)
            "#,
        )
        .bind(status)
        .bind(funcionario_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Agendamentos ativos depois de `today` para o funcionário.
    pub async fn count_upcoming(&self, funcionario_id: Uuid, today: NaiveDate) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM agendamentos
            WHERE funcionario_id = $1
              AND data_agendamento > $2
              AND status IN ('pendente', 'confirmado')
            "#,
        )
        .bind(funcionario_id)
        .bind(today)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
