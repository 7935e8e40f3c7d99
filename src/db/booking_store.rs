// src/db/booking_store.rs

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        AppointmentRepository, AvailabilityRepository, EmployeeServiceRepository, ServiceRepository,
        UserRepository,
    },
    models::{
        appointments::{Appointment, NewAppointment},
        catalog::Service,
        staff::{AvailabilityBlock, Employee},
    },
    services::booking_service::BookingStore,
};

/// `BookingStore` sobre o Postgres, compondo os repositórios de cada tabela.
#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
    user_repo: UserRepository,
    service_repo: ServiceRepository,
    employee_service_repo: EmployeeServiceRepository,
    availability_repo: AvailabilityRepository,
    appointment_repo: AppointmentRepository,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            user_repo: UserRepository::new(pool.clone()),
            service_repo: ServiceRepository::new(pool.clone()),
            employee_service_repo: EmployeeServiceRepository::new(pool.clone()),
            availability_repo: AvailabilityRepository::new(pool.clone()),
            appointment_repo: AppointmentRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn find_service(&self, id: Uuid) -> Result<Option<Service>, AppError> {
        self.service_repo.find_by_id(id).await
    }

    async fn find_service_by_name(&self, term: &str) -> Result<Option<Service>, AppError> {
        self.service_repo.find_first_by_name(term).await
    }

    async fn first_service(&self) -> Result<Option<Service>, AppError> {
        self.service_repo.first().await
    }

    async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        self.user_repo.find_employee(&self.pool, id).await
    }

    async fn eligible_employees(
        &self,
        servico_id: Uuid,
        name_term: Option<&str>,
    ) -> Result<Vec<Employee>, AppError> {
        self.employee_service_repo
            .eligible_employees(servico_id, name_term)
            .await
    }

    async fn is_eligible(&self, funcionario_id: Uuid, servico_id: Uuid) -> Result<bool, AppError> {
        self.employee_service_repo
            .is_eligible(funcionario_id, servico_id)
            .await
    }

    async fn blocks_for_day(
        &self,
        funcionario_id: Uuid,
        dia_semana: i16,
    ) -> Result<Vec<AvailabilityBlock>, AppError> {
        self.availability_repo
            .blocks_for_day(&self.pool, funcionario_id, dia_semana)
            .await
    }

    async fn booked_times(&self, funcionario_id: Uuid, data: NaiveDate) -> Result<Vec<NaiveTime>, AppError> {
        self.appointment_repo.booked_times(funcionario_id, data).await
    }

    async fn insert_if_slot_free(&self, new: &NewAppointment) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await?;

        let taken = self
            .appointment_repo
            .slot_taken(
                &mut *tx,
                new.funcionario_id,
                new.data_agendamento,
                new.hora_agendamento,
            )
            .await?;
        if taken {
            return Err(AppError::SlotTaken);
        }

        // Se outra requisição inserir entre a checagem e o INSERT,
        // o índice único agendamentos_slot_unico barra e vira SlotTaken.
        let appointment = self.appointment_repo.insert(&mut *tx, new).await?;

        tx.commit().await?;
        Ok(appointment)
    }
}
