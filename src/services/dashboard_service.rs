// src/services/dashboard_service.rs

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    db::{appointment_repo::AppointmentFilter, AppointmentRepository, ServiceRepository, UserRepository},
    models::{appointments::AppointmentStatus, auth::SessionUser, dashboard::DashboardSummary},
};

#[derive(Clone)]
pub struct DashboardService {
    appointment_repo: AppointmentRepository,
    user_repo: UserRepository,
    service_repo: ServiceRepository,
}

impl DashboardService {
    pub fn new(
        appointment_repo: AppointmentRepository,
        user_repo: UserRepository,
        service_repo: ServiceRepository,
    ) -> Self {
        Self {
            appointment_repo,
            user_repo,
            service_repo,
        }
    }

    pub async fn get_summary(&self, user: &SessionUser, today: NaiveDate) -> Result<DashboardSummary, AppError> {
        let filter = AppointmentFilter {
            funcionario_id: (!user.is_admin()).then_some(user.id),
            data: Some(today),
            status: None,
        };
        let agendamentos_hoje = self.appointment_repo.list_detailed(&filter).await?;

        if user.is_admin() {
            Ok(DashboardSummary::Admin {
                agendamentos_hoje,
                total_funcionarios: self.user_repo.count_employees().await?,
                total_servicos: self.service_repo.count().await?,
                total_pendentes: self
                    .appointment_repo
                    .count_by_status(None, AppointmentStatus::Pendente)
                    .await?,
            })
        } else {
            Ok(DashboardSummary::Funcionario {
                agendamentos_hoje,
                proximos_agendamentos: self.appointment_repo.count_upcoming(user.id, today).await?,
                total_confirmados: self
                    .appointment_repo
                    .count_by_status(Some(user.id), AppointmentStatus::Confirmado)
                    .await?,
            })
        }
    }
}
