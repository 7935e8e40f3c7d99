// src/services/staff_service.rs
//
// Habilitação de funcionários por serviço e bloqueios de agenda.

use std::collections::{BTreeSet, HashMap};

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, validation::parse_time},
    db::{AvailabilityRepository, EmployeeServiceRepository, UserRepository},
    models::{
        auth::SessionUser,
        staff::{AvailabilityBlock, CreateAvailabilityPayload, EmployeeWithServices, UpdateEmployeeServicesPayload},
    },
};

/// Remove repetidos mantendo uma ordem estável.
pub fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

#[derive(Clone)]
pub struct StaffService {
    user_repo: UserRepository,
    employee_service_repo: EmployeeServiceRepository,
    availability_repo: AvailabilityRepository,
    pool: PgPool,
}

impl StaffService {
    pub fn new(
        user_repo: UserRepository,
        employee_service_repo: EmployeeServiceRepository,
        availability_repo: AvailabilityRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            employee_service_repo,
            availability_repo,
            pool,
        }
    }

    pub async fn list_employees(&self) -> Result<Vec<EmployeeWithServices>, AppError> {
        let employees = self.user_repo.list_employees().await?;

        let mut by_employee: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (funcionario_id, servico_id) in self.employee_service_repo.all_pairs().await? {
            by_employee.entry(funcionario_id).or_default().push(servico_id);
        }

        Ok(employees
            .into_iter()
            .map(|employee| {
                let mut servico_ids = by_employee.remove(&employee.id).unwrap_or_default();
                servico_ids.sort();
                EmployeeWithServices { employee, servico_ids }
            })
            .collect())
    }

    pub async fn services_of(&self, user: &SessionUser, funcionario_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        if !user.can_act_for(funcionario_id) {
            return Err(AppError::Forbidden);
        }
        self.employee_service_repo.service_ids_for(funcionario_id).await
    }

    /// Troca o conjunto inteiro de serviços do funcionário numa transação.
    pub async fn replace_services(&self, payload: UpdateEmployeeServicesPayload) -> Result<Vec<Uuid>, AppError> {
        payload.validate()?;
        let servico_ids = dedup_ids(&payload.service_ids);

        let mut tx = self.pool.begin().await?;

        self.user_repo
            .find_employee(&mut *tx, payload.employee_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Funcionário".to_string()))?;

        self.employee_service_repo
            .replace_for_employee(&mut tx, payload.employee_id, &servico_ids)
            .await?;

        tx.commit().await?;

        tracing::info!(
            funcionario_id = %payload.employee_id,
            total = servico_ids.len(),
            "Serviços do funcionário atualizados"
        );
        Ok(servico_ids)
    }

    pub async fn list_blocks(
        &self,
        user: &SessionUser,
        funcionario_id: Option<Uuid>,
    ) -> Result<Vec<AvailabilityBlock>, AppError> {
        match (user.is_admin(), funcionario_id) {
            (true, Some(id)) => self.availability_repo.list_for_employee(id).await,
            (true, None) => self.availability_repo.list_all().await,
            (false, _) => self.availability_repo.list_for_employee(user.id).await,
        }
    }

    pub async fn create_block(
        &self,
        user: &SessionUser,
        payload: CreateAvailabilityPayload,
    ) -> Result<AvailabilityBlock, AppError> {
        payload.validate()?;

        let funcionario_id = payload.funcionario_id.unwrap_or(user.id);
        if !user.can_act_for(funcionario_id) {
            return Err(AppError::Forbidden);
        }

        let hora_inicio = parse_time(&payload.hora_inicio)?;
        let hora_fim = parse_time(&payload.hora_fim)?;
        if hora_inicio >= hora_fim {
            return Err(AppError::InvalidInput(
                "O horário inicial deve ser anterior ao final.".to_string(),
            ));
        }

        // Admin pode informar um id qualquer; precisa ser funcionário
        self.user_repo
            .find_employee(&self.pool, funcionario_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Funcionário".to_string()))?;

        let block = self
            .availability_repo
            .create(funcionario_id, payload.dia_semana, hora_inicio, hora_fim)
            .await?;

        tracing::info!(
            bloqueio_id = %block.id,
            funcionario_id = %funcionario_id,
            dia_semana = block.dia_semana,
            "Bloqueio de agenda criado"
        );
        Ok(block)
    }

    pub async fn delete_block(&self, user: &SessionUser, id: Uuid) -> Result<(), AppError> {
        let block = self
            .availability_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Bloqueio".to_string()))?;

        if !user.can_act_for(block.funcionario_id) {
            return Err(AppError::Forbidden);
        }

        self.availability_repo.delete(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_service_ids_are_collapsed() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ids = dedup_ids(&[a, b, a, a]);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a) && ids.contains(&b));
        assert!(dedup_ids(&[]).is_empty());
    }
}
