// src/services/catalog_service.rs

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::ServiceRepository,
    models::catalog::{Service, ServicePayload},
};

#[derive(Clone)]
pub struct CatalogService {
    repo: ServiceRepository,
}

impl CatalogService {
    pub fn new(repo: ServiceRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Service>, AppError> {
        self.repo.list().await
    }

    pub async fn create(&self, payload: ServicePayload) -> Result<Service, AppError> {
        payload.validate()?;
        let service = self.repo.create(&payload).await?;
        tracing::info!(servico_id = %service.id, nome = %service.nome_servico, "Serviço criado");
        Ok(service)
    }

    pub async fn update(&self, id: Uuid, payload: ServicePayload) -> Result<Service, AppError> {
        payload.validate()?;
        self.repo
            .update(id, &payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Serviço".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Serviço".to_string()));
        }
        tracing::info!(servico_id = %id, "Serviço removido");
        Ok(())
    }
}
