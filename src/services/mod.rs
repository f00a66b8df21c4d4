//! Business logic services

pub mod catalog;
pub mod inventory;
pub mod loans;
pub mod people;

use crate::{config::LoansConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub inventory: inventory::InventoryService,
    pub loans: loans::LoansService,
    pub people: people::PeopleService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, loans_config: LoansConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            inventory: inventory::InventoryService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), loans_config),
            people: people::PeopleService::new(repository.clone()),
            repository,
        }
    }

    /// Check that the database answers
    pub async fn ping_database(&self) -> crate::error::AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.repository.pool).await?;
        Ok(())
    }
}
