//! Business logic services

pub mod catalog;
pub mod ledger;
pub mod locks;
pub mod reports;

use crate::{config::LedgerConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub ledger: ledger::LedgerService,
    pub reports: reports::ReportsService,
    repository: Repository,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository, ledger_config: LedgerConfig) -> Self {
        let catalog = catalog::CatalogService::new(repository.clone());
        Self {
            ledger: ledger::LedgerService::new(repository.clone(), catalog.clone(), ledger_config),
            reports: reports::ReportsService::new(repository.clone(), catalog.clone()),
            catalog,
            repository,
        }
    }

    /// Check that the underlying store answers
    pub async fn ready(&self) -> crate::error::AppResult<()> {
        self.repository.ping().await
    }
}
