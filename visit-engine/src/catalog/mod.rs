//! Service catalog collaborator
//!
//! The workshop price list lives outside this engine; lookups go through
//! the `ServiceCatalog` trait. `MemoryCatalog` backs tests and
//! single-process embeddings.

use parking_lot::RwLock;
use shared::models::CatalogService;
use std::collections::HashMap;

/// Service catalog lookup
pub trait ServiceCatalog: Send + Sync {
    /// Look up a catalog entry; `None` when the service is unknown
    fn find_service(&self, service_id: i64) -> Option<CatalogService>;
}

/// In-memory service catalog
#[derive(Default)]
pub struct MemoryCatalog {
    services: RwLock<HashMap<i64, CatalogService>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, service: CatalogService) {
        self.services.write().insert(service.id, service);
    }
}

impl ServiceCatalog for MemoryCatalog {
    fn find_service(&self, service_id: i64) -> Option<CatalogService> {
        self.services.read().get(&service_id).cloned()
    }
}
