//! Visit persistence boundary
//!
//! Persistence is an external collaborator: the engine only talks to the
//! `VisitStore` trait. `MemoryVisitStore` is the in-process
//! implementation used in tests and as the default backing.

use parking_lot::RwLock;
use shared::visit::VisitSnapshot;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Visit not found: {0}")]
    NotFound(String),

    #[error("Storage conflict: {0}")]
    Conflict(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence boundary for visits
///
/// Implementations must make `save_visit` atomic per visit; the engine
/// serializes writers per visit, so no cross-call coordination is needed.
pub trait VisitStore: Send + Sync {
    /// Load a visit snapshot
    fn load_visit(&self, visit_id: &str) -> StoreResult<VisitSnapshot>;

    /// Persist a visit snapshot (insert or replace)
    fn save_visit(&self, snapshot: &VisitSnapshot) -> StoreResult<()>;

    /// Delete a visit entirely (draft cancellation only)
    fn delete_visit(&self, visit_id: &str) -> StoreResult<()>;

    /// IDs of all visits in a non-terminal status
    fn active_visit_ids(&self) -> StoreResult<Vec<String>>;

    /// Next value of the visit-number counter (crash-safe in real backends)
    fn next_visit_count(&self) -> StoreResult<u64>;

    /// Whether a command was already processed (idempotency)
    fn is_command_processed(&self, command_id: &str) -> StoreResult<bool>;

    /// Record a command as processed
    fn mark_command_processed(&self, command_id: &str) -> StoreResult<()>;
}

/// In-memory visit store
#[derive(Default)]
pub struct MemoryVisitStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    visits: HashMap<String, VisitSnapshot>,
    processed_commands: HashSet<String>,
    visit_count: u64,
}

impl MemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored visits (test helper)
    pub fn len(&self) -> usize {
        self.inner.read().visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().visits.is_empty()
    }
}

impl VisitStore for MemoryVisitStore {
    fn load_visit(&self, visit_id: &str) -> StoreResult<VisitSnapshot> {
        self.inner
            .read()
            .visits
            .get(visit_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(visit_id.to_string()))
    }

    fn save_visit(&self, snapshot: &VisitSnapshot) -> StoreResult<()> {
        self.inner
            .write()
            .visits
            .insert(snapshot.visit_id.clone(), snapshot.clone());
        Ok(())
    }

    fn delete_visit(&self, visit_id: &str) -> StoreResult<()> {
        self.inner
            .write()
            .visits
            .remove(visit_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(visit_id.to_string()))
    }

    fn active_visit_ids(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .inner
            .read()
            .visits
            .values()
            .filter(|v| !v.is_terminal())
            .map(|v| v.visit_id.clone())
            .collect())
    }

    fn next_visit_count(&self) -> StoreResult<u64> {
        let mut inner = self.inner.write();
        inner.visit_count += 1;
        Ok(inner.visit_count)
    }

    fn is_command_processed(&self, command_id: &str) -> StoreResult<bool> {
        Ok(self.inner.read().processed_commands.contains(command_id))
    }

    fn mark_command_processed(&self, command_id: &str) -> StoreResult<()> {
        self.inner
            .write()
            .processed_commands
            .insert(command_id.to_string());
        Ok(())
    }
}
