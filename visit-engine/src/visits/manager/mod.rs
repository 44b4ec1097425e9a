//! VisitManager - Core command processing and event generation
//!
//! This module handles:
//! - Command validation and processing
//! - Per-visit single-writer locking
//! - Optimistic concurrency (snapshot versions)
//! - Event generation with global sequence numbers
//! - Event broadcasting (via channel)
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Acquire per-visit lock
//!     ├─ 3. Load snapshot, check expected_version
//!     ├─ 4. Convert command to action and execute
//!     ├─ 5. Persist the mutated snapshot (or delete it)
//!     ├─ 6. Mark command processed
//!     ├─ 7. Broadcast event(s)
//!     └─ 8. Return response
//! ```
//!
//! Every mutation is all-or-nothing: an error at any step leaves the
//! stored snapshot untouched. Operations on different visits run fully in
//! parallel; operations on the same visit are serialized.

mod error;
pub use error::*;

#[cfg(test)]
mod tests;

use super::actions::{CommandAction, RegisterVisitAction};
use super::store::{StoreError, VisitStore};
use super::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::catalog::ServiceCatalog;
use crate::core::config::EngineConfig;
use chrono::Utc;
use dashmap::DashMap;
use shared::visit::{CommandResponse, VisitCommand, VisitCommandPayload, VisitEvent, VisitSnapshot};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::sync::{Mutex, broadcast};

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Lock table size warning threshold
const LOCK_TABLE_WARN_THRESHOLD: usize = 500;

/// VisitManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect engine restarts and refetch their snapshots.
pub struct VisitManager {
    store: Arc<dyn VisitStore>,
    event_tx: broadcast::Sender<VisitEvent>,
    /// Engine instance epoch - unique ID generated on startup
    epoch: String,
    /// Per-visit write locks (single-writer discipline)
    locks: DashMap<String, Arc<Mutex<()>>>,
    /// Catalog collaborator for service lookups
    catalog: Option<Arc<dyn ServiceCatalog>>,
    /// Global event sequence
    sequence: AtomicU64,
    config: EngineConfig,
}

impl std::fmt::Debug for VisitManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisitManager")
            .field("store", &"<VisitStore>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl VisitManager {
    /// Create a new VisitManager over the given store
    pub fn new(store: Arc<dyn VisitStore>, config: EngineConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "VisitManager started with new epoch");
        Self {
            store,
            event_tx,
            epoch,
            locks: DashMap::new(),
            catalog: None,
            sequence: AtomicU64::new(0),
            config,
        }
    }

    /// Create a VisitManager over a fresh in-memory store (for testing)
    #[cfg(test)]
    pub fn with_memory_store() -> Self {
        Self::new(
            Arc::new(super::store::MemoryVisitStore::new()),
            EngineConfig {
                timezone: chrono_tz::Europe::Warsaw,
                currency: "PLN".to_string(),
                visit_number_prefix: "SRV".to_string(),
            },
        )
    }

    /// Set the catalog collaborator for service lookups
    pub fn set_catalog(&mut self, catalog: Arc<dyn ServiceCatalog>) {
        self.catalog = Some(catalog);
    }

    /// Get the engine epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<VisitEvent> {
        self.event_tx.subscribe()
    }

    /// Load a visit snapshot
    pub fn get_visit(&self, visit_id: &str) -> ManagerResult<VisitSnapshot> {
        match self.store.load_visit(visit_id) {
            Ok(snapshot) => Ok(snapshot),
            Err(StoreError::NotFound(id)) => Err(ManagerError::VisitNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// IDs of all visits in a non-terminal status
    pub fn active_visit_ids(&self) -> ManagerResult<Vec<String>> {
        Ok(self.store.active_visit_ids()?)
    }

    /// Generate the next visit number, date-stamped in the business timezone
    fn next_visit_number(&self) -> String {
        let count = self.store.next_visit_count().unwrap_or(1);
        let date_str = Utc::now()
            .with_timezone(&self.config.timezone)
            .format("%Y%m%d")
            .to_string();
        format!(
            "{}{}{}",
            self.config.visit_number_prefix,
            date_str,
            10000 + count
        )
    }

    /// Get or create the write lock for a visit
    fn visit_lock(&self, visit_id: &str) -> Arc<Mutex<()>> {
        let lock = self
            .locks
            .entry(visit_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        if self.locks.len() > LOCK_TABLE_WARN_THRESHOLD {
            tracing::warn!(
                lock_count = self.locks.len(),
                "Visit lock table exceeds threshold, possible visit leak"
            );
        }
        lock
    }

    /// Execute a command and return the response
    pub async fn execute_command(&self, cmd: VisitCommand) -> CommandResponse {
        match self.process_command(cmd.clone()).await {
            Ok((response, events)) => {
                // Broadcast events after successful commit
                for event in events {
                    if self.event_tx.send(event).is_err() {
                        tracing::warn!("Event broadcast failed: no active receivers");
                        break;
                    }
                }
                response
            }
            Err(err) => CommandResponse::error(cmd.command_id, err.into()),
        }
    }

    /// Process a command and return the response with events
    async fn process_command(
        &self,
        cmd: VisitCommand,
    ) -> ManagerResult<(CommandResponse, Vec<VisitEvent>)> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. Idempotency check (before taking any lock)
        if self.store.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        match &cmd.payload {
            VisitCommandPayload::RegisterVisit { .. } => self.process_register(cmd).await,
            _ => self.process_mutation(cmd).await,
        }
    }

    /// Register a new draft visit
    ///
    /// Handled outside the action dispatch because the visit id and visit
    /// number must be generated first.
    async fn process_register(
        &self,
        cmd: VisitCommand,
    ) -> ManagerResult<(CommandResponse, Vec<VisitEvent>)> {
        let VisitCommandPayload::RegisterVisit {
            customer,
            vehicle,
            services,
            currency,
        } = &cmd.payload
        else {
            return Err(ManagerError::Internal(
                "process_register called with a non-register payload".to_string(),
            ));
        };

        let visit_id = uuid::Uuid::new_v4().to_string();
        let visit_number = self.next_visit_number();
        let currency = currency
            .clone()
            .unwrap_or_else(|| self.config.currency.clone());

        let mut snapshot = VisitSnapshot::new(visit_id.clone(), visit_number.clone(), currency);

        let action = RegisterVisitAction {
            visit_id: visit_id.clone(),
            customer: customer.clone(),
            vehicle: vehicle.clone(),
            services: services.clone(),
        };
        let metadata = CommandMetadata::from(&cmd);

        let mut ctx = CommandContext::new(&mut snapshot, self.catalog.as_deref(), &self.sequence);
        let events = action.execute(&mut ctx, &metadata).await?;
        drop(ctx);

        snapshot.version += 1;
        snapshot.updated_at = Utc::now().timestamp_millis();
        self.store.save_visit(&snapshot)?;
        self.store.mark_command_processed(&cmd.command_id)?;

        tracing::info!(visit_id = %visit_id, visit_number = %visit_number, "Visit registered");
        Ok((
            CommandResponse::success(cmd.command_id, Some(visit_id)),
            events,
        ))
    }

    /// Process a mutation on an existing visit
    async fn process_mutation(
        &self,
        cmd: VisitCommand,
    ) -> ManagerResult<(CommandResponse, Vec<VisitEvent>)> {
        let visit_id = cmd
            .payload
            .visit_id()
            .ok_or_else(|| {
                ManagerError::Internal("mutation command without a visit id".to_string())
            })?
            .to_string();

        // 2. Serialize writers per visit
        let lock = self.visit_lock(&visit_id);
        let _guard = lock.lock().await;

        // Double-check idempotency under the lock
        if self.store.is_command_processed(&cmd.command_id)? {
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 3. Load and pin the snapshot
        let mut snapshot = match self.store.load_visit(&visit_id) {
            Ok(snapshot) => snapshot,
            Err(StoreError::NotFound(id)) => return Err(ManagerError::VisitNotFound(id)),
            Err(e) => return Err(e.into()),
        };
        if let Some(expected) = cmd.expected_version {
            if expected != snapshot.version {
                return Err(ManagerError::VersionConflict {
                    expected,
                    actual: snapshot.version,
                });
            }
        }

        // 4. Convert to action and execute
        let action = CommandAction::from(&cmd);
        let metadata = CommandMetadata::from(&cmd);
        let mut ctx = CommandContext::new(&mut snapshot, self.catalog.as_deref(), &self.sequence);
        let events = action.execute(&mut ctx, &metadata).await?;
        let deleted = ctx.delete_requested();
        drop(ctx);

        // 5. Persist all-or-nothing
        if deleted {
            self.store.delete_visit(&visit_id)?;
            self.locks.remove(&visit_id);
            tracing::info!(visit_id = %visit_id, "Visit deleted");
        } else {
            snapshot.version += 1;
            snapshot.updated_at = Utc::now().timestamp_millis();
            self.store.save_visit(&snapshot)?;
            if snapshot.status.is_terminal() {
                // Terminal visits take no further mutations
                self.locks.remove(&visit_id);
                tracing::info!(visit_id = %visit_id, status = ?snapshot.status, "Visit reached terminal status");
            }
        }

        // 6. Mark processed
        self.store.mark_command_processed(&cmd.command_id)?;

        Ok((
            CommandResponse::success(cmd.command_id, Some(visit_id)),
            events,
        ))
    }
}
