//! Action traits and the action-level error type

use crate::catalog::ServiceCatalog;
use crate::pricing::PricingError;
use async_trait::async_trait;
use shared::visit::{VisitEvent, VisitSnapshot, VisitStatus};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Action-level errors
#[derive(Debug, Error)]
pub enum VisitError {
    #[error("Visit not found: {0}")]
    VisitNotFound(String),

    #[error("Service line item not found: {0}")]
    ItemNotFound(String),

    #[error("Catalog service not found: {0}")]
    ServiceNotFound(i64),

    #[error("No pending change on item: {0}")]
    NoPendingChange(String),

    #[error("Invalid pricing input: {0}")]
    InvalidPricingInput(String),

    #[error("Invalid discount target: {0}")]
    InvalidDiscountTarget(String),

    #[error("Visit {visit_id} is in terminal status {status:?}")]
    TerminalState {
        visit_id: String,
        status: VisitStatus,
    },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<PricingError> for VisitError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::InvalidInput(msg) => VisitError::InvalidPricingInput(msg),
        }
    }
}

/// Command metadata extracted from the envelope
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_id: String,
    pub operator_name: String,
    /// Client timestamp (Unix millis)
    pub timestamp: i64,
}

impl From<&shared::visit::VisitCommand> for CommandMetadata {
    fn from(cmd: &shared::visit::VisitCommand) -> Self {
        Self {
            command_id: cmd.command_id.clone(),
            operator_id: cmd.operator_id.clone(),
            operator_name: cmd.operator_name.clone(),
            timestamp: cmd.timestamp,
        }
    }
}

/// Execution context handed to actions
///
/// Holds the snapshot the command targets (already loaded under the
/// per-visit lock), the catalog handle and the event sequence allocator.
/// Actions mutate the snapshot in place; the manager persists it only
/// when the action succeeds.
pub struct CommandContext<'a> {
    pub snapshot: &'a mut VisitSnapshot,
    catalog: Option<&'a dyn ServiceCatalog>,
    sequence: &'a AtomicU64,
    delete_requested: bool,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        snapshot: &'a mut VisitSnapshot,
        catalog: Option<&'a dyn ServiceCatalog>,
        sequence: &'a AtomicU64,
    ) -> Self {
        Self {
            snapshot,
            catalog,
            sequence,
            delete_requested: false,
        }
    }

    /// Allocate the next global event sequence number
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The service catalog, when configured
    pub fn catalog(&self) -> Option<&'a dyn ServiceCatalog> {
        self.catalog
    }

    /// Mark the visit for deletion instead of persistence (draft cancel,
    /// the one destructive path in the lifecycle)
    pub fn request_delete(&mut self) {
        self.delete_requested = true;
    }

    pub fn delete_requested(&self) -> bool {
        self.delete_requested
    }
}

/// Command handler - one implementation per command type
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError>;
}
