use super::super::store::StoreError;
use super::super::traits::VisitError;
use shared::visit::{CommandError, CommandErrorCode, VisitStatus};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

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

    #[error("Version conflict: expected {expected}, visit is at {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Map a store error onto a wire error code
fn classify_store_error(e: &StoreError) -> CommandErrorCode {
    match e {
        StoreError::NotFound(_) => CommandErrorCode::VisitNotFound,
        StoreError::Conflict(_) => CommandErrorCode::Conflict,
        StoreError::Backend(_) => CommandErrorCode::InternalError,
    }
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match err {
            ManagerError::Store(e) => {
                let code = classify_store_error(&e);
                tracing::error!(error = %e, error_code = ?code, "Store error occurred");
                (code, e.to_string())
            }
            ManagerError::VisitNotFound(id) => (
                CommandErrorCode::VisitNotFound,
                format!("Visit not found: {}", id),
            ),
            ManagerError::ItemNotFound(id) => (
                CommandErrorCode::ItemNotFound,
                format!("Service line item not found: {}", id),
            ),
            ManagerError::ServiceNotFound(id) => (
                CommandErrorCode::ServiceNotFound,
                format!("Catalog service not found: {}", id),
            ),
            ManagerError::NoPendingChange(id) => (
                CommandErrorCode::NoPendingChange,
                format!("No pending change on item: {}", id),
            ),
            ManagerError::InvalidPricingInput(msg) => (CommandErrorCode::InvalidPricingInput, msg),
            ManagerError::InvalidDiscountTarget(msg) => {
                (CommandErrorCode::InvalidDiscountTarget, msg)
            }
            ManagerError::TerminalState { visit_id, status } => (
                CommandErrorCode::TerminalStateViolation,
                format!("Visit {} is in terminal status {:?}", visit_id, status),
            ),
            ManagerError::VersionConflict { expected, actual } => (
                CommandErrorCode::Conflict,
                format!("Version conflict: expected {}, visit is at {}", expected, actual),
            ),
            ManagerError::InvalidOperation(msg) => (CommandErrorCode::InvalidOperation, msg),
            ManagerError::Internal(msg) => (CommandErrorCode::InternalError, msg),
        };
        CommandError::new(code, message)
    }
}

impl From<VisitError> for ManagerError {
    fn from(err: VisitError) -> Self {
        match err {
            VisitError::VisitNotFound(id) => ManagerError::VisitNotFound(id),
            VisitError::ItemNotFound(id) => ManagerError::ItemNotFound(id),
            VisitError::ServiceNotFound(id) => ManagerError::ServiceNotFound(id),
            VisitError::NoPendingChange(id) => ManagerError::NoPendingChange(id),
            VisitError::InvalidPricingInput(msg) => ManagerError::InvalidPricingInput(msg),
            VisitError::InvalidDiscountTarget(msg) => ManagerError::InvalidDiscountTarget(msg),
            VisitError::TerminalState { visit_id, status } => {
                ManagerError::TerminalState { visit_id, status }
            }
            VisitError::InvalidOperation(msg) => ManagerError::InvalidOperation(msg),
        }
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
