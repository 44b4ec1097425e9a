//! Transition wizards
//!
//! A wizard is a bounded, linear sequence of guarded steps that must
//! complete before a visit status transition commits:
//!
//! - **ReadyWizard** (InProgress -> ReadyForPickup, 2 steps):
//!   quality check, then customer notification
//! - **CompletionWizard** (ReadyForPickup -> Completed, 3 steps):
//!   client briefing, signature, then payment
//!
//! A wizard session is owned by the initiating caller and never
//! persisted: dropping it abandons the flow and discards everything it
//! collected, with no effect on the visit. Commits go through the
//! `VisitManager`, so a failed commit leaves the wizard open on its
//! current step and the visit untouched; retry is simply calling the
//! committing method again.

mod complete;
mod ready;

pub use complete::CompletionWizard;
pub use ready::{QualityChecklist, ReadyWizard};

use shared::visit::{CommandError, VisitStatus};
use thiserror::Error;

/// Wizard kind, one per guarded transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    InProgressToReady,
    ReadyToCompleted,
}

/// Wizard errors
#[derive(Debug, Clone, Error)]
pub enum WizardError {
    #[error("Visit {visit_id} is in {status:?}, expected {expected:?}")]
    WrongStatus {
        visit_id: String,
        status: VisitStatus,
        expected: VisitStatus,
    },

    #[error("Wizard is on step {actual}, expected step {expected}")]
    WrongStep { expected: u8, actual: u8 },

    #[error("Wizard already finished")]
    Finished,

    #[error("Quality checklist is not fully checked")]
    ChecklistIncomplete,

    #[error("Customer has no email on file")]
    EmailUnavailable,

    #[error("No notification channel selected")]
    NoChannelSelected,

    #[error("Notification dispatch failed: {0:?}")]
    NotificationDispatchFailed(Vec<String>),

    #[error("Transition commit rejected: {} ({:?})", .0.message, .0.code)]
    Commit(CommandError),
}
