//! Visit status state machine
//!
//! The transition table for the workshop flow:
//!
//! ```text
//! Draft ──confirm──▶ InProgress ──ready wizard──▶ ReadyForPickup ──completion wizard──▶ Completed
//!   │                     │                            │
//!   └─cancel (delete)     └────────────┬───────────────┘
//!                                      ▼
//!                          Rejected / Archived (administrative)
//! ```
//!
//! `Completed`, `Rejected` and `Archived` are terminal: every transition
//! attempted from them is refused and the snapshot is left untouched.

use crate::visits::traits::VisitError;
use shared::visit::{VisitSnapshot, VisitStatus};

/// Refuse any operation on a visit in a terminal status
pub fn ensure_not_terminal(snapshot: &VisitSnapshot) -> Result<(), VisitError> {
    if snapshot.status.is_terminal() {
        return Err(VisitError::TerminalState {
            visit_id: snapshot.visit_id.clone(),
            status: snapshot.status,
        });
    }
    Ok(())
}

/// Refuse line-item changes once the bill is frozen
///
/// Proposals and approvals are accepted only while the visit is `Draft`
/// or `InProgress`.
pub fn ensure_editable(snapshot: &VisitSnapshot) -> Result<(), VisitError> {
    ensure_not_terminal(snapshot)?;
    if !snapshot.status.is_editable() {
        return Err(VisitError::InvalidOperation(format!(
            "Line items cannot be changed in {:?} status",
            snapshot.status
        )));
    }
    Ok(())
}

/// Validate a status transition
///
/// Legal edges: `Draft -> InProgress`, `InProgress -> ReadyForPickup`,
/// `ReadyForPickup -> Completed`, and any non-terminal status to
/// `Rejected` or `Archived` (administrative). Everything else is refused.
pub fn validate_transition(
    snapshot: &VisitSnapshot,
    to: VisitStatus,
) -> Result<(), VisitError> {
    ensure_not_terminal(snapshot)?;

    let from = snapshot.status;
    let allowed = matches!(
        (from, to),
        (VisitStatus::Draft, VisitStatus::InProgress)
            | (VisitStatus::InProgress, VisitStatus::ReadyForPickup)
            | (VisitStatus::ReadyForPickup, VisitStatus::Completed)
            | (_, VisitStatus::Rejected)
            | (_, VisitStatus::Archived)
    );

    if !allowed {
        return Err(VisitError::InvalidOperation(format!(
            "Transition {:?} -> {:?} is not permitted",
            from, to
        )));
    }
    Ok(())
}
