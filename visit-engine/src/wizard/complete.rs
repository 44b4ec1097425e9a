//! Completion wizard: ReadyForPickup -> Completed
//!
//! Step 1 - client briefing: read-only review of the customer-facing
//! comments; advances unconditionally.
//!
//! Step 2 - signature: a confirmation gate (placeholder for real
//! signature capture).
//!
//! Step 3 - payment: select payment method and invoice type; "finish"
//! commits the transition carrying the selection. The selection is
//! returned only at the explicit finish call - there is no reactive
//! syncing while the user is still choosing.

use super::{TransitionKind, WizardError};
use crate::visits::manager::VisitManager;
use shared::models::{CommentKind, VisitComment};
use shared::visit::{
    CommandError, CommandErrorCode, InvoiceType, PaymentDetails, PaymentMethod, VisitCommand,
    VisitCommandPayload, VisitSnapshot, VisitStatus,
};

/// Completion wizard session
///
/// Owned by the initiating caller; dropping it abandons the flow with no
/// effect on the visit.
#[derive(Debug)]
pub struct CompletionWizard {
    visit_id: String,
    operator_id: String,
    operator_name: String,
    /// 1-based current step
    current_step: u8,
    signature_confirmed: bool,
    finished: bool,
}

impl CompletionWizard {
    pub const TOTAL_STEPS: u8 = 3;

    /// Open a wizard session for a visit awaiting pickup
    pub fn start(
        snapshot: &VisitSnapshot,
        operator_id: impl Into<String>,
        operator_name: impl Into<String>,
    ) -> Result<Self, WizardError> {
        if snapshot.status != VisitStatus::ReadyForPickup {
            return Err(WizardError::WrongStatus {
                visit_id: snapshot.visit_id.clone(),
                status: snapshot.status,
                expected: VisitStatus::ReadyForPickup,
            });
        }
        Ok(Self {
            visit_id: snapshot.visit_id.clone(),
            operator_id: operator_id.into(),
            operator_name: operator_name.into(),
            current_step: 1,
            signature_confirmed: false,
            finished: false,
        })
    }

    pub fn kind(&self) -> TransitionKind {
        TransitionKind::ReadyToCompleted
    }

    pub fn visit_id(&self) -> &str {
        &self.visit_id
    }

    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    pub fn total_steps(&self) -> u8 {
        Self::TOTAL_STEPS
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The comments shown during the briefing step
    pub fn briefing_comments(snapshot: &VisitSnapshot) -> Vec<&VisitComment> {
        snapshot
            .comments
            .iter()
            .filter(|c| c.kind == CommentKind::ForCustomer)
            .collect()
    }

    fn ensure_step(&self, expected: u8) -> Result<(), WizardError> {
        if self.finished {
            return Err(WizardError::Finished);
        }
        if self.current_step != expected {
            return Err(WizardError::WrongStep {
                expected,
                actual: self.current_step,
            });
        }
        Ok(())
    }

    /// Step 1: the briefing is read-only and advances unconditionally
    pub fn acknowledge_briefing(&mut self) -> Result<(), WizardError> {
        self.ensure_step(1)?;
        self.current_step = 2;
        Ok(())
    }

    /// Step 2: single confirmation advances to payment
    pub fn confirm_signature(&mut self) -> Result<(), WizardError> {
        self.ensure_step(2)?;
        self.signature_confirmed = true;
        self.current_step = 3;
        Ok(())
    }

    /// Explicit back to the previous step
    pub fn back(&mut self) -> Result<(), WizardError> {
        if self.finished {
            return Err(WizardError::Finished);
        }
        match self.current_step {
            2 => {
                self.current_step = 1;
                Ok(())
            }
            3 => {
                self.signature_confirmed = false;
                self.current_step = 2;
                Ok(())
            }
            _ => Err(WizardError::WrongStep {
                expected: 2,
                actual: self.current_step,
            }),
        }
    }

    /// Step 3 finish: commit the transition with the selected payment
    ///
    /// A rejected commit leaves the wizard open on this step; retry is
    /// calling finish again.
    pub async fn finish(
        &mut self,
        manager: &VisitManager,
        method: PaymentMethod,
        invoice: InvoiceType,
    ) -> Result<(), WizardError> {
        self.ensure_step(3)?;

        let cmd = VisitCommand::new(
            self.operator_id.clone(),
            self.operator_name.clone(),
            VisitCommandPayload::CompleteVisit {
                visit_id: self.visit_id.clone(),
                payment: PaymentDetails { method, invoice },
            },
        );
        let resp = manager.execute_command(cmd).await;
        if !resp.success {
            return Err(WizardError::Commit(resp.error.unwrap_or_else(|| {
                CommandError::new(CommandErrorCode::InternalError, "commit failed")
            })));
        }
        self.finished = true;
        Ok(())
    }
}
