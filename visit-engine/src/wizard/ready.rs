//! Ready wizard: InProgress -> ReadyForPickup
//!
//! Step 1 - quality check: a fixed checklist that must be fully ticked to
//! advance; rejecting it closes the wizard with no state change (the
//! failure is resolved by further work, not recorded here).
//!
//! Step 2 - notification: choose SMS/email channels. "Skip" commits the
//! transition directly; "send" dispatches through the notification
//! collaborator and commits only when every selected channel succeeded.

use super::{TransitionKind, WizardError};
use crate::notify::NotificationSender;
use crate::visits::manager::VisitManager;
use shared::visit::{
    CommandError, CommandErrorCode, NotificationChannels, NotificationOutcome, VisitCommand,
    VisitCommandPayload, VisitSnapshot, VisitStatus,
};

/// Fixed quality checklist for the hand-back inspection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityChecklist {
    /// Work matches the agreed scope
    pub scope_conformity: bool,
    /// Workmanship quality is acceptable
    pub workmanship_quality: bool,
    /// Overall technical condition checked
    pub technical_condition: bool,
}

impl QualityChecklist {
    /// Approval requires every box ticked
    pub fn is_complete(&self) -> bool {
        self.scope_conformity && self.workmanship_quality && self.technical_condition
    }
}

/// Ready wizard session
///
/// Owned by the initiating caller; dropping it abandons the flow with no
/// effect on the visit.
#[derive(Debug)]
pub struct ReadyWizard {
    visit_id: String,
    operator_id: String,
    operator_name: String,
    /// 1-based current step
    current_step: u8,
    quality: Option<QualityChecklist>,
    channels: NotificationChannels,
    customer_email_available: bool,
    finished: bool,
}

impl ReadyWizard {
    pub const TOTAL_STEPS: u8 = 2;

    /// Open a wizard session for a visit currently in progress
    pub fn start(
        snapshot: &VisitSnapshot,
        operator_id: impl Into<String>,
        operator_name: impl Into<String>,
    ) -> Result<Self, WizardError> {
        if snapshot.status != VisitStatus::InProgress {
            return Err(WizardError::WrongStatus {
                visit_id: snapshot.visit_id.clone(),
                status: snapshot.status,
                expected: VisitStatus::InProgress,
            });
        }
        Ok(Self {
            visit_id: snapshot.visit_id.clone(),
            operator_id: operator_id.into(),
            operator_name: operator_name.into(),
            current_step: 1,
            quality: None,
            channels: NotificationChannels::default(),
            customer_email_available: snapshot.customer.has_email(),
            finished: false,
        })
    }

    pub fn kind(&self) -> TransitionKind {
        TransitionKind::InProgressToReady
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

    /// Whether the email channel can be offered
    pub fn email_available(&self) -> bool {
        self.customer_email_available
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

    /// Step 1 approve: requires the full checklist
    pub fn submit_quality(&mut self, checklist: QualityChecklist) -> Result<(), WizardError> {
        self.ensure_step(1)?;
        if !checklist.is_complete() {
            return Err(WizardError::ChecklistIncomplete);
        }
        self.quality = Some(checklist);
        self.current_step = 2;
        Ok(())
    }

    /// Step 1 reject: close the wizard, visit status unchanged
    pub fn reject_quality(self) {
        tracing::info!(visit_id = %self.visit_id, "Quality check rejected, wizard closed");
    }

    /// Explicit back from the notification step
    pub fn back(&mut self) -> Result<(), WizardError> {
        self.ensure_step(2)?;
        self.current_step = 1;
        Ok(())
    }

    /// Step 2: select notification channels
    ///
    /// Email is only selectable when the customer has an email on file.
    pub fn select_channels(&mut self, sms: bool, email: bool) -> Result<(), WizardError> {
        self.ensure_step(2)?;
        if email && !self.customer_email_available {
            return Err(WizardError::EmailUnavailable);
        }
        self.channels = NotificationChannels { sms, email };
        Ok(())
    }

    /// Step 2 skip: commit the transition without notifying
    pub async fn skip_and_commit(&mut self, manager: &VisitManager) -> Result<(), WizardError> {
        self.ensure_step(2)?;
        self.commit(manager, None).await
    }

    /// Step 2 send: dispatch notifications, commit only on full success
    ///
    /// A failed or partial dispatch leaves the wizard on this step with
    /// the failed channels reported; retry is calling this again.
    pub async fn send_and_commit(
        &mut self,
        manager: &VisitManager,
        sender: &dyn NotificationSender,
    ) -> Result<NotificationOutcome, WizardError> {
        self.ensure_step(2)?;
        if self.channels.is_empty() {
            return Err(WizardError::NoChannelSelected);
        }

        let outcome = sender
            .send(&self.visit_id, self.channels)
            .await
            .map_err(|e| WizardError::NotificationDispatchFailed(vec![e.to_string()]))?;
        if !outcome.failed.is_empty() {
            tracing::warn!(
                visit_id = %self.visit_id,
                failed = ?outcome.failed,
                "Notification dispatch failed, transition not committed"
            );
            return Err(WizardError::NotificationDispatchFailed(outcome.failed));
        }

        self.commit(manager, Some(outcome.clone())).await?;
        Ok(outcome)
    }

    async fn commit(
        &mut self,
        manager: &VisitManager,
        notification: Option<NotificationOutcome>,
    ) -> Result<(), WizardError> {
        let cmd = VisitCommand::new(
            self.operator_id.clone(),
            self.operator_name.clone(),
            VisitCommandPayload::MarkReady {
                visit_id: self.visit_id.clone(),
                notification,
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
