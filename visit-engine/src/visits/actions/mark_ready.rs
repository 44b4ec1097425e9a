//! MarkReady command handler
//!
//! Commits the InProgress -> ReadyForPickup transition. Issued by the
//! ready wizard after its quality-check and notification steps; the
//! dispatch outcome (if notifications were sent) rides along for audit.

use async_trait::async_trait;

use crate::visits::lifecycle::validate_transition;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{EventPayload, NotificationOutcome, VisitEvent, VisitEventType, VisitStatus};

/// MarkReady action
#[derive(Debug, Clone)]
pub struct MarkReadyAction {
    pub visit_id: String,
    /// Dispatch outcome when notifications were sent; `None` = skipped
    pub notification: Option<NotificationOutcome>,
}

#[async_trait]
impl CommandHandler for MarkReadyAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Validate transition
        validate_transition(ctx.snapshot, VisitStatus::ReadyForPickup)?;

        // 2. The bill freezes at ReadyForPickup: unresolved proposals
        //    would have no way to ever settle
        if ctx.snapshot.has_pending_changes() {
            return Err(VisitError::InvalidOperation(
                "Visit has unresolved pending changes".to_string(),
            ));
        }

        // 3. Commit the new status
        ctx.snapshot.status = VisitStatus::ReadyForPickup;

        // 4. Create event
        let seq = ctx.next_sequence();
        let event = VisitEvent::new(
            seq,
            self.visit_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            VisitEventType::VisitReady,
            EventPayload::VisitReady {
                notification: self.notification.clone(),
            },
        );

        Ok(vec![event])
    }
}
