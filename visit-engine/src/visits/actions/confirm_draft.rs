//! ConfirmDraft command handler
//!
//! Moves a draft into progress. Irreversible: there is no way back to
//! Draft.

use async_trait::async_trait;

use crate::visits::lifecycle::validate_transition;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{EventPayload, VisitEvent, VisitEventType, VisitStatus};

/// ConfirmDraft action
#[derive(Debug, Clone)]
pub struct ConfirmDraftAction {
    pub visit_id: String,
}

#[async_trait]
impl CommandHandler for ConfirmDraftAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Validate transition
        validate_transition(ctx.snapshot, VisitStatus::InProgress)?;

        // 2. Commit the new status
        ctx.snapshot.status = VisitStatus::InProgress;

        // 3. Create event
        let seq = ctx.next_sequence();
        let event = VisitEvent::new(
            seq,
            self.visit_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            VisitEventType::DraftConfirmed,
            EventPayload::DraftConfirmed {},
        );

        Ok(vec![event])
    }
}
