//! CancelDraft command handler
//!
//! Deletes a draft visit entirely. This is the only destructive path in
//! the lifecycle: once a draft is confirmed, a visit can only reach a
//! terminal status, never deletion.

use async_trait::async_trait;

use crate::visits::lifecycle::ensure_not_terminal;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{EventPayload, VisitEvent, VisitEventType, VisitStatus};

/// CancelDraft action
#[derive(Debug, Clone)]
pub struct CancelDraftAction {
    pub visit_id: String,
}

#[async_trait]
impl CommandHandler for CancelDraftAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Validate status: only drafts may be deleted
        ensure_not_terminal(ctx.snapshot)?;
        if ctx.snapshot.status != VisitStatus::Draft {
            return Err(VisitError::InvalidOperation(format!(
                "Only draft visits can be cancelled, visit is {:?}",
                ctx.snapshot.status
            )));
        }

        // 2. Request deletion; the manager removes the stored snapshot
        ctx.request_delete();

        // 3. Create event
        let seq = ctx.next_sequence();
        let event = VisitEvent::new(
            seq,
            self.visit_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            VisitEventType::DraftCancelled,
            EventPayload::DraftCancelled {
                visit_number: ctx.snapshot.visit_number.clone(),
            },
        );

        Ok(vec![event])
    }
}
