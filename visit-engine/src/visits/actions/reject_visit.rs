//! RejectVisit command handler
//!
//! Administrative transition: moves any non-terminal visit to Rejected.
//! Unconditional and irreversible; the visit is retained for the record.

use async_trait::async_trait;

use crate::visits::lifecycle::validate_transition;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{EventPayload, VisitEvent, VisitEventType, VisitStatus};

/// RejectVisit action
#[derive(Debug, Clone)]
pub struct RejectVisitAction {
    pub visit_id: String,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for RejectVisitAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Validate transition
        validate_transition(ctx.snapshot, VisitStatus::Rejected)?;

        // 2. Commit the new status
        ctx.snapshot.status = VisitStatus::Rejected;

        // 3. Create event
        let seq = ctx.next_sequence();
        let event = VisitEvent::new(
            seq,
            self.visit_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            VisitEventType::VisitRejected,
            EventPayload::VisitRejected {
                reason: self.reason.clone(),
            },
        );

        Ok(vec![event])
    }
}
