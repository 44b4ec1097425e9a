//! ArchiveVisit command handler
//!
//! Administrative transition: moves any non-terminal visit to Archived.
//! Archival is a status, not deletion - the visit is retained
//! indefinitely.

use async_trait::async_trait;

use crate::visits::lifecycle::validate_transition;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{EventPayload, VisitEvent, VisitEventType, VisitStatus};

/// ArchiveVisit action
#[derive(Debug, Clone)]
pub struct ArchiveVisitAction {
    pub visit_id: String,
}

#[async_trait]
impl CommandHandler for ArchiveVisitAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Validate transition
        validate_transition(ctx.snapshot, VisitStatus::Archived)?;

        // 2. Commit the new status
        ctx.snapshot.status = VisitStatus::Archived;

        // 3. Create event
        let seq = ctx.next_sequence();
        let event = VisitEvent::new(
            seq,
            self.visit_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            VisitEventType::VisitArchived,
            EventPayload::VisitArchived {},
        );

        Ok(vec![event])
    }
}
