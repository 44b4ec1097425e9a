//! ProposeDeleteService command handler
//!
//! Marks a confirmed line item for deletion. The item stays on the visit
//! (struck through in the UI) until the deletion is approved or rejected.

use async_trait::async_trait;

use crate::visits::lifecycle::ensure_editable;
use crate::visits::money::recalculate_totals;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{EventPayload, LineItemStatus, PendingOperation, VisitEvent, VisitEventType};

/// ProposeDeleteService action
#[derive(Debug, Clone)]
pub struct ProposeDeleteAction {
    pub visit_id: String,
    pub item_id: String,
}

#[async_trait]
impl CommandHandler for ProposeDeleteAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Validate status
        ensure_editable(ctx.snapshot)?;

        // 2. Locate the item; only settled items can be marked
        let service_name = {
            let item = ctx
                .snapshot
                .find_service_mut(&self.item_id)
                .ok_or_else(|| VisitError::ItemNotFound(self.item_id.clone()))?;

            if let Some(op) = item.pending_operation {
                return Err(VisitError::InvalidOperation(format!(
                    "Item {} already has a pending {:?} operation",
                    self.item_id, op
                )));
            }

            item.status = LineItemStatus::Pending;
            item.pending_operation = Some(PendingOperation::Delete);
            item.service_name.clone()
        };

        // 3. Recompute totals (the item still bills until approval)
        recalculate_totals(ctx.snapshot);

        // 4. Create event
        let seq = ctx.next_sequence();
        let event = VisitEvent::new(
            seq,
            self.visit_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            VisitEventType::ServiceDeleteProposed,
            EventPayload::ServiceDeleteProposed {
                item_id: self.item_id.clone(),
                service_name,
            },
        );

        Ok(vec![event])
    }
}
