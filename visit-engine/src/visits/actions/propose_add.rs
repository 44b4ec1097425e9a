//! ProposeAddService command handler
//!
//! Inserts a service as a pending addition awaiting approval.

use async_trait::async_trait;

use crate::visits::actions::build_line_item;
use crate::visits::lifecycle::ensure_editable;
use crate::visits::money::recalculate_totals;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{
    EventPayload, LineItemStatus, PendingOperation, ServiceItemInput, VisitEvent, VisitEventType,
};

/// ProposeAddService action
#[derive(Debug, Clone)]
pub struct ProposeAddAction {
    pub visit_id: String,
    pub service: ServiceItemInput,
}

#[async_trait]
impl CommandHandler for ProposeAddAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Validate status
        ensure_editable(ctx.snapshot)?;

        // 2. Resolve the input into a pending line item
        let item = build_line_item(
            &self.service,
            ctx.catalog(),
            LineItemStatus::Pending,
            Some(PendingOperation::Add),
        )?;

        // 3. Insert and recompute totals
        ctx.snapshot.services.push(item.clone());
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
            VisitEventType::ServiceAddProposed,
            EventPayload::ServiceAddProposed {
                item: Box::new(item),
            },
        );

        Ok(vec![event])
    }
}
