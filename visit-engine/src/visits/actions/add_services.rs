//! AddServices command handler
//!
//! Adds services directly as confirmed line items while the visit is
//! still a draft (intake). Once work is in progress, additions go through
//! the approval workflow instead.

use async_trait::async_trait;

use crate::visits::actions::build_line_item;
use crate::visits::lifecycle::ensure_not_terminal;
use crate::visits::money::recalculate_totals;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{
    EventPayload, LineItemStatus, ServiceItemInput, VisitEvent, VisitEventType, VisitStatus,
};

/// AddServices action
#[derive(Debug, Clone)]
pub struct AddServicesAction {
    pub visit_id: String,
    pub services: Vec<ServiceItemInput>,
}

#[async_trait]
impl CommandHandler for AddServicesAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Validate status: direct adds are an intake operation
        ensure_not_terminal(ctx.snapshot)?;
        if ctx.snapshot.status != VisitStatus::Draft {
            return Err(VisitError::InvalidOperation(format!(
                "Direct service adds are only allowed on drafts, visit is {:?}",
                ctx.snapshot.status
            )));
        }

        // 2. Resolve inputs into confirmed line items
        let mut items = Vec::with_capacity(self.services.len());
        for input in &self.services {
            items.push(build_line_item(
                input,
                ctx.catalog(),
                LineItemStatus::Confirmed,
                None,
            )?);
        }

        // 3. Append and recompute totals
        ctx.snapshot.services.extend(items.iter().cloned());
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
            VisitEventType::ServicesAdded,
            EventPayload::ServicesAdded {
                items,
                total_net: ctx.snapshot.total_net,
                total_gross: ctx.snapshot.total_gross,
            },
        );

        Ok(vec![event])
    }
}
