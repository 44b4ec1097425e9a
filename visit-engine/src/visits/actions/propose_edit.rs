//! ProposeEditService command handler
//!
//! Records a price-change proposal on a line item. A confirmed item keeps
//! its last confirmed price in `previous_price_*` until the edit is
//! approved or rejected; re-proposing overwrites the outstanding proposal
//! but never chains diffs, so the first confirmed price is retained.

use async_trait::async_trait;

use crate::pricing;
use crate::visits::lifecycle::ensure_editable;
use crate::visits::money::recalculate_totals;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{
    Adjustment, EventPayload, LineItemStatus, PendingOperation, VisitEvent, VisitEventType,
};

/// ProposeEditService action
#[derive(Debug, Clone)]
pub struct ProposeEditAction {
    pub visit_id: String,
    pub item_id: String,
    pub adjustment: Adjustment,
    pub note: Option<String>,
}

#[async_trait]
impl CommandHandler for ProposeEditAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Validate status
        ensure_editable(ctx.snapshot)?;

        // 2. Locate the item and apply the proposal
        let (event_type, payload) = {
            let item = ctx
                .snapshot
                .find_service_mut(&self.item_id)
                .ok_or_else(|| VisitError::ItemNotFound(self.item_id.clone()))?;

            let breakdown =
                pricing::price(item.base_price_net, item.vat_rate, &self.adjustment)?;

            match item.pending_operation {
                Some(PendingOperation::Delete) => {
                    return Err(VisitError::InvalidOperation(format!(
                        "Item {} is marked for deletion",
                        self.item_id
                    )));
                }
                Some(PendingOperation::Add) => {
                    // The item itself is still an unapproved proposal:
                    // update it in place, it stays a pending addition
                    item.adjustment = self.adjustment;
                    item.final_price_net = breakdown.final_price_net;
                    item.final_price_gross = breakdown.final_price_gross;
                    if let Some(note) = &self.note {
                        item.note = Some(note.clone());
                    }
                    (
                        VisitEventType::ServiceAddProposed,
                        EventPayload::ServiceAddProposed {
                            item: Box::new(item.clone()),
                        },
                    )
                }
                Some(PendingOperation::Edit) => {
                    // Overwrite the outstanding proposal; keep the original
                    // previous_price_* (never chain pending diffs)
                    item.adjustment = self.adjustment;
                    item.final_price_net = breakdown.final_price_net;
                    item.final_price_gross = breakdown.final_price_gross;
                    if let Some(note) = &self.note {
                        item.note = Some(note.clone());
                    }
                    (
                        VisitEventType::ServiceEditProposed,
                        EventPayload::ServiceEditProposed {
                            item_id: item.id.clone(),
                            service_name: item.service_name.clone(),
                            adjustment: self.adjustment,
                            previous_price_net: item.previous_price_net.unwrap_or_default(),
                            previous_price_gross: item.previous_price_gross.unwrap_or_default(),
                            proposed_price_net: item.final_price_net,
                            proposed_price_gross: item.final_price_gross,
                        },
                    )
                }
                None => {
                    // First edit on a confirmed item: capture the confirmed
                    // price before replacing it
                    item.previous_price_net = Some(item.final_price_net);
                    item.previous_price_gross = Some(item.final_price_gross);
                    item.adjustment = self.adjustment;
                    item.final_price_net = breakdown.final_price_net;
                    item.final_price_gross = breakdown.final_price_gross;
                    item.status = LineItemStatus::Pending;
                    item.pending_operation = Some(PendingOperation::Edit);
                    if let Some(note) = &self.note {
                        item.note = Some(note.clone());
                    }
                    (
                        VisitEventType::ServiceEditProposed,
                        EventPayload::ServiceEditProposed {
                            item_id: item.id.clone(),
                            service_name: item.service_name.clone(),
                            adjustment: self.adjustment,
                            previous_price_net: item.previous_price_net.unwrap_or_default(),
                            previous_price_gross: item.previous_price_gross.unwrap_or_default(),
                            proposed_price_net: item.final_price_net,
                            proposed_price_gross: item.final_price_gross,
                        },
                    )
                }
            }
        };

        // 3. Recompute totals (pending edits still bill at the confirmed price)
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
            event_type,
            payload,
        );

        Ok(vec![event])
    }
}
