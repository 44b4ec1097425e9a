//! RejectChange command handler
//!
//! Resolves a pending line-item change against the proposal:
//! - Add: the proposed item is removed from the visit
//! - Edit: the last confirmed price is restored
//! - Delete: the item survives unchanged

use async_trait::async_trait;

use crate::visits::lifecycle::ensure_editable;
use crate::visits::money::recalculate_totals;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{
    Adjustment, EventPayload, LineItemStatus, PendingOperation, VisitEvent, VisitEventType,
};

/// RejectChange action
#[derive(Debug, Clone)]
pub struct RejectChangeAction {
    pub visit_id: String,
    pub item_id: String,
}

#[async_trait]
impl CommandHandler for RejectChangeAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Validate status
        ensure_editable(ctx.snapshot)?;

        // 2. Resolve the pending operation
        let (service_name, operation) = {
            let item = ctx
                .snapshot
                .find_service_mut(&self.item_id)
                .ok_or_else(|| VisitError::ItemNotFound(self.item_id.clone()))?;

            let operation = item
                .pending_operation
                .ok_or_else(|| VisitError::NoPendingChange(self.item_id.clone()))?;
            let service_name = item.service_name.clone();

            match operation {
                PendingOperation::Add => {
                    let item_id = self.item_id.clone();
                    ctx.snapshot.services.retain(|s| s.id != item_id);
                }
                PendingOperation::Edit => {
                    let (prev_net, prev_gross) =
                        match (item.previous_price_net, item.previous_price_gross) {
                            (Some(net), Some(gross)) => (net, gross),
                            _ => {
                                return Err(VisitError::InvalidOperation(format!(
                                    "Pending edit on item {} has no previous price",
                                    self.item_id
                                )));
                            }
                        };
                    item.final_price_net = prev_net;
                    item.final_price_gross = prev_gross;
                    // Materialize the restored price so the stored
                    // adjustment still derives the final values
                    item.adjustment = Adjustment::SetNet(prev_net);
                    item.previous_price_net = None;
                    item.previous_price_gross = None;
                    item.status = LineItemStatus::Confirmed;
                    item.pending_operation = None;
                }
                PendingOperation::Delete => {
                    item.status = LineItemStatus::Confirmed;
                    item.pending_operation = None;
                }
            }

            (service_name, operation)
        };

        // 3. Recompute totals
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
            VisitEventType::ChangeRejected,
            EventPayload::ChangeRejected {
                item_id: self.item_id.clone(),
                service_name,
                operation,
                total_net: ctx.snapshot.total_net,
                total_gross: ctx.snapshot.total_gross,
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::gross_from_net;
    use shared::visit::{ServiceLineItem, VisitSnapshot, VisitStatus};
    use std::sync::atomic::AtomicU64;

    fn create_test_metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_id: "op-1".to_string(),
            operator_name: "Test Operator".to_string(),
            timestamp: 1234567890,
        }
    }

    fn confirmed_item(id: &str, base_net: i64, vat: i32) -> ServiceLineItem {
        ServiceLineItem {
            id: id.to_string(),
            service_id: Some(1),
            service_name: "Brake service".to_string(),
            base_price_net: base_net,
            vat_rate: vat,
            adjustment: Adjustment::unchanged(),
            note: None,
            final_price_net: base_net,
            final_price_gross: gross_from_net(base_net, vat),
            status: LineItemStatus::Confirmed,
            pending_operation: None,
            previous_price_net: None,
            previous_price_gross: None,
        }
    }

    fn visit_with(items: Vec<ServiceLineItem>) -> VisitSnapshot {
        let mut snapshot = VisitSnapshot::new(
            "visit-1".to_string(),
            "SRV-1".to_string(),
            "PLN".to_string(),
        );
        snapshot.status = VisitStatus::InProgress;
        snapshot.services = items;
        crate::visits::money::recalculate_totals(&mut snapshot);
        snapshot
    }

    fn reject(item_id: &str) -> RejectChangeAction {
        RejectChangeAction {
            visit_id: "visit-1".to_string(),
            item_id: item_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_reject_pending_add_removes_item() {
        let mut item = confirmed_item("item-1", 40_000, 23);
        item.status = LineItemStatus::Pending;
        item.pending_operation = Some(PendingOperation::Add);
        let mut snapshot = visit_with(vec![item]);

        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);
        let events = reject("item-1")
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();
        drop(ctx);

        assert!(snapshot.services.is_empty());
        assert_eq!(snapshot.total_gross, 0);
        assert_eq!(events[0].event_type, VisitEventType::ChangeRejected);
    }

    #[tokio::test]
    async fn test_reject_pending_edit_restores_confirmed_price() {
        let mut item = confirmed_item("item-1", 100_000, 23);
        item.final_price_net = 80_000;
        item.final_price_gross = 98_400;
        item.status = LineItemStatus::Pending;
        item.pending_operation = Some(PendingOperation::Edit);
        item.previous_price_net = Some(90_000);
        item.previous_price_gross = Some(110_700);
        let mut snapshot = visit_with(vec![item]);

        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);
        reject("item-1")
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();
        drop(ctx);

        let item = &snapshot.services[0];
        assert!(item.is_settled());
        assert_eq!(item.final_price_net, 90_000);
        assert_eq!(item.final_price_gross, 110_700);
        assert!(item.previous_price_net.is_none());
        assert!(item.previous_price_gross.is_none());
        assert_eq!(snapshot.total_net, 90_000);
        assert_eq!(snapshot.total_gross, 110_700);
    }

    #[tokio::test]
    async fn test_reject_pending_delete_restores_item_unchanged() {
        let mut item = confirmed_item("item-1", 100_000, 23);
        item.status = LineItemStatus::Pending;
        item.pending_operation = Some(PendingOperation::Delete);
        let mut snapshot = visit_with(vec![item]);

        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);
        reject("item-1")
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();
        drop(ctx);

        let item = &snapshot.services[0];
        assert!(item.is_settled());
        // Prior price untouched
        assert_eq!(item.final_price_net, 100_000);
        assert_eq!(item.final_price_gross, 123_000);
        assert_eq!(snapshot.total_gross, 123_000);
    }

    #[tokio::test]
    async fn test_reject_settled_item_is_no_pending_change() {
        let mut snapshot = visit_with(vec![confirmed_item("item-1", 100_000, 23)]);
        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);

        let result = reject("item-1").execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(VisitError::NoPendingChange(_))));
    }

    #[tokio::test]
    async fn test_reject_unknown_item() {
        let mut snapshot = visit_with(vec![]);
        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);

        let result = reject("missing").execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(VisitError::ItemNotFound(_))));
    }
}
