//! ApproveChange command handler
//!
//! Resolves a pending line-item change in favour of the proposal:
//! - Add: the item joins the confirmed bill
//! - Edit: the proposed price becomes the confirmed price
//! - Delete: the item is removed from the visit

use async_trait::async_trait;

use crate::visits::lifecycle::ensure_editable;
use crate::visits::money::recalculate_totals;
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{EventPayload, LineItemStatus, PendingOperation, VisitEvent, VisitEventType};

/// ApproveChange action
#[derive(Debug, Clone)]
pub struct ApproveChangeAction {
    pub visit_id: String,
    pub item_id: String,
}

#[async_trait]
impl CommandHandler for ApproveChangeAction {
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
                    item.status = LineItemStatus::Confirmed;
                    item.pending_operation = None;
                }
                PendingOperation::Edit => {
                    // The final price already equals the proposed value
                    item.previous_price_net = None;
                    item.previous_price_gross = None;
                    item.status = LineItemStatus::Confirmed;
                    item.pending_operation = None;
                }
                PendingOperation::Delete => {
                    let item_id = self.item_id.clone();
                    ctx.snapshot.services.retain(|s| s.id != item_id);
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
            VisitEventType::ChangeApproved,
            EventPayload::ChangeApproved {
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
    use shared::visit::{Adjustment, ServiceLineItem, VisitSnapshot, VisitStatus};
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

    fn approve(item_id: &str) -> ApproveChangeAction {
        ApproveChangeAction {
            visit_id: "visit-1".to_string(),
            item_id: item_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_approve_pending_add() {
        let mut item = confirmed_item("item-1", 40_000, 23);
        item.status = LineItemStatus::Pending;
        item.pending_operation = Some(PendingOperation::Add);
        let mut snapshot = visit_with(vec![item]);
        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);

        let events = approve("item-1")
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();
        drop(ctx);

        assert!(snapshot.services[0].is_settled());
        assert_eq!(events[0].event_type, VisitEventType::ChangeApproved);
        if let EventPayload::ChangeApproved { operation, .. } = &events[0].payload {
            assert_eq!(*operation, PendingOperation::Add);
        } else {
            panic!("Expected ChangeApproved payload");
        }
    }

    #[tokio::test]
    async fn test_approve_pending_edit_adopts_proposed_price() {
        let mut item = confirmed_item("item-1", 100_000, 23);
        item.final_price_net = 80_000;
        item.final_price_gross = 98_400;
        item.status = LineItemStatus::Pending;
        item.pending_operation = Some(PendingOperation::Edit);
        item.previous_price_net = Some(90_000);
        item.previous_price_gross = Some(110_700);
        let mut snapshot = visit_with(vec![item]);

        // Before approval the bill shows the confirmed price
        assert_eq!(snapshot.total_gross, 110_700);

        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);
        approve("item-1")
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();
        drop(ctx);

        let item = &snapshot.services[0];
        assert!(item.is_settled());
        assert!(item.previous_price_net.is_none());
        assert!(item.previous_price_gross.is_none());
        assert_eq!(item.final_price_net, 80_000);
        // Totals now report the approved price
        assert_eq!(snapshot.total_net, 80_000);
        assert_eq!(snapshot.total_gross, 98_400);
    }

    #[tokio::test]
    async fn test_approve_pending_delete_removes_item() {
        let mut doomed = confirmed_item("item-1", 100_000, 23);
        doomed.status = LineItemStatus::Pending;
        doomed.pending_operation = Some(PendingOperation::Delete);
        let keeper = confirmed_item("item-2", 50_000, 23);
        let mut snapshot = visit_with(vec![doomed, keeper]);

        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);
        approve("item-1")
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();
        drop(ctx);

        assert_eq!(snapshot.services.len(), 1);
        assert_eq!(snapshot.services[0].id, "item-2");
        assert_eq!(snapshot.total_net, 50_000);
    }

    #[tokio::test]
    async fn test_approve_settled_item_is_no_pending_change() {
        let mut snapshot = visit_with(vec![confirmed_item("item-1", 100_000, 23)]);
        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);

        let result = approve("item-1").execute(&mut ctx, &create_test_metadata()).await;
        drop(ctx);

        assert!(matches!(result, Err(VisitError::NoPendingChange(_))));
        // No-op: the item is untouched
        assert!(snapshot.services[0].is_settled());
    }

    #[tokio::test]
    async fn test_approve_unknown_item() {
        let mut snapshot = visit_with(vec![]);
        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);

        let result = approve("missing").execute(&mut ctx, &create_test_metadata()).await;
        assert!(matches!(result, Err(VisitError::ItemNotFound(_))));
    }
}
