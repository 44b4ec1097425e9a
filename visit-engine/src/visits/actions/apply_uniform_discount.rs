//! ApplyUniformDiscount command handler
//!
//! Discounts every line item by the exact percentage that brings the
//! current bill down to a target amount. Each item is re-derived from its
//! own base price and the result is materialized as an absolute net
//! override, so the stored adjustment stays integer-valued. Rounding
//! remainders are not redistributed: the final total may deviate from the
//! target by at most half a minor unit per item.

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;

use crate::pricing;
use crate::visits::lifecycle::ensure_editable;
use crate::visits::money::{compute_totals, discounted_net, recalculate_totals, uniform_discount_percent};
use crate::visits::traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
use shared::visit::{
    Adjustment, EventPayload, PendingOperation, PriceBasis, VisitEvent, VisitEventType,
};

/// ApplyUniformDiscount action
#[derive(Debug, Clone)]
pub struct ApplyUniformDiscountAction {
    pub visit_id: String,
    /// Target total in minor units, on the chosen basis
    pub target_amount: i64,
    pub price_basis: PriceBasis,
}

#[async_trait]
impl CommandHandler for ApplyUniformDiscountAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<VisitEvent>, VisitError> {
        // 1. Validate status
        ensure_editable(ctx.snapshot)?;

        // 2. Compute the exact percentage from the authoritative totals
        let totals = compute_totals(ctx.snapshot);
        let current_total = match self.price_basis {
            PriceBasis::Net => totals.total_net,
            PriceBasis::Gross => totals.total_gross,
        };
        let percent = uniform_discount_percent(current_total, self.target_amount)?;

        // 3. Re-derive every line item from its own base price. Items
        //    marked for deletion are skipped - they are leaving the bill.
        for item in &mut ctx.snapshot.services {
            if item.pending_operation == Some(PendingOperation::Delete) {
                continue;
            }
            let new_net = discounted_net(item.base_price_net, percent);
            let breakdown =
                pricing::price(item.base_price_net, item.vat_rate, &Adjustment::SetNet(new_net))?;
            item.adjustment = Adjustment::SetNet(new_net);
            item.final_price_net = breakdown.final_price_net;
            item.final_price_gross = breakdown.final_price_gross;
        }

        // 4. Recompute totals
        recalculate_totals(ctx.snapshot);

        // 5. Create event
        let seq = ctx.next_sequence();
        let event = VisitEvent::new(
            seq,
            self.visit_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            VisitEventType::UniformDiscountApplied,
            EventPayload::UniformDiscountApplied {
                price_basis: self.price_basis,
                target_amount: self.target_amount,
                percent: percent.to_f64().unwrap_or_default(),
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
    use shared::visit::{LineItemStatus, ServiceLineItem, VisitSnapshot, VisitStatus};
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
            service_name: format!("Service {}", id),
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

    fn discount_to(target: i64, basis: PriceBasis) -> ApplyUniformDiscountAction {
        ApplyUniformDiscountAction {
            visit_id: "visit-1".to_string(),
            target_amount: target,
            price_basis: basis,
        }
    }

    #[tokio::test]
    async fn test_uniform_discount_hits_net_target() {
        // Two items, 200000 net total, discount to 150000 -> exactly 25%
        let mut snapshot = visit_with(vec![
            confirmed_item("item-1", 120_000, 23),
            confirmed_item("item-2", 80_000, 23),
        ]);
        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);

        let events = discount_to(150_000, PriceBasis::Net)
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();
        drop(ctx);

        assert_eq!(snapshot.services[0].final_price_net, 90_000);
        assert_eq!(snapshot.services[1].final_price_net, 60_000);
        assert_eq!(snapshot.total_net, 150_000);
        assert!(snapshot.has_total_discount);

        // Adjustments are materialized as absolute net overrides
        assert_eq!(snapshot.services[0].adjustment, Adjustment::SetNet(90_000));

        if let EventPayload::UniformDiscountApplied { percent, .. } = &events[0].payload {
            assert!((percent - 25.0).abs() < 1e-9);
        } else {
            panic!("Expected UniformDiscountApplied payload");
        }
    }

    #[tokio::test]
    async fn test_uniform_discount_on_gross_basis() {
        // 123000 gross, target 110700 -> 10%
        let mut snapshot = visit_with(vec![confirmed_item("item-1", 100_000, 23)]);
        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);

        discount_to(110_700, PriceBasis::Gross)
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();
        drop(ctx);

        assert_eq!(snapshot.services[0].final_price_net, 90_000);
        assert_eq!(snapshot.total_gross, 110_700);
    }

    #[tokio::test]
    async fn test_target_above_current_total_rejected() {
        let mut snapshot = visit_with(vec![confirmed_item("item-1", 200_000, 0)]);
        assert_eq!(snapshot.total_net, 200_000);
        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);

        let result = discount_to(250_000, PriceBasis::Net)
            .execute(&mut ctx, &create_test_metadata())
            .await;
        drop(ctx);

        assert!(matches!(result, Err(VisitError::InvalidDiscountTarget(_))));
        // No mutation on failure
        assert_eq!(snapshot.services[0].final_price_net, 200_000);
        assert_eq!(snapshot.total_net, 200_000);
    }

    #[tokio::test]
    async fn test_empty_visit_rejected() {
        let mut snapshot = visit_with(vec![]);
        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);

        let result = discount_to(0, PriceBasis::Net)
            .execute(&mut ctx, &create_test_metadata())
            .await;
        assert!(matches!(result, Err(VisitError::InvalidDiscountTarget(_))));
    }

    #[tokio::test]
    async fn test_discount_rederives_from_base_not_adjusted_price() {
        // Item already discounted to 90000; uniform discount of 50% must
        // derive from the 100000 base, not the 90000 final
        let mut item = confirmed_item("item-1", 100_000, 23);
        item.adjustment = Adjustment::Percent(-10);
        item.final_price_net = 90_000;
        item.final_price_gross = 110_700;
        let mut snapshot = visit_with(vec![item]);
        assert_eq!(snapshot.total_net, 90_000);

        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);
        discount_to(45_000, PriceBasis::Net)
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();
        drop(ctx);

        // 50% of the 100000 base
        assert_eq!(snapshot.services[0].final_price_net, 50_000);
        assert_eq!(snapshot.total_net, 50_000);
    }

    #[tokio::test]
    async fn test_items_marked_for_deletion_are_skipped() {
        let keeper = confirmed_item("item-1", 100_000, 23);
        let mut doomed = confirmed_item("item-2", 100_000, 23);
        doomed.status = LineItemStatus::Pending;
        doomed.pending_operation = Some(PendingOperation::Delete);
        let mut snapshot = visit_with(vec![keeper, doomed]);

        let seq = AtomicU64::new(0);
        let mut ctx = CommandContext::new(&mut snapshot, None, &seq);
        discount_to(100_000, PriceBasis::Net)
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();
        drop(ctx);

        // 50% applied to the surviving item, the doomed one untouched
        assert_eq!(snapshot.services[0].final_price_net, 50_000);
        assert_eq!(snapshot.services[1].final_price_net, 100_000);
    }
}
