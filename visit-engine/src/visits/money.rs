//! Totals aggregation for a visit
//!
//! Sums line items into net/VAT/gross totals. An item with a pending
//! edit contributes its last *confirmed* price: the bill shown to staff
//! must not move on an unapproved change. The uniform discount helpers
//! compute the exact percentage needed to land the bill on a target
//! amount.
//!
//! All amounts are integer minor units; intermediate arithmetic uses
//! `Decimal` with half-away-from-zero rounding.

use crate::pricing::{gross_from_net, to_decimal, to_minor};
use crate::visits::traits::VisitError;
use rust_decimal::Decimal;
use shared::visit::VisitSnapshot;

/// Aggregated visit totals (minor units)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitTotals {
    pub total_net: i64,
    pub total_vat: i64,
    pub total_gross: i64,
    /// Whether the gross total is below the pre-adjustment reference sum
    pub has_total_discount: bool,
}

/// Compute the authoritative payable totals for a visit
///
/// Per item: a pending edit contributes `previous_price_*` (the last
/// confirmed value); everything else contributes the current final
/// prices. `total_vat = total_gross - total_net`.
pub fn compute_totals(snapshot: &VisitSnapshot) -> VisitTotals {
    let mut total_net: i64 = 0;
    let mut total_gross: i64 = 0;
    let mut reference_gross: i64 = 0;

    for item in &snapshot.services {
        let (net, gross) = match (
            item.has_pending_edit(),
            item.previous_price_net,
            item.previous_price_gross,
        ) {
            (true, Some(prev_net), Some(prev_gross)) => (prev_net, prev_gross),
            _ => (item.final_price_net, item.final_price_gross),
        };
        total_net += net;
        total_gross += gross;
        reference_gross += gross_from_net(item.base_price_net, item.vat_rate);
    }

    VisitTotals {
        total_net,
        total_vat: total_gross - total_net,
        total_gross,
        has_total_discount: total_gross < reference_gross,
    }
}

/// Recompute and write back the snapshot's total fields
///
/// Every line-item mutation must call this before the snapshot is
/// persisted.
pub fn recalculate_totals(snapshot: &mut VisitSnapshot) {
    let totals = compute_totals(snapshot);
    snapshot.total_net = totals.total_net;
    snapshot.total_vat = totals.total_vat;
    snapshot.total_gross = totals.total_gross;
    snapshot.has_total_discount = totals.has_total_discount;
}

/// Exact percentage that brings `current_total` down to `target_amount`
///
/// Rejects with `InvalidDiscountTarget` when the current total is zero or
/// the resulting percentage falls outside `[0, 100]`.
pub fn uniform_discount_percent(
    current_total: i64,
    target_amount: i64,
) -> Result<Decimal, VisitError> {
    if current_total == 0 {
        return Err(VisitError::InvalidDiscountTarget(
            "current total is zero".to_string(),
        ));
    }

    let percent = (to_decimal(current_total) - to_decimal(target_amount))
        / to_decimal(current_total)
        * Decimal::ONE_HUNDRED;

    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(VisitError::InvalidDiscountTarget(format!(
            "discount of {:.2}% is outside 0-100%",
            percent
        )));
    }

    Ok(percent)
}

/// Net price of an item discounted by an exact percentage, re-derived
/// from the item's own base price
pub fn discounted_net(base_price_net: i64, percent: Decimal) -> i64 {
    to_minor(to_decimal(base_price_net) * (Decimal::ONE - percent / Decimal::ONE_HUNDRED))
}
