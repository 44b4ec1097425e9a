//! Line Item Price Calculator
//!
//! Computes the final net/gross price of a service line item from:
//! - the net base price (integer minor currency units)
//! - the VAT rate (whole percentage points)
//! - a price adjustment (percent delta, fixed delta or absolute override)
//!
//! Uses rust_decimal for intermediate arithmetic; results are rounded
//! back to minor units, half away from zero.

use rust_decimal::prelude::*;
use shared::visit::Adjustment;
use thiserror::Error;

/// Pricing errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Invalid pricing input: {0}")]
    InvalidInput(String),
}

/// Result of a line item price calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    /// Final net price (minor units)
    pub final_price_net: i64,
    /// Final gross price (minor units)
    pub final_price_gross: i64,
    /// Pre-adjustment reference gross price (minor units)
    pub original_price_gross: i64,
    /// Whether the final gross is below the reference gross
    pub has_discount: bool,
    /// Human label describing the discount, present when discounted
    pub discount_label: Option<String>,
}

// ==================== Conversion Helpers ====================

/// Convert minor units to Decimal for calculation
#[inline]
pub fn to_decimal(value: i64) -> Decimal {
    Decimal::from(value)
}

/// Convert Decimal back to minor units, rounded half away from zero
#[inline]
pub fn to_minor(value: Decimal) -> i64 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or_default()
}

/// Format minor units as a major-unit amount, e.g. `12300` -> "123.00"
pub fn format_minor(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// VAT multiplier: `1 + vat_rate/100`
#[inline]
fn vat_factor(vat_rate: i32) -> Decimal {
    Decimal::ONE + Decimal::from(vat_rate) / Decimal::ONE_HUNDRED
}

/// Derive a gross price from a net price at the given VAT rate
pub fn gross_from_net(net: i64, vat_rate: i32) -> i64 {
    to_minor(to_decimal(net) * vat_factor(vat_rate))
}

/// Derive a net price from a gross price at the given VAT rate
pub fn net_from_gross(gross: i64, vat_rate: i32) -> i64 {
    to_minor(to_decimal(gross) / vat_factor(vat_rate))
}

// ==================== Validation ====================

fn validate_inputs(base_price_net: i64, vat_rate: i32) -> Result<(), PricingError> {
    if !(0..=100).contains(&vat_rate) {
        return Err(PricingError::InvalidInput(format!(
            "vat_rate must be between 0 and 100, got {}",
            vat_rate
        )));
    }
    if base_price_net < 0 {
        return Err(PricingError::InvalidInput(format!(
            "base_price_net must be non-negative, got {}",
            base_price_net
        )));
    }
    Ok(())
}

// ==================== Main Calculator ====================

/// Compute the final price of a line item
///
/// # Calculation
/// 1. `original_price_gross = round(base * (1 + vat/100))`, always computed
/// 2. Apply the adjustment:
///    - `Percent(v)`: net scaled by `(1 + v/100)`, gross derived from net
///    - `FixedNet(v)`: `net = base + v`, gross derived from net
///    - `FixedGross(v)`: `gross = original_gross + v`, net derived from gross
///    - `SetNet(v)`: `net = v`, gross derived from net
///    - `SetGross(v)`: `gross = v`, net derived from gross
/// 3. `has_discount` when the final gross is below the reference gross;
///    the label shows the percentage for `Percent`, the absolute gross
///    delta otherwise.
///
/// Pure: no side effects, safe to call repeatedly.
pub fn price(
    base_price_net: i64,
    vat_rate: i32,
    adjustment: &Adjustment,
) -> Result<PriceBreakdown, PricingError> {
    validate_inputs(base_price_net, vat_rate)?;

    let base = to_decimal(base_price_net);
    let factor = vat_factor(vat_rate);
    let original_price_gross = to_minor(base * factor);

    let (final_price_net, final_price_gross) = match *adjustment {
        Adjustment::Percent(v) => {
            let net = to_minor(base * (Decimal::ONE + Decimal::from(v) / Decimal::ONE_HUNDRED));
            (net, gross_from_net(net, vat_rate))
        }
        Adjustment::FixedNet(v) => {
            let net = base_price_net + v;
            (net, gross_from_net(net, vat_rate))
        }
        Adjustment::FixedGross(v) => {
            let gross = original_price_gross + v;
            (net_from_gross(gross, vat_rate), gross)
        }
        Adjustment::SetNet(v) => (v, gross_from_net(v, vat_rate)),
        Adjustment::SetGross(v) => (net_from_gross(v, vat_rate), v),
    };

    let has_discount = final_price_gross < original_price_gross;
    let discount_label = if has_discount {
        Some(match *adjustment {
            Adjustment::Percent(v) => format!("{}%", v),
            _ => format!(
                "-{}",
                format_minor(original_price_gross - final_price_gross)
            ),
        })
    } else {
        None
    };

    Ok(PriceBreakdown {
        final_price_net,
        final_price_gross,
        original_price_gross,
        has_discount,
        discount_label,
    })
}

// ==================== Tests ====================
