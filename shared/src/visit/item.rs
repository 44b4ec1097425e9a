//! Service line item - one service entry on a visit

use super::types::{Adjustment, LineItemStatus, PendingOperation};
use serde::{Deserialize, Serialize};

/// Service line item snapshot
///
/// All prices are integers in minor currency units. `final_price_net` and
/// `final_price_gross` are derived from `base_price_net`, `vat_rate` and
/// `adjustment` by the pricing engine.
///
/// Invariant: `previous_price_net`/`previous_price_gross` are `Some` if
/// and only if `pending_operation == Some(Edit)`; they hold the last
/// confirmed price while an edit awaits approval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceLineItem {
    /// Line item instance ID
    pub id: String,
    /// Catalog service reference; `None` = ad-hoc service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<i64>,
    pub service_name: String,
    /// Net base price in minor currency units
    pub base_price_net: i64,
    /// VAT rate as whole percentage points
    pub vat_rate: i32,
    pub adjustment: Adjustment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Final net price after adjustment (minor units)
    pub final_price_net: i64,
    /// Final gross price after adjustment (minor units)
    pub final_price_gross: i64,
    pub status: LineItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_operation: Option<PendingOperation>,
    /// Last confirmed net price, held while an edit is pending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_price_net: Option<i64>,
    /// Last confirmed gross price, held while an edit is pending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_price_gross: Option<i64>,
}

impl ServiceLineItem {
    /// Whether this item is confirmed with no outstanding change
    pub fn is_settled(&self) -> bool {
        self.status == LineItemStatus::Confirmed && self.pending_operation.is_none()
    }

    /// Whether an edit awaits approval on this item
    pub fn has_pending_edit(&self) -> bool {
        self.pending_operation == Some(PendingOperation::Edit)
    }

    /// Whether this item is ad-hoc (not backed by a catalog entry)
    pub fn is_ad_hoc(&self) -> bool {
        self.service_id.is_none()
    }
}

/// Service line item input - for adding services (without instance id)
///
/// Two entry paths: catalog (`service_id` set, name/price/VAT resolved
/// from the catalog) and ad-hoc (`service_id` unset, name/price/VAT
/// carried inline).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceItemInput {
    /// Catalog service ID; `None` = ad-hoc service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<i64>,
    /// Service name (required for ad-hoc services)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Net base price in minor units (required for ad-hoc services)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price_net: Option<i64>,
    /// VAT rate in whole percentage points (required for ad-hoc services)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<i32>,
    #[serde(default)]
    pub adjustment: Adjustment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
