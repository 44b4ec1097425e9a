//! Service Catalog Model

use serde::{Deserialize, Serialize};

/// Catalog service entry (workshop price list)
///
/// Prices are integers in minor currency units; `vat_rate` is a whole
/// percentage (e.g. `23` = 23%).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogService {
    pub id: i64,
    pub name: String,
    /// Net base price in minor currency units
    pub base_price_net: i64,
    /// VAT rate as whole percentage points
    pub vat_rate: i32,
    pub is_active: bool,
}
