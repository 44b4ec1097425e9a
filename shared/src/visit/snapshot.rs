//! Visit snapshot - authoritative visit state
//!
//! The snapshot carries a `version` counter for optimistic concurrency:
//! mutating commands may pin the version they were issued against, and
//! the engine rejects the command with a conflict when the stored
//! snapshot has moved on.

use super::item::ServiceLineItem;
use super::types::PaymentDetails;
use crate::models::{CustomerRef, VehicleRef, VisitComment};
use serde::{Deserialize, Serialize};

/// Visit status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitStatus {
    #[default]
    Draft,
    InProgress,
    ReadyForPickup,
    Completed,
    Rejected,
    Archived,
}

impl VisitStatus {
    /// Terminal statuses permit no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            VisitStatus::Completed | VisitStatus::Rejected | VisitStatus::Archived
        )
    }

    /// Whether line items may still be changed in this status
    pub fn is_editable(&self) -> bool {
        matches!(self, VisitStatus::Draft | VisitStatus::InProgress)
    }
}

/// Visit snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitSnapshot {
    /// Visit ID (assigned by the engine)
    pub visit_id: String,
    /// Human-facing visit number (assigned at registration)
    pub visit_number: String,
    pub status: VisitStatus,
    pub customer: CustomerRef,
    pub vehicle: VehicleRef,
    /// Service line items, in insertion order
    pub services: Vec<ServiceLineItem>,
    /// Comments attached by the journal collaborator (read-only here)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<VisitComment>,
    /// ISO 4217 currency code for all amounts on this visit
    pub currency: String,
    /// Net total in minor units
    pub total_net: i64,
    /// VAT total in minor units
    pub total_vat: i64,
    /// Gross total in minor units
    pub total_gross: i64,
    /// Whether the gross total is below the pre-adjustment reference
    #[serde(default)]
    pub has_total_discount: bool,
    /// Payment details recorded at completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentDetails>,
    /// Optimistic concurrency version, bumped on every committed mutation
    pub version: u64,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
    /// Last update timestamp (Unix millis)
    pub updated_at: i64,
}

impl VisitSnapshot {
    /// Create a new draft visit
    pub fn new(visit_id: String, visit_number: String, currency: String) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            visit_id,
            visit_number,
            status: VisitStatus::Draft,
            customer: CustomerRef::default(),
            vehicle: VehicleRef::default(),
            services: Vec::new(),
            comments: Vec::new(),
            currency,
            total_net: 0,
            total_vat: 0,
            total_gross: 0,
            has_total_discount: false,
            payment: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Find a line item by instance ID
    pub fn find_service(&self, item_id: &str) -> Option<&ServiceLineItem> {
        self.services.iter().find(|s| s.id == item_id)
    }

    /// Find a line item by instance ID, mutably
    pub fn find_service_mut(&mut self, item_id: &str) -> Option<&mut ServiceLineItem> {
        self.services.iter_mut().find(|s| s.id == item_id)
    }

    /// Whether any line item has an unresolved pending change
    pub fn has_pending_changes(&self) -> bool {
        self.services.iter().any(|s| s.pending_operation.is_some())
    }
}
