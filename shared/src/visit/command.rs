//! Visit commands - requests from the UI to mutate a visit

use super::item::ServiceItemInput;
use super::types::{Adjustment, NotificationOutcome, PaymentDetails, PriceBasis};
use crate::models::{CustomerRef, VehicleRef};
use serde::{Deserialize, Serialize};

/// Visit command envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitCommand {
    /// Command unique ID (idempotency key)
    pub command_id: String,
    /// Operator who issued the command
    pub operator_id: String,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Client timestamp (Unix millis)
    pub timestamp: i64,
    /// Optimistic concurrency pin: reject unless the stored visit is at
    /// exactly this version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
    pub payload: VisitCommandPayload,
}

impl VisitCommand {
    /// Create a new command with a generated ID and current timestamp
    pub fn new(
        operator_id: impl Into<String>,
        operator_name: impl Into<String>,
        payload: VisitCommandPayload,
    ) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            operator_id: operator_id.into(),
            operator_name: operator_name.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            expected_version: None,
            payload,
        }
    }

    /// Pin this command to a snapshot version
    pub fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitCommandPayload {
    // ========== Lifecycle ==========
    /// Register a new draft visit with the intake services (confirmed)
    RegisterVisit {
        customer: CustomerRef,
        vehicle: VehicleRef,
        #[serde(default)]
        services: Vec<ServiceItemInput>,
        #[serde(skip_serializing_if = "Option::is_none")]
        currency: Option<String>,
    },
    /// Confirm the draft: Draft -> InProgress, irreversible
    ConfirmDraft { visit_id: String },
    /// Delete the visit entirely (permitted only while Draft)
    CancelDraft { visit_id: String },
    /// Commit InProgress -> ReadyForPickup (wizard outcome)
    MarkReady {
        visit_id: String,
        /// Dispatch outcome when notifications were sent; `None` = skipped
        #[serde(skip_serializing_if = "Option::is_none")]
        notification: Option<NotificationOutcome>,
    },
    /// Commit ReadyForPickup -> Completed with payment details (wizard outcome)
    CompleteVisit {
        visit_id: String,
        payment: PaymentDetails,
    },
    /// Administrative: any non-terminal status -> Rejected
    RejectVisit {
        visit_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Administrative: any non-terminal status -> Archived
    ArchiveVisit { visit_id: String },

    // ========== Line Items ==========
    /// Add services directly as confirmed (intake, Draft only)
    AddServices {
        visit_id: String,
        services: Vec<ServiceItemInput>,
    },
    /// Propose adding a service (pending, awaiting approval)
    ProposeAddService {
        visit_id: String,
        service: ServiceItemInput,
    },
    /// Propose a price change on an existing item
    ProposeEditService {
        visit_id: String,
        item_id: String,
        adjustment: Adjustment,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// Propose removing a confirmed item
    ProposeDeleteService { visit_id: String, item_id: String },
    /// Approve the pending change on an item
    ApproveChange { visit_id: String, item_id: String },
    /// Reject the pending change on an item
    RejectChange { visit_id: String, item_id: String },

    // ========== Totals ==========
    /// Discount every line item so the total lands on the target amount
    ApplyUniformDiscount {
        visit_id: String,
        /// Target total in minor units
        target_amount: i64,
        price_basis: PriceBasis,
    },
}

impl VisitCommandPayload {
    /// The visit this command targets; `None` for RegisterVisit
    pub fn visit_id(&self) -> Option<&str> {
        match self {
            VisitCommandPayload::RegisterVisit { .. } => None,
            VisitCommandPayload::ConfirmDraft { visit_id }
            | VisitCommandPayload::CancelDraft { visit_id }
            | VisitCommandPayload::MarkReady { visit_id, .. }
            | VisitCommandPayload::CompleteVisit { visit_id, .. }
            | VisitCommandPayload::RejectVisit { visit_id, .. }
            | VisitCommandPayload::ArchiveVisit { visit_id }
            | VisitCommandPayload::AddServices { visit_id, .. }
            | VisitCommandPayload::ProposeAddService { visit_id, .. }
            | VisitCommandPayload::ProposeEditService { visit_id, .. }
            | VisitCommandPayload::ProposeDeleteService { visit_id, .. }
            | VisitCommandPayload::ApproveChange { visit_id, .. }
            | VisitCommandPayload::RejectChange { visit_id, .. }
            | VisitCommandPayload::ApplyUniformDiscount { visit_id, .. } => Some(visit_id),
        }
    }
}
