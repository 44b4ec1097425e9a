//! Visit events - immutable facts recorded after command processing

use super::item::ServiceLineItem;
use super::types::{
    Adjustment, NotificationOutcome, PaymentDetails, PendingOperation, PriceBasis,
};
use serde::{Deserialize, Serialize};

/// Visit event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number (for ordering)
    pub sequence: u64,
    /// Visit this event belongs to
    pub visit_id: String,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Client timestamp (Unix milliseconds) - for audit, may have clock skew
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    /// Operator who triggered this event
    pub operator_id: String,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Command that triggered this event (for audit tracing)
    pub command_id: String,
    /// Event type
    pub event_type: VisitEventType,
    /// Event payload
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitEventType {
    // Lifecycle
    VisitRegistered,
    DraftConfirmed,
    DraftCancelled,
    VisitReady,
    VisitCompleted,
    VisitRejected,
    VisitArchived,

    // Line items
    ServicesAdded,
    ServiceAddProposed,
    ServiceEditProposed,
    ServiceDeleteProposed,
    ChangeApproved,
    ChangeRejected,

    // Totals
    UniformDiscountApplied,
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Lifecycle ==========
    VisitRegistered {
        visit_number: String,
        customer_name: String,
        vehicle_label: String,
        /// Complete snapshots of the intake services
        services: Vec<ServiceLineItem>,
        total_gross: i64,
    },

    DraftConfirmed {},

    /// The visit was deleted; this event is the only surviving record
    DraftCancelled { visit_number: String },

    VisitReady {
        /// Dispatch outcome when notifications were sent; `None` = skipped
        #[serde(skip_serializing_if = "Option::is_none")]
        notification: Option<NotificationOutcome>,
    },

    VisitCompleted {
        visit_number: String,
        payment: PaymentDetails,
        final_total_gross: i64,
    },

    VisitRejected {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    VisitArchived {},

    // ========== Line Items ==========
    ServicesAdded {
        /// Complete snapshots of the added items
        items: Vec<ServiceLineItem>,
        total_net: i64,
        total_gross: i64,
    },

    ServiceAddProposed {
        /// Complete snapshot of the proposed item
        item: Box<ServiceLineItem>,
    },

    ServiceEditProposed {
        item_id: String,
        service_name: String,
        adjustment: Adjustment,
        /// Last confirmed prices, retained until the edit resolves
        previous_price_net: i64,
        previous_price_gross: i64,
        proposed_price_net: i64,
        proposed_price_gross: i64,
    },

    ServiceDeleteProposed {
        item_id: String,
        service_name: String,
    },

    ChangeApproved {
        item_id: String,
        service_name: String,
        operation: PendingOperation,
        total_net: i64,
        total_gross: i64,
    },

    ChangeRejected {
        item_id: String,
        service_name: String,
        operation: PendingOperation,
        total_net: i64,
        total_gross: i64,
    },

    // ========== Totals ==========
    UniformDiscountApplied {
        price_basis: PriceBasis,
        target_amount: i64,
        /// Exact percentage applied (display only)
        percent: f64,
        total_net: i64,
        total_gross: i64,
    },
}

impl VisitEvent {
    /// Create a new event
    ///
    /// The server timestamp is always set here; the client timestamp is
    /// preserved from the originating command for audit.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        visit_id: String,
        operator_id: String,
        operator_name: String,
        command_id: String,
        client_timestamp: Option<i64>,
        event_type: VisitEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            visit_id,
            timestamp: chrono::Utc::now().timestamp_millis(),
            client_timestamp,
            operator_id,
            operator_name,
            command_id,
            event_type,
            payload,
        }
    }

    /// Create an event from a command (extracts audit metadata)
    pub fn from_command(
        sequence: u64,
        visit_id: String,
        command: &super::VisitCommand,
        event_type: VisitEventType,
        payload: EventPayload,
    ) -> Self {
        Self::new(
            sequence,
            visit_id,
            command.operator_id.clone(),
            command.operator_name.clone(),
            command.command_id.clone(),
            Some(command.timestamp),
            event_type,
            payload,
        )
    }
}
