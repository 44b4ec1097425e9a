//! Shared types for the visit lifecycle engine

use serde::{Deserialize, Serialize};

// ============================================================================
// Price Adjustment
// ============================================================================

/// Price adjustment on a service line item
///
/// Closed sum type: each variant carries exactly the value it needs, so
/// invalid `{type, value}` combinations are unrepresentable. Amounts are
/// integers in minor currency units; percentages are signed whole
/// percentage points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Adjustment {
    /// Signed percentage delta applied to the net price
    Percent(i32),
    /// Signed delta added to the net price
    FixedNet(i64),
    /// Signed delta added to the gross price; `0` = "price unchanged"
    FixedGross(i64),
    /// Absolute net price override
    SetNet(i64),
    /// Absolute gross price override
    SetGross(i64),
}

impl Adjustment {
    /// The canonical "no price change" adjustment
    pub fn unchanged() -> Self {
        Adjustment::FixedGross(0)
    }

    /// Whether this adjustment leaves the base price untouched
    pub fn is_identity(&self) -> bool {
        matches!(
            self,
            Adjustment::Percent(0) | Adjustment::FixedNet(0) | Adjustment::FixedGross(0)
        )
    }
}

impl Default for Adjustment {
    fn default() -> Self {
        Adjustment::unchanged()
    }
}

// ============================================================================
// Line Item State
// ============================================================================

/// Line item approval status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineItemStatus {
    /// Awaiting approval of a pending operation
    Pending,
    /// Part of the confirmed bill
    #[default]
    Confirmed,
}

/// Pending operation on a line item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PendingOperation {
    Add,
    Edit,
    Delete,
}

// ============================================================================
// Totals
// ============================================================================

/// Price basis for the uniform discount target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceBasis {
    Net,
    Gross,
}

// ============================================================================
// Payment
// ============================================================================

/// Payment method selected at completion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

/// Invoice type selected at completion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceType {
    Vat,
    Receipt,
    Other,
}

/// Payment details recorded when a visit completes
///
/// Data entry only; capturing the actual transaction is out of scope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub invoice: InvoiceType,
}

// ============================================================================
// Notifications
// ============================================================================

/// Channel selection for the pickup notification
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationChannels {
    pub sms: bool,
    pub email: bool,
}

impl NotificationChannels {
    pub fn is_empty(&self) -> bool {
        !self.sms && !self.email
    }
}

/// Dispatch outcome reported by the notification collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationOutcome {
    pub sms_sent: bool,
    pub email_sent: bool,
    /// Channels that failed to dispatch, with reasons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

// ============================================================================
// Command Response
// ============================================================================

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Visit ID (set on success; newly generated for RegisterVisit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_id: Option<String>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, visit_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            visit_id,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            visit_id: None,
            error: Some(error),
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            visit_id: None,
            error: None,
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    VisitNotFound,
    ItemNotFound,
    ServiceNotFound,
    NoPendingChange,
    InvalidPricingInput,
    InvalidDiscountTarget,
    TerminalStateViolation,
    Conflict,
    InvalidOperation,
    DuplicateCommand,
    InternalError,
}
