//! Notification dispatch collaborator
//!
//! Pickup notifications (SMS/email) are dispatched by an external
//! channel service; the wizard talks to it through `NotificationSender`.
//! A failed or partial dispatch never commits the status transition.

use async_trait::async_trait;
use shared::visit::{NotificationChannels, NotificationOutcome};
use thiserror::Error;

/// Dispatch errors
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Notification dispatch failed: {0}")]
    Dispatch(String),
}

/// Notification channel collaborator
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Dispatch pickup notifications on the selected channels
    async fn send(
        &self,
        visit_id: &str,
        channels: NotificationChannels,
    ) -> Result<NotificationOutcome, NotifyError>;
}
