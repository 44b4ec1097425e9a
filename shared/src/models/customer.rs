//! Customer reference snapshot

use serde::{Deserialize, Serialize};

/// Customer reference carried on a visit
///
/// Opaque to the engine apart from the contact fields: the notification
/// step offers the email channel only when `email` is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl CustomerRef {
    /// Whether the customer can be reached by email
    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.is_empty())
    }
}
