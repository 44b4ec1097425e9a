//! Visit comment model
//!
//! Comment CRUD lives in an external collaborator; the engine only reads
//! comments during the client-briefing wizard step.

use serde::{Deserialize, Serialize};

/// Comment audience
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentKind {
    /// Shown to the customer during the briefing step
    ForCustomer,
    /// Internal workshop note
    Internal,
}

/// Comment attached to a visit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisitComment {
    pub id: String,
    pub kind: CommentKind,
    pub body: String,
    pub author_name: String,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
}
