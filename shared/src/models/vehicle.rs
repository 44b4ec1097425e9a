//! Vehicle reference snapshot

use serde::{Deserialize, Serialize};

/// Vehicle reference carried on a visit (opaque to the engine)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display label, e.g. "WX 12345 - Skoda Octavia"
    pub label: String,
}
