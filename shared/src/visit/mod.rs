//! Visit lifecycle types
//!
//! This module provides the types for the visit lifecycle engine:
//! - Commands: Requests from the UI to mutate a visit
//! - Events: Immutable facts recorded after command processing
//! - Snapshots: Authoritative visit state

pub mod command;
pub mod event;
pub mod item;
pub mod snapshot;
pub mod types;

// Re-exports
pub use command::{VisitCommand, VisitCommandPayload};
pub use event::{EventPayload, VisitEvent, VisitEventType};
pub use item::{ServiceItemInput, ServiceLineItem};
pub use snapshot::{VisitSnapshot, VisitStatus};
pub use types::*;
