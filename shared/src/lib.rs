//! Shared types for the visit lifecycle engine
//!
//! Common types used across the engine and any embedding application:
//! visit snapshots, service line items, price adjustments, commands,
//! events, responses and reference models.

pub mod models;
pub mod visit;

// Re-exports
pub use serde::{Deserialize, Serialize};
