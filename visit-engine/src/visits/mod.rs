//! Visit Command Processing Module
//!
//! This module implements the visit lifecycle engine:
//!
//! - **manager**: Core VisitManager for command processing and event generation
//! - **actions**: One handler per command (proposals, approvals, transitions)
//! - **money**: Totals aggregation and the uniform discount
//! - **lifecycle**: The visit status transition table
//! - **store**: Persistence boundary trait + in-memory implementation
//!
//! # Data Flow
//!
//! 1. UI sends a VisitCommand to the VisitManager
//! 2. VisitManager takes the per-visit lock and loads the snapshot
//! 3. The matching action validates and mutates the snapshot
//! 4. A VisitEvent is generated with a global sequence
//! 5. The snapshot is persisted all-or-nothing
//! 6. The event is broadcast to all subscribers
//! 7. A CommandResponse is returned to the caller

pub mod actions;
pub mod lifecycle;
pub mod manager;
pub mod money;
pub mod store;
pub mod traits;

// Re-exports
pub use manager::VisitManager;
pub use money::{VisitTotals, compute_totals, recalculate_totals};
pub use store::{MemoryVisitStore, StoreError, VisitStore};
pub use traits::{CommandContext, CommandHandler, CommandMetadata, VisitError};
