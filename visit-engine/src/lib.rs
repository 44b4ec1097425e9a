//! Visit lifecycle engine for a vehicle-service workshop
//!
//! This crate implements the rules behind the workshop's visit screen:
//!
//! - **pricing**: base price + VAT + adjustment -> final net/gross price
//! - **visits**: the `VisitManager` command processor, change-approval
//!   actions, totals and the status state machine
//! - **wizard**: the guarded step sequences that gate status transitions
//! - **catalog** / **notify**: collaborator traits for the service
//!   catalog and the notification channel
//!
//! # Architecture
//!
//! ```text
//! Command → VisitManager → Action → Snapshot mutation + Events
//!                 ↓                        ↓
//!            VisitStore               Broadcast
//!                                         ↓
//!                                  All Subscribers
//! ```
//!
//! # Command Flow
//!
//! 1. UI builds a `VisitCommand` (optionally pinned to a snapshot version)
//! 2. `VisitManager` takes the per-visit lock (single-writer discipline)
//! 3. The action validates and mutates the loaded snapshot, producing events
//! 4. The snapshot is saved (or deleted) all-or-nothing
//! 5. Events are broadcast to subscribers
//! 6. A `CommandResponse` is returned to the caller

pub mod catalog;
pub mod core;
pub mod notify;
pub mod pricing;
pub mod visits;
pub mod wizard;

// Re-exports
pub use catalog::{MemoryCatalog, ServiceCatalog};
pub use crate::core::config::EngineConfig;
pub use notify::{NotificationSender, NotifyError};
pub use pricing::{PriceBreakdown, PricingError};
pub use visits::manager::VisitManager;
pub use visits::store::{MemoryVisitStore, StoreError, VisitStore};
pub use wizard::{CompletionWizard, QualityChecklist, ReadyWizard, WizardError};
