//! Reference models consumed by the engine
//!
//! These are snapshots of data owned by external collaborators (service
//! catalog, customer registry, comment journal). The engine reads them
//! but never mutates them.

pub mod comment;
pub mod customer;
pub mod service;
pub mod vehicle;

pub use comment::{CommentKind, VisitComment};
pub use customer::CustomerRef;
pub use service::CatalogService;
pub use vehicle::VehicleRef;
