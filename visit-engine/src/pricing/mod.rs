//! Pricing Engine Module
//!
//! This module computes final line-item prices from a net base price, a
//! VAT rate and a price adjustment. All amounts are integers in minor
//! currency units.

mod engine;

pub use engine::*;
