//! Utils Module - Helper Functions & Shared Utilities
//!
//! Constants, unit conversions and in-process telemetry shared by the crate.

pub mod constants;
pub mod telemetry;
pub mod units;

pub use constants::*;
pub use telemetry::*;
pub use units::*;
