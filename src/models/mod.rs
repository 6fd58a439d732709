//! Models Module - Data Structures & Configuration
//!
//! Snapshot types, configuration and the crate-wide error type.

pub mod config;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
