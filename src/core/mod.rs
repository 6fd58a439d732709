//! Core Module - Health Analytics Engine
//!
//! Enrichment, history, transaction scanning and the snapshot assembler.

pub mod enricher;
pub mod health;
pub mod history;
pub mod scanner;

#[cfg(test)]
pub(crate) mod test_support;

pub use enricher::*;
pub use health::*;
pub use history::*;
pub use scanner::*;
