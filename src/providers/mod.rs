//! Providers Module - External Data Sources
//!
//! The node's JSON-RPC endpoint and the Telegram alert sink.

pub mod rpc;
pub mod telegram;
pub mod types;

pub use rpc::*;
pub use telegram::*;
pub use types::*;
