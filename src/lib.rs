//! L3 Vitals Library
//!
//! Health and analytics snapshots for layer-3 / rollup chains, computed
//! from a node's standard JSON-RPC interface:
//! - Liveness: block production delay, sync state, peers
//! - Sequencer solvency: balance of the latest block's miner
//! - Throughput: block time, tx per block, TPS and gas usage over a window
//! - Recent transactions with fees, status and type
//!
//! Individual stages degrade to markers (`"N/A"`, `"Unknown"`, `"Error"`)
//! instead of failing the whole snapshot.

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{get_chain_health, HealthEvaluator};
pub use models::{
    AppError, AppResult, ChainSnapshot, ErrorCode, ErrorEnvelope, MonitorConfig, OverallStatus,
    ServerConfig,
};
pub use providers::{AlertSink, ChainRpc, RpcProvider, TelegramNotifier};
pub use utils::telemetry::{SnapshotTelemetry, TelemetryStats};
