//! Constants Module - Single Source of Truth
//!
//! Policy defaults, RPC limits and chain metadata used across the crate.
//! Thresholds here are defaults only; `MonitorConfig` can override them.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "L3Vitals";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outbound HTTP requests
pub const USER_AGENT: &str = concat!("L3Vitals/", env!("CARGO_PKG_VERSION"));

// ============================================
// RPC CONSTANTS
// ============================================

/// Default RPC endpoint when none is supplied
pub const DEFAULT_RPC_URL: &str = "https://nova.arbitrum.io/rpc";

/// Default timeout for a single RPC request (seconds)
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 60;

/// Upper bound for any per-call RPC timeout (seconds)
pub const MAX_RPC_TIMEOUT_SECS: u64 = 60;

/// TCP connect timeout for RPC endpoints (seconds)
pub const RPC_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default bound on in-flight RPC calls during fan-out
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;

// ============================================
// HEALTH POLICY DEFAULTS
// ============================================

/// Alert when the latest block is older than this (seconds)
pub const BLOCK_PRODUCTION_THRESHOLD_SECONDS: u64 = 300;

/// Alert when the sequencer balance drops below this (ETH)
pub const CRITICAL_BALANCE_ETH: f64 = 1.0;

/// Window size for historical averages (blocks)
pub const NUM_BLOCKS_FOR_AVERAGES: u64 = 20;

/// Target number of enriched transactions in a snapshot
pub const MIN_TRANSACTIONS_TO_FETCH: usize = 20;

/// Safety limit on blocks walked while collecting transactions
pub const MAX_BLOCKS_TO_SCAN_FOR_TXS: u64 = 50;

/// Marker reported alongside the sequencer address
pub const SEQUENCER_RESOLUTION: &str = "latest_block_miner";

// ============================================
// NOTIFICATION CONSTANTS
// ============================================

/// Telegram Bot API base URL
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Timeout for notification delivery (seconds)
pub const NOTIFIER_TIMEOUT_SECS: u64 = 5;

// ============================================
// API SERVER DEFAULTS
// ============================================

/// Default bind host for the API server
pub const DEFAULT_API_HOST: &str = "0.0.0.0";

/// Default bind port for the API server
pub const DEFAULT_API_PORT: u16 = 8080;

/// Overall request timeout for API calls (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Maximum concurrently served API requests
pub const DEFAULT_API_CONCURRENCY: usize = 64;

/// Output file for the one-shot CLI
pub const DEFAULT_OUTPUT_PATH: &str = "l3_health_data.json";

// ============================================
// CHAIN METADATA
// ============================================

/// Ethereum Mainnet
pub const CHAIN_ID_ETHEREUM: u64 = 1;
/// Arbitrum One
pub const CHAIN_ID_ARBITRUM_ONE: u64 = 42161;
/// Arbitrum Nova
pub const CHAIN_ID_ARBITRUM_NOVA: u64 = 42170;
/// Optimism
pub const CHAIN_ID_OPTIMISM: u64 = 10;
/// Base
pub const CHAIN_ID_BASE: u64 = 8453;

/// Get a human-readable chain name for well-known chain ids
pub fn get_chain_name(chain_id: u64) -> &'static str {
    match chain_id {
        CHAIN_ID_ETHEREUM => "Ethereum",
        CHAIN_ID_ARBITRUM_ONE => "Arbitrum One",
        CHAIN_ID_ARBITRUM_NOVA => "Arbitrum Nova",
        CHAIN_ID_OPTIMISM => "Optimism",
        CHAIN_ID_BASE => "Base",
        _ => "Unknown",
    }
}
