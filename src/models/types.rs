//! Type definitions for L3 Vitals
//! The snapshot data model: everything a single health check reports.

use alloy_primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::utils::constants::get_chain_name;

// ============================================
// Field-level availability
// ============================================

/// A value that a stage may fail to produce.
///
/// `Available` serializes as the plain JSON value, `Unavailable` as the
/// string `"N/A"`, so a real zero never reads as missing data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading<T> {
    Available(T),
    Unavailable,
}

impl<T> Reading<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Reading::Available(_))
    }
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Reading::Unavailable, Reading::Available)
    }
}

impl<T: Serialize> Serialize for Reading<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reading::Available(v) => v.serialize(serializer),
            Reading::Unavailable => serializer.serialize_str("N/A"),
        }
    }
}

/// Round to 2 decimals. Applied only when serializing.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn serialize_round2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round2(*value))
}

fn serialize_round2_opt<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_f64(round2(*v)),
        None => serializer.serialize_none(),
    }
}

// ============================================
// Snapshot sections
// ============================================

#[derive(Debug, Clone, Serialize)]
pub struct ChainInfo {
    pub rpc_url: String,
    pub chain_id: u64,
    pub chain_name: &'static str,
    pub client_version: Reading<String>,
}

impl ChainInfo {
    pub fn new(rpc_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
            chain_name: get_chain_name(chain_id),
            client_version: Reading::Unavailable,
        }
    }
}

/// Sync progress as reported by `eth_syncing`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    NotSyncing,
    Syncing {
        starting: u64,
        current: u64,
        highest: u64,
    },
}

impl SyncState {
    /// current / highest * 100, 0 when highest is 0
    pub fn progress_percent(&self) -> Option<f64> {
        match self {
            SyncState::NotSyncing => None,
            SyncState::Syncing {
                current, highest, ..
            } => Some(if *highest == 0 {
                0.0
            } else {
                *current as f64 / *highest as f64 * 100.0
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeHealth {
    pub syncing: Reading<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_round2_opt"
    )]
    pub sync_progress_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_current_block: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_highest_block: Option<u64>,
    pub peer_count: Reading<u64>,
}

impl Default for NodeHealth {
    fn default() -> Self {
        Self {
            syncing: Reading::Unavailable,
            sync_progress_percent: None,
            sync_current_block: None,
            sync_highest_block: None,
            peer_count: Reading::Unavailable,
        }
    }
}

impl NodeHealth {
    pub fn apply_sync_state(&mut self, state: SyncState) {
        match state {
            SyncState::NotSyncing => {
                self.syncing = Reading::Available(false);
            }
            SyncState::Syncing {
                current, highest, ..
            } => {
                self.syncing = Reading::Available(true);
                self.sync_progress_percent = state.progress_percent();
                self.sync_current_block = Some(current);
                self.sync_highest_block = Some(highest);
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestBlockAnalytics {
    pub number: u64,
    pub hash: B256,
    pub timestamp_utc: DateTime<Utc>,
    pub seconds_since_block: i64,
    pub tx_count: usize,
    pub gas_used: u64,
    pub gas_limit: u64,
    #[serde(serialize_with = "serialize_round2")]
    pub gas_used_percent: f64,
    pub base_fee_per_gas_gwei: Reading<f64>,
    pub size_bytes: Reading<u64>,
}

/// Who produced the latest block, as far as the miner field tells us
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerAddress {
    Resolved(Address),
    /// Miner field absent or malformed
    Unknown,
    /// Balance lookup failed
    Error,
}

impl Serialize for SequencerAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SequencerAddress::Resolved(address) => address.serialize(serializer),
            SequencerAddress::Unknown => serializer.serialize_str("Unknown"),
            SequencerAddress::Error => serializer.serialize_str("Error"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SequencerInfo {
    pub address: SequencerAddress,
    pub balance_eth: Reading<f64>,
    pub critical_threshold_eth: f64,
    /// How the address was derived; best-effort only
    pub resolution: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalStats {
    pub start_block: u64,
    pub end_block: u64,
    pub blocks_analyzed: u64,
    #[serde(serialize_with = "serialize_round2")]
    pub average_block_time_seconds: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub average_tx_per_block: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub estimated_tps: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub average_gas_used_percent: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub min_gas_used_percent: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub max_gas_used_percent: f64,
    pub min_tx_count: usize,
    pub max_tx_count: usize,
    pub min_block_size_bytes: Reading<u64>,
    pub max_block_size_bytes: Reading<u64>,
}

/// Outcome of the history stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HistoricalPerformance {
    Available(HistoricalStats),
    InsufficientHistory {
        latest_block: u64,
        required_blocks: u64,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TxType {
    SimpleTransfer,
    ContractCreation,
    ContractCall,
}

impl TxType {
    /// No recipient means deployment; any calldata means a call
    pub fn classify(to: Option<Address>, input_len: usize) -> Self {
        match to {
            None => TxType::ContractCreation,
            Some(_) if input_len > 0 => TxType::ContractCall,
            Some(_) => TxType::SimpleTransfer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTransaction {
    pub hash: B256,
    pub block_number: u64,
    pub from: Address,
    /// `None` for contract creation
    pub to: Option<Address>,
    pub value_eth: f64,
    pub status: TxStatus,
    pub gas_used: u64,
    pub gas_price_gwei: f64,
    pub transaction_fee_eth: f64,
    #[serde(rename = "type")]
    pub tx_type: TxType,
}

#[derive(Debug, Clone, Serialize)]
pub struct GasFeeMetrics {
    pub gas_limit_per_block: u64,
    pub gas_spent_latest_block: u64,
    pub network_gas_price_gwei: Reading<f64>,
    pub sequencer_balance_eth: Reading<f64>,
    pub sequencer_balance_critical_point: f64,
}

// ============================================
// Alerts
// ============================================

/// Threshold violations detected while assembling a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum HealthAlert {
    /// Latest block older than the production threshold
    StaleBlocks { elapsed_secs: i64, threshold_secs: u64 },
    /// Sequencer balance under the critical mark
    CriticalBalance { balance_eth: f64, threshold_eth: f64 },
    /// Node still catching up
    NodeSyncing {
        progress_percent: f64,
        current_block: u64,
        highest_block: u64,
    },
}

impl HealthAlert {
    pub fn description(&self) -> String {
        match self {
            HealthAlert::StaleBlocks {
                elapsed_secs,
                threshold_secs,
            } => format!(
                "No new blocks in over {:.1} minutes. Last block was {} seconds ago.",
                *threshold_secs as f64 / 60.0,
                elapsed_secs
            ),
            HealthAlert::CriticalBalance {
                balance_eth,
                threshold_eth,
            } => format!(
                "Sequencer ETH balance is critical: {:.4} ETH. Below threshold of {:?} ETH.",
                balance_eth, threshold_eth
            ),
            HealthAlert::NodeSyncing {
                progress_percent,
                current_block,
                highest_block,
            } => format!(
                "Node is syncing: {:.2}% complete (block {} of {}).",
                progress_percent, current_block, highest_block
            ),
        }
    }
}

impl Serialize for HealthAlert {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverallStatus {
    OK,
    ALERT,
}

impl OverallStatus {
    pub fn from_alerts(alerts: &[HealthAlert]) -> Self {
        if alerts.is_empty() {
            OverallStatus::OK
        } else {
            OverallStatus::ALERT
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            OverallStatus::OK => "✅",
            OverallStatus::ALERT => "🚨",
        }
    }
}

// ============================================
// Snapshot root
// ============================================

#[derive(Debug, Clone, Serialize)]
pub struct ChainSnapshot {
    pub generated_at: DateTime<Utc>,
    pub chain_info: ChainInfo,
    pub node_health: NodeHealth,
    pub latest_block_analytics: LatestBlockAnalytics,
    pub sequencer_info: SequencerInfo,
    pub historical_performance: HistoricalPerformance,
    pub detailed_transactions: Vec<EnrichedTransaction>,
    pub gas_fee_metrics: GasFeeMetrics,
    pub health_alerts: Vec<HealthAlert>,
    pub overall_status: OverallStatus,
}

impl ChainSnapshot {
    /// Markdown alert text for notification sinks; `None` when healthy
    pub fn alert_report(&self) -> Option<String> {
        if self.health_alerts.is_empty() {
            return None;
        }

        let mut output = format!(
            "{} *L3 Health Alert*\n*Chain:* {} ({})\n*RPC:* {}\n*Latest block:* {}\n\n",
            self.overall_status.emoji(),
            escape_markdown(self.chain_info.chain_name),
            self.chain_info.chain_id,
            escape_markdown(&self.chain_info.rpc_url),
            self.latest_block_analytics.number
        );
        for alert in &self.health_alerts {
            output.push_str(&format!("- {}\n", alert.description()));
        }
        output.push_str(&format!(
            "\n_Generated at {}_",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        Some(output)
    }
}

/// Backslash-escape Telegram legacy Markdown entities
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
