//! Health Evaluator / Snapshot Assembler
//!
//! Runs every stage against one node, in order:
//! probe -> latest block -> block production -> client version -> sequencer
//! -> gas price -> peers -> sync -> history -> transactions -> status.
//!
//! Only the probe and the latest block are fatal. Every later stage degrades
//! its own field and leaves its siblings alone.

use alloy_rpc_types::BlockNumberOrTag;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::core::history::analyze_history;
use crate::core::scanner::{scan_recent_transactions, ScanLimits};
use crate::models::config::MonitorConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    ChainInfo, ChainSnapshot, GasFeeMetrics, HealthAlert, LatestBlockAnalytics, NodeHealth,
    OverallStatus, Reading, SequencerAddress, SequencerInfo, SyncState,
};
use crate::providers::rpc::{ChainRpc, RpcProvider};
use crate::providers::types::RpcBlock;
use crate::utils::constants::SEQUENCER_RESOLUTION;
use crate::utils::units::{format_eth_exact, gas_used_percent, wei_to_eth, wei_to_gwei};

/// Build a provider for `rpc_url` and take one snapshot
pub async fn get_chain_health(rpc_url: &str, config: &MonitorConfig) -> AppResult<ChainSnapshot> {
    let provider = RpcProvider::new(rpc_url, config.rpc_timeout).map_err(|e| {
        error!("❌ Could not set up RPC client for {}: {}", rpc_url, e);
        AppError::connect_failed(rpc_url)
    })?;
    HealthEvaluator::new(config.clone())
        .snapshot(&provider, rpc_url)
        .await
}

pub struct HealthEvaluator {
    config: MonitorConfig,
}

impl HealthEvaluator {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Snapshot against the wall clock
    pub async fn snapshot<P: ChainRpc>(&self, rpc: &P, rpc_url: &str) -> AppResult<ChainSnapshot> {
        self.snapshot_at(rpc, rpc_url, Utc::now()).await
    }

    /// Snapshot with an explicit "now"
    pub async fn snapshot_at<P: ChainRpc>(
        &self,
        rpc: &P,
        rpc_url: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ChainSnapshot> {
        let start = Instant::now();
        let config = &self.config;
        let mut alerts = Vec::new();

        // 1. Probe
        let chain_id = rpc.chain_id().await.map_err(|e| {
            error!("❌ RPC probe failed for {}: {}", rpc_url, e);
            AppError::connect_failed(rpc_url)
        })?;
        info!("🔗 Connected to {} (chain {})", rpc_url, chain_id);

        // 2. Latest block
        let latest = match rpc.block_by_number(BlockNumberOrTag::Latest).await {
            Ok(Some(block)) => block,
            Ok(None) => {
                error!("❌ Node returned no latest block");
                return Err(AppError::latest_block_unavailable());
            }
            Err(e) => {
                error!("❌ Failed to fetch latest block: {}", e);
                return Err(AppError::latest_block_unavailable());
            }
        };

        // 3. Block production
        let latest_block_analytics = block_analytics(&latest, now);
        if let Some(alert) = check_block_production(
            now - latest_block_analytics.timestamp_utc,
            config.block_production_threshold_secs,
        ) {
            warn!("🚨 {}", alert.description());
            alerts.push(alert);
        }

        // 4. Client version
        let mut chain_info = ChainInfo::new(rpc_url, chain_id);
        chain_info.client_version = match rpc.client_version().await {
            Ok(version) => Reading::Available(version),
            Err(e) => {
                warn!("⚠️ Client version unavailable: {}", e);
                Reading::Unavailable
            }
        };

        // 5. Sequencer
        let sequencer_info = self.resolve_sequencer(rpc, &latest).await;
        if let Reading::Available(balance_eth) = sequencer_info.balance_eth {
            if let Some(alert) = check_balance(balance_eth, config.critical_balance_eth) {
                warn!("🚨 {}", alert.description());
                alerts.push(alert);
            }
        }

        // 6. Network gas price
        let network_gas_price_gwei = match rpc.gas_price().await {
            Ok(price) => Reading::Available(wei_to_gwei(price)),
            Err(e) => {
                warn!("⚠️ Gas price unavailable: {}", e);
                Reading::Unavailable
            }
        };

        // 7. Peers
        let mut node_health = NodeHealth::default();
        node_health.peer_count = match rpc.peer_count().await {
            Ok(peers) => Reading::Available(peers),
            Err(e) => {
                warn!("⚠️ Peer count unavailable: {}", e);
                Reading::Unavailable
            }
        };

        // 8. Sync status
        match rpc.sync_state().await {
            Ok(state) => {
                node_health.apply_sync_state(state);
                if let Some(alert) = check_sync(state) {
                    warn!("🚨 {}", alert.description());
                    alerts.push(alert);
                }
            }
            Err(e) => warn!("⚠️ Sync status unavailable: {}", e),
        }

        // 9. History
        let historical_performance = analyze_history(
            rpc,
            &latest,
            config.num_blocks_for_averages,
            config.max_concurrent_requests,
        )
        .await;

        // 10. Recent transactions
        let detailed_transactions = scan_recent_transactions(
            rpc,
            &latest,
            ScanLimits {
                target: config.min_transactions_to_fetch,
                max_blocks: config.max_blocks_to_scan_for_txs,
                max_concurrent: config.max_concurrent_requests,
            },
        )
        .await;

        // 11. Status
        let overall_status = OverallStatus::from_alerts(&alerts);

        let gas_fee_metrics = GasFeeMetrics {
            gas_limit_per_block: latest.gas_limit(),
            gas_spent_latest_block: latest.gas_used(),
            network_gas_price_gwei,
            sequencer_balance_eth: sequencer_info.balance_eth,
            sequencer_balance_critical_point: config.critical_balance_eth,
        };

        info!(
            "{} Snapshot for chain {} at block {}: {:?} ({} alerts, {}ms)",
            overall_status.emoji(),
            chain_id,
            latest_block_analytics.number,
            overall_status,
            alerts.len(),
            start.elapsed().as_millis()
        );

        Ok(ChainSnapshot {
            generated_at: now,
            chain_info,
            node_health,
            latest_block_analytics,
            sequencer_info,
            historical_performance,
            detailed_transactions,
            gas_fee_metrics,
            health_alerts: alerts,
            overall_status,
        })
    }

    /// Miner of the latest block, and its balance
    async fn resolve_sequencer<P: ChainRpc>(&self, rpc: &P, latest: &RpcBlock) -> SequencerInfo {
        let mut sequencer = SequencerInfo {
            address: SequencerAddress::Unknown,
            balance_eth: Reading::Unavailable,
            critical_threshold_eth: self.config.critical_balance_eth,
            resolution: SEQUENCER_RESOLUTION,
        };

        let Some(address) = latest.miner_address() else {
            info!("❔ Latest block has no usable miner field, sequencer unknown");
            return sequencer;
        };

        match rpc.balance(address).await {
            Ok(wei) => {
                debug!("💰 Sequencer {} holds {} ETH", address, format_eth_exact(wei));
                sequencer.address = SequencerAddress::Resolved(address);
                sequencer.balance_eth = Reading::Available(wei_to_eth(wei));
            }
            Err(e) => {
                warn!("⚠️ Balance lookup for sequencer {} failed: {}", address, e);
                sequencer.address = SequencerAddress::Error;
            }
        }
        sequencer
    }
}

fn block_analytics(block: &RpcBlock, now: DateTime<Utc>) -> LatestBlockAnalytics {
    let timestamp_utc =
        DateTime::<Utc>::from_timestamp(block.timestamp() as i64, 0).unwrap_or_default();
    LatestBlockAnalytics {
        number: block.number(),
        hash: block.hash,
        timestamp_utc,
        seconds_since_block: (now - timestamp_utc).num_seconds(),
        tx_count: block.tx_count(),
        gas_used: block.gas_used(),
        gas_limit: block.gas_limit(),
        gas_used_percent: gas_used_percent(block.gas_used(), block.gas_limit()),
        base_fee_per_gas_gwei: block.base_fee_per_gas.map(wei_to_gwei).into(),
        size_bytes: block.size().into(),
    }
}

/// Strictly older than the threshold, sub-second part included
pub fn check_block_production(elapsed: TimeDelta, threshold_secs: u64) -> Option<HealthAlert> {
    let threshold = TimeDelta::try_seconds(i64::try_from(threshold_secs).ok()?)?;
    (elapsed > threshold).then(|| HealthAlert::StaleBlocks {
        elapsed_secs: elapsed.num_seconds(),
        threshold_secs,
    })
}

/// Strictly below the threshold
pub fn check_balance(balance_eth: f64, threshold_eth: f64) -> Option<HealthAlert> {
    (balance_eth < threshold_eth).then_some(HealthAlert::CriticalBalance {
        balance_eth,
        threshold_eth,
    })
}

pub fn check_sync(state: SyncState) -> Option<HealthAlert> {
    match state {
        SyncState::NotSyncing => None,
        SyncState::Syncing {
            current, highest, ..
        } => Some(HealthAlert::NodeSyncing {
            progress_percent: state.progress_percent().unwrap_or(0.0),
            current_block: current,
            highest_block: highest,
        }),
    }
}
