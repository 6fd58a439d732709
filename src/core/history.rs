//! Historical Analyzer
//!
//! Averages over the most recent window of blocks ending at the latest one.
//! Window blocks are fetched with bounded, order-preserving parallelism; a
//! single missing block invalidates the whole window.

use alloy_rpc_types::BlockNumberOrTag;
use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::models::types::{HistoricalPerformance, HistoricalStats};
use crate::providers::rpc::ChainRpc;
use crate::providers::types::RpcBlock;
use crate::utils::units::gas_used_percent;

/// Analyze the `window` blocks ending at `latest` (inclusive)
pub async fn analyze_history<P: ChainRpc>(
    rpc: &P,
    latest: &RpcBlock,
    window: u64,
    max_concurrent: usize,
) -> HistoricalPerformance {
    let latest_number = latest.number();
    if window == 0 || latest_number <= window {
        info!(
            "📉 Not enough history: latest block {} needs more than {}",
            latest_number, window
        );
        return HistoricalPerformance::InsufficientHistory {
            latest_block: latest_number,
            required_blocks: window,
        };
    }

    let start = latest_number - window + 1;
    let requests: Vec<_> = (start..latest_number)
        .map(|number| async move {
            (number, rpc.block_by_number(BlockNumberOrTag::Number(number)).await)
        })
        .collect();
    let fetched: Vec<_> = stream::iter(requests)
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    let mut blocks = Vec::with_capacity(window as usize);
    for (number, result) in fetched {
        match result {
            Ok(Some(block)) => blocks.push(block),
            Ok(None) => {
                let message = format!("Block {} not found while analyzing history", number);
                warn!("⚠️ {}", message);
                return HistoricalPerformance::Error { message };
            }
            Err(e) => {
                let message = format!("Failed to fetch block {}: {}", number, e.message);
                warn!("⚠️ {}", message);
                return HistoricalPerformance::Error { message };
            }
        }
    }
    blocks.push(latest.clone());

    let stats = compute_stats(&blocks, window);
    info!(
        "📊 History {}..={}: {:.2}s/block, {:.2} TPS",
        stats.start_block, stats.end_block, stats.average_block_time_seconds, stats.estimated_tps
    );
    HistoricalPerformance::Available(stats)
}

/// Aggregate an oldest-first, non-empty window of blocks
pub fn compute_stats(blocks: &[RpcBlock], window: u64) -> HistoricalStats {
    let oldest = &blocks[0];
    let newest = &blocks[blocks.len() - 1];
    let count = blocks.len() as f64;

    let average_block_time_seconds =
        newest.timestamp().saturating_sub(oldest.timestamp()) as f64 / window as f64;

    let tx_counts: Vec<usize> = blocks.iter().map(RpcBlock::tx_count).collect();
    let average_tx_per_block = tx_counts.iter().sum::<usize>() as f64 / count;

    let estimated_tps = if average_block_time_seconds > 0.0 {
        average_tx_per_block / average_block_time_seconds
    } else {
        0.0
    };

    let gas_percents: Vec<f64> = blocks
        .iter()
        .map(|b| gas_used_percent(b.gas_used(), b.gas_limit()))
        .collect();

    let sizes: Vec<u64> = blocks.iter().filter_map(RpcBlock::size).collect();

    HistoricalStats {
        start_block: oldest.number(),
        end_block: newest.number(),
        blocks_analyzed: blocks.len() as u64,
        average_block_time_seconds,
        average_tx_per_block,
        estimated_tps,
        average_gas_used_percent: gas_percents.iter().sum::<f64>() / count,
        min_gas_used_percent: gas_percents.iter().copied().fold(f64::INFINITY, f64::min),
        max_gas_used_percent: gas_percents.iter().copied().fold(0.0, f64::max),
        min_tx_count: tx_counts.iter().copied().min().unwrap_or(0),
        max_tx_count: tx_counts.iter().copied().max().unwrap_or(0),
        min_block_size_bytes: sizes.iter().copied().min().into(),
        max_block_size_bytes: sizes.iter().copied().max().into(),
    }
}
