//! Recent-Transaction Scanner
//!
//! Walks backward from the latest block collecting enriched transactions,
//! newest first, until the target count is reached or the scan budget runs
//! out. Enrichment inside a block runs in ordered chunks so the result is the
//! same as enriching one hash at a time.

use alloy_rpc_types::BlockNumberOrTag;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::core::enricher::enrich_transaction;
use crate::models::types::EnrichedTransaction;
use crate::providers::rpc::ChainRpc;
use crate::providers::types::RpcBlock;

/// Scan limits for one run
#[derive(Debug, Clone, Copy)]
pub struct ScanLimits {
    /// Stop once this many transactions are collected
    pub target: usize,
    /// Blocks examined at most, failed blocks included
    pub max_blocks: u64,
    /// In-flight enrichments per chunk
    pub max_concurrent: usize,
}

pub async fn scan_recent_transactions<P: ChainRpc>(
    rpc: &P,
    latest: &RpcBlock,
    limits: ScanLimits,
) -> Vec<EnrichedTransaction> {
    let mut collected = Vec::with_capacity(limits.target);
    if limits.target == 0 {
        return collected;
    }

    let latest_number = latest.number();
    let mut scanned = 0u64;

    for offset in 0..limits.max_blocks {
        let Some(number) = latest_number.checked_sub(offset) else {
            break;
        };
        scanned += 1;

        let fetched;
        let block = if offset == 0 {
            latest
        } else {
            match rpc.block_by_number(BlockNumberOrTag::Number(number)).await {
                Ok(Some(block)) => {
                    fetched = block;
                    &fetched
                }
                Ok(None) => {
                    warn!("⚠️ Block {} not found, skipping", number);
                    continue;
                }
                Err(e) => {
                    warn!("⚠️ Failed to load block {}: {}", number, e);
                    continue;
                }
            }
        };

        collect_from_block(rpc, block, &mut collected, limits).await;
        if collected.len() >= limits.target {
            break;
        }
    }

    info!(
        "🧾 Collected {} transactions from {} blocks",
        collected.len(),
        scanned
    );
    collected
}

/// Enrich a block's transactions in reverse index order
async fn collect_from_block<P: ChainRpc>(
    rpc: &P,
    block: &RpcBlock,
    collected: &mut Vec<EnrichedTransaction>,
    limits: ScanLimits,
) {
    let number = block.number();
    let mut pending = block.transactions.iter().rev().copied().peekable();

    while pending.peek().is_some() && collected.len() < limits.target {
        let needed = limits.target - collected.len();
        let chunk: Vec<_> = pending
            .by_ref()
            .take(needed.min(limits.max_concurrent.max(1)))
            .collect();

        let results = join_all(
            chunk
                .iter()
                .map(|hash| enrich_transaction(rpc, *hash, number)),
        )
        .await;

        let before = collected.len();
        collected.extend(results.into_iter().flatten());
        debug!(
            "Block {}: {} of {} enriched",
            number,
            collected.len() - before,
            chunk.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{tx_hash, FakeChain};

    fn limits(target: usize, max_blocks: u64) -> ScanLimits {
        ScanLimits {
            target,
            max_blocks,
            max_concurrent: 4,
        }
    }

    #[tokio::test]
    async fn test_newest_first_and_stops_at_target() {
        let chain = FakeChain::build(100, 3, 2);
        let txs = scan_recent_transactions(&chain, &chain.latest_block(), limits(20, 50)).await;

        assert_eq!(txs.len(), 20);
        assert_eq!(txs[0].hash, tx_hash(100, 2));
        assert_eq!(txs[1].hash, tx_hash(100, 1));
        assert_eq!(txs[3].hash, tx_hash(99, 2));
        assert_eq!(txs[19].hash, tx_hash(94, 1));
        assert!(txs.windows(2).all(|w| w[0].block_number >= w[1].block_number));
        // 100 reused, 99..=94 fetched
        assert_eq!(chain.block_request_count(), 6);
        // no enrichment past the target
        assert_eq!(chain.tx_request_count(), 20);
    }

    #[tokio::test]
    async fn test_block_cap_limits_result() {
        let chain = FakeChain::build(100, 1, 2);
        let txs = scan_recent_transactions(&chain, &chain.latest_block(), limits(20, 5)).await;
        assert_eq!(txs.len(), 5);
    }

    #[tokio::test]
    async fn test_stops_at_genesis() {
        let chain = FakeChain::build(3, 2, 2);
        let txs = scan_recent_transactions(&chain, &chain.latest_block(), limits(20, 50)).await;
        // blocks 3, 2, 1, 0
        assert_eq!(txs.len(), 8);
        assert_eq!(txs.last().map(|t| t.block_number), Some(0));
    }

    #[tokio::test]
    async fn test_skips_do_not_count_toward_target() {
        let mut chain = FakeChain::build(10, 2, 2);
        chain.receipts.remove(&tx_hash(10, 1));
        let txs = scan_recent_transactions(&chain, &chain.latest_block(), limits(3, 50)).await;

        assert_eq!(txs.len(), 3);
        assert_eq!(txs[0].hash, tx_hash(10, 0));
        assert_eq!(txs[1].hash, tx_hash(9, 1));
        assert_eq!(txs[2].hash, tx_hash(9, 0));
    }

    #[tokio::test]
    async fn test_failed_block_consumes_budget() {
        let mut chain = FakeChain::build(10, 1, 2);
        chain.failing_blocks.insert(9);
        chain.blocks.remove(&8);
        let txs = scan_recent_transactions(&chain, &chain.latest_block(), limits(20, 4)).await;

        let numbers: Vec<u64> = txs.iter().map(|t| t.block_number).collect();
        assert_eq!(numbers, vec![10, 7]);
    }

    #[tokio::test]
    async fn test_chunked_matches_sequential() {
        let mut chain = FakeChain::build(5, 9, 2);
        chain.receipts.remove(&tx_hash(5, 7));
        chain.failing_txs.insert(tx_hash(5, 3));

        let sequential = scan_recent_transactions(
            &chain,
            &chain.latest_block(),
            ScanLimits {
                target: 6,
                max_blocks: 50,
                max_concurrent: 1,
            },
        )
        .await;
        let chunked = scan_recent_transactions(
            &chain,
            &chain.latest_block(),
            ScanLimits {
                target: 6,
                max_blocks: 50,
                max_concurrent: 8,
            },
        )
        .await;

        assert_eq!(sequential, chunked);
        let indices: Vec<_> = chunked.iter().map(|t| t.hash).collect();
        assert_eq!(
            indices,
            vec![
                tx_hash(5, 8),
                tx_hash(5, 6),
                tx_hash(5, 5),
                tx_hash(5, 4),
                tx_hash(5, 2),
                tx_hash(5, 1)
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_target_scans_nothing() {
        let chain = FakeChain::build(10, 1, 2);
        let txs = scan_recent_transactions(&chain, &chain.latest_block(), limits(0, 50)).await;
        assert!(txs.is_empty());
        assert_eq!(chain.block_request_count(), 0);
    }
}
