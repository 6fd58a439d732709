//! Transaction Enricher
//!
//! Turns a transaction hash into an `EnrichedTransaction` by joining the
//! transaction with its receipt. A transaction that cannot be enriched is
//! skipped, never reported half-filled.

use alloy_primitives::{B256, U256};
use tracing::{debug, warn};

use crate::models::errors::AppResult;
use crate::models::types::{EnrichedTransaction, TxStatus, TxType};
use crate::providers::rpc::ChainRpc;
use crate::providers::types::{RpcReceipt, RpcTransaction};
use crate::utils::units::{wei_to_eth, wei_to_gwei};

/// Enrich one transaction; `None` means skip.
///
/// `block_number` is used when the transaction itself does not carry one.
pub async fn enrich_transaction<P: ChainRpc>(
    rpc: &P,
    hash: B256,
    block_number: u64,
) -> Option<EnrichedTransaction> {
    match try_enrich(rpc, hash, block_number).await {
        Ok(enriched) => enriched,
        Err(e) => {
            warn!("⚠️ Skipping tx {}: {}", hash, e);
            None
        }
    }
}

async fn try_enrich<P: ChainRpc>(
    rpc: &P,
    hash: B256,
    block_number: u64,
) -> AppResult<Option<EnrichedTransaction>> {
    let (tx, receipt) = tokio::join!(rpc.transaction_by_hash(hash), rpc.transaction_receipt(hash));

    let Some(tx) = tx? else {
        debug!("Transaction {} not found, skipping", hash);
        return Ok(None);
    };
    let Some(receipt) = receipt? else {
        debug!("Receipt for {} not found, skipping", hash);
        return Ok(None);
    };

    let enriched = build_enriched(&tx, &receipt, block_number);
    if enriched.is_none() {
        debug!("No gas price for {}, skipping", hash);
    }
    Ok(enriched)
}

/// Pure join of a transaction and its receipt
pub fn build_enriched(
    tx: &RpcTransaction,
    receipt: &RpcReceipt,
    block_number: u64,
) -> Option<EnrichedTransaction> {
    let price = receipt.effective_gas_price.or(tx.gas_price)?;
    let gas_used = receipt.gas_used.to::<u64>();
    let fee_wei = U256::from(gas_used).saturating_mul(price);

    Some(EnrichedTransaction {
        hash: tx.hash,
        block_number: tx.block_number.map(|n| n.to::<u64>()).unwrap_or(block_number),
        from: tx.from,
        to: tx.to,
        value_eth: wei_to_eth(tx.value),
        status: if receipt.succeeded() {
            TxStatus::Success
        } else {
            TxStatus::Failed
        },
        gas_used,
        gas_price_gwei: wei_to_gwei(price),
        transaction_fee_eth: wei_to_eth(fee_wei),
        tx_type: TxType::classify(tx.to, tx.input.len()),
    })
}
