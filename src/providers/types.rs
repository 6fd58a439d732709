//! JSON-RPC wire types
//!
//! Only the fields the health engine reads. Quantities arrive as `0x` hex
//! strings and decode straight into alloy primitives.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::Deserialize;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::SyncState;

/// `eth_getBlockByNumber(tag, false)` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    pub number: U64,
    pub hash: B256,
    pub timestamp: U64,
    pub gas_used: U64,
    pub gas_limit: U64,
    #[serde(default)]
    pub size: Option<U64>,
    #[serde(default)]
    pub base_fee_per_gas: Option<U256>,
    /// Kept raw: some rollups put non-address values here
    #[serde(default)]
    pub miner: Option<String>,
    /// Hashes in block order
    #[serde(default)]
    pub transactions: Vec<B256>,
}

impl RpcBlock {
    pub fn number(&self) -> u64 {
        self.number.to::<u64>()
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp.to::<u64>()
    }

    pub fn gas_used(&self) -> u64 {
        self.gas_used.to::<u64>()
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit.to::<u64>()
    }

    pub fn size(&self) -> Option<u64> {
        self.size.map(|s| s.to::<u64>())
    }

    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Miner field as an address, if it is one
    pub fn miner_address(&self) -> Option<Address> {
        self.miner.as_deref().and_then(|m| m.parse::<Address>().ok())
    }
}

/// `eth_getTransactionByHash` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    pub value: U256,
    #[serde(default)]
    pub gas_price: Option<U256>,
    #[serde(default, alias = "data")]
    pub input: Bytes,
}

/// `eth_getTransactionReceipt` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    /// Absent on pre-Byzantium receipts
    #[serde(default)]
    pub status: Option<U64>,
    pub gas_used: U64,
    #[serde(default)]
    pub effective_gas_price: Option<U256>,
}

impl RpcReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map(|s| s == U64::from(1)) == Some(true)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcSyncProgress {
    starting_block: U64,
    current_block: U64,
    highest_block: U64,
}

/// Decode `eth_syncing`: `false`, or a progress object
pub fn parse_sync_state(value: serde_json::Value) -> AppResult<SyncState> {
    match value {
        serde_json::Value::Bool(false) => Ok(SyncState::NotSyncing),
        serde_json::Value::Object(_) => {
            let progress: RpcSyncProgress = serde_json::from_value(value)?;
            Ok(SyncState::Syncing {
                starting: progress.starting_block.to::<u64>(),
                current: progress.current_block.to::<u64>(),
                highest: progress.highest_block.to::<u64>(),
            })
        }
        other => Err(AppError::invalid_response(format!(
            "Unexpected eth_syncing result: {}",
            other
        ))),
    }
}
