//! In-memory `ChainRpc` for unit tests

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use alloy_rpc_types::BlockNumberOrTag;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::SyncState;
use crate::providers::rpc::ChainRpc;
use crate::providers::types::{RpcBlock, RpcReceipt, RpcTransaction};
use crate::utils::units::eth_to_wei;

pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;
pub const GWEI: u64 = 1_000_000_000;

pub fn sequencer() -> Address {
    Address::repeat_byte(0xa4)
}

/// Deterministic hash for transaction `index` of block `block`
pub fn tx_hash(block: u64, index: u64) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[16..24].copy_from_slice(&block.to_be_bytes());
    bytes[24..].copy_from_slice(&(index + 1).to_be_bytes());
    B256::from(bytes)
}

pub struct FakeChain {
    pub chain_id: Option<u64>,
    pub client_version: Option<String>,
    pub latest: u64,
    pub blocks: HashMap<u64, RpcBlock>,
    pub failing_blocks: HashSet<u64>,
    pub transactions: HashMap<B256, RpcTransaction>,
    pub receipts: HashMap<B256, RpcReceipt>,
    pub failing_txs: HashSet<B256>,
    pub balances: HashMap<Address, U256>,
    pub balance_fails: bool,
    pub gas_price: Option<U256>,
    pub sync: Option<SyncState>,
    pub peers: Option<u64>,
    pub block_requests: AtomicUsize,
    pub tx_requests: AtomicUsize,
}

impl FakeChain {
    /// Blocks 0..=latest, `block_time` seconds apart, `txs_per_block` simple
    /// transfers each, 10 ETH on the sequencer
    pub fn build(latest: u64, txs_per_block: u64, block_time: u64) -> Self {
        let mut chain = Self {
            chain_id: Some(42170),
            client_version: Some("nitro/v3.1.0".to_string()),
            latest,
            blocks: HashMap::new(),
            failing_blocks: HashSet::new(),
            transactions: HashMap::new(),
            receipts: HashMap::new(),
            failing_txs: HashSet::new(),
            balances: HashMap::new(),
            balance_fails: false,
            gas_price: Some(U256::from(GWEI / 10)),
            sync: Some(SyncState::NotSyncing),
            peers: Some(0),
            block_requests: AtomicUsize::new(0),
            tx_requests: AtomicUsize::new(0),
        };
        chain
            .balances
            .insert(sequencer(), eth_to_wei(10.0));

        for number in 0..=latest {
            let hashes: Vec<B256> = (0..txs_per_block).map(|i| tx_hash(number, i)).collect();
            for hash in &hashes {
                chain.insert_transfer(*hash, number);
            }
            chain.blocks.insert(
                number,
                block(number, GENESIS_TIMESTAMP + number * block_time, hashes),
            );
        }
        chain
    }

    pub fn latest_timestamp(&self) -> u64 {
        self.blocks
            .get(&self.latest)
            .map(|b| b.timestamp())
            .unwrap_or(GENESIS_TIMESTAMP)
    }

    pub fn latest_block(&self) -> RpcBlock {
        self.blocks[&self.latest].clone()
    }

    pub fn insert_transfer(&mut self, hash: B256, block_number: u64) {
        self.transactions.insert(
            hash,
            RpcTransaction {
                hash,
                block_number: Some(U64::from(block_number)),
                from: Address::repeat_byte(0x01),
                to: Some(Address::repeat_byte(0x02)),
                value: eth_to_wei(1.0),
                gas_price: Some(U256::from(GWEI)),
                input: Bytes::new(),
            },
        );
        self.receipts.insert(
            hash,
            RpcReceipt {
                status: Some(U64::from(1)),
                gas_used: U64::from(21_000),
                effective_gas_price: Some(U256::from(GWEI)),
            },
        );
    }

    pub fn block_request_count(&self) -> usize {
        self.block_requests.load(Ordering::Relaxed)
    }

    pub fn tx_request_count(&self) -> usize {
        self.tx_requests.load(Ordering::Relaxed)
    }
}

pub fn block(number: u64, timestamp: u64, transactions: Vec<B256>) -> RpcBlock {
    RpcBlock {
        number: U64::from(number),
        hash: tx_hash(number, u64::MAX - 1),
        timestamp: U64::from(timestamp),
        gas_used: U64::from(21_000 * transactions.len() as u64),
        gas_limit: U64::from(30_000_000u64),
        size: Some(U64::from(1_000 + 100 * transactions.len() as u64)),
        base_fee_per_gas: Some(U256::from(GWEI / 10)),
        miner: Some(sequencer().to_string()),
        transactions,
    }
}

fn unavailable(what: &str) -> AppError {
    AppError::rpc_error(format!("fake node: {} unavailable", what))
}

impl ChainRpc for FakeChain {
    async fn chain_id(&self) -> AppResult<u64> {
        self.chain_id
            .ok_or_else(|| AppError::rpc_connection_failed("Connection failed"))
    }

    async fn client_version(&self) -> AppResult<String> {
        self.client_version
            .clone()
            .ok_or_else(|| unavailable("web3_clientVersion"))
    }

    async fn block_by_number(&self, block: BlockNumberOrTag) -> AppResult<Option<RpcBlock>> {
        self.block_requests.fetch_add(1, Ordering::Relaxed);
        let number = match block {
            BlockNumberOrTag::Latest => self.latest,
            BlockNumberOrTag::Number(n) => n,
            _ => return Err(unavailable("block tag")),
        };
        if self.failing_blocks.contains(&number) {
            return Err(unavailable("block"));
        }
        Ok(self.blocks.get(&number).cloned())
    }

    async fn transaction_by_hash(&self, hash: B256) -> AppResult<Option<RpcTransaction>> {
        self.tx_requests.fetch_add(1, Ordering::Relaxed);
        if self.failing_txs.contains(&hash) {
            return Err(unavailable("transaction"));
        }
        Ok(self.transactions.get(&hash).cloned())
    }

    async fn transaction_receipt(&self, hash: B256) -> AppResult<Option<RpcReceipt>> {
        Ok(self.receipts.get(&hash).cloned())
    }

    async fn balance(&self, address: Address) -> AppResult<U256> {
        if self.balance_fails {
            return Err(unavailable("eth_getBalance"));
        }
        Ok(self.balances.get(&address).copied().unwrap_or(U256::ZERO))
    }

    async fn gas_price(&self) -> AppResult<U256> {
        self.gas_price.ok_or_else(|| unavailable("eth_gasPrice"))
    }

    async fn sync_state(&self) -> AppResult<SyncState> {
        self.sync.ok_or_else(|| unavailable("eth_syncing"))
    }

    async fn peer_count(&self) -> AppResult<u64> {
        self.peers.ok_or_else(|| unavailable("net_peerCount"))
    }
}
