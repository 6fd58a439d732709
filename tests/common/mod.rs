//! Mock JSON-RPC node and Telegram Bot API shared by the integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const ARBITRUM_NOVA_CHAIN_ID: u64 = 42170;
pub const SEQUENCER: &str = "0x00000000000000000000000000000000000000a4";
pub const ONE_ETH_WEI: u128 = 1_000_000_000_000_000_000;

/// Shape of the chain the mock node serves
#[derive(Debug, Clone)]
pub struct ChainFixture {
    pub latest: u64,
    pub txs_per_block: u64,
    pub block_time_secs: u64,
    /// How old the latest block is when the snapshot runs
    pub latest_age_secs: u64,
    pub sequencer_balance_wei: u128,
    pub syncing: bool,
    /// `eth_getBlockByNumber("latest")` answers `null`
    pub latest_missing: bool,
}

impl Default for ChainFixture {
    fn default() -> Self {
        Self {
            latest: 100,
            txs_per_block: 2,
            block_time_secs: 2,
            latest_age_secs: 5,
            sequencer_balance_wei: 10 * ONE_ETH_WEI,
            syncing: false,
            latest_missing: false,
        }
    }
}

fn hex(n: u128) -> String {
    format!("0x{:x}", n)
}

/// Hash encodes its own position: high half block, low half index
pub fn tx_hash(block: u64, index: u64) -> String {
    format!("0x{:032x}{:032x}", block, index)
}

fn decode_tx_hash(hash: &str) -> Option<(u64, u64)> {
    let raw = hash.strip_prefix("0x")?;
    if raw.len() != 64 {
        return None;
    }
    let block = u64::from_str_radix(&raw[..32], 16).ok()?;
    let index = u64::from_str_radix(&raw[32..], 16).ok()?;
    Some((block, index))
}

impl ChainFixture {
    fn latest_timestamp(&self) -> u64 {
        chrono::Utc::now().timestamp() as u64 - self.latest_age_secs
    }

    fn block(&self, number: u64) -> Value {
        let timestamp = self.latest_timestamp() - (self.latest - number) * self.block_time_secs;
        let txs: Vec<String> = if number == 0 {
            Vec::new()
        } else {
            (0..self.txs_per_block).map(|i| tx_hash(number, i)).collect()
        };
        json!({
            "number": hex(number as u128),
            "hash": format!("0x{:064x}", number + 0xb10c),
            "timestamp": hex(timestamp as u128),
            "gasUsed": hex(21_000 * txs.len() as u128),
            "gasLimit": hex(30_000_000),
            "size": hex(1_000 + 100 * txs.len() as u128),
            "baseFeePerGas": hex(100_000_000),
            "miner": SEQUENCER,
            "transactions": txs,
        })
    }

    fn block_by_param(&self, tag: &Value) -> Value {
        match tag.as_str() {
            Some("latest") if self.latest_missing => Value::Null,
            Some("latest") => self.block(self.latest),
            Some(raw) => match u64::from_str_radix(raw.trim_start_matches("0x"), 16) {
                Ok(n) if n <= self.latest => self.block(n),
                _ => Value::Null,
            },
            None => Value::Null,
        }
    }

    fn transaction(&self, hash: &str) -> Value {
        match decode_tx_hash(hash) {
            Some((block, _)) if block <= self.latest => json!({
                "hash": hash,
                "blockNumber": hex(block as u128),
                "from": "0x1111111111111111111111111111111111111111",
                "to": "0x2222222222222222222222222222222222222222",
                "value": hex(ONE_ETH_WEI),
                "gasPrice": hex(1_000_000_000),
                "input": "0x",
            }),
            _ => Value::Null,
        }
    }

    fn receipt(&self, hash: &str) -> Value {
        match decode_tx_hash(hash) {
            Some((block, _)) if block <= self.latest => json!({
                "status": "0x1",
                "gasUsed": hex(21_000),
                "effectiveGasPrice": hex(1_000_000_000),
            }),
            _ => Value::Null,
        }
    }

    fn syncing(&self) -> Value {
        if self.syncing {
            json!({
                "startingBlock": "0x0",
                "currentBlock": hex(self.latest as u128),
                "highestBlock": hex(self.latest as u128 * 2),
            })
        } else {
            json!(false)
        }
    }

    /// Answer one JSON-RPC request the way a Nitro node would
    pub fn respond(&self, request: &Value) -> Value {
        let id = request.get("id").cloned().unwrap_or(json!(1));
        let params = request.get("params").cloned().unwrap_or(json!([]));
        let first = params.get(0).cloned().unwrap_or(Value::Null);

        let result = match request.get("method").and_then(Value::as_str) {
            Some("eth_chainId") => json!(hex(ARBITRUM_NOVA_CHAIN_ID as u128)),
            Some("web3_clientVersion") => json!("nitro/v3.1.0"),
            Some("eth_getBlockByNumber") => self.block_by_param(&first),
            Some("eth_getTransactionByHash") => self.transaction(first.as_str().unwrap_or_default()),
            Some("eth_getTransactionReceipt") => self.receipt(first.as_str().unwrap_or_default()),
            Some("eth_getBalance") => json!(hex(self.sequencer_balance_wei)),
            Some("eth_gasPrice") => json!(hex(100_000_000)),
            Some("net_peerCount") => json!("0x0"),
            Some("eth_syncing") => self.syncing(),
            other => {
                return json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32601, "message": format!("method {:?} not found", other) },
                })
            }
        };

        json!({ "jsonrpc": "2.0", "id": id, "result": result })
    }
}

/// Start a JSON-RPC node serving `fixture`
pub async fn mock_node(fixture: ChainFixture) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(move |request: &Request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
            ResponseTemplate::new(200).set_body_json(fixture.respond(&body))
        })
        .mount(&server)
        .await;
    server
}

/// Start a Bot API stand-in answering every `sendMessage` with `status`
pub async fn mock_telegram(status: u16) -> MockServer {
    let server = MockServer::start().await;
    let body = if status == 200 {
        json!({ "ok": true, "result": { "message_id": 1 } })
    } else {
        json!({ "ok": false, "error_code": status, "description": "Bad Request: chat not found" })
    };
    Mock::given(method("POST"))
        .and(path_regex(r"^/bot[^/]+/sendMessage$"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    server
}

/// Bodies of every `sendMessage` call the stand-in received
pub async fn sent_messages(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| serde_json::from_slice(&r.body).ok())
        .collect()
}
