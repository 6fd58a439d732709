//! Configuration module for L3 Vitals
//!
//! Defaults come from utils/constants.rs; environment variables override them.
//! Every override is validated, bad input is a `ConfigInvalidValue` error
//! rather than a silent fallback.

use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    BLOCK_PRODUCTION_THRESHOLD_SECONDS, CRITICAL_BALANCE_ETH, DEFAULT_API_CONCURRENCY,
    DEFAULT_API_HOST, DEFAULT_API_PORT, DEFAULT_MAX_CONCURRENT_REQUESTS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_RPC_URL,
    MAX_BLOCKS_TO_SCAN_FOR_TXS, MAX_RPC_TIMEOUT_SECS, MIN_TRANSACTIONS_TO_FETCH,
    NUM_BLOCKS_FOR_AVERAGES,
};

/// Telegram credentials for alert delivery
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

// Token is never printed.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<hidden>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Policy and resource limits for one snapshot
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Endpoint used when the caller does not supply one
    pub default_rpc_url: String,
    /// Latest block older than this raises an alert
    pub block_production_threshold_secs: u64,
    /// Sequencer balance below this raises an alert
    pub critical_balance_eth: f64,
    /// History window size
    pub num_blocks_for_averages: u64,
    /// Target size of the transaction feed
    pub min_transactions_to_fetch: usize,
    /// Scan budget for the transaction feed
    pub max_blocks_to_scan_for_txs: u64,
    /// Per-request RPC timeout
    pub rpc_timeout: Duration,
    /// Bound on in-flight RPC calls during fan-out
    pub max_concurrent_requests: usize,
    /// Optional alert delivery
    pub telegram: Option<TelegramConfig>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            default_rpc_url: DEFAULT_RPC_URL.to_string(),
            block_production_threshold_secs: BLOCK_PRODUCTION_THRESHOLD_SECONDS,
            critical_balance_eth: CRITICAL_BALANCE_ETH,
            num_blocks_for_averages: NUM_BLOCKS_FOR_AVERAGES,
            min_transactions_to_fetch: MIN_TRANSACTIONS_TO_FETCH,
            max_blocks_to_scan_for_txs: MAX_BLOCKS_TO_SCAN_FOR_TXS,
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            telegram: None,
        }
    }
}

impl MonitorConfig {
    /// Load from the process environment
    pub fn from_env() -> AppResult<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        info!(
            "⚙️ Monitor config: rpc={} window={} feed={} scan_cap={} timeout={}s",
            config.default_rpc_url,
            config.num_blocks_for_averages,
            config.min_transactions_to_fetch,
            config.max_blocks_to_scan_for_txs,
            config.rpc_timeout.as_secs()
        );
        if config.telegram.is_some() {
            info!("🔑 Telegram alerts configured (token hidden)");
        }
        Ok(config)
    }

    /// Load from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let default_rpc_url = get("L3_RPC_URL").unwrap_or(defaults.default_rpc_url);

        let block_production_threshold_secs: u64 = parse_or(
            &get,
            "L3_BLOCK_PRODUCTION_THRESHOLD_SECS",
            defaults.block_production_threshold_secs,
        )?;
        // Must fit a signed chrono duration
        let representable = i64::try_from(block_production_threshold_secs)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .is_some();
        if !representable {
            return Err(AppError::invalid_config(
                "L3_BLOCK_PRODUCTION_THRESHOLD_SECS",
                &block_production_threshold_secs.to_string(),
            ));
        }

        let critical_balance_eth: f64 =
            parse_or(&get, "L3_CRITICAL_BALANCE_ETH", defaults.critical_balance_eth)?;
        if !critical_balance_eth.is_finite() || critical_balance_eth < 0.0 {
            return Err(AppError::invalid_config(
                "L3_CRITICAL_BALANCE_ETH",
                &critical_balance_eth.to_string(),
            ));
        }

        let num_blocks_for_averages: u64 = parse_or(
            &get,
            "L3_NUM_BLOCKS_FOR_AVERAGES",
            defaults.num_blocks_for_averages,
        )?;
        if num_blocks_for_averages < 2 {
            return Err(AppError::invalid_config(
                "L3_NUM_BLOCKS_FOR_AVERAGES",
                &num_blocks_for_averages.to_string(),
            ));
        }

        let min_transactions_to_fetch = parse_or(
            &get,
            "L3_MIN_TRANSACTIONS_TO_FETCH",
            defaults.min_transactions_to_fetch,
        )?;
        let max_blocks_to_scan_for_txs = parse_or(
            &get,
            "L3_MAX_BLOCKS_TO_SCAN_FOR_TXS",
            defaults.max_blocks_to_scan_for_txs,
        )?;

        let timeout_secs: u64 = parse_or(&get, "L3_RPC_TIMEOUT_SECS", DEFAULT_RPC_TIMEOUT_SECS)?;
        if !(1..=MAX_RPC_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(AppError::invalid_config(
                "L3_RPC_TIMEOUT_SECS",
                &timeout_secs.to_string(),
            ));
        }

        let max_concurrent_requests: usize = parse_or(
            &get,
            "L3_MAX_CONCURRENT_REQUESTS",
            defaults.max_concurrent_requests,
        )?;
        if max_concurrent_requests == 0 {
            return Err(AppError::invalid_config("L3_MAX_CONCURRENT_REQUESTS", "0"));
        }

        let telegram = match (get("TELEGRAM_BOT_TOKEN"), get("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => None,
        };

        Ok(Self {
            default_rpc_url,
            block_production_threshold_secs,
            critical_balance_eth,
            num_blocks_for_averages,
            min_transactions_to_fetch,
            max_blocks_to_scan_for_txs,
            rpc_timeout: Duration::from_secs(timeout_secs),
            max_concurrent_requests,
            telegram,
        })
    }
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Overall deadline for one API request
    pub request_timeout: Duration,
    /// Maximum requests served at once
    pub max_concurrency: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_API_HOST.to_string(),
            port: DEFAULT_API_PORT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_concurrency: DEFAULT_API_CONCURRENCY,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `PORT` (platform-provided) wins over `L3_VITALS_PORT`
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("L3_VITALS_HOST").unwrap_or(defaults.host);
        let port = match get("PORT").or_else(|| get("L3_VITALS_PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppError::invalid_config("PORT", &raw))?,
            None => defaults.port,
        };

        Ok(Self {
            host,
            port,
            ..defaults
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::invalid_config(key, &raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.default_rpc_url, "https://nova.arbitrum.io/rpc");
        assert_eq!(config.block_production_threshold_secs, 300);
        assert_eq!(config.critical_balance_eth, 1.0);
        assert_eq!(config.num_blocks_for_averages, 20);
        assert_eq!(config.min_transactions_to_fetch, 20);
        assert_eq!(config.max_blocks_to_scan_for_txs, 50);
        assert_eq!(config.rpc_timeout, Duration::from_secs(60));
        assert_eq!(config.max_concurrent_requests, 10);
        assert!(config.telegram.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = MonitorConfig::from_lookup(lookup_from(&[
            ("L3_RPC_URL", "http://localhost:8547"),
            ("L3_CRITICAL_BALANCE_ETH", "2.5"),
            ("L3_RPC_TIMEOUT_SECS", "15"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-100"),
        ]))
        .unwrap();

        assert_eq!(config.default_rpc_url, "http://localhost:8547");
        assert_eq!(config.critical_balance_eth, 2.5);
        assert_eq!(config.rpc_timeout, Duration::from_secs(15));
        let telegram = config.telegram.unwrap();
        assert_eq!(telegram.chat_id, "-100");
        assert!(!format!("{:?}", telegram).contains("123:abc"));
    }

    #[test]
    fn test_rejects_bad_values() {
        for (key, value) in [
            ("L3_RPC_TIMEOUT_SECS", "0"),
            ("L3_RPC_TIMEOUT_SECS", "61"),
            ("L3_NUM_BLOCKS_FOR_AVERAGES", "1"),
            ("L3_MAX_CONCURRENT_REQUESTS", "0"),
            ("L3_CRITICAL_BALANCE_ETH", "-1"),
            ("L3_MIN_TRANSACTIONS_TO_FETCH", "twenty"),
            ("L3_BLOCK_PRODUCTION_THRESHOLD_SECS", "18446744073709551615"),
            ("L3_BLOCK_PRODUCTION_THRESHOLD_SECS", "9223372036854775807"),
        ] {
            let err = MonitorConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();
            assert_eq!(err.code, ErrorCode::ConfigInvalidValue, "{}={}", key, value);
        }
    }

    #[test]
    fn test_partial_telegram_is_ignored() {
        let config =
            MonitorConfig::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", "123:abc")])).unwrap();
        assert!(config.telegram.is_none());
    }

    #[test]
    fn test_server_port_precedence() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("L3_VITALS_PORT", "7000"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");

        let config = ServerConfig::from_lookup(lookup_from(&[("L3_VITALS_PORT", "7000")])).unwrap();
        assert_eq!(config.port, 7000);

        assert!(ServerConfig::from_lookup(lookup_from(&[("PORT", "http")])).is_err());
    }
}
