//! Unit conversion helpers
//!
//! Scaling between wei, gwei and ether is done on exact decimal strings
//! (`format_units` / `parse_units`); the float is produced last, for display.

use alloy_primitives::utils::{format_units, parse_units};
use alloy_primitives::U256;

/// Convert wei to ETH (or native token)
#[inline]
pub fn wei_to_eth(wei: U256) -> f64 {
    scale_down(wei, "ether")
}

/// Convert wei to gwei
#[inline]
pub fn wei_to_gwei(wei: U256) -> f64 {
    scale_down(wei, "gwei")
}

/// Convert ETH to wei. Non-finite or negative input yields zero.
pub fn eth_to_wei(eth: f64) -> U256 {
    if !eth.is_finite() || eth < 0.0 {
        return U256::ZERO;
    }
    parse_units(&eth.to_string(), "ether")
        .map(Into::into)
        .unwrap_or(U256::ZERO)
}

/// Exact ether amount as a decimal string (18 fractional digits)
pub fn format_eth_exact(wei: U256) -> String {
    format_units(wei, "ether").unwrap_or_else(|_| "0".to_string())
}

/// Gas-used share of a block in percent; 0 when the limit is 0
#[inline]
pub fn gas_used_percent(gas_used: u64, gas_limit: u64) -> f64 {
    if gas_limit == 0 {
        return 0.0;
    }
    gas_used as f64 / gas_limit as f64 * 100.0
}

fn scale_down(amount: U256, unit: &str) -> f64 {
    format_units(amount, unit)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wei_to_eth() {
        let one_eth = U256::from(1_000_000_000_000_000_000u128);
        assert!((wei_to_eth(one_eth) - 1.0).abs() < 1e-12);
        assert_eq!(wei_to_eth(U256::ZERO), 0.0);
    }

    #[test]
    fn test_wei_to_gwei() {
        let gwei = U256::from(1_500_000_000u64);
        assert!((wei_to_gwei(gwei) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_eth_to_wei() {
        assert_eq!(eth_to_wei(0.99), U256::from(990_000_000_000_000_000u128));
        assert_eq!(eth_to_wei(-1.0), U256::ZERO);
        assert_eq!(eth_to_wei(f64::NAN), U256::ZERO);
    }

    #[test]
    fn test_exact_formatting_keeps_all_digits() {
        let wei = U256::from(1_000_000_000_000_000_001u128);
        assert_eq!(format_eth_exact(wei), "1.000000000000000001");
    }

    #[test]
    fn test_balance_beyond_u128_still_converts() {
        let huge = U256::from(u128::MAX) * U256::from(10u8);
        assert!(wei_to_eth(huge) > 3.0e21);
    }

    #[test]
    fn test_gas_used_percent_zero_limit() {
        assert_eq!(gas_used_percent(1_000, 0), 0.0);
        assert_eq!(gas_used_percent(0, 0), 0.0);
        assert!((gas_used_percent(15_000_000, 30_000_000) - 50.0).abs() < 1e-9);
    }
}
