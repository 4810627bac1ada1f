use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::chains::ChainContext;

/// Gas limit applied when the caller does not supply one. Sized for a typical
/// contract call; a plain transfer needs only 21_000.
pub const DEFAULT_GAS_LIMIT: u64 = 1_000_000;

/// Wei per Gwei.
pub const WEI_PER_GWEI: f64 = 1e9;

/// A point-in-time fee quote taken from one gas-oracle response.
///
/// Fee values are in Gwei as reported by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasQuote {
    pub max_fee_per_gas: f64,
    pub max_priority_fee_per_gas: f64,
    pub estimated_base_fee: f64,
    pub block_number: u64,
    pub block_time: u64,
}

impl GasQuote {
    /// `max_fee_per_gas` in wei.
    pub fn max_fee_wei(&self) -> u128 {
        gwei_to_wei(self.max_fee_per_gas)
    }

    /// `max_priority_fee_per_gas` in wei.
    pub fn max_priority_fee_wei(&self) -> u128 {
        gwei_to_wei(self.max_priority_fee_per_gas)
    }

    /// Whether the fee cap covers the priority fee, as EIP-1559 requires.
    pub fn is_ordered(&self) -> bool {
        self.max_fee_per_gas >= self.max_priority_fee_per_gas
    }
}

/// Converts a decimal Gwei amount to wei, truncating toward zero.
///
/// Negative and NaN inputs become 0; values past `u128::MAX` saturate.
pub fn gwei_to_wei(gwei: f64) -> u128 {
    (gwei * WEI_PER_GWEI) as u128
}

/// The fully parameterized, not-yet-signed context of an EIP-1559
/// transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAuthorization {
    pub nonce: u64,
    /// Maximum total fee per gas, in wei.
    pub gas_fee_cap: u128,
    /// Maximum priority fee per gas, in wei.
    pub gas_tip_cap: u128,
    pub gas_limit: u64,
    pub chain_id: u64,
    pub sender: Address,
}

impl TransactionAuthorization {
    /// Assembles an authorization from a nonce and a fee quote taken for the
    /// same request.
    pub fn from_quote(
        nonce: u64,
        quote: &GasQuote,
        gas_limit: u64,
        chain: ChainContext,
        sender: Address,
    ) -> Self {
        Self {
            nonce,
            gas_fee_cap: quote.max_fee_wei(),
            gas_tip_cap: quote.max_priority_fee_wei(),
            gas_limit,
            chain_id: chain.chain_id(),
            sender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENDER: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

    fn quote(max_fee: f64, priority: f64) -> GasQuote {
        GasQuote {
            max_fee_per_gas: max_fee,
            max_priority_fee_per_gas: priority,
            estimated_base_fee: 90.0,
            block_number: 41_000_000,
            block_time: 2,
        }
    }

    #[test]
    fn gwei_conversion_truncates() {
        assert_eq!(gwei_to_wei(120.5), 120_500_000_000);
        assert_eq!(gwei_to_wei(30.25), 30_250_000_000);
        assert_eq!(gwei_to_wei(1.0000000019), 1_000_000_001);
        assert_eq!(gwei_to_wei(0.0), 0);
    }

    #[test]
    fn gwei_conversion_handles_degenerate_input() {
        assert_eq!(gwei_to_wei(-5.0), 0);
        assert_eq!(gwei_to_wei(f64::NAN), 0);
        assert_eq!(gwei_to_wei(f64::INFINITY), u128::MAX);
    }

    #[test]
    fn from_quote_converts_fast_tier() {
        let sender: Address = SENDER.parse().unwrap();
        let auth = TransactionAuthorization::from_quote(
            7,
            &quote(120.5, 30.25),
            DEFAULT_GAS_LIMIT,
            ChainContext::new(137),
            sender,
        );

        assert_eq!(auth.nonce, 7);
        assert_eq!(auth.gas_fee_cap, 120_500_000_000);
        assert_eq!(auth.gas_tip_cap, 30_250_000_000);
        assert_eq!(auth.gas_limit, 1_000_000);
        assert_eq!(auth.chain_id, 137);
        assert_eq!(auth.sender, sender);
    }

    #[test]
    fn quote_ordering() {
        assert!(quote(120.5, 30.25).is_ordered());
        assert!(quote(30.0, 30.0).is_ordered());
        assert!(!quote(10.0, 30.0).is_ordered());
    }

    #[test]
    fn authorization_serializes_checksummed_sender() {
        let sender: Address = SENDER.to_lowercase().parse().unwrap();
        let auth = TransactionAuthorization::from_quote(
            0,
            &quote(1.0, 1.0),
            21_000,
            ChainContext::new(1),
            sender,
        );
        let json = serde_json::to_value(auth).unwrap();
        assert_eq!(json["sender"], SENDER);
        assert_eq!(json["gas_limit"], 21_000);
    }
}
