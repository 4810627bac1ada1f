use serde::{Deserialize, Serialize};

/// Polygon PoS gas station (mainnet).
pub const POLYGON_GAS_STATION_URL: &str = "https://gasstation-mainnet.matic.network";

/// Polygon gas station for the public testnet.
pub const POLYGON_TESTNET_GAS_STATION_URL: &str = "https://gasstation-mumbai.matic.today";

/// The EIP-155 chain a transaction authorization is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainContext {
    chain_id: u64,
}

impl ChainContext {
    pub const fn new(chain_id: u64) -> Self {
        Self { chain_id }
    }

    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The network definition for this chain id, if it is a known one.
    pub fn network(&self) -> Option<&'static EvmChain> {
        get_chain(self.chain_id)
    }
}

impl From<u64> for ChainContext {
    fn from(chain_id: u64) -> Self {
        Self::new(chain_id)
    }
}

/// Definition of an EVM-compatible blockchain network.
#[derive(Debug, Clone, Serialize)]
pub struct EvmChain {
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    /// Fee-estimation service for this network, where one is published.
    pub gas_station_url: Option<&'static str>,
    pub is_testnet: bool,
}

impl EvmChain {
    pub const fn context(&self) -> ChainContext {
        ChainContext::new(self.chain_id)
    }
}

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: EvmChain = EvmChain {
    chain_id: 1,
    name: "Ethereum",
    symbol: "ETH",
    gas_station_url: None,
    is_testnet: false,
};

/// Polygon PoS (chain ID 137).
pub const POLYGON: EvmChain = EvmChain {
    chain_id: 137,
    name: "Polygon",
    symbol: "MATIC",
    gas_station_url: Some(POLYGON_GAS_STATION_URL),
    is_testnet: false,
};

/// Polygon Mumbai Testnet (chain ID 80001).
pub const POLYGON_MUMBAI: EvmChain = EvmChain {
    chain_id: 80001,
    name: "Polygon Mumbai",
    symbol: "MATIC",
    gas_station_url: Some(POLYGON_TESTNET_GAS_STATION_URL),
    is_testnet: true,
};

/// Sepolia Testnet (chain ID 11155111).
pub const SEPOLIA: EvmChain = EvmChain {
    chain_id: 11155111,
    name: "Sepolia",
    symbol: "ETH",
    gas_station_url: None,
    is_testnet: true,
};

const ALL_CHAINS: &[&EvmChain] = &[&ETHEREUM, &POLYGON, &POLYGON_MUMBAI, &SEPOLIA];

/// Returns the chain definition for a given chain ID, or `None` if unknown.
pub fn get_chain(chain_id: u64) -> Option<&'static EvmChain> {
    ALL_CHAINS.iter().find(|c| c.chain_id == chain_id).copied()
}

/// Returns all known EVM chain definitions.
pub fn supported_chains() -> Vec<&'static EvmChain> {
    ALL_CHAINS.to_vec()
}
