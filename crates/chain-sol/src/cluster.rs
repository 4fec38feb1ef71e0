//! Solana clusters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SolError;

const EXPLORER_BASE: &str = "https://explorer.solana.com";

/// A public Solana cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolanaCluster {
    MainnetBeta,
    Devnet,
    Testnet,
}

impl SolanaCluster {
    pub const ALL: [SolanaCluster; 3] = [
        SolanaCluster::MainnetBeta,
        SolanaCluster::Devnet,
        SolanaCluster::Testnet,
    ];

    /// Cluster moniker as used by RPC providers and wallets.
    pub fn name(&self) -> &'static str {
        match self {
            SolanaCluster::MainnetBeta => "mainnet-beta",
            SolanaCluster::Devnet => "devnet",
            SolanaCluster::Testnet => "testnet",
        }
    }

    pub fn is_testnet(&self) -> bool {
        !matches!(self, SolanaCluster::MainnetBeta)
    }

    /// Base58 hash of the cluster's genesis block.
    pub fn genesis_hash(&self) -> &'static str {
        match self {
            SolanaCluster::MainnetBeta => "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdpKuc147dw2N9d",
            SolanaCluster::Devnet => "EtWTRABZaYq6iMfeYKouRu166VU2xqa1wcaWoxPkrZBG",
            SolanaCluster::Testnet => "4uhcVJyU9pJkvQyS88uRDiswHXSCkY3zQawwpjk2NsNY",
        }
    }

    /// Identifies the cluster from a `getGenesisHash` result.
    pub fn from_genesis_hash(hash: &str) -> Option<Self> {
        let hash = hash.trim();
        Self::ALL.into_iter().find(|c| c.genesis_hash() == hash)
    }

    pub fn from_name(name: &str) -> Result<Self, SolError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mainnet-beta" | "mainnet" => Ok(SolanaCluster::MainnetBeta),
            "devnet" => Ok(SolanaCluster::Devnet),
            "testnet" => Ok(SolanaCluster::Testnet),
            other => Err(SolError::InvalidArgument(format!("unknown cluster: {other}"))),
        }
    }

    pub fn address_url(&self, address: &str) -> String {
        format!("{EXPLORER_BASE}/address/{address}{}", self.query())
    }

    pub fn tx_url(&self, signature: &str) -> String {
        format!("{EXPLORER_BASE}/tx/{signature}{}", self.query())
    }

    fn query(&self) -> String {
        match self {
            SolanaCluster::MainnetBeta => String::new(),
            other => format!("?cluster={}", other.name()),
        }
    }
}

impl fmt::Display for SolanaCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_hashes_identify_clusters() {
        for cluster in SolanaCluster::ALL {
            assert_eq!(
                SolanaCluster::from_genesis_hash(cluster.genesis_hash()),
                Some(cluster)
            );
        }
    }

    #[test]
    fn genesis_hashes_are_32_bytes() {
        for cluster in SolanaCluster::ALL {
            let bytes = bs58::decode(cluster.genesis_hash()).into_vec().unwrap();
            assert_eq!(bytes.len(), 32);
        }
    }

    #[test]
    fn unknown_genesis_hash_is_none() {
        assert_eq!(
            SolanaCluster::from_genesis_hash("11111111111111111111111111111111"),
            None
        );
    }

    #[test]
    fn names_parse_back() {
        for cluster in SolanaCluster::ALL {
            assert_eq!(SolanaCluster::from_name(cluster.name()).unwrap(), cluster);
        }
        assert_eq!(
            SolanaCluster::from_name("Mainnet").unwrap(),
            SolanaCluster::MainnetBeta
        );
        assert!(SolanaCluster::from_name("localnet").is_err());
    }

    #[test]
    fn explorer_links_carry_cluster_query() {
        assert_eq!(
            SolanaCluster::MainnetBeta.tx_url("sig"),
            "https://explorer.solana.com/tx/sig"
        );
        assert_eq!(
            SolanaCluster::Devnet.address_url("Mint111"),
            "https://explorer.solana.com/address/Mint111?cluster=devnet"
        );
    }

    #[test]
    fn serde_uses_monikers() {
        let json = serde_json::to_string(&SolanaCluster::MainnetBeta).unwrap();
        assert_eq!(json, "\"mainnet-beta\"");
        let back: SolanaCluster = serde_json::from_str("\"testnet\"").unwrap();
        assert_eq!(back, SolanaCluster::Testnet);
    }
}
