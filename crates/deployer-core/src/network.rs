use std::fmt;

use chain_eth::chains::{self, EvmChain};
use chain_sol::SolanaCluster;
use serde::{Deserialize, Serialize};

/// Chain family a network belongs to. Decides which executor, signer
/// capability and validation limits apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Evm,
    Solana,
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFamily::Evm => f.write_str("EVM"),
            ChainFamily::Solana => f.write_str("Solana"),
        }
    }
}

/// Networks a token can be deployed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkId {
    Ethereum,
    Sepolia,
    Polygon,
    PolygonAmoy,
    Bsc,
    BscTestnet,
    Arbitrum,
    Base,
    Optimism,
    Avalanche,
    SolanaMainnet,
    SolanaDevnet,
    SolanaTestnet,
}

impl NetworkId {
    pub const ALL: [NetworkId; 13] = [
        NetworkId::Ethereum,
        NetworkId::Sepolia,
        NetworkId::Polygon,
        NetworkId::PolygonAmoy,
        NetworkId::Bsc,
        NetworkId::BscTestnet,
        NetworkId::Arbitrum,
        NetworkId::Base,
        NetworkId::Optimism,
        NetworkId::Avalanche,
        NetworkId::SolanaMainnet,
        NetworkId::SolanaDevnet,
        NetworkId::SolanaTestnet,
    ];

    pub fn family(&self) -> ChainFamily {
        match self {
            NetworkId::SolanaMainnet | NetworkId::SolanaDevnet | NetworkId::SolanaTestnet => {
                ChainFamily::Solana
            }
            _ => ChainFamily::Evm,
        }
    }

    /// Numeric EIP-155 chain id, for EVM networks.
    pub fn evm_chain_id(&self) -> Option<u64> {
        let id = match self {
            NetworkId::Ethereum => 1,
            NetworkId::Sepolia => 11155111,
            NetworkId::Polygon => 137,
            NetworkId::PolygonAmoy => 80002,
            NetworkId::Bsc => 56,
            NetworkId::BscTestnet => 97,
            NetworkId::Arbitrum => 42161,
            NetworkId::Base => 8453,
            NetworkId::Optimism => 10,
            NetworkId::Avalanche => 43114,
            NetworkId::SolanaMainnet | NetworkId::SolanaDevnet | NetworkId::SolanaTestnet => {
                return None
            }
        };
        Some(id)
    }

    pub fn evm_chain(&self) -> Option<&'static EvmChain> {
        self.evm_chain_id().and_then(chains::get_chain)
    }

    pub fn solana_cluster(&self) -> Option<SolanaCluster> {
        match self {
            NetworkId::SolanaMainnet => Some(SolanaCluster::MainnetBeta),
            NetworkId::SolanaDevnet => Some(SolanaCluster::Devnet),
            NetworkId::SolanaTestnet => Some(SolanaCluster::Testnet),
            _ => None,
        }
    }

    pub fn from_evm_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|n| n.evm_chain_id() == Some(chain_id))
    }

    pub fn from_solana_cluster(cluster: SolanaCluster) -> Self {
        match cluster {
            SolanaCluster::MainnetBeta => NetworkId::SolanaMainnet,
            SolanaCluster::Devnet => NetworkId::SolanaDevnet,
            SolanaCluster::Testnet => NetworkId::SolanaTestnet,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NetworkId::SolanaMainnet => "Solana",
            NetworkId::SolanaDevnet => "Solana Devnet",
            NetworkId::SolanaTestnet => "Solana Testnet",
            evm => evm.evm_chain().map(|c| c.name).unwrap_or("Unknown EVM network"),
        }
    }

    /// Native currency symbol, used for fee estimates.
    pub fn native_symbol(&self) -> &'static str {
        match self.family() {
            ChainFamily::Solana => "SOL",
            ChainFamily::Evm => self.evm_chain().map(|c| c.symbol).unwrap_or("ETH"),
        }
    }

    /// Decimals of the native currency (wei or lamports).
    pub fn native_decimals(&self) -> u8 {
        match self.family() {
            ChainFamily::Solana => 9,
            ChainFamily::Evm => self.evm_chain().map(|c| c.decimals).unwrap_or(18),
        }
    }

    pub fn is_testnet(&self) -> bool {
        match self.family() {
            ChainFamily::Solana => self.solana_cluster().is_some_and(|c| c.is_testnet()),
            ChainFamily::Evm => self.evm_chain().is_some_and(|c| c.is_testnet),
        }
    }

    pub fn address_url(&self, address: &str) -> String {
        if let Some(cluster) = self.solana_cluster() {
            return cluster.address_url(address);
        }
        match self.evm_chain() {
            Some(chain) => chain.address_url(address),
            None => address.to_string(),
        }
    }

    pub fn tx_url(&self, tx_id: &str) -> String {
        if let Some(cluster) = self.solana_cluster() {
            return cluster.tx_url(tx_id);
        }
        match self.evm_chain() {
            Some(chain) => chain.tx_url(tx_id),
            None => tx_id.to_string(),
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_evm_network_has_a_chain_definition() {
        for network in NetworkId::ALL {
            match network.family() {
                ChainFamily::Evm => {
                    let chain = network.evm_chain().unwrap();
                    assert_eq!(Some(chain.chain_id), network.evm_chain_id());
                    assert!(network.solana_cluster().is_none());
                }
                ChainFamily::Solana => {
                    assert!(network.evm_chain_id().is_none());
                    assert!(network.solana_cluster().is_some());
                }
            }
        }
    }

    #[test]
    fn chain_id_lookup_round_trips() {
        for network in NetworkId::ALL {
            if let Some(id) = network.evm_chain_id() {
                assert_eq!(NetworkId::from_evm_chain_id(id), Some(network));
            }
        }
        assert_eq!(NetworkId::from_evm_chain_id(999_999), None);
    }

    #[test]
    fn cluster_mapping_round_trips() {
        for cluster in SolanaCluster::ALL {
            let network = NetworkId::from_solana_cluster(cluster);
            assert_eq!(network.solana_cluster(), Some(cluster));
        }
    }

    #[test]
    fn native_symbols() {
        assert_eq!(NetworkId::Ethereum.native_symbol(), "ETH");
        assert_eq!(NetworkId::Bsc.native_symbol(), "BNB");
        assert_eq!(NetworkId::SolanaDevnet.native_symbol(), "SOL");
        assert_eq!(NetworkId::SolanaMainnet.native_decimals(), 9);
    }

    #[test]
    fn testnet_flags() {
        assert!(NetworkId::Sepolia.is_testnet());
        assert!(NetworkId::BscTestnet.is_testnet());
        assert!(NetworkId::SolanaDevnet.is_testnet());
        assert!(!NetworkId::Ethereum.is_testnet());
        assert!(!NetworkId::SolanaMainnet.is_testnet());
    }

    #[test]
    fn explorer_links_follow_family() {
        assert_eq!(
            NetworkId::SolanaDevnet.tx_url("abc"),
            "https://explorer.solana.com/tx/abc?cluster=devnet"
        );
        assert!(NetworkId::Ethereum
            .address_url("0xabc")
            .starts_with("https://etherscan.io/"));
    }

    #[test]
    fn serde_uses_kebab_case_ids() {
        let json = serde_json::to_string(&NetworkId::PolygonAmoy).unwrap();
        assert_eq!(json, "\"polygon-amoy\"");
        let back: NetworkId = serde_json::from_str("\"solana-devnet\"").unwrap();
        assert_eq!(back, NetworkId::SolanaDevnet);
    }
}
