//! EVM networks a token can be deployed to, keyed by EIP-155 chain id.

use serde::Serialize;

/// Display and explorer data for an EVM deployment target.
#[derive(Debug, Clone, Serialize)]
pub struct EvmChain {
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub explorer_url: &'static str,
    pub is_testnet: bool,
}

impl EvmChain {
    const fn new(
        chain_id: u64,
        name: &'static str,
        symbol: &'static str,
        explorer_url: &'static str,
        is_testnet: bool,
    ) -> Self {
        EvmChain {
            chain_id,
            name,
            symbol,
            decimals: 18,
            explorer_url,
            is_testnet,
        }
    }

    /// Explorer link for a deployed contract.
    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{address}", self.explorer_url)
    }

    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{tx_hash}", self.explorer_url)
    }
}

static DEPLOY_TARGETS: [EvmChain; 10] = [
    EvmChain::new(1, "Ethereum", "ETH", "https://etherscan.io", false),
    EvmChain::new(11155111, "Sepolia", "ETH", "https://sepolia.etherscan.io", true),
    EvmChain::new(137, "Polygon", "MATIC", "https://polygonscan.com", false),
    EvmChain::new(80002, "Polygon Amoy", "MATIC", "https://amoy.polygonscan.com", true),
    EvmChain::new(56, "BNB Smart Chain", "BNB", "https://bscscan.com", false),
    EvmChain::new(97, "BNB Smart Chain Testnet", "tBNB", "https://testnet.bscscan.com", true),
    EvmChain::new(42161, "Arbitrum One", "ETH", "https://arbiscan.io", false),
    EvmChain::new(8453, "Base", "ETH", "https://basescan.org", false),
    EvmChain::new(10, "Optimism", "ETH", "https://optimistic.etherscan.io", false),
    EvmChain::new(43114, "Avalanche C-Chain", "AVAX", "https://snowtrace.io", false),
];

/// Deployment target for `chain_id`, or `None` if tokens cannot be deployed there.
pub fn get_chain(chain_id: u64) -> Option<&'static EvmChain> {
    DEPLOY_TARGETS.iter().find(|c| c.chain_id == chain_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_chain_id() {
        let bsc = get_chain(56).unwrap();
        assert_eq!(bsc.name, "BNB Smart Chain");
        assert_eq!(bsc.symbol, "BNB");
        assert!(!bsc.is_testnet);

        let amoy = get_chain(80002).unwrap();
        assert_eq!(amoy.symbol, "MATIC");
        assert!(amoy.is_testnet);

        assert!(get_chain(999_999).is_none());
    }

    #[test]
    fn chain_ids_are_unique() {
        for (i, chain) in DEPLOY_TARGETS.iter().enumerate() {
            assert!(
                DEPLOY_TARGETS[i + 1..].iter().all(|c| c.chain_id != chain.chain_id),
                "duplicate chain id {}",
                chain.chain_id
            );
        }
    }

    #[test]
    fn three_testnets() {
        let testnets: Vec<u64> = DEPLOY_TARGETS
            .iter()
            .filter(|c| c.is_testnet)
            .map(|c| c.chain_id)
            .collect();
        assert_eq!(testnets, vec![11155111, 80002, 97]);
    }

    #[test]
    fn explorer_links() {
        let sepolia = get_chain(11155111).unwrap();
        assert_eq!(sepolia.tx_url("0xabc"), "https://sepolia.etherscan.io/tx/0xabc");

        let base = get_chain(8453).unwrap();
        assert_eq!(base.address_url("0xdead"), "https://basescan.org/address/0xdead");
    }
}
