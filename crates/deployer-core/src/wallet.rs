//! Wallet capabilities.
//!
//! A deployment is handed an explicit [`WalletCapability`] for the target
//! chain family. The orchestrator only ever sees addresses and signed
//! payloads; private keys stay behind the trait. The local signers at the
//! bottom of this module hold a key in memory and exist for devnets and
//! tests.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chain_eth::{EthTransaction, SignedEthTransaction};
use chain_sol::SolanaCluster;
use thiserror::Error;
use zeroize::Zeroize;

use crate::network::ChainFamily;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("User rejected the request")]
    Rejected,

    #[error("Wallet error: {0}")]
    Other(String),
}

/// Signer for EVM transactions (an injected browser wallet, a hardware
/// device, or [`LocalEvmSigner`]).
#[async_trait]
pub trait EvmSigner: Send + Sync {
    /// Checksummed `0x` address.
    fn address(&self) -> String;

    /// Chain id the wallet is currently connected to.
    async fn chain_id(&self) -> Result<u64, WalletError>;

    async fn sign_transaction(
        &self,
        tx: &EthTransaction,
    ) -> Result<SignedEthTransaction, WalletError>;
}

/// Signer for Solana wire-format transactions.
#[async_trait]
pub trait SolanaWallet: Send + Sync {
    fn public_key(&self) -> [u8; 32];

    /// Cluster the wallet is connected to. `None` when the wallet does not
    /// expose it.
    async fn cluster(&self) -> Result<Option<SolanaCluster>, WalletError>;

    /// Fills the wallet's signature slot of a (possibly partially signed)
    /// wire-format transaction and returns the result.
    async fn sign_transaction(&self, raw_tx: Vec<u8>) -> Result<Vec<u8>, WalletError>;
}

/// The signing capability passed alongside a deployment request.
#[derive(Clone)]
pub enum WalletCapability {
    Evm(Arc<dyn EvmSigner>),
    Solana(Arc<dyn SolanaWallet>),
}

impl WalletCapability {
    pub fn family(&self) -> ChainFamily {
        match self {
            WalletCapability::Evm(_) => ChainFamily::Evm,
            WalletCapability::Solana(_) => ChainFamily::Solana,
        }
    }

    /// Address in the family's native text format.
    pub fn address(&self) -> String {
        match self {
            WalletCapability::Evm(signer) => signer.address(),
            WalletCapability::Solana(wallet) => chain_sol::bytes_to_address(&wallet.public_key()),
        }
    }
}

impl fmt::Debug for WalletCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletCapability")
            .field("family", &self.family())
            .field("address", &self.address())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Local signers
// ---------------------------------------------------------------------------

/// In-memory secp256k1 signer bound to one chain id.
pub struct LocalEvmSigner {
    private_key: [u8; 32],
    address: String,
    chain_id: u64,
}

impl LocalEvmSigner {
    pub fn new(private_key: [u8; 32], chain_id: u64) -> Result<Self, chain_eth::EthError> {
        let address = chain_eth::address::private_key_to_address(&private_key)?;
        Ok(Self {
            private_key,
            address,
            chain_id,
        })
    }

    /// Parses a `0x`-prefixed or bare hex private key.
    pub fn from_hex(private_key: &str, chain_id: u64) -> Result<Self, chain_eth::EthError> {
        let mut bytes = hex::decode(private_key.trim().trim_start_matches("0x"))
            .map_err(|e| chain_eth::EthError::InvalidPrivateKey(e.to_string()))?;
        let key: Result<[u8; 32], _> = bytes.as_slice().try_into();
        bytes.zeroize();
        let mut key = key.map_err(|_| {
            chain_eth::EthError::InvalidPrivateKey("expected 32 bytes".into())
        })?;
        let signer = Self::new(key, chain_id);
        key.zeroize();
        signer
    }
}

impl Drop for LocalEvmSigner {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

#[async_trait]
impl EvmSigner for LocalEvmSigner {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.chain_id)
    }

    async fn sign_transaction(
        &self,
        tx: &EthTransaction,
    ) -> Result<SignedEthTransaction, WalletError> {
        if tx.chain_id != self.chain_id {
            return Err(WalletError::Other(format!(
                "transaction targets chain {} but signer is on {}",
                tx.chain_id, self.chain_id
            )));
        }
        chain_eth::transaction::sign_transaction(tx, &self.private_key)
            .map_err(|e| WalletError::Other(e.to_string()))
    }
}

/// In-memory ed25519 wallet.
pub struct LocalSolanaWallet {
    seed: [u8; 32],
    public_key: [u8; 32],
    cluster: Option<SolanaCluster>,
}

impl LocalSolanaWallet {
    pub fn new(seed: [u8; 32], cluster: Option<SolanaCluster>) -> Self {
        let public_key = chain_sol::public_key_from_seed(&seed);
        Self {
            seed,
            public_key,
            cluster,
        }
    }

    /// Accepts a 32-byte seed or a 64-byte CLI keypair.
    pub fn from_secret_bytes(
        secret: &[u8],
        cluster: Option<SolanaCluster>,
    ) -> Result<Self, chain_sol::SolError> {
        let mut seed = chain_sol::seed_from_secret_bytes(secret)?;
        let wallet = Self::new(seed, cluster);
        seed.zeroize();
        Ok(wallet)
    }
}

impl Drop for LocalSolanaWallet {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

#[async_trait]
impl SolanaWallet for LocalSolanaWallet {
    fn public_key(&self) -> [u8; 32] {
        self.public_key
    }

    async fn cluster(&self) -> Result<Option<SolanaCluster>, WalletError> {
        Ok(self.cluster)
    }

    async fn sign_transaction(&self, raw_tx: Vec<u8>) -> Result<Vec<u8>, WalletError> {
        chain_sol::partial_sign(&self.seed, &raw_tx).map_err(|e| WalletError::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_eth::FeeParams;

    // Hardhat account #0
    const HARDHAT_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const HARDHAT_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn creation_tx(chain_id: u64) -> EthTransaction {
        chain_eth::transaction::build_contract_creation(
            chain_id,
            0,
            vec![0x60, 0x80, 0x60, 0x40],
            FeeParams {
                max_priority_fee_per_gas: 1,
                max_fee_per_gas: 2,
            },
            100_000,
        )
        .unwrap()
    }

    // -- EVM --

    #[test]
    fn local_evm_signer_derives_address() {
        let signer = LocalEvmSigner::from_hex(HARDHAT_KEY, 1).unwrap();
        assert_eq!(signer.address(), HARDHAT_ADDRESS);
    }

    #[test]
    fn local_evm_signer_rejects_short_key() {
        assert!(LocalEvmSigner::from_hex("0xdeadbeef", 1).is_err());
    }

    #[tokio::test]
    async fn local_evm_signer_signs_for_its_chain() {
        let signer = LocalEvmSigner::from_hex(HARDHAT_KEY, 11155111).unwrap();
        assert_eq!(signer.chain_id().await.unwrap(), 11155111);

        let signed = signer.sign_transaction(&creation_tx(11155111)).await.unwrap();
        assert_eq!(signed.raw_tx[0], 0x02);
        assert!(signed.tx_hash.starts_with("0x"));
    }

    #[tokio::test]
    async fn local_evm_signer_refuses_foreign_chain() {
        let signer = LocalEvmSigner::from_hex(HARDHAT_KEY, 1).unwrap();
        let err = signer.sign_transaction(&creation_tx(137)).await.unwrap_err();
        assert!(matches!(err, WalletError::Other(_)));
    }

    // -- Solana --

    #[tokio::test]
    async fn local_solana_wallet_fills_its_slot() {
        let wallet = LocalSolanaWallet::new([7u8; 32], Some(SolanaCluster::Devnet));
        let payer = wallet.public_key();

        let ix = chain_sol::system::create_account(&payer, &[9u8; 32], 1_000, 82, &[3u8; 32]);
        let tx = chain_sol::compile_transaction(&[ix], &payer, &[1u8; 32]).unwrap();
        let unsigned = chain_sol::serialize_unsigned(&tx).unwrap();

        let signed = wallet.sign_transaction(unsigned).await.unwrap();
        assert_ne!(&signed[1..65], &[0u8; 64][..]);
        assert_eq!(wallet.cluster().await.unwrap(), Some(SolanaCluster::Devnet));
    }

    #[test]
    fn keypair_bytes_must_match() {
        let seed = [5u8; 32];
        let mut keypair = seed.to_vec();
        keypair.extend_from_slice(&chain_sol::public_key_from_seed(&seed));
        let wallet = LocalSolanaWallet::from_secret_bytes(&keypair, None).unwrap();
        assert_eq!(wallet.public_key(), chain_sol::public_key_from_seed(&seed));

        keypair[40] ^= 1;
        assert!(LocalSolanaWallet::from_secret_bytes(&keypair, None).is_err());
    }

    #[test]
    fn capability_reports_family_and_address() {
        let cap = WalletCapability::Solana(Arc::new(LocalSolanaWallet::new([1u8; 32], None)));
        assert_eq!(cap.family(), ChainFamily::Solana);
        assert_eq!(
            cap.address(),
            chain_sol::bytes_to_address(&chain_sol::public_key_from_seed(&[1u8; 32]))
        );

        let cap = WalletCapability::Evm(Arc::new(LocalEvmSigner::from_hex(HARDHAT_KEY, 1).unwrap()));
        assert_eq!(cap.family(), ChainFamily::Evm);
        assert_eq!(cap.address(), HARDHAT_ADDRESS);
        assert!(format!("{cap:?}").contains("Evm"));
    }
}
