//! In-memory boundary mocks shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chain_eth::{EthTransaction, SignedEthTransaction};
use chain_sol::SolanaCluster;

use crate::rpc::{
    CallRequest, ConfirmationStatus, EvmRpc, FeeData, RpcError, SignatureStatus, SolanaRpc,
    TransactionReceipt,
};
use crate::wallet::{EvmSigner, LocalSolanaWallet, SolanaWallet, WalletError};

pub const TEST_BYTECODE: &[u8] = &[0x60, 0x80, 0x60, 0x40, 0x52];
pub const RECEIPT_CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const RECEIPT_BLOCK: u64 = 4_242;

// ---------------------------------------------------------------------------
// EVM
// ---------------------------------------------------------------------------

pub struct MockEvmRpc {
    nonce: u64,
    receipt_address: bool,
    revert: bool,
    send_error: Option<String>,
    sent: Mutex<Vec<Vec<u8>>>,
    receipt_polls: AtomicU32,
}

impl MockEvmRpc {
    pub fn new() -> Self {
        Self {
            nonce: 7,
            receipt_address: true,
            revert: false,
            send_error: None,
            sent: Mutex::new(Vec::new()),
            receipt_polls: AtomicU32::new(0),
        }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn without_receipt_address(mut self) -> Self {
        self.receipt_address = false;
        self
    }

    pub fn reverting(mut self) -> Self {
        self.revert = true;
        self
    }

    pub fn failing_send(mut self, message: &str) -> Self {
        self.send_error = Some(message.to_string());
        self
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EvmRpc for MockEvmRpc {
    async fn get_transaction_count(&self, _address: &str) -> Result<u64, RpcError> {
        Ok(self.nonce)
    }

    async fn fee_data(&self) -> Result<FeeData, RpcError> {
        Ok(FeeData {
            base_fee_per_gas: 10_000_000_000,
            max_priority_fee_per_gas: 1_000_000_000,
        })
    }

    async fn estimate_gas(&self, _call: &CallRequest) -> Result<u64, RpcError> {
        Ok(120_000)
    }

    async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, RpcError> {
        if let Some(message) = &self.send_error {
            return Err(RpcError::Server {
                code: -32000,
                message: message.clone(),
            });
        }
        self.sent.lock().unwrap().push(raw_tx.to_vec());
        Ok(format!("0x{}", "ab".repeat(32)))
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        // Not mined on the first poll.
        if self.receipt_polls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(None);
        }
        Ok(Some(TransactionReceipt {
            transaction_hash: tx_hash.to_string(),
            block_number: RECEIPT_BLOCK,
            contract_address: self.receipt_address.then(|| RECEIPT_CONTRACT.to_string()),
            status: !self.revert,
        }))
    }
}

pub struct MockEvmSigner {
    address: String,
    chain_id: u64,
    reject: bool,
    last_signed: Mutex<Option<EthTransaction>>,
}

impl MockEvmSigner {
    pub fn new(address: &str, chain_id: u64) -> Self {
        Self {
            address: address.to_string(),
            chain_id,
            reject: false,
            last_signed: Mutex::new(None),
        }
    }

    pub fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }

    pub fn last_signed(&self) -> Option<EthTransaction> {
        self.last_signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl EvmSigner for MockEvmSigner {
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
        if self.reject {
            return Err(WalletError::Rejected);
        }
        *self.last_signed.lock().unwrap() = Some(tx.clone());
        let raw_tx = chain_eth::transaction::encode_unsigned_tx(tx)
            .map_err(|e| WalletError::Other(e.to_string()))?;
        Ok(SignedEthTransaction {
            raw_tx,
            tx_hash: format!("0x{}", "cd".repeat(32)),
        })
    }
}

// ---------------------------------------------------------------------------
// Solana
// ---------------------------------------------------------------------------

/// Rent for `space` bytes at the default rate of 3480 lamports per
/// byte-year over two years, including the 128-byte account header.
pub fn rent_for(space: u64) -> u64 {
    (space + 128) * 6_960
}

pub struct MockSolanaRpc {
    genesis_hash: String,
    send_error: Option<String>,
    status_error: Option<String>,
    accounts: HashMap<[u8; 32], Vec<u8>>,
    sent: Mutex<Vec<Vec<u8>>>,
    status_polls: AtomicU32,
}

impl MockSolanaRpc {
    pub fn new(cluster: SolanaCluster) -> Self {
        Self {
            genesis_hash: cluster.genesis_hash().to_string(),
            send_error: None,
            status_error: None,
            accounts: HashMap::new(),
            sent: Mutex::new(Vec::new()),
            status_polls: AtomicU32::new(0),
        }
    }

    pub fn failing_send(mut self, message: &str) -> Self {
        self.send_error = Some(message.to_string());
        self
    }

    pub fn failing_status(mut self, err: &str) -> Self {
        self.status_error = Some(err.to_string());
        self
    }

    pub fn with_account(mut self, address: [u8; 32], data: Vec<u8>) -> Self {
        self.accounts.insert(address, data);
        self
    }

    pub fn sent_transactions(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SolanaRpc for MockSolanaRpc {
    async fn get_latest_blockhash(&self) -> Result<[u8; 32], RpcError> {
        Ok([0x11; 32])
    }

    async fn get_minimum_balance_for_rent_exemption(&self, space: u64) -> Result<u64, RpcError> {
        Ok(rent_for(space))
    }

    async fn get_fee_per_signature(&self) -> Result<u64, RpcError> {
        Ok(5_000)
    }

    async fn send_transaction(&self, raw_tx: &[u8]) -> Result<String, RpcError> {
        if let Some(message) = &self.send_error {
            return Err(RpcError::Server {
                code: -32002,
                message: message.clone(),
            });
        }
        let signature = chain_sol::transaction_signature(raw_tx).map_err(|e| RpcError::Server {
            code: -32602,
            message: e.to_string(),
        })?;
        self.sent.lock().unwrap().push(raw_tx.to_vec());
        Ok(signature)
    }

    async fn get_signature_status(
        &self,
        _signature: &str,
    ) -> Result<Option<SignatureStatus>, RpcError> {
        let poll = self.status_polls.fetch_add(1, Ordering::SeqCst);
        let status = match poll {
            0 => return Ok(None),
            1 => ConfirmationStatus::Processed,
            _ => ConfirmationStatus::Confirmed,
        };
        Ok(Some(SignatureStatus {
            confirmation: Some(status),
            err: self.status_error.clone(),
        }))
    }

    async fn get_account_data(&self, address: &[u8; 32]) -> Result<Option<Vec<u8>>, RpcError> {
        Ok(self.accounts.get(address).cloned())
    }

    async fn get_genesis_hash(&self) -> Result<String, RpcError> {
        Ok(self.genesis_hash.clone())
    }
}

pub struct MockSolanaWallet {
    inner: LocalSolanaWallet,
    reject: bool,
}

impl MockSolanaWallet {
    pub fn new(cluster: Option<SolanaCluster>) -> Self {
        Self {
            inner: LocalSolanaWallet::new([0x5a; 32], cluster),
            reject: false,
        }
    }

    pub fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }
}

#[async_trait]
impl SolanaWallet for MockSolanaWallet {
    fn public_key(&self) -> [u8; 32] {
        self.inner.public_key()
    }

    async fn cluster(&self) -> Result<Option<SolanaCluster>, WalletError> {
        self.inner.cluster().await
    }

    async fn sign_transaction(&self, raw_tx: Vec<u8>) -> Result<Vec<u8>, WalletError> {
        if self.reject {
            return Err(WalletError::Rejected);
        }
        self.inner.sign_transaction(raw_tx).await
    }
}

/// 82-byte SPL mint account state.
pub fn mint_account_bytes(authority: Option<[u8; 32]>, supply: u64, decimals: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(82);
    push_account_coption(&mut data, authority);
    data.extend_from_slice(&supply.to_le_bytes());
    data.push(decimals);
    data.push(1);
    push_account_coption(&mut data, None);
    data
}

fn push_account_coption(data: &mut Vec<u8>, key: Option<[u8; 32]>) {
    match key {
        Some(key) => {
            data.extend_from_slice(&1u32.to_le_bytes());
            data.extend_from_slice(&key);
        }
        None => data.extend_from_slice(&[0u8; 36]),
    }
}

/// A metadata account as the metadata program stores it, strings padded.
pub fn metadata_account_bytes(
    update_authority: [u8; 32],
    mint: [u8; 32],
    name: &str,
    symbol: &str,
    is_mutable: bool,
) -> Vec<u8> {
    fn padded(out: &mut Vec<u8>, s: &str, len: usize) {
        out.extend_from_slice(&(len as u32).to_le_bytes());
        out.extend_from_slice(s.as_bytes());
        out.extend(std::iter::repeat(0u8).take(len - s.len()));
    }

    let mut data = vec![4u8];
    data.extend_from_slice(&update_authority);
    data.extend_from_slice(&mint);
    padded(&mut data, name, 32);
    padded(&mut data, symbol, 10);
    padded(&mut data, "", 200);
    data.extend_from_slice(&0u16.to_le_bytes());
    data.push(0); // no creators
    data.push(0); // primary sale
    data.push(is_mutable as u8);
    data
}
