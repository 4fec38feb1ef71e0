use alloy_primitives::Address;
use alloy_rlp::{Encodable, RlpEncodable};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::address::{format_address, parse_address};
use crate::error::EthError;

/// EIP-1559 fee parameters, in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeParams {
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
}

/// An unsigned EIP-1559 (type 2) transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
    /// Recipient as a 0x-prefixed hex string; `None` creates a contract.
    pub to: Option<String>,
    /// Value in wei.
    pub value: u128,
    /// Calldata, or creation bytecode + constructor arguments.
    pub data: Vec<u8>,
}

impl EthTransaction {
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }
}

/// A signed EIP-1559 transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedEthTransaction {
    /// RLP-encoded signed transaction bytes (including 0x02 type prefix).
    pub raw_tx: Vec<u8>,
    /// Transaction hash as a 0x-prefixed hex string.
    pub tx_hash: String,
}

/// Builds an unsigned EIP-1559 contract-creation transaction.
///
/// `init_code` is the creation bytecode with the ABI-encoded constructor
/// arguments already appended.
pub fn build_contract_creation(
    chain_id: u64,
    nonce: u64,
    init_code: Vec<u8>,
    fees: FeeParams,
    gas_limit: u64,
) -> Result<EthTransaction, EthError> {
    if init_code.is_empty() {
        return Err(EthError::TransactionBuildError(
            "contract creation requires init code".into(),
        ));
    }
    if fees.max_priority_fee_per_gas > fees.max_fee_per_gas {
        return Err(EthError::TransactionBuildError(format!(
            "priority fee {} exceeds max fee {}",
            fees.max_priority_fee_per_gas, fees.max_fee_per_gas
        )));
    }

    Ok(EthTransaction {
        chain_id,
        nonce,
        max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
        max_fee_per_gas: fees.max_fee_per_gas,
        gas_limit,
        to: None,
        value: 0,
        data: init_code,
    })
}

/// The address a CREATE from `deployer` at `nonce` deploys to:
/// `keccak256(rlp([deployer, nonce]))[12..]`.
pub fn contract_address(deployer: &str, nonce: u64) -> Result<String, EthError> {
    let sender = Address::from(parse_address(deployer)?);
    let created = sender.create(nonce);
    Ok(format_address(&created.0 .0))
}

/// Signs an EIP-1559 transaction with the given secp256k1 private key.
///
/// The signing process:
/// 1. RLP-encode the unsigned transaction fields.
/// 2. Prepend the type byte (0x02) to get the signing payload.
/// 3. Keccak-256 hash the payload.
/// 4. Sign the hash with the private key using k256.
/// 5. Build the signed transaction with v (y_parity), r, s appended.
pub fn sign_transaction(
    tx: &EthTransaction,
    private_key: &[u8; 32],
) -> Result<SignedEthTransaction, EthError> {
    let unsigned_payload = encode_unsigned_tx(tx)?;
    let msg_hash = Keccak256::digest(&unsigned_payload);

    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()));
    key_bytes.zeroize();
    let signing_key = signing_key?;

    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash(msg_hash.as_slice())
        .map_err(|e| EthError::SigningError(e.to_string()))?;

    let mut r_bytes = [0u8; 32];
    let mut s_bytes = [0u8; 32];
    r_bytes.copy_from_slice(&signature.r().to_bytes());
    s_bytes.copy_from_slice(&signature.s().to_bytes());

    let signed_fields = SignedTxFields {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        gas_limit: tx.gas_limit,
        to: parse_to(tx.to.as_deref())?,
        value: tx.value,
        data: tx.data.clone(),
        access_list: Vec::new(),
        signature_y_parity: recovery_id.is_y_odd() as u8,
        signature_r: r_bytes.into(),
        signature_s: s_bytes.into(),
    };

    let mut rlp_buf = Vec::new();
    signed_fields.encode(&mut rlp_buf);

    let mut raw_tx = Vec::with_capacity(1 + rlp_buf.len());
    raw_tx.push(0x02);
    raw_tx.extend_from_slice(&rlp_buf);

    let tx_hash = format!("0x{}", hex::encode(Keccak256::digest(&raw_tx)));

    Ok(SignedEthTransaction { raw_tx, tx_hash })
}

/// Encodes the unsigned EIP-1559 transaction as `0x02 || rlp(fields)`.
///
/// The RLP-encoded fields are:
/// `[chain_id, nonce, max_priority_fee_per_gas, max_fee_per_gas, gas_limit, to,
///   value, data, access_list]`, with `to` as the empty string for creation.
pub fn encode_unsigned_tx(tx: &EthTransaction) -> Result<Vec<u8>, EthError> {
    let unsigned_fields = UnsignedTxFields {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        gas_limit: tx.gas_limit,
        to: parse_to(tx.to.as_deref())?,
        value: tx.value,
        data: tx.data.clone(),
        access_list: Vec::new(),
    };

    let mut rlp_buf = Vec::new();
    unsigned_fields.encode(&mut rlp_buf);

    let mut payload = Vec::with_capacity(1 + rlp_buf.len());
    payload.push(0x02);
    payload.extend_from_slice(&rlp_buf);

    Ok(payload)
}

// ---------------------------------------------------------------------------
// RLP-encodable structures
// ---------------------------------------------------------------------------

#[derive(RlpEncodable)]
struct UnsignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpTo,
    value: u128,
    data: Vec<u8>,
    access_list: Vec<AccessListItem>,
}

#[derive(RlpEncodable)]
struct SignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpTo,
    value: u128,
    data: Vec<u8>,
    access_list: Vec<AccessListItem>,
    signature_y_parity: u8,
    signature_r: RlpU256,
    signature_s: RlpU256,
}

/// An EIP-2930 access list entry (always empty here).
#[derive(Debug, Clone, RlpEncodable)]
struct AccessListItem {
    address: RlpTo,
    storage_keys: Vec<RlpFixedBytes<32>>,
}

/// Transaction destination: a 20-byte address, or the empty string for
/// contract creation.
#[derive(Debug, Clone)]
struct RlpTo(Option<[u8; 20]>);

impl Encodable for RlpTo {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        match &self.0 {
            Some(addr) => addr.as_slice().encode(out),
            None => (&[] as &[u8]).encode(out),
        }
    }

    fn length(&self) -> usize {
        match &self.0 {
            Some(addr) => addr.as_slice().length(),
            None => 1,
        }
    }
}

/// A 256-bit integer encoded as minimal big-endian bytes.
#[derive(Debug, Clone)]
struct RlpU256([u8; 32]);

impl From<[u8; 32]> for RlpU256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl RlpU256 {
    fn trimmed(&self) -> &[u8] {
        let start = self.0.iter().position(|&b| b != 0).unwrap_or(32);
        &self.0[start..]
    }
}

impl Encodable for RlpU256 {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.trimmed().encode(out);
    }

    fn length(&self) -> usize {
        self.trimmed().length()
    }
}

#[derive(Debug, Clone)]
struct RlpFixedBytes<const N: usize>([u8; N]);

impl<const N: usize> Encodable for RlpFixedBytes<N> {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

fn parse_to(to: Option<&str>) -> Result<RlpTo, EthError> {
    to.map(parse_address).transpose().map(RlpTo)
}
