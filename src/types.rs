use ethers::types::{Address, H256, Signature, U256};
use ethers::utils::keccak256;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Value in integer minor units.
///
/// Signed so that a negative output can be represented and rejected by validation
/// instead of being unrepresentable at the type level.
pub type Amount = i64;

/// Identifier of an unspent output: the hash of the producing transaction and the
/// position of the output inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoId {
    pub tx_hash: H256,
    pub index: u32,
}

impl UtxoId {
    pub const fn new(tx_hash: H256, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.tx_hash, self.index)
    }
}

/// Output descriptor: an amount locked to an owner credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: Amount,
    pub owner: Address,
}

impl TxOutput {
    pub fn new(value: Amount, owner: Address) -> Self {
        Self { value, owner }
    }
}

/// Placeholder signature carried by an input until it is signed.
///
/// Never verifies: zero `r` and `s` are not a valid secp256k1 signature.
pub const UNSIGNED: Signature = Signature {
    r: U256::zero(),
    s: U256::zero(),
    v: 0,
};

/// Transaction input claiming a previously produced output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub prev_tx_hash: H256,
    pub output_index: u32,
    pub signature: Signature,
}

impl TxInput {
    /// The UTXO this input claims.
    pub fn utxo_id(&self) -> UtxoId {
        UtxoId::new(self.prev_tx_hash, self.output_index)
    }
}

/// A proposed transfer: ordered inputs consumed, ordered outputs produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an unsigned input referencing `prev_tx_hash:output_index`.
    pub fn add_input(&mut self, prev_tx_hash: H256, output_index: u32) -> &mut Self {
        self.inputs.push(TxInput {
            prev_tx_hash,
            output_index,
            signature: UNSIGNED,
        });
        self
    }

    pub fn add_output(&mut self, value: Amount, owner: Address) -> &mut Self {
        self.outputs.push(TxOutput::new(value, owner));
        self
    }

    /// Attach a signature to input `index`. Returns false if there is no such input.
    pub fn set_signature(&mut self, index: usize, signature: Signature) -> bool {
        match self.inputs.get_mut(index) {
            Some(input) => {
                input.signature = signature;
                true
            }
            None => false,
        }
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    /// Bytes the owner of the output claimed by input `index` must sign.
    ///
    /// Layout: prev tx hash (32) | output index (u32 BE), then for every output
    /// value (i64 BE) | owner (20). Returns `None` for an out-of-range index.
    pub fn signing_payload(&self, index: usize) -> Option<Vec<u8>> {
        let input = self.inputs.get(index)?;
        let mut data = Vec::with_capacity(36 + self.outputs.len() * 28);
        data.extend_from_slice(input.prev_tx_hash.as_bytes());
        data.extend_from_slice(&input.output_index.to_be_bytes());
        self.encode_outputs(&mut data);
        Some(data)
    }

    /// Keccak-256 over the full transaction, signatures included.
    ///
    /// Produced outputs are keyed by this hash, so two transactions differing only in
    /// a signature produce distinct UTXO identifiers.
    pub fn content_hash(&self) -> H256 {
        let mut data = Vec::with_capacity(self.inputs.len() * 101 + self.outputs.len() * 28);
        for input in &self.inputs {
            data.extend_from_slice(input.prev_tx_hash.as_bytes());
            data.extend_from_slice(&input.output_index.to_be_bytes());
            data.extend_from_slice(&input.signature.to_vec());
        }
        self.encode_outputs(&mut data);
        H256::from_slice(&keccak256(data))
    }

    /// Identifier of the `index`-th output once this transaction is accepted.
    pub fn output_id(&self, index: u32) -> UtxoId {
        UtxoId::new(self.content_hash(), index)
    }

    fn encode_outputs(&self, data: &mut Vec<u8>) {
        for output in &self.outputs {
            data.extend_from_slice(&output.value.to_be_bytes());
            data.extend_from_slice(output.owner.as_bytes());
        }
    }
}

/// Why a transaction was not accepted.
///
/// Rejection is an ordinary outcome, not a fault: it is returned as a value and
/// never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Rejection {
    #[error("input {index} references unknown utxo {utxo}")]
    MissingInput { index: usize, utxo: UtxoId },

    #[error("input {index} has an invalid signature")]
    InvalidSignature { index: usize },

    #[error("utxo {utxo} is claimed more than once")]
    DuplicateInput { utxo: UtxoId },

    #[error("output {index} has negative value {value}")]
    NegativeOutput { index: usize, value: Amount },

    #[error("outputs ({outputs}) exceed inputs ({inputs})")]
    ValueNotConserved { inputs: i128, outputs: i128 },

    #[error("input {index} claims utxo {utxo}, already consumed in this epoch")]
    AlreadySpent { index: usize, utxo: UtxoId },

    #[error("produced utxo {utxo} already exists in the pool")]
    OutputCollision { utxo: UtxoId },

    #[error("transaction {tx_hash:?} was already accepted in this epoch")]
    AlreadyAccepted { tx_hash: H256 },
}

impl Rejection {
    /// Failures that depend only on the transaction itself and therefore can never
    /// be cured by later changes to the pool.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Rejection::DuplicateInput { .. } | Rejection::NegativeOutput { .. }
        )
    }
}

/// One entry of the genesis file used to seed the initial pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisEntry {
    pub tx_hash: H256,
    pub index: u32,
    pub value: Amount,
    pub owner: Address,
}

/// Epoch metadata for the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochMetadata {
    pub epoch_id: u64,
    pub accepted_count: usize,
    pub rejected_count: usize,
    pub passes: usize,
    pub pool_size: usize,
    pub timestamp: u64,
}

/// Acknowledgement sent to clients submitting a candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftConfirmation {
    pub tx_hash: H256,
    pub status: ConfirmationStatus,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConfirmationStatus {
    /// Queued for the next epoch
    Queued,
    Rejected { reason: String },
}
