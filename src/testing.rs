//! Shared fixtures for unit tests

use crate::{
    Amount, Transaction, TxOutput, UtxoId,
    pool::UtxoPool,
    validation::{CredentialVerifier, sign_input},
};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256, Signature};

pub const ALICE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const BOB_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const CAROL_KEY: &str = "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

pub fn wallet(key: &str) -> LocalWallet {
    key.parse().unwrap()
}

pub fn alice() -> LocalWallet {
    wallet(ALICE_KEY)
}

pub fn bob() -> LocalWallet {
    wallet(BOB_KEY)
}

pub fn carol() -> LocalWallet {
    wallet(CAROL_KEY)
}

/// Identifier of a genesis output, distinguished by `byte`
pub fn genesis_utxo(byte: u8) -> UtxoId {
    UtxoId::new(H256::repeat_byte(byte), 0)
}

/// Pool holding the given (utxo, value, owner) entries
pub fn pool_with(entries: &[(UtxoId, Amount, &LocalWallet)]) -> UtxoPool {
    let mut pool = UtxoPool::new();
    for (utxo, value, owner) in entries {
        pool.insert(*utxo, TxOutput::new(*value, owner.address())).unwrap();
    }
    pool
}

/// Build a transaction spending `inputs`, each signed by `signer`
pub fn signed_tx(signer: &LocalWallet, inputs: &[UtxoId], outputs: &[(Amount, Address)]) -> Transaction {
    let mut tx = Transaction::new();
    for utxo in inputs {
        tx.add_input(utxo.tx_hash, utxo.index);
    }
    for (value, owner) in outputs {
        tx.add_output(*value, *owner);
    }
    for index in 0..inputs.len() {
        assert!(sign_input(signer, &mut tx, index).unwrap());
    }
    tx
}

/// Verifier with a fixed answer, standing in for the signature primitive
#[derive(Debug, Clone, Copy)]
pub struct FixedVerifier(pub bool);

impl CredentialVerifier for FixedVerifier {
    fn verify(&self, _credential: &Address, _message: &[u8], _signature: &Signature) -> bool {
        self.0
    }
}
