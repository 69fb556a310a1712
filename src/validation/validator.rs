use crate::{Rejection, Transaction, TxOutput, pool::UtxoPool};
use std::collections::HashSet;
use tracing::debug;

use super::verifier::{CredentialVerifier, EcdsaVerifier};

/// Per-transaction validity checks against a pool snapshot
///
/// Holds no state besides the credential verifier, so a check never mutates the
/// pool and repeated calls on an unchanged pool give the same answer.
#[derive(Debug, Clone, Default)]
pub struct Validator<V = EcdsaVerifier> {
    verifier: V,
}

impl<V: CredentialVerifier> Validator<V> {
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    pub fn is_valid(&self, pool: &UtxoPool, tx: &Transaction) -> bool {
        self.check(pool, tx).is_ok()
    }

    /// Validate a transaction against the current pool
    /// Returns Ok(()) if valid, Err(Rejection) naming the first failed check
    pub fn check(&self, pool: &UtxoPool, tx: &Transaction) -> Result<(), Rejection> {
        // Pool-independent checks first so their rejection is reported as structural
        check_no_double_claim(tx)
            .and_then(|()| check_outputs_non_negative(tx))
            .and_then(|()| {
                let claimed = claimed_outputs(pool, tx)?;
                self.check_signatures(tx, &claimed)?;
                check_value_conserved(tx, &claimed)
            })
            .inspect_err(|rejection| debug!("Transaction {:?} invalid: {}", tx.content_hash(), rejection))
    }

    /// Each input must carry a signature from the owner of the output it claims
    fn check_signatures(&self, tx: &Transaction, claimed: &[&TxOutput]) -> Result<(), Rejection> {
        for (index, (input, output)) in tx.inputs().iter().zip(claimed).enumerate() {
            let verified = tx
                .signing_payload(index)
                .is_some_and(|payload| self.verifier.verify(&output.owner, &payload, &input.signature));
            if !verified {
                return Err(Rejection::InvalidSignature { index });
            }
        }
        Ok(())
    }
}

/// Resolve every input to the output it claims.
/// Fails on the first input whose UTXO is not in the pool.
fn claimed_outputs<'a>(pool: &'a UtxoPool, tx: &Transaction) -> Result<Vec<&'a TxOutput>, Rejection> {
    tx.inputs()
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let utxo = input.utxo_id();
            pool.get(&utxo)
                .map_err(|_| Rejection::MissingInput { index, utxo })
        })
        .collect()
}

fn check_no_double_claim(tx: &Transaction) -> Result<(), Rejection> {
    let mut seen = HashSet::with_capacity(tx.inputs().len());
    for input in tx.inputs() {
        let utxo = input.utxo_id();
        if !seen.insert(utxo) {
            return Err(Rejection::DuplicateInput { utxo });
        }
    }
    Ok(())
}

fn check_outputs_non_negative(tx: &Transaction) -> Result<(), Rejection> {
    match tx.outputs().iter().enumerate().find(|(_, output)| output.value < 0) {
        Some((index, output)) => Err(Rejection::NegativeOutput { index, value: output.value }),
        None => Ok(()),
    }
}

/// Integer minor units make this an exact comparison; no tolerance is needed.
fn check_value_conserved(tx: &Transaction, claimed: &[&TxOutput]) -> Result<(), Rejection> {
    let inputs: i128 = claimed.iter().map(|output| output.value as i128).sum();
    let outputs: i128 = tx.outputs().iter().map(|output| output.value as i128).sum();
    if outputs > inputs {
        return Err(Rejection::ValueNotConserved { inputs, outputs });
    }
    Ok(())
}
