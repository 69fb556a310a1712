use crate::{
    Rejection, Transaction,
    error::HandlerError,
    pool::UtxoPool,
    validation::{CredentialVerifier, EcdsaVerifier, Validator},
};

use super::resolver::{EpochOutcome, resolve};

/// Public ledger over a private UTXO pool
///
/// The handler never shares its pool: it copies the pool it is built from, and
/// epochs only ever touch that copy.
#[derive(Debug, Clone)]
pub struct TxHandler<V = EcdsaVerifier> {
    pool: UtxoPool,
    validator: Validator<V>,
}

impl TxHandler {
    /// Creates a handler over a copy of `pool`, verifying ECDSA signatures
    pub fn new(pool: &UtxoPool) -> Self {
        Self::with_verifier(pool, EcdsaVerifier)
    }
}

impl<V: CredentialVerifier> TxHandler<V> {
    pub fn with_verifier(pool: &UtxoPool, verifier: V) -> Self {
        Self {
            pool: pool.clone(),
            validator: Validator::new(verifier),
        }
    }

    /// Checks `tx` against the current pool
    pub fn is_valid(&self, tx: &Transaction) -> bool {
        self.validator.is_valid(&self.pool, tx)
    }

    /// Like `is_valid`, naming the first failed check
    pub fn check(&self, tx: &Transaction) -> Result<(), Rejection> {
        self.validator.check(&self.pool, tx)
    }

    /// Handle one epoch of candidates
    ///
    /// # Returns
    /// The accepted transactions in acceptance order. Rejected candidates are simply
    /// left out; `Err` is only returned for an internal fault.
    pub fn handle_epoch(&mut self, candidates: Vec<Transaction>) -> Result<Vec<Transaction>, HandlerError> {
        Ok(self.handle_epoch_with_outcome(candidates)?.accepted)
    }

    /// Handle one epoch and report rejections and pass count alongside the accepted
    /// transactions
    ///
    /// The epoch runs on a working copy that replaces the pool only on success, so a
    /// fault leaves the pool as it was before the epoch.
    pub fn handle_epoch_with_outcome(
        &mut self,
        candidates: Vec<Transaction>,
    ) -> Result<EpochOutcome, HandlerError> {
        if candidates.is_empty() {
            return Ok(EpochOutcome::default());
        }
        let mut working = self.pool.clone();
        let outcome = resolve(&self.validator, &mut working, candidates)?;
        self.pool = working;
        Ok(outcome)
    }

    /// Read-only view of the current pool
    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }
}
