//! Batch Resolver Module
//!
//! Selects a mutually compatible subset of candidate transactions and applies it to
//! the pool with fixed-point multi-pass greedy acceptance:
//!
//! 1. Scan the remaining candidates in submission order
//! 2. Accept every candidate valid against the pool as it stands at that moment,
//!    applying it before the next candidate is examined
//! 3. Repeat while a pass accepts something
//!
//! A candidate spending an output produced by a later-submitted candidate validates
//! on a later pass, once its producer has been applied. A candidate claiming an
//! output consumed during this epoch is rejected for good.

use crate::{
    Rejection, Transaction, UtxoId,
    error::HandlerError,
    pool::UtxoPool,
    validation::{CredentialVerifier, Validator},
};
use ethers::types::H256;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Result of one epoch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpochOutcome {
    /// Accepted transactions in acceptance order
    pub accepted: Vec<Transaction>,
    /// Content hash and final reason for every candidate not accepted, in
    /// submission order
    pub rejected: Vec<(H256, Rejection)>,
    /// Number of full passes over the candidates
    pub passes: usize,
}

struct Candidate {
    position: usize,
    tx_hash: H256,
    tx: Transaction,
    last_rejection: Option<Rejection>,
}

/// Resolve one epoch of candidates against `pool`, mutating it in place
///
/// # Returns
/// * `Ok(EpochOutcome)` - the pool reflects exactly the accepted transactions
/// * `Err(HandlerError)` - an internal fault; the pool must be discarded
pub fn resolve<V: CredentialVerifier>(
    validator: &Validator<V>,
    pool: &mut UtxoPool,
    candidates: Vec<Transaction>,
) -> Result<EpochOutcome, HandlerError> {
    let max_passes = candidates.len() + 1;
    let mut remaining: Vec<Candidate> = candidates
        .into_iter()
        .enumerate()
        .map(|(position, tx)| Candidate {
            position,
            tx_hash: tx.content_hash(),
            tx,
            last_rejection: None,
        })
        .collect();

    let mut spent: HashSet<UtxoId> = HashSet::new();
    let mut accepted_hashes: HashSet<H256> = HashSet::new();
    let mut accepted = Vec::new();
    let mut rejected: Vec<(usize, H256, Rejection)> = Vec::new();
    let mut passes = 0;

    while !remaining.is_empty() && passes < max_passes {
        passes += 1;
        let mut progress = false;
        let mut retry = Vec::with_capacity(remaining.len());

        for mut candidate in std::mem::take(&mut remaining) {
            // An identical transaction may only be applied once per epoch, even if
            // the outputs of the first copy have been spent in the meantime
            if accepted_hashes.contains(&candidate.tx_hash) {
                let rejection = Rejection::AlreadyAccepted { tx_hash: candidate.tx_hash };
                warn!("Transaction {:?} rejected: {}", candidate.tx_hash, rejection);
                rejected.push((candidate.position, candidate.tx_hash, rejection));
                continue;
            }
            if let Some(rejection) = consumed_this_epoch(pool, &spent, &candidate.tx) {
                rejected.push((candidate.position, candidate.tx_hash, rejection));
                continue;
            }

            let verdict = validator
                .check(pool, &candidate.tx)
                .and_then(|()| check_output_collision(pool, &candidate.tx, candidate.tx_hash));

            match verdict {
                Ok(()) => {
                    apply(pool, &candidate.tx, candidate.tx_hash)?;
                    spent.extend(candidate.tx.inputs().iter().map(|input| input.utxo_id()));
                    accepted_hashes.insert(candidate.tx_hash);
                    debug!("Accepted transaction {:?} on pass {}", candidate.tx_hash, passes);
                    accepted.push(candidate.tx);
                    progress = true;
                }
                Err(rejection) if rejection.is_structural() => {
                    rejected.push((candidate.position, candidate.tx_hash, rejection));
                }
                Err(rejection @ Rejection::OutputCollision { .. }) => {
                    warn!("Transaction {:?} rejected: {}", candidate.tx_hash, rejection);
                    rejected.push((candidate.position, candidate.tx_hash, rejection));
                }
                Err(rejection) => {
                    candidate.last_rejection = Some(rejection);
                    retry.push(candidate);
                }
            }
        }

        remaining = retry;
        if !progress {
            break;
        }
    }

    // Whatever is left could not be satisfied by anything accepted this epoch
    for candidate in remaining {
        if let Some(rejection) = candidate.last_rejection {
            rejected.push((candidate.position, candidate.tx_hash, rejection));
        }
    }
    rejected.sort_by_key(|(position, _, _)| *position);

    info!(
        "Epoch resolved: {} accepted, {} rejected in {} passes",
        accepted.len(),
        rejected.len(),
        passes
    );

    Ok(EpochOutcome {
        accepted,
        rejected: rejected
            .into_iter()
            .map(|(_, tx_hash, rejection)| (tx_hash, rejection))
            .collect(),
        passes,
    })
}

/// An input whose UTXO was consumed during this epoch and has not reappeared can
/// never be satisfied again.
fn consumed_this_epoch(pool: &UtxoPool, spent: &HashSet<UtxoId>, tx: &Transaction) -> Option<Rejection> {
    tx.inputs().iter().enumerate().find_map(|(index, input)| {
        let utxo = input.utxo_id();
        (spent.contains(&utxo) && !pool.contains(&utxo)).then_some(Rejection::AlreadySpent { index, utxo })
    })
}

/// Produced identifiers must be fresh. Only input-less transactions with identical
/// content can collide.
fn check_output_collision(pool: &UtxoPool, tx: &Transaction, tx_hash: H256) -> Result<(), Rejection> {
    for index in 0..tx.outputs().len() {
        let utxo = UtxoId::new(tx_hash, index as u32);
        if pool.contains(&utxo) {
            return Err(Rejection::OutputCollision { utxo });
        }
    }
    Ok(())
}

/// Consume the inputs and insert the outputs of a validated transaction.
///
/// Every operation here was checked before the call; a failure is a fault.
fn apply(pool: &mut UtxoPool, tx: &Transaction, tx_hash: H256) -> Result<(), HandlerError> {
    let fault = |source| HandlerError::Internal { tx_hash, source };

    for input in tx.inputs() {
        pool.remove(&input.utxo_id()).map_err(fault)?;
    }
    for (index, output) in tx.outputs().iter().enumerate() {
        pool.insert(UtxoId::new(tx_hash, index as u32), *output)
            .map_err(fault)?;
    }
    Ok(())
}
