use crate::{
    EpochMetadata, Rejection, Transaction, TxOutput, UtxoId,
    epoch::{EpochOutcome, TxHandler},
    error::HandlerError,
    pool::UtxoPool,
};
use std::sync::Arc;
use tokio::sync::RwLock;

struct Ledger {
    handler: TxHandler,
    next_epoch_id: u64,
}

/// Shared handle to the node's transaction handler
///
/// Epochs take the write lock for their whole duration, so at most one epoch runs
/// at a time and queries never observe a half-applied epoch.
#[derive(Clone)]
pub struct LedgerState {
    ledger: Arc<RwLock<Ledger>>,
}

impl LedgerState {
    pub fn new(pool: &UtxoPool) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(Ledger {
                handler: TxHandler::new(pool),
                next_epoch_id: 1, // Epochs start from ID 1
            })),
        }
    }

    pub async fn is_valid(&self, tx: &Transaction) -> bool {
        let ledger = self.ledger.read().await;
        ledger.handler.is_valid(tx)
    }

    /// Like `is_valid`, naming the first failed check
    pub async fn check(&self, tx: &Transaction) -> Result<(), Rejection> {
        let ledger = self.ledger.read().await;
        ledger.handler.check(tx)
    }

    pub async fn get_utxo(&self, id: &UtxoId) -> Option<TxOutput> {
        let ledger = self.ledger.read().await;
        ledger.handler.pool().get(id).ok().copied()
    }

    pub async fn pool_size(&self) -> usize {
        let ledger = self.ledger.read().await;
        ledger.handler.pool().len()
    }

    /// Run one epoch and describe it for the registry
    ///
    /// Every call consumes an epoch ID, including empty epochs.
    pub async fn run_epoch(
        &self,
        candidates: Vec<Transaction>,
    ) -> Result<(EpochMetadata, EpochOutcome), HandlerError> {
        let mut ledger = self.ledger.write().await;
        let outcome = ledger.handler.handle_epoch_with_outcome(candidates)?;

        let metadata = EpochMetadata {
            epoch_id: ledger.next_epoch_id,
            accepted_count: outcome.accepted.len(),
            rejected_count: outcome.rejected.len(),
            passes: outcome.passes,
            pool_size: ledger.handler.pool().len(),
            timestamp: chrono::Utc::now().timestamp() as u64,
        };
        ledger.next_epoch_id += 1;

        Ok((metadata, outcome))
    }
}
