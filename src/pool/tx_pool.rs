//! Candidate Pool Module
//!
//! This module implements the queue of candidate transactions waiting for the next
//! epoch. Submission order is preserved because it is the scan order the resolver
//! uses to break double-spend ties.

use crate::Transaction;
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Pool for pending candidate transactions
///
/// Stores submitted transactions in a FIFO queue until the orchestrator drains them
/// into an epoch. Protected by RwLock for concurrent access.
pub struct CandidatePool {
    /// Queue of pending candidates, protected by a read-write lock
    transactions: RwLock<VecDeque<Transaction>>,
}

impl CandidatePool {
    /// Creates a new empty candidate pool
    pub fn new() -> Self {
        Self {
            transactions: RwLock::new(VecDeque::new()),
        }
    }

    /// Add a candidate to the back of the queue
    ///
    /// Called by the API server for every `sendTransaction` request that is not
    /// structurally invalid.
    pub async fn add(&self, tx: Transaction) {
        let mut txs = self.transactions.write().await;
        txs.push_back(tx);
    }

    /// Removes and returns up to `max` candidates from the front of the queue
    ///
    /// # Returns
    /// The oldest candidates in submission order (fewer if the pool holds less)
    pub async fn take_pending(&self, max: usize) -> Vec<Transaction> {
        let mut txs = self.transactions.write().await;
        let len = txs.len();
        txs.drain(..max.min(len)).collect()
    }

    pub async fn len(&self) -> usize {
        self.transactions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.transactions.read().await.is_empty()
    }
}

impl Default for CandidatePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Address;

    fn candidate(value: i64) -> Transaction {
        let mut tx = Transaction::new();
        tx.add_output(value, Address::zero());
        tx
    }

    #[tokio::test]
    async fn test_take_pending_preserves_submission_order() {
        let pool = CandidatePool::new();
        for value in [3, 1, 2] {
            pool.add(candidate(value)).await;
        }

        let first = pool.take_pending(2).await;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].outputs[0].value, 3);
        assert_eq!(first[1].outputs[0].value, 1);

        let rest = pool.take_pending(10).await;
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].outputs[0].value, 2);
        assert!(pool.is_empty().await);
    }
}
