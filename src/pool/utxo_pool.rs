//! UTXO Pool Module
//!
//! This module implements the set of unspent transaction outputs.
//! Every mutation goes through `insert` and `remove`; there is no mutable access to
//! stored descriptors.

use crate::{GenesisEntry, TxOutput, UtxoId, error::PoolError};
use std::collections::HashMap;

/// Pool of unspent outputs keyed by their identifier
///
/// Cloning produces a fully independent copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoPool {
    utxos: HashMap<UtxoId, TxOutput>,
}

impl UtxoPool {
    /// Creates an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pool from genesis entries
    ///
    /// # Returns
    /// * `Err(PoolError::AlreadyExists)` if two entries share an identifier
    pub fn from_genesis(entries: Vec<GenesisEntry>) -> Result<Self, PoolError> {
        let mut pool = Self::new();
        for entry in entries {
            pool.insert(
                UtxoId::new(entry.tx_hash, entry.index),
                TxOutput::new(entry.value, entry.owner),
            )?;
        }
        Ok(pool)
    }

    pub fn contains(&self, id: &UtxoId) -> bool {
        self.utxos.contains_key(id)
    }

    pub fn get(&self, id: &UtxoId) -> Result<&TxOutput, PoolError> {
        self.utxos.get(id).ok_or(PoolError::NotFound(*id))
    }

    /// Adds a new output. Existing entries are never overwritten.
    pub fn insert(&mut self, id: UtxoId, output: TxOutput) -> Result<(), PoolError> {
        if self.utxos.contains_key(&id) {
            return Err(PoolError::AlreadyExists(id));
        }
        self.utxos.insert(id, output);
        Ok(())
    }

    /// Removes an output and returns its descriptor
    pub fn remove(&mut self, id: &UtxoId) -> Result<TxOutput, PoolError> {
        self.utxos.remove(id).ok_or(PoolError::NotFound(*id))
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UtxoId, &TxOutput)> {
        self.utxos.iter()
    }

    /// Sum of all stored values, widened so it cannot overflow
    pub fn total_value(&self) -> i128 {
        self.utxos.values().map(|output| output.value as i128).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::{Address, H256};

    fn utxo(byte: u8, index: u32) -> UtxoId {
        UtxoId::new(H256::repeat_byte(byte), index)
    }

    #[test]
    fn test_insert_then_get() {
        let mut pool = UtxoPool::new();
        let owner = Address::repeat_byte(0xaa);

        pool.insert(utxo(1, 0), TxOutput::new(10, owner)).unwrap();

        assert!(pool.contains(&utxo(1, 0)));
        assert_eq!(pool.get(&utxo(1, 0)).unwrap().value, 10);
        assert_eq!(pool.get(&utxo(1, 1)), Err(PoolError::NotFound(utxo(1, 1))));
    }

    #[test]
    fn test_insert_existing_fails_without_overwrite() {
        let mut pool = UtxoPool::new();
        pool.insert(utxo(1, 0), TxOutput::new(10, Address::zero())).unwrap();

        let result = pool.insert(utxo(1, 0), TxOutput::new(99, Address::zero()));

        assert_eq!(result, Err(PoolError::AlreadyExists(utxo(1, 0))));
        assert_eq!(pool.get(&utxo(1, 0)).unwrap().value, 10);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_remove_absent_fails() {
        let mut pool = UtxoPool::new();
        pool.insert(utxo(2, 3), TxOutput::new(5, Address::zero())).unwrap();

        assert_eq!(pool.remove(&utxo(2, 3)).unwrap().value, 5);
        assert_eq!(pool.remove(&utxo(2, 3)), Err(PoolError::NotFound(utxo(2, 3))));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = UtxoPool::new();
        original.insert(utxo(1, 0), TxOutput::new(10, Address::zero())).unwrap();

        let mut copy = original.clone();
        copy.remove(&utxo(1, 0)).unwrap();
        copy.insert(utxo(9, 0), TxOutput::new(1, Address::zero())).unwrap();

        assert!(original.contains(&utxo(1, 0)));
        assert!(!original.contains(&utxo(9, 0)));
        assert_eq!(original.total_value(), 10);
    }

    #[test]
    fn test_from_genesis_rejects_duplicates() {
        let entry = GenesisEntry {
            tx_hash: H256::repeat_byte(7),
            index: 0,
            value: 50,
            owner: Address::zero(),
        };

        let pool = UtxoPool::from_genesis(vec![entry.clone()]).unwrap();
        assert_eq!(pool.total_value(), 50);

        let result = UtxoPool::from_genesis(vec![entry.clone(), entry]);
        assert_eq!(result, Err(PoolError::AlreadyExists(utxo(7, 0))));
    }
}
