//! Pool Module
//!
//! This module holds the two pools the handler works with:
//! - UtxoPool: the set of unspent outputs an epoch validates against and mutates
//! - CandidatePool: submitted transactions waiting for the next epoch

mod tx_pool;
mod utxo_pool;

pub use tx_pool::CandidatePool;
pub use utxo_pool::UtxoPool;
