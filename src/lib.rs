//! This crate implements a UTXO transaction handler: per-transaction validation
//! against a pool of unspent outputs, and epoch resolution that accepts a
//! mutually compatible subset of candidate transactions and applies it to the pool.
//! Around that core it provides the pieces of a small node: configuration, a
//! candidate queue, an epoch orchestrator, an epoch registry and a JSON-RPC API.

pub mod types; // Transactions, UTXO identifiers, rejections and metadata types.
pub mod error; // Pool and handler fault types.
pub mod pool; // The UTXO pool and the queue of pending candidates.
pub mod validation; // Per-transaction checks and credential verification.
pub mod epoch; // Epoch resolution, the transaction handler and its orchestrator.
pub mod state; // Shared access to the handler for async callers.
pub mod registry; // Persistent epoch metadata.
pub mod api; // JSON-RPC API.
pub mod config; // Defines and loads node configuration.

#[cfg(test)]
mod testing;

// Re-export commonly used types for easier access.
pub use types::*;
pub use config::Config;
pub use epoch::{EpochOutcome, TxHandler};
pub use error::{HandlerError, PoolError};
pub use pool::UtxoPool;
