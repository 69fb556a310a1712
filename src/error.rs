//! Error types
//!
//! Transaction rejection is not an error (see [`crate::Rejection`]). These types cover
//! misuse of the pool and faults inside the handler itself.

use crate::UtxoId;
use thiserror::Error;

/// Failure of a single pool operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("utxo not found: {0}")]
    NotFound(UtxoId),

    #[error("utxo already exists: {0}")]
    AlreadyExists(UtxoId),
}

/// Unrecoverable fault raised while applying an accepted transaction.
///
/// Seeing one of these means the validator and the pool disagree, which is a defect
/// in the handler and not a property of the submitted transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("internal fault applying transaction {tx_hash:?}: {source}")]
    Internal {
        tx_hash: ethers::types::H256,
        #[source]
        source: PoolError,
    },
}
