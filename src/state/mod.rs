//! State Management Module
//!
//! This module provides shared, serialized access to the transaction handler.
//! The API server and the epoch orchestrator both go through it.

mod cache;
pub use cache::LedgerState;
