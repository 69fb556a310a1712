//! Epoch Module
//!
//! This module turns an unordered batch of candidates into an accepted, mutually
//! compatible subset:
//! - resolve: fixed-point multi-pass greedy acceptance over a pool
//! - TxHandler: owns the pool and runs one epoch per call
//! - EpochOrchestrator: drains the candidate pool on a timer

mod handler;
mod resolver;
pub mod orchestrator;


pub use handler::TxHandler;
pub use orchestrator::{EpochOrchestrator, serve_until_stopped};
pub use resolver::{EpochOutcome, resolve};
