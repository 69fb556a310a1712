//! Epoch Registry Module
//!
//! This module provides a database registry for epoch metadata.

mod database;
pub use database::Registry;
