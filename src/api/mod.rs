//! API Module
//!
//! This module handles the JSON-RPC API in front of the transaction handler.

mod server;


pub use server::Server;
