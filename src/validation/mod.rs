//! Transaction Validation Module
//!
//! This module decides whether a single transaction may be applied to a pool.
//! Performs existence, signature, double-claim, non-negative output and value
//! conservation checks.

mod validator;
mod verifier;


pub use validator::Validator;
pub use verifier::{CredentialVerifier, EcdsaVerifier, sign_input, sign_payload};
