//! Credential verification
//!
//! The validator only needs a yes/no answer to "did the owner of this output sign
//! this payload". `CredentialVerifier` is that seam; `EcdsaVerifier` answers it with
//! secp256k1 signatures over Ethereum addresses.

use crate::Transaction;
use ethers::signers::{LocalWallet, WalletError};
use ethers::types::{Address, Signature};
use ethers::utils::hash_message;

pub trait CredentialVerifier {
    /// Returns true if `signature` over `message` was produced by `credential`
    fn verify(&self, credential: &Address, message: &[u8], signature: &Signature) -> bool;
}

/// Recovers the signer of the EIP-191 hash of the message and compares it to the
/// credential
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaVerifier;

impl CredentialVerifier for EcdsaVerifier {
    fn verify(&self, credential: &Address, message: &[u8], signature: &Signature) -> bool {
        signature.verify(message.to_vec(), *credential).is_ok()
    }
}

/// Sign `payload` the way `EcdsaVerifier` expects
pub fn sign_payload(wallet: &LocalWallet, payload: &[u8]) -> Result<Signature, WalletError> {
    wallet.sign_hash(hash_message(payload))
}

/// Sign input `index` of `tx` in place
///
/// # Returns
/// * `Ok(false)` if `tx` has no input at `index`
pub fn sign_input(wallet: &LocalWallet, tx: &mut Transaction, index: usize) -> Result<bool, WalletError> {
    let Some(payload) = tx.signing_payload(index) else {
        return Ok(false);
    };
    let signature = sign_payload(wallet, &payload)?;
    Ok(tx.set_signature(index, signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UNSIGNED;
    use ethers::signers::Signer;
    use ethers::types::H256;

    const ALICE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const BOB_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    #[test]
    fn test_owner_signature_verifies() {
        let alice: LocalWallet = ALICE_KEY.parse().unwrap();
        let signature = sign_payload(&alice, b"payload").unwrap();

        assert!(EcdsaVerifier.verify(&alice.address(), b"payload", &signature));
        assert!(!EcdsaVerifier.verify(&alice.address(), b"other payload", &signature));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let alice: LocalWallet = ALICE_KEY.parse().unwrap();
        let bob: LocalWallet = BOB_KEY.parse().unwrap();
        let signature = sign_payload(&bob, b"payload").unwrap();

        assert!(!EcdsaVerifier.verify(&alice.address(), b"payload", &signature));
        assert!(!EcdsaVerifier.verify(&alice.address(), b"payload", &UNSIGNED));
    }

    #[test]
    fn test_sign_input_out_of_range() {
        let alice: LocalWallet = ALICE_KEY.parse().unwrap();
        let mut tx = Transaction::new();
        tx.add_input(H256::repeat_byte(1), 0);

        assert!(sign_input(&alice, &mut tx, 0).unwrap());
        assert!(!sign_input(&alice, &mut tx, 1).unwrap());
        assert_ne!(tx.inputs[0].signature, UNSIGNED);
    }
}
