//! In-memory `secp256k1` key storage implementing `obscura_core::KeyLookup`.
//!
//! `spec.md` treats EC key storage as an opaque dependency (§1); `Keystore`
//! is this crate's concrete (if minimal) implementation of that dependency,
//! grounded in the teacher's `wallet` crate structure but ported from
//! `ed25519-dalek` to `secp256k1`, the curve Bitcoin-shaped signing
//! actually needs.

use std::collections::HashMap;

use secp256k1::rand::rngs::OsRng;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};

use obscura_core::error::{Error, Result};
use obscura_core::keys::KeyLookup;
use obscura_core::script::hash160;
use obscura_core::tx::KeyId;

struct StoredKey {
    secret: SecretKey,
    public: PublicKey,
}

/// An in-memory map from an opaque [`KeyId`] to a `secp256k1` keypair.
pub struct Keystore {
    secp: Secp256k1<secp256k1::All>,
    keys: HashMap<KeyId, StoredKey>,
}

impl Keystore {
    pub fn new() -> Self {
        Keystore {
            secp: Secp256k1::new(),
            keys: HashMap::new(),
        }
    }

    /// Generates a fresh keypair, stores it under `key_id`, and returns its
    /// compressed public-key bytes.
    pub fn generate(&mut self, key_id: impl Into<KeyId>) -> Vec<u8> {
        let mut rng = OsRng;
        let (secret, public) = self.secp.generate_keypair(&mut rng);
        let bytes = public.serialize().to_vec();
        self.keys.insert(key_id.into(), StoredKey { secret, public });
        bytes
    }

    /// Imports an existing secret key under `key_id`.
    pub fn import(&mut self, key_id: impl Into<KeyId>, secret: SecretKey) {
        let public = PublicKey::from_secret_key(&self.secp, &secret);
        self.keys.insert(key_id.into(), StoredKey { secret, public });
    }

    /// `HASH160(pubkey)` for an already-stored key, the address digest
    /// `obscura_core::script::p2pkh_locking_script` expects.
    pub fn pubkey_hash(&self, key_id: &str) -> Option<[u8; 20]> {
        self.keys.get(key_id).map(|k| hash160(&k.public.serialize()))
    }
}

impl Default for Keystore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyLookup for Keystore {
    fn find_p2pkh(&self, pubkey_hash: &[u8; 20]) -> Option<KeyId> {
        self.keys
            .iter()
            .find(|(_, k)| hash160(&k.public.serialize()) == *pubkey_hash)
            .map(|(id, _)| id.clone())
    }

    fn find_p2pk(&self, pubkey: &[u8]) -> Option<KeyId> {
        self.keys
            .iter()
            .find(|(_, k)| k.public.serialize().as_slice() == pubkey)
            .map(|(id, _)| id.clone())
    }

    fn public_key_bytes(&self, key_id: &str) -> Option<Vec<u8>> {
        self.keys.get(key_id).map(|k| k.public.serialize().to_vec())
    }

    fn sign(&self, key_id: &str, digest: &[u8; 32]) -> Result<Vec<u8>> {
        let stored = self.keys.get(key_id).ok_or(Error::MissingPrivateKey)?;
        let message = Message::from_digest(*digest);
        let signature: Signature = self.secp.sign_ecdsa_low_r(&message, &stored.secret);
        Ok(signature.serialize_der().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_round_trips_through_find_p2pkh() {
        let mut store = Keystore::new();
        let pubkey = store.generate("k1");
        let hash = hash160(&pubkey);
        assert_eq!(store.find_p2pkh(&hash), Some("k1".to_string()));
    }

    #[test]
    fn sign_produces_der_signature_verifiable_against_public_key() {
        let mut store = Keystore::new();
        store.generate("k1");
        let digest = [7u8; 32];
        let der = store.sign("k1", &digest).unwrap();

        let secp = Secp256k1::verification_only();
        let sig = Signature::from_der(&der).unwrap();
        let message = Message::from_digest(digest);
        let pubkey_bytes = store.public_key_bytes("k1").unwrap();
        let pubkey = PublicKey::from_slice(&pubkey_bytes).unwrap();
        assert!(secp.verify_ecdsa(&message, &sig, &pubkey).is_ok());
    }

    #[test]
    fn missing_key_id_errors() {
        let store = Keystore::new();
        assert!(matches!(store.sign("absent", &[0u8; 32]), Err(Error::MissingPrivateKey)));
    }
}
