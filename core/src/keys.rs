//! The signing seam between `TxBuilder` and an opaque EC-key collaborator.
//!
//! `spec.md` §1 treats key storage, signing and public-key derivation as an
//! external dependency; `KeyLookup` is the capability trait that seam takes
//! the shape of, following the "dynamic-dispatch adapter" pattern from
//! `DESIGN.md` rather than giving `obscura-core` a hard dependency on any
//! concrete wallet/keystore type.

use crate::error::Result;
use crate::tx::KeyId;

/// Everything `TxBuilder::sign` needs from a key store, expressed as a
/// trait so the core crate never depends on how keys are actually held.
pub trait KeyLookup {
    /// Returns the id of the key whose `HASH160(pubkey)` equals `pubkey_hash`.
    fn find_p2pkh(&self, pubkey_hash: &[u8; 20]) -> Option<KeyId>;

    /// Returns the id of the key whose raw public-key bytes equal `pubkey`.
    fn find_p2pk(&self, pubkey: &[u8]) -> Option<KeyId>;

    /// Raw (compressed, 33-byte) public-key bytes for `key_id`.
    fn public_key_bytes(&self, key_id: &str) -> Option<Vec<u8>>;

    /// Signs the 32-byte sighash digest with `key_id`'s private key,
    /// returning a DER-encoded ECDSA signature *without* the trailing
    /// hash-type byte — callers append that themselves when building the
    /// unlocking script.
    fn sign(&self, key_id: &str, digest: &[u8; 32]) -> Result<Vec<u8>>;
}
