//! In-memory transaction model.
//!
//! The wire-level [`TxInput`]/[`TxOutput`] carry only what goes on the wire.
//! Everything a builder needs but the wire format has no room for — the
//! prior output's locking script and value, dust/change/fee bookkeeping
//! flags, an opaque key hint — lives in a parallel [`InputSupplement`] /
//! [`OutputSupplement`] indexed the same way. Never store a back-reference
//! inside the wire struct itself: see `DESIGN.md` on pointer-heavy side data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Hash32;

/// An opaque identifier a caller can attach to an input or output, letting
/// `Keystore`-like collaborators know which key it corresponds to without
/// the core depending on any concrete key-storage type.
pub type KeyId = String;

/// A reference to a previous output being spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outpoint {
    pub tx_hash: Hash32,
    pub index: u32,
}

impl Outpoint {
    pub fn new(tx_hash: Hash32, index: u32) -> Self {
        Outpoint { tx_hash, index }
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.index)
    }
}

impl FromStr for Outpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (hash_part, index_part) = s
            .rsplit_once(':')
            .ok_or(Error::CorruptedData("outpoint must be hash:index"))?;
        let tx_hash: Hash32 = hash_part.parse()?;
        let index: u32 = index_part
            .parse()
            .map_err(|_| Error::CorruptedData("outpoint index is not a u32"))?;
        Ok(Outpoint { tx_hash, index })
    }
}

/// Default sequence number: no relative-locktime/RBF semantics.
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

/// A transaction input as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub outpoint: Outpoint,
    pub unlocking_script: Vec<u8>,
    pub sequence: u32,
}

impl TxInput {
    pub fn new(outpoint: Outpoint) -> Self {
        TxInput {
            outpoint,
            unlocking_script: Vec::new(),
            sequence: SEQUENCE_FINAL,
        }
    }
}

/// Per-input data needed for signing and fee math, carried outside the wire
/// structure and kept index-aligned with the `TxInput` it describes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSupplement {
    /// Locking script of the output this input spends.
    pub locking_script: Vec<u8>,
    /// Satoshi value of the output this input spends.
    pub value: u64,
    /// Opaque key hint, resolved by the caller's key store at signing time.
    pub key_id: Option<KeyId>,
}

impl InputSupplement {
    pub fn new(locking_script: Vec<u8>, value: u64) -> Self {
        InputSupplement {
            locking_script,
            value,
            key_id: None,
        }
    }

    pub fn with_key_id(mut self, key_id: impl Into<KeyId>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }
}

/// A transaction output as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: u64,
    pub locking_script: Vec<u8>,
}

impl TxOutput {
    pub fn new(value: u64, locking_script: Vec<u8>) -> Self {
        TxOutput { value, locking_script }
    }
}

/// Per-output bookkeeping flags used by fee reconciliation and dust policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSupplement {
    /// This output absorbs the leftover value during fee reconciliation.
    pub is_remainder: bool,
    /// This output's value is the dust floor; it may be replaced (never
    /// incremented) when value is later added to it.
    pub is_dust: bool,
    /// This output was synthesized by fee adjustment and may be deleted by
    /// a later adjustment pass.
    pub added_for_fee: bool,
    /// Opaque key hint for the output's eventual spender.
    pub key_id: Option<KeyId>,
}

/// A full Bitcoin-shaped transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub locktime: u32,
}

impl Default for Transaction {
    fn default() -> Self {
        Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            locktime: 0,
        }
    }
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transaction id: double-SHA-256 of the canonical serialization.
    pub fn txid(&self) -> Hash32 {
        Hash32::double_sha256(&crate::ser::serialize_tx(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outpoint_string_form_roundtrips() {
        let op = Outpoint::new(Hash32::double_sha256(b"x"), 7);
        let s = op.to_string();
        let parsed: Outpoint = s.parse().unwrap();
        assert_eq!(op, parsed);
    }
}
