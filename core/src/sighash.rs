//! BIP-143-style signature preimage assembly with a reusable per-transaction
//! hash cache.
//!
//! Computing `hashPrevouts`/`hashSequence`/`hashOutputs` once and reusing
//! them across every input's preimage is what takes signing a transaction
//! with N inputs from O(N²) hashing to O(N); see `spec.md` §2/§9.

use std::io::Write;

use crate::hash::Hash32;
use crate::tx::Transaction;

/// Hash-type bits appended (OR-ed with [`HashType::FORKID`]) to every
/// signature. `ALL`/`NONE`/`SINGLE` occupy the low byte as in upstream
/// Bitcoin; `ANYONECANPAY` and `FORKID` are independent flag bits combined
/// by bitwise OR, never compared as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashType(pub u8);

impl HashType {
    pub const ALL: u8 = 0x01;
    pub const NONE: u8 = 0x02;
    pub const SINGLE: u8 = 0x03;
    pub const ANYONE_CAN_PAY: u8 = 0x80;
    pub const FORK_ID: u8 = 0x40;

    const BASE_MASK: u8 = 0x1f;

    pub fn all() -> Self {
        HashType(Self::ALL)
    }
    pub fn none() -> Self {
        HashType(Self::NONE)
    }
    pub fn single() -> Self {
        HashType(Self::SINGLE)
    }

    pub fn anyone_can_pay(self) -> Self {
        HashType(self.0 | Self::ANYONE_CAN_PAY)
    }

    pub fn is_anyone_can_pay(self) -> bool {
        self.0 & Self::ANYONE_CAN_PAY != 0
    }

    pub fn is_single(self) -> bool {
        self.0 & Self::BASE_MASK == Self::SINGLE
    }

    pub fn is_none(self) -> bool {
        self.0 & Self::BASE_MASK == Self::NONE
    }

    /// The byte written into the signature / preimage: the base type and
    /// `ANYONE_CAN_PAY` bit as supplied, OR-ed with `FORK_ID`.
    pub fn with_fork_id(self) -> u8 {
        self.0 | Self::FORK_ID
    }
}

/// The three sub-hashes reused across every input's preimage, lazily
/// computed and cleared selectively on mutation rather than tracked with a
/// separate dirty flag per field.
#[derive(Debug, Clone, Default)]
pub struct SigHashCache {
    hash_prevouts: Option<Hash32>,
    hash_sequence: Option<Hash32>,
    hash_outputs: Option<Hash32>,
}

impl SigHashCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate the parts of the cache that depend on inputs. Unlocking
    /// script rewrites alone do not affect `hashPrevouts`/`hashSequence`
    /// (they hash only the outpoint and sequence), but structural changes —
    /// adding, removing, or reordering inputs — do.
    pub fn clear_inputs(&mut self) {
        self.hash_prevouts = None;
        self.hash_sequence = None;
    }

    /// Invalidate the outputs sub-hash. Must be called after any output is
    /// added, removed, or has its value/script mutated.
    pub fn clear_outputs(&mut self) {
        self.hash_outputs = None;
    }

    pub fn clear_all(&mut self) {
        self.hash_prevouts = None;
        self.hash_sequence = None;
        self.hash_outputs = None;
    }

    fn hash_prevouts(&mut self, tx: &Transaction) -> Hash32 {
        *self.hash_prevouts.get_or_insert_with(|| {
            let mut buf = Vec::with_capacity(tx.inputs.len() * 36);
            for input in &tx.inputs {
                buf.write_all(input.outpoint.tx_hash.as_bytes()).unwrap();
                buf.write_all(&input.outpoint.index.to_le_bytes()).unwrap();
            }
            Hash32::double_sha256(&buf)
        })
    }

    fn hash_sequence(&mut self, tx: &Transaction) -> Hash32 {
        *self.hash_sequence.get_or_insert_with(|| {
            let mut buf = Vec::with_capacity(tx.inputs.len() * 4);
            for input in &tx.inputs {
                buf.write_all(&input.sequence.to_le_bytes()).unwrap();
            }
            Hash32::double_sha256(&buf)
        })
    }

    fn hash_outputs(&mut self, tx: &Transaction) -> Hash32 {
        *self.hash_outputs.get_or_insert_with(|| {
            let mut buf = Vec::new();
            for output in &tx.outputs {
                crate::ser::write_output(&mut buf, output).expect("writing to a Vec cannot fail");
            }
            Hash32::double_sha256(&buf)
        })
    }
}

/// Computes BIP-143 preimages and digests, caching the three reusable
/// sub-hashes across calls for the same transaction.
pub struct SigHashEngine<'a> {
    tx: &'a Transaction,
    cache: &'a mut SigHashCache,
}

impl<'a> SigHashEngine<'a> {
    pub fn new(tx: &'a Transaction, cache: &'a mut SigHashCache) -> Self {
        SigHashEngine { tx, cache }
    }

    /// Assembles the exact byte sequence that gets double-SHA-256'd to form
    /// the signature digest for input `index`, spending a prior output of
    /// `value` satoshis locked by `locking_script`.
    pub fn preimage(&mut self, index: usize, locking_script: &[u8], value: u64, hash_type: HashType) -> Vec<u8> {
        let input = &self.tx.inputs[index];
        let mut buf = Vec::new();

        buf.extend_from_slice(&self.tx.version.to_le_bytes());

        if hash_type.is_anyone_can_pay() {
            buf.extend_from_slice(&[0u8; 32]);
        } else {
            buf.extend_from_slice(self.cache.hash_prevouts(self.tx).as_bytes());
        }

        if hash_type.is_anyone_can_pay() || hash_type.is_single() || hash_type.is_none() {
            buf.extend_from_slice(&[0u8; 32]);
        } else {
            buf.extend_from_slice(self.cache.hash_sequence(self.tx).as_bytes());
        }

        buf.extend_from_slice(input.outpoint.tx_hash.as_bytes());
        buf.extend_from_slice(&input.outpoint.index.to_le_bytes());

        crate::varint::write_varbytes(&mut buf, locking_script).expect("writing to a Vec cannot fail");
        buf.extend_from_slice(&value.to_le_bytes());
        buf.extend_from_slice(&input.sequence.to_le_bytes());

        if hash_type.is_single() {
            if index < self.tx.outputs.len() {
                let mut out_buf = Vec::new();
                crate::ser::write_output(&mut out_buf, &self.tx.outputs[index])
                    .expect("writing to a Vec cannot fail");
                buf.extend_from_slice(Hash32::double_sha256(&out_buf).as_bytes());
            } else {
                buf.extend_from_slice(&[0u8; 32]);
            }
        } else {
            buf.extend_from_slice(self.cache.hash_outputs(self.tx).as_bytes());
        }

        buf.extend_from_slice(&self.tx.locktime.to_le_bytes());
        buf.extend_from_slice(&(hash_type.with_fork_id() as u32).to_le_bytes());

        buf
    }

    /// `SHA-256(SHA-256(preimage))`, per `spec.md` §4.3/§9's resolution of
    /// the single-vs-double outer-hash open question.
    pub fn digest(&mut self, index: usize, locking_script: &[u8], value: u64, hash_type: HashType) -> Hash32 {
        let preimage = self.preimage(index, locking_script, value, hash_type);
        Hash32::double_sha256(&preimage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{Outpoint, TxInput, TxOutput};

    fn one_in_one_out_tx() -> Transaction {
        let mut tx = Transaction::new();
        tx.inputs.push(TxInput::new(Outpoint::new(
            Hash32::double_sha256(b"prev"),
            0,
        )));
        tx.outputs.push(TxOutput::new(500, vec![0xac]));
        tx
    }

    #[test]
    fn digest_is_stable_across_repeated_calls() {
        let tx = one_in_one_out_tx();
        let mut cache = SigHashCache::new();
        let mut engine = SigHashEngine::new(&tx, &mut cache);
        let d1 = engine.digest(0, &[0x76, 0xa9], 1000, HashType::all());
        let d2 = engine.digest(0, &[0x76, 0xa9], 1000, HashType::all());
        assert_eq!(d1, d2);
    }

    #[test]
    fn anyone_can_pay_zeroes_prevouts_hash() {
        let tx = one_in_one_out_tx();
        let mut cache = SigHashCache::new();
        let mut engine = SigHashEngine::new(&tx, &mut cache);
        let preimage = engine.preimage(0, &[], 1000, HashType::all().anyone_can_pay());
        // version (4 bytes) then 32 zero bytes for hashPrevouts.
        assert_eq!(&preimage[4..36], &[0u8; 32]);
    }

    #[test]
    fn clearing_outputs_changes_digest_after_output_mutation() {
        let mut tx = one_in_one_out_tx();
        let mut cache = SigHashCache::new();
        let d1 = SigHashEngine::new(&tx, &mut cache).digest(0, &[], 1000, HashType::all());
        tx.outputs[0].value = 999;
        cache.clear_outputs();
        let d2 = SigHashEngine::new(&tx, &mut cache).digest(0, &[], 1000, HashType::all());
        assert_ne!(d1, d2);
    }

    #[test]
    fn single_with_no_matching_output_zeroes_outputs_hash() {
        let mut tx = one_in_one_out_tx();
        tx.inputs.push(TxInput::new(Outpoint::new(
            Hash32::double_sha256(b"prev2"),
            1,
        )));
        let mut cache = SigHashCache::new();
        let mut engine = SigHashEngine::new(&tx, &mut cache);
        // index 1 has no matching output (only one output exists).
        let preimage = engine.preimage(1, &[], 1000, HashType::single());
        let tail_start = preimage.len() - 32 - 4 - 4;
        assert_eq!(&preimage[tail_start..tail_start + 32], &[0u8; 32]);
    }
}
