//! Streaming block parser.
//!
//! Reads a block's header and transactions off any `Read` source without
//! buffering the whole block, computing the Merkle root incrementally as
//! each transaction is parsed. `next_tx` is restartable: callers can stop
//! consuming transactions early and later confirm the accumulated root
//! once they've seen enough, or drive the iterator to completion and cross
//! check it against the header's committed root.

use std::io::Read;

use crate::error::{Error, Result};
use crate::hash::Hash32;
use crate::merkle::MerkleTree;
use crate::ser;
use crate::tx::Transaction;
use crate::varint::read_varint;

/// An 80-byte Bitcoin/BSV block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block: Hash32,
    pub merkle_root: Hash32,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

pub const BLOCK_HEADER_SIZE: usize = 80;

impl BlockHeader {
    pub fn read<R: Read>(r: &mut R) -> Result<BlockHeader> {
        let mut version = [0u8; 4];
        r.read_exact(&mut version)?;
        let mut prev_block = [0u8; 32];
        r.read_exact(&mut prev_block)?;
        let mut merkle_root = [0u8; 32];
        r.read_exact(&mut merkle_root)?;
        let mut timestamp = [0u8; 4];
        r.read_exact(&mut timestamp)?;
        let mut bits = [0u8; 4];
        r.read_exact(&mut bits)?;
        let mut nonce = [0u8; 4];
        r.read_exact(&mut nonce)?;
        Ok(BlockHeader {
            version: i32::from_le_bytes(version),
            prev_block: Hash32(prev_block),
            merkle_root: Hash32(merkle_root),
            timestamp: u32::from_le_bytes(timestamp),
            bits: u32::from_le_bytes(bits),
            nonce: u32::from_le_bytes(nonce),
        })
    }

    /// Double-SHA-256 of the 80-byte serialized header — the block hash.
    pub fn hash(&self) -> Hash32 {
        let mut buf = Vec::with_capacity(BLOCK_HEADER_SIZE);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(self.prev_block.as_bytes());
        buf.extend_from_slice(self.merkle_root.as_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&self.bits.to_le_bytes());
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        Hash32::double_sha256(&buf)
    }
}

/// Drives a streaming scan of a block's body, yielding transactions lazily
/// and accumulating their txids into a [`MerkleTree`] for root verification.
pub struct BlockParser<R> {
    reader: R,
    header: BlockHeader,
    tx_count: u64,
    seen: u64,
    tree: MerkleTree,
}

impl<R: Read> BlockParser<R> {
    /// Reads the header and transaction-count varint, leaving `reader`
    /// positioned at the first transaction.
    pub fn new(mut reader: R) -> Result<Self> {
        let header = BlockHeader::read(&mut reader)?;
        let tx_count = read_varint(&mut reader)?;
        Ok(BlockParser {
            reader,
            header,
            tx_count,
            seen: 0,
            tree: MerkleTree::new(),
        })
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn tx_count(&self) -> u64 {
        self.tx_count
    }

    pub fn transactions_seen(&self) -> u64 {
        self.seen
    }

    /// Parses and returns the next transaction, feeding its txid into the
    /// running Merkle tree. Returns `Ok(None)` once every transaction named
    /// by the header's count has been consumed.
    pub fn next_tx(&mut self) -> Result<Option<Transaction>> {
        if self.seen >= self.tx_count {
            return Ok(None);
        }
        let tx = ser::read_tx(&mut self.reader)?;
        self.tree.push_leaf(tx.txid());
        self.seen += 1;
        Ok(Some(tx))
    }

    /// Drives the parser to completion, returning every transaction.
    pub fn read_all(&mut self) -> Result<Vec<Transaction>> {
        let mut out = Vec::with_capacity(self.tx_count as usize);
        while let Some(tx) = self.next_tx()? {
            out.push(tx);
        }
        Ok(out)
    }

    /// The Merkle root of every transaction consumed so far. Only
    /// meaningful for comparison against the header once every transaction
    /// has been read — see [`Self::verify_merkle_root`].
    pub fn running_root(&self) -> Hash32 {
        self.tree.root()
    }

    /// Confirms every transaction named by the header's count has been
    /// consumed and that their accumulated root matches the header's
    /// committed `merkle_root`.
    pub fn verify_merkle_root(&self) -> Result<()> {
        if self.seen != self.tx_count {
            return Err(Error::CorruptedData(
                "not all transactions were read before verifying the merkle root",
            ));
        }
        if self.running_root() != self.header.merkle_root {
            return Err(Error::CorruptedData("merkle root does not match block header"));
        }
        Ok(())
    }
}
