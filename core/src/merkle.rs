//! Incremental Merkle tree over a transaction set.
//!
//! Leaves (txids) arrive one at a time via [`MerkleTree::push_leaf`] as a
//! block streams in; the root and any tracked leaf's authentication path are
//! derived from the accumulated leaves on demand, following the BSV rule
//! that a lone trailing node at any layer is combined with a copy of
//! itself rather than left unpaired.
//!
//! A proof carries, alongside its sibling list, the flat list of layer
//! indices at which that duplication happened. [`MerkleProof::verify`]
//! treats a right-side sibling equal to the running hash as a forged
//! duplicate-collision attempt unless that layer is declared — an
//! undisclosed duplicate is a malformed proof, not a free pass.

use std::collections::HashMap;

use crate::hash::Hash32;
use crate::tx::Transaction;

/// One step of a Merkle authentication path: the sibling hash and which
/// side of the combination it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// An authentication path from a leaf to a root, plus the layers (0 =
/// leaf layer) at which the sibling is a duplicate of the running hash
/// rather than a distinct node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    pub leaf: Hash32,
    pub path: Vec<(Side, Hash32)>,
    pub duplicate_layers: Vec<u32>,
}

impl MerkleProof {
    /// Recomputes the root this proof implies and compares it to `root`.
    ///
    /// A right-side sibling equal to the running hash at a layer not
    /// listed in `duplicate_layers` is rejected outright: an undeclared
    /// duplicate is exactly the second-preimage ambiguity the BSV rule
    /// exists to avoid, so a prover doesn't get to assert one unchecked.
    /// A layer declared as a duplicate that turns out not to be one, or
    /// that lands on the left side, is rejected the same way.
    pub fn verify(&self, root: &Hash32) -> bool {
        let mut current = self.leaf;
        for (layer, (side, sibling)) in self.path.iter().enumerate() {
            let declared = self.duplicate_layers.contains(&(layer as u32));
            let structural = *sibling == current;
            match side {
                Side::Right => {
                    if structural != declared {
                        return false;
                    }
                    current = combine(&current, sibling);
                }
                Side::Left => {
                    if declared {
                        return false;
                    }
                    current = combine(sibling, &current);
                }
            }
        }
        current == *root
    }
}

fn combine(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(left.as_bytes());
    buf.extend_from_slice(right.as_bytes());
    Hash32::double_sha256(&buf)
}

/// Builds one layer up from `layer`, duplicating a lone trailing node.
fn next_layer(layer: &[Hash32]) -> Vec<Hash32> {
    let mut out = Vec::with_capacity(layer.len().div_ceil(2));
    let mut it = layer.chunks(2);
    while let Some(pair) = it.next() {
        let right = pair.get(1).unwrap_or(&pair[0]);
        out.push(combine(&pair[0], right));
    }
    out
}

struct Finalized {
    root: Hash32,
    leaf_count: usize,
    proofs: HashMap<u64, MerkleProof>,
}

/// A Merkle tree accumulated incrementally from leaves, tracking a
/// requested set of leaf indices for later proof retrieval.
///
/// With `prune` set, [`Self::finalize`] computes the root and every
/// tracked proof once and then drops the leaf buffer entirely: the root
/// this produces is identical to the unpruned root, since both derive it
/// by folding the same leaves through the same layer function — pruning
/// only changes what's retained afterward, never the algorithm.
pub struct MerkleTree {
    leaves: Vec<Hash32>,
    tracked: Vec<u64>,
    prune: bool,
    finalized: Option<Finalized>,
}

impl MerkleTree {
    pub fn new() -> Self {
        MerkleTree {
            leaves: Vec::new(),
            tracked: Vec::new(),
            prune: false,
            finalized: None,
        }
    }

    /// Builds a complete tree from a known leaf set in one pass.
    pub fn from_leaves(leaves: &[Hash32]) -> Self {
        MerkleTree {
            leaves: leaves.to_vec(),
            tracked: Vec::new(),
            prune: false,
            finalized: None,
        }
    }

    /// Builds a tree from a block's transactions, hashing each to its txid.
    pub fn from_transactions(txs: &[Transaction]) -> Self {
        Self::from_leaves(&txs.iter().map(Transaction::txid).collect::<Vec<_>>())
    }

    /// Enables pruning: once [`Self::finalize`] is called, interior hashes
    /// (everything but the root and any tracked proofs) are dropped.
    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    /// Marks a leaf index to have its authentication path retrievable via
    /// [`Self::proof_for`] once leaves stop arriving. Has no effect once
    /// the tree has been pruned.
    pub fn track(&mut self, leaf_index: u64) {
        if self.finalized.is_some() {
            return;
        }
        if !self.tracked.contains(&leaf_index) {
            self.tracked.push(leaf_index);
        }
    }

    /// Appends the next leaf in sequence. A no-op once the tree has been
    /// finalized — finalizing marks the leaf set as complete.
    pub fn push_leaf(&mut self, leaf: Hash32) {
        if self.finalized.is_some() {
            return;
        }
        self.leaves.push(leaf);
    }

    /// Computes the root and every tracked proof, then — if `prune` was
    /// set — discards the leaf buffer. Idempotent; later calls are no-ops.
    pub fn finalize(&mut self) {
        if self.finalized.is_some() {
            return;
        }
        let root = self.root_uncached();
        let leaf_count = self.leaves.len();
        let proofs = self
            .tracked
            .iter()
            .filter_map(|&idx| self.proof_for_uncached(idx).map(|p| (idx, p)))
            .collect();
        self.finalized = Some(Finalized {
            root,
            leaf_count,
            proofs,
        });
        if self.prune {
            self.leaves = Vec::new();
        }
    }

    pub fn leaf_count(&self) -> usize {
        match &self.finalized {
            Some(f) => f.leaf_count,
            None => self.leaves.len(),
        }
    }

    /// All layers from leaves up to (and including) the single-element root
    /// layer. Empty input yields `Hash32::ZERO` as a zero-layer tree.
    fn layers(&self) -> Vec<Vec<Hash32>> {
        if self.leaves.is_empty() {
            return vec![vec![Hash32::ZERO]];
        }
        let mut layers = vec![self.leaves.clone()];
        while layers.last().unwrap().len() > 1 {
            let next = next_layer(layers.last().unwrap());
            layers.push(next);
        }
        layers
    }

    fn root_uncached(&self) -> Hash32 {
        self.layers().last().unwrap()[0]
    }

    /// The Merkle root over every leaf pushed so far (or, once finalized,
    /// the cached root computed at finalize time).
    pub fn root(&self) -> Hash32 {
        match &self.finalized {
            Some(f) => f.root,
            None => self.root_uncached(),
        }
    }

    fn proof_for_uncached(&self, leaf_index: u64) -> Option<MerkleProof> {
        let layers = self.layers();
        let leaf = *layers.first()?.get(leaf_index as usize)?;
        let mut path = Vec::new();
        let mut duplicate_layers = Vec::new();
        let mut index = leaf_index as usize;
        for (layer_no, layer) in layers[..layers.len() - 1].iter().enumerate() {
            let sibling_index = index ^ 1;
            let (side, sibling) = if sibling_index < layer.len() {
                let side = if sibling_index > index { Side::Right } else { Side::Left };
                (side, layer[sibling_index])
            } else {
                // Lone trailing node: BSV duplicates it against itself.
                duplicate_layers.push(layer_no as u32);
                (Side::Right, layer[index])
            };
            path.push((side, sibling));
            index /= 2;
        }
        Some(MerkleProof {
            leaf,
            path,
            duplicate_layers,
        })
    }

    /// An authentication path for `leaf_index`, if it is within range. Once
    /// the tree is pruned, only tracked indices computed at finalize time
    /// remain available.
    pub fn proof_for(&self, leaf_index: u64) -> Option<MerkleProof> {
        match &self.finalized {
            Some(f) => f.proofs.get(&leaf_index).cloned(),
            None => self.proof_for_uncached(leaf_index),
        }
    }

    /// Authentication paths for every tracked leaf index, once leaves have
    /// stopped arriving.
    pub fn tracked_proofs(&self) -> Vec<MerkleProof> {
        match &self.finalized {
            Some(f) => self.tracked.iter().filter_map(|idx| f.proofs.get(idx).cloned()).collect(),
            None => self.tracked.iter().filter_map(|&idx| self.proof_for_uncached(idx)).collect(),
        }
    }
}

impl Default for MerkleTree {
    fn default() -> Self {
        Self::new()
    }
}
