//! Obscura Core Library
//!
//! Transaction construction and wire-format primitives for the Obscura BSV
//! stack: a codec (transaction wire format plus p2p message framing), an
//! in-memory transaction model, a BIP-143-style signing engine,
//! unlocking-script builders, a fee/funding-aware `TxBuilder`, an online
//! Merkle tree, and a streaming block parser. EC key storage,
//! address/script-template parsing beyond the templates `TxBuilder` itself
//! signs, and all network/consensus concerns are external collaborators —
//! see `obscura-wallet` and `obscura-network`.

pub mod block;
pub mod builder;
pub mod config;
pub mod dust;
pub mod error;
pub mod hash;
pub mod keys;
pub mod merkle;
pub mod msg;
pub mod script;
pub mod ser;
pub mod sighash;
pub mod tx;
pub mod unlocking;
pub mod varint;

pub use builder::{SpendableOutput, TxBuilder};
pub use error::{Error, Result};
pub use hash::Hash32;
pub use keys::KeyLookup;
pub use tx::{InputSupplement, KeyId, Outpoint, OutputSupplement, Transaction, TxInput, TxOutput};
