//! Miner-API HTTP collaborator for the Obscura BSV stack: signed-envelope
//! construction/verification and a thin client for fee quotes, transaction
//! submission, and status lookups. Owns no core invariants — see
//! `obscura-core` for the transaction/wire model this crate only transports.

pub mod envelope;
pub mod miner;

pub use envelope::Envelope;
pub use miner::{MinerClient, translate_failure};
