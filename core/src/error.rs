//! Error types for the **Obscura** core crate.
//!
//! All high-level operations return [`crate::Result`] which is a convenient
//! alias for `core::result::Result<T, Error>`.
//!
//! The enum is intentionally a closed set: callers match on variant, never
//! on the message text, which exists for logging only.
//!
//! # Examples
//!
//! ```
//! use obscura_core::{Error, Result};
//!
//! fn demo_fn(fail: bool) -> Result<()> {
//!     if fail {
//!         Err(Error::MissingPrivateKey)
//!     } else {
//!         Ok(())
//!     }
//! }
//! ```

use thiserror::Error;

/// Core crate error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Funding or fee adjustment could not balance the transaction.
    #[error("insufficient value to cover outputs and fee")]
    InsufficientValue,

    /// Overpayment exists but no change locking script was configured.
    #[error("change output required but no change locking script is set")]
    ChangeAddressNeeded,

    /// A supplied key does not match the input it was offered against.
    #[error("supplied private key does not match the required input script")]
    WrongPrivateKey,

    /// No supplied key matches an input's locking script.
    #[error("no private key matches input script")]
    MissingPrivateKey,

    /// The locking script template is not one `UnlockingScripts` supports.
    #[error("unsupported or unrecognised script template")]
    WrongScriptTemplate,

    /// Output value is below the dust floor for its locking script.
    #[error("output value {value} is below the dust limit {limit}")]
    BelowDust { value: u64, limit: u64 },

    /// The same outpoint was already added to the builder.
    #[error("outpoint {0} already present as an input")]
    DuplicateInput(String),

    /// An input was constructed without a prior-output reference.
    #[error("input is missing its prior locking script / value")]
    MissingInputData,

    /// A deadline elapsed waiting on a collaborator call.
    #[error("operation timed out")]
    Timeout,

    /// Miner already has this transaction in its mempool.
    #[error("transaction already in mempool")]
    AlreadyInMempool,

    /// Miner already has a confirmed copy of this transaction.
    #[error("transaction already confirmed")]
    ExistingTx,

    /// One or more inputs reference outputs the miner does not know about.
    #[error("transaction references missing inputs")]
    MissingInputs,

    /// Transaction conflicts with another transaction already known to the miner.
    #[error("transaction conflicts with an existing transaction")]
    ConflictingTx,

    /// Transaction fee is below the miner's accepted rate.
    #[error("insufficient fee")]
    InsufficientFee,

    /// Miner reported a generic service failure.
    #[error("miner service failure: {0}")]
    ServiceFailure(String),

    /// Miner is running in safe mode and rejected the transaction.
    #[error("miner is in safe mode")]
    SafeMode,

    /// Requested resource (transaction/status) was not found.
    #[error("not found")]
    NotFound,

    /// Miner reported a failure we could not map to a known variant.
    #[error("unrecognised miner failure: {0}")]
    UnsupportedFailure(String),

    /// Envelope signature did not verify against its enclosed public key.
    #[error("envelope signature does not verify")]
    InvalidEnvelopeSignature,

    /// Envelope is missing its signature or public key.
    #[error("envelope is not signed")]
    EnvelopeNotSigned,

    /// Wire-format decoding encountered malformed or non-canonical data.
    #[error("corrupted data: {0}")]
    CorruptedData(&'static str),

    /// A varbytes/vector length exceeded the configured safety cap.
    #[error("length {length} exceeds cap {cap}")]
    LengthCapExceeded { length: u64, cap: u64 },

    /// Underlying I/O failure while reading or writing the wire format.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// secp256k1 signing/verification primitive failure.
    #[error("secp256k1 error: {0}")]
    Secp256k1(#[from] secp256k1::Error),

    /// JSON (de)serialization failure, e.g. in the signed envelope.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenient result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
