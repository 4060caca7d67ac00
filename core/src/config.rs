//! Fee and dust-policy configuration for `TxBuilder`.
//!
//! The [`Config`] struct centralises tunable parameters — fee rate, dust
//! fee rate, and the fee-reconciliation round cap. It is constructed via the
//! [`ConfigBuilder`] using the fluent builder pattern, enabling callers to
//! customise only the fields they care about while keeping sensible defaults.
//!
//! All fields are `pub` so read-only access is ergonomic, however mutation
//! should occur through the builder to preserve validation invariants.
//!
//! ```
//! use obscura_core::config::Config;
//!
//! let cfg = Config::default();
//! assert_eq!(cfg.max_sign_rounds, 3);
//! ```

use serde::{Deserialize, Serialize};

/// Tunable fee/dust parameters shared across a `TxBuilder` session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Satoshis per byte used for fee estimation.
    pub fee_rate: f64,

    /// Satoshis per byte used for the dust-limit formula; may differ from
    /// `fee_rate` when a miner quotes a separate relay-dust rate.
    pub dust_fee_rate: f64,

    /// Maximum number of fee-adjustment/re-sign passes `TxBuilder::sign`
    /// will attempt before accepting whatever deviation remains.
    pub max_sign_rounds: u32,

    /// Acceptable fee deviation as a fraction of the estimated fee.
    pub fee_tolerance_fraction: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fee_rate: 0.5,
            dust_fee_rate: 0.25,
            max_sign_rounds: 3,
            fee_tolerance_fraction: 0.05,
        }
    }
}

/// Fluent builder for [`Config`].
pub struct ConfigBuilder {
    inner: Config,
}

impl ConfigBuilder {
    /// Starts a new builder pre-populated with [`Config::default`].
    pub fn new() -> Self {
        Self { inner: Config::default() }
    }

    pub fn fee_rate(mut self, rate: f64) -> Self {
        self.inner.fee_rate = rate;
        self
    }

    pub fn dust_fee_rate(mut self, rate: f64) -> Self {
        self.inner.dust_fee_rate = rate;
        self
    }

    pub fn max_sign_rounds(mut self, rounds: u32) -> Self {
        self.inner.max_sign_rounds = rounds;
        self
    }

    pub fn fee_tolerance_fraction(mut self, fraction: f64) -> Self {
        self.inner.fee_tolerance_fraction = fraction;
        self
    }

    /// Consumes the builder returning an immutable configuration value.
    pub fn finish(self) -> Config {
        self.inner
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
