//! Miner-API HTTP collaborator: fee quotes, transaction submission, and
//! status lookups, per `spec.md` §6.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use obscura_core::error::{Error, Result};

use crate::envelope::Envelope;

/// One fee-rate row returned by a fee quote (e.g. "standard", "data").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeRow {
    pub fee_type: String,
    pub mining_fee_satoshis: u64,
    pub mining_fee_bytes: u64,
    pub relay_fee_satoshis: u64,
    pub relay_fee_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeQuote {
    pub api_version: String,
    pub timestamp: String,
    pub expiry_time: String,
    pub miner_id: String,
    pub current_highest_block_hash: String,
    pub current_highest_block_height: u64,
    pub fees: Vec<FeeRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub raw_tx: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub api_version: String,
    pub timestamp: String,
    pub txid: Option<String>,
    pub return_result: String,
    pub return_description: String,
    pub miner_id: String,
    pub current_highest_block_hash: String,
    pub current_highest_block_height: u64,
    #[serde(default)]
    pub conflicted_with: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxStatus {
    pub api_version: String,
    pub timestamp: String,
    pub txid: String,
    pub return_result: String,
    pub return_description: String,
    pub block_hash: Option<String>,
    pub block_height: Option<u64>,
    pub confirmations: Option<u64>,
}

/// Maps a miner failure description to a typed error, per `spec.md` §7/§8
/// scenario 7. Falls through to `UnsupportedFailure` for anything not in
/// the table, never failing to classify silently as success.
pub fn translate_failure(description: &str) -> Error {
    let d = description.to_lowercase();
    if d.contains("not enough fees") {
        Error::InsufficientFee
    } else if d.contains("txn-mempool-conflict") {
        Error::ConflictingTx
    } else if d.contains("missing inputs") {
        Error::MissingInputs
    } else if d.contains("txn-already-known") || d.contains("already in the mempool") {
        Error::AlreadyInMempool
    } else if d.contains("txn-already-confirmed") || d.contains("already in a block") {
        Error::ExistingTx
    } else if d.contains("safe mode") {
        Error::SafeMode
    } else if d.contains("not found") {
        Error::NotFound
    } else {
        Error::UnsupportedFailure(description.to_string())
    }
}

/// Thin `reqwest`-based client for a single miner endpoint. Holds no
/// connection-pool tuning or retry policy — callers that want those layer
/// them on top.
pub struct MinerClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl MinerClient {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        MinerClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            auth_token,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn with_timeout<T>(
        timeout: Duration,
        fut: impl std::future::Future<Output = reqwest::Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(Error::ServiceFailure(e.to_string())),
            Err(_) => Err(Error::Timeout),
        }
    }

    /// Fetches the miner's current fee quote.
    pub async fn get_fee_quote(&self, timeout: Duration) -> Result<(Envelope, FeeQuote)> {
        let envelope: Envelope = Self::with_timeout(timeout, async {
            self.request(reqwest::Method::GET, "/mapi/feeQuote")
                .send()
                .await?
                .json()
                .await
        })
        .await?;
        let quote = envelope.decode_payload()?;
        Ok((envelope, quote))
    }

    /// Submits a raw transaction (hex-encoded) to the miner.
    pub async fn submit_tx(&self, raw_tx_hex: String, timeout: Duration) -> Result<(Envelope, SubmitResponse)> {
        let body = SubmitRequest { raw_tx: raw_tx_hex };
        let envelope: Envelope = Self::with_timeout(timeout, async {
            self.request(reqwest::Method::POST, "/mapi/tx")
                .json(&body)
                .send()
                .await?
                .json()
                .await
        })
        .await?;
        let response: SubmitResponse = envelope.decode_payload()?;
        if response.return_result != "success" {
            return Err(translate_failure(&response.return_description));
        }
        Ok((envelope, response))
    }

    /// Fetches the status of a previously submitted transaction by txid.
    pub async fn get_tx_status(&self, txid: &str, timeout: Duration) -> Result<(Envelope, TxStatus)> {
        let path = format!("/mapi/tx/{txid}");
        let envelope: Envelope = Self::with_timeout(timeout, async {
            self.request(reqwest::Method::GET, &path).send().await?.json().await
        })
        .await?;
        let status = envelope.decode_payload()?;
        Ok((envelope, status))
    }
}
