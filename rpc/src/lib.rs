//! Thin JSON-RPC façade exposing `build`, `fund`, `sign`, and `broadcast` as
//! RPC methods, for use by indexers and services that would rather not link
//! the core crate directly.
//!
//! Each in-progress transaction lives server-side under a session id
//! returned by `build`; later calls reference it by that id. The server
//! holds no consensus state of its own — it is a thin wrapper over
//! `obscura_core::TxBuilder` and `obscura_wallet::Keystore`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use jsonrpsee::core::{async_trait, RpcResult};
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::types::ErrorObjectOwned;
use serde::{Deserialize, Serialize};

use obscura_core::ser;
use obscura_core::tx::KeyId;
use obscura_core::{SpendableOutput, TxBuilder};
use obscura_network::MinerClient;
use obscura_wallet::Keystore;

fn rpc_err(err: obscura_core::error::Error) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(-32000, err.to_string(), None::<()>)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSpec {
    pub locking_script_hex: String,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    pub fee_rate: f64,
    pub dust_fee_rate: f64,
    pub outputs: Vec<OutputSpec>,
    pub change_locking_script_hex: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub outpoint: String,
    pub locking_script_hex: String,
    pub value: u64,
    pub key_id: Option<KeyId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundRequest {
    pub session_id: String,
    pub candidates: Vec<CandidateSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignResponse {
    pub used_key_ids: Vec<KeyId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastRequest {
    pub session_id: String,
    pub miner_base_url: String,
    pub auth_token: Option<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub txid: Option<String>,
}

#[rpc(server)]
pub trait Obscura {
    #[method(name = "build")]
    fn build(&self, req: BuildRequest) -> RpcResult<String>;

    #[method(name = "fund")]
    fn fund(&self, req: FundRequest) -> RpcResult<()>;

    #[method(name = "sign")]
    fn sign(&self, session_id: String) -> RpcResult<SignResponse>;

    #[method(name = "broadcast")]
    async fn broadcast(&self, req: BroadcastRequest) -> RpcResult<BroadcastResponse>;
}

pub struct ObscuraRpcServer {
    sessions: Mutex<HashMap<String, TxBuilder>>,
    next_id: AtomicU64,
    keystore: Keystore,
}

impl ObscuraRpcServer {
    pub fn new(keystore: Keystore) -> Self {
        ObscuraRpcServer {
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            keystore,
        }
    }

    pub fn keystore_mut(&mut self) -> &mut Keystore {
        &mut self.keystore
    }
}

#[async_trait]
impl ObscuraServer for ObscuraRpcServer {
    fn build(&self, req: BuildRequest) -> RpcResult<String> {
        let mut builder = TxBuilder::new(req.fee_rate, req.dust_fee_rate);
        if let Some(script_hex) = &req.change_locking_script_hex {
            let script = hex::decode(script_hex)
                .map_err(|_| ErrorObjectOwned::owned(-32602, "invalid change script hex", None::<()>))?;
            builder.set_change_locking_script(script, None);
        }
        for out in req.outputs {
            let script = hex::decode(&out.locking_script_hex)
                .map_err(|_| ErrorObjectOwned::owned(-32602, "invalid output script hex", None::<()>))?;
            builder.add_output(script, out.value).map_err(rpc_err)?;
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        self.sessions.lock().unwrap().insert(id.clone(), builder);
        Ok(id)
    }

    fn fund(&self, req: FundRequest) -> RpcResult<()> {
        let mut candidates = Vec::with_capacity(req.candidates.len());
        for c in &req.candidates {
            let outpoint = c
                .outpoint
                .parse()
                .map_err(|_| ErrorObjectOwned::owned(-32602, "invalid outpoint", None::<()>))?;
            let locking_script = hex::decode(&c.locking_script_hex)
                .map_err(|_| ErrorObjectOwned::owned(-32602, "invalid candidate script hex", None::<()>))?;
            candidates.push(SpendableOutput {
                outpoint,
                locking_script,
                value: c.value,
                key_id: c.key_id.clone(),
            });
        }

        let mut sessions = self.sessions.lock().unwrap();
        let builder = sessions
            .get_mut(&req.session_id)
            .ok_or_else(|| ErrorObjectOwned::owned(-32001, "unknown session", None::<()>))?;
        builder.add_funding(&candidates).map_err(rpc_err)
    }

    fn sign(&self, session_id: String) -> RpcResult<SignResponse> {
        let mut sessions = self.sessions.lock().unwrap();
        let builder = sessions
            .get_mut(&session_id)
            .ok_or_else(|| ErrorObjectOwned::owned(-32001, "unknown session", None::<()>))?;
        let used_key_ids = builder.sign(&self.keystore).map_err(rpc_err)?;
        Ok(SignResponse { used_key_ids })
    }

    async fn broadcast(&self, req: BroadcastRequest) -> RpcResult<BroadcastResponse> {
        let raw_tx_hex = {
            let sessions = self.sessions.lock().unwrap();
            let builder = sessions
                .get(&req.session_id)
                .ok_or_else(|| ErrorObjectOwned::owned(-32001, "unknown session", None::<()>))?;
            hex::encode(ser::serialize_tx(builder.transaction()))
        };

        let client = MinerClient::new(req.miner_base_url, req.auth_token);
        let (_, response) = client
            .submit_tx(raw_tx_hex, Duration::from_millis(req.timeout_ms))
            .await
            .map_err(rpc_err)?;
        Ok(BroadcastResponse { txid: response.txid })
    }
}
