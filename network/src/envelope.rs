//! Signed-envelope format used for every miner-API payload.
//!
//! `spec.md` §6: `{ payload, signature, publicKey, encoding, mimetype }`,
//! where `signature` is a compact `secp256k1` ECDSA signature over
//! `SHA-256(payload_bytes)` and `publicKey` is the signer's hex-encoded
//! compressed public key.

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use obscura_core::error::{Error, Result};

/// A signed envelope as exchanged with the miner API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub payload: String,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(rename = "publicKey", default)]
    pub public_key: Option<String>,
    pub encoding: String,
    pub mimetype: String,
}

impl Envelope {
    /// Serializes `payload` to JSON and signs it with `secret_key`,
    /// producing a ready-to-send envelope.
    pub fn sign<T: Serialize>(payload: &T, secret_key: &SecretKey) -> Result<Envelope> {
        let payload_json = serde_json::to_string(payload)?;
        let secp = Secp256k1::signing_only();
        let digest = Sha256::digest(payload_json.as_bytes());
        let message = Message::from_digest_slice(&digest).map_err(Error::Secp256k1)?;
        let signature = secp.sign_ecdsa(&message, secret_key);
        let public_key = PublicKey::from_secret_key(&secp, secret_key);

        Ok(Envelope {
            payload: payload_json,
            signature: Some(hex::encode(signature.serialize_compact())),
            public_key: Some(hex::encode(public_key.serialize())),
            encoding: "UTF-8".to_string(),
            mimetype: "application/json".to_string(),
        })
    }

    /// Verifies the envelope's signature over `SHA-256(payload_bytes)`
    /// against its enclosed public key, per `spec.md` §6.
    pub fn verify(&self) -> Result<()> {
        let (sig_hex, pubkey_hex) = match (&self.signature, &self.public_key) {
            (Some(s), Some(p)) => (s, p),
            _ => return Err(Error::EnvelopeNotSigned),
        };

        let sig_bytes = hex::decode(sig_hex).map_err(|_| Error::InvalidEnvelopeSignature)?;
        let signature =
            Signature::from_compact(&sig_bytes).map_err(|_| Error::InvalidEnvelopeSignature)?;
        let pubkey_bytes = hex::decode(pubkey_hex).map_err(|_| Error::InvalidEnvelopeSignature)?;
        let public_key =
            PublicKey::from_slice(&pubkey_bytes).map_err(|_| Error::InvalidEnvelopeSignature)?;

        let digest = Sha256::digest(self.payload.as_bytes());
        let message = Message::from_digest_slice(&digest).map_err(|_| Error::InvalidEnvelopeSignature)?;

        let secp = Secp256k1::verification_only();
        secp.verify_ecdsa(&message, &signature, &public_key)
            .map_err(|_| Error::InvalidEnvelopeSignature)
    }

    /// Deserializes the enclosed JSON payload, after verifying the
    /// signature.
    pub fn decode_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        self.verify()?;
        Ok(serde_json::from_str(&self.payload)?)
    }
}
