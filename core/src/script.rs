//! Script-template recognition and the per-template size tables used for
//! fee estimation and dust policy.
//!
//! Address/script-template *parsing* in full generality is an external
//! collaborator per `spec.md` §1; what lives here is the narrow subset the
//! builder itself needs: recognising which of a handful of supported
//! templates a locking script is, so it can size an input that would spend
//! it and, later, build the matching unlocking script.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

pub const OP_DUP: u8 = 0x76;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKMULTISIG: u8 = 0xae;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_FALSE: u8 = 0x00;
pub const OP_TRUE: u8 = 0x51;

/// `HASH160(data)` = `RIPEMD160(SHA256(data))`, the address digest used by
/// P2PKH and MultiPKH.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let rip = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&rip);
    out
}

/// A recognised locking-script template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptTemplate {
    /// `OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG`.
    P2pkh { pubkey_hash: [u8; 20] },
    /// `<pubkey> OP_CHECKSIG`.
    P2pk { pubkey: Vec<u8> },
    /// k-of-n multi-pubkey-hash: `<required> <total> (<hash160>)* OP_CHECKMULTISIG`,
    /// where each signer is identified by a hash rather than a full pubkey.
    MultiPkh { required: u8, hashes: Vec<[u8; 20]> },
    /// `OP_HASH160 <20-byte hash> OP_EQUAL`. Structurally recognised but
    /// signing is not implemented — see `spec.md` §4.4.
    P2sh,
    /// Recognised-but-unsupported "pay to R puzzle hash" template.
    P2rph,
    /// Anything else, including provably unspendable data outputs.
    Unknown,
}

impl ScriptTemplate {
    /// Classifies a locking script by structural pattern matching.
    pub fn detect(script: &[u8]) -> ScriptTemplate {
        if script.len() == 25
            && script[0] == OP_DUP
            && script[1] == OP_HASH160
            && script[2] == 0x14
            && script[23] == OP_EQUALVERIFY
            && script[24] == OP_CHECKSIG
        {
            let mut h = [0u8; 20];
            h.copy_from_slice(&script[3..23]);
            return ScriptTemplate::P2pkh { pubkey_hash: h };
        }

        if script.len() == 35 && script[0] == 0x21 && script[34] == OP_CHECKSIG {
            return ScriptTemplate::P2pk {
                pubkey: script[1..34].to_vec(),
            };
        }
        if script.len() == 67 && script[0] == 0x41 && script[66] == OP_CHECKSIG {
            return ScriptTemplate::P2pk {
                pubkey: script[1..66].to_vec(),
            };
        }

        if script.len() == 23
            && script[0] == OP_HASH160
            && script[1] == 0x14
            && script[22] == OP_EQUAL
        {
            return ScriptTemplate::P2sh;
        }

        if let Some(t) = Self::detect_multi_pkh(script) {
            return t;
        }

        ScriptTemplate::Unknown
    }

    fn detect_multi_pkh(script: &[u8]) -> Option<ScriptTemplate> {
        if script.len() < 5 || script[0] != 0x01 || script[2] != 0x01 {
            return None;
        }
        let required = script[1];
        let total = script[3] as usize;
        let expected_len = 4 + total * 21 + 1;
        if script.len() != expected_len || script[script.len() - 1] != OP_CHECKMULTISIG {
            return None;
        }
        let mut hashes = Vec::with_capacity(total);
        let mut offset = 4;
        for _ in 0..total {
            if script[offset] != 0x14 {
                return None;
            }
            let mut h = [0u8; 20];
            h.copy_from_slice(&script[offset + 1..offset + 21]);
            hashes.push(h);
            offset += 21;
        }
        Some(ScriptTemplate::MultiPkh { required, hashes })
    }

    /// Builds the locking script bytes for this template, where applicable.
    pub fn to_locking_script(&self) -> Result<Vec<u8>> {
        match self {
            ScriptTemplate::P2pkh { pubkey_hash } => {
                let mut v = Vec::with_capacity(25);
                v.push(OP_DUP);
                v.push(OP_HASH160);
                v.push(0x14);
                v.extend_from_slice(pubkey_hash);
                v.push(OP_EQUALVERIFY);
                v.push(OP_CHECKSIG);
                Ok(v)
            }
            ScriptTemplate::P2pk { pubkey } => {
                let mut v = Vec::with_capacity(pubkey.len() + 2);
                v.push(pubkey.len() as u8);
                v.extend_from_slice(pubkey);
                v.push(OP_CHECKSIG);
                Ok(v)
            }
            ScriptTemplate::MultiPkh { required, hashes } => {
                let mut v = Vec::with_capacity(4 + hashes.len() * 21 + 1);
                v.push(0x01);
                v.push(*required);
                v.push(0x01);
                v.push(hashes.len() as u8);
                for h in hashes {
                    v.push(0x14);
                    v.extend_from_slice(h);
                }
                v.push(OP_CHECKMULTISIG);
                Ok(v)
            }
            ScriptTemplate::P2sh | ScriptTemplate::P2rph | ScriptTemplate::Unknown => {
                Err(Error::WrongScriptTemplate)
            }
        }
    }
}

/// Builds a P2PKH locking script for `pubkey_hash`, the common case callers
/// reach for directly rather than through [`ScriptTemplate`].
pub fn p2pkh_locking_script(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    ScriptTemplate::P2pkh {
        pubkey_hash: *pubkey_hash,
    }
    .to_locking_script()
    .expect("P2PKH template always builds")
}

/// A script beginning with `OP_RETURN` or `OP_FALSE OP_RETURN` can never be
/// spent, so dust policy does not apply to it.
pub fn is_provably_unspendable(script: &[u8]) -> bool {
    matches!(script.first(), Some(&OP_RETURN))
        || (script.len() >= 2 && script[0] == OP_FALSE && script[1] == OP_RETURN)
}

/// Maximum serialized size of an input that spends `locking_script`, using
/// the fixed per-template tables from `spec.md` §4.2. `required_signers` is
/// only consulted for `MultiPkh`; pass `0` for other templates.
pub fn input_size_for_script(locking_script: &[u8]) -> usize {
    match ScriptTemplate::detect(locking_script) {
        ScriptTemplate::P2pkh { .. } | ScriptTemplate::P2sh => 148 + 41,
        ScriptTemplate::P2pk { .. } => 74 + 41,
        ScriptTemplate::MultiPkh { required, hashes } => {
            let selectors = hashes.len();
            selectors + (required as usize) * (34 + 74) + 41
        }
        ScriptTemplate::P2rph | ScriptTemplate::Unknown => 148 + 41,
    }
}
