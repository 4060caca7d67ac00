//! Unlocking-script construction for the templates `TxBuilder` can sign.
//!
//! Signature materialization is `EC_sign(key, digest) || [hash_type_byte]`;
//! assembling that into a spendable script is template-specific and lives
//! here, kept separate from [`crate::sighash`] (which only ever produces the
//! digest that gets signed).

use crate::error::{Error, Result};
use crate::script::{OP_FALSE, OP_TRUE};

/// Minimal-pushdata encoding of `data` onto `script`.
pub fn push_data(script: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        0..=0x4b => script.push(data.len() as u8),
        0x4c..=0xff => {
            script.push(0x4c);
            script.push(data.len() as u8);
        }
        0x100..=0xffff => {
            script.push(0x4d);
            script.extend_from_slice(&(data.len() as u16).to_le_bytes());
        }
        _ => {
            script.push(0x4e);
            script.extend_from_slice(&(data.len() as u32).to_le_bytes());
        }
    }
    script.extend_from_slice(data);
}

/// A DER signature with its trailing hash-type byte already appended —
/// the exact bytes a template pushes onto the unlocking script.
pub fn signature_push(der_signature: &[u8], hash_type_byte: u8) -> Vec<u8> {
    let mut sig = Vec::with_capacity(der_signature.len() + 1);
    sig.extend_from_slice(der_signature);
    sig.push(hash_type_byte);
    sig
}

/// `push(signature || hashtype), push(pubkey)`.
pub fn p2pkh(der_signature: &[u8], hash_type_byte: u8, pubkey: &[u8]) -> Vec<u8> {
    let mut script = Vec::new();
    push_data(&mut script, &signature_push(der_signature, hash_type_byte));
    push_data(&mut script, pubkey);
    script
}

/// `push(signature || hashtype)`.
pub fn p2pk(der_signature: &[u8], hash_type_byte: u8) -> Vec<u8> {
    let mut script = Vec::new();
    push_data(&mut script, &signature_push(der_signature, hash_type_byte));
    script
}

/// One potential signer's contribution to a `MultiPkh` unlocking script:
/// `None` if they did not sign.
pub struct MultiPkhSigner<'a> {
    pub der_signature: &'a [u8],
    pub hash_type_byte: u8,
    pub pubkey: &'a [u8],
}

/// Builds a k-of-n multi-pubkey-hash unlocking script. Signers are emitted
/// in *reverse* index order because the verifying locking script consumes
/// the unlocking stack top-down; for each potential signer: `OP_FALSE` if
/// they did not sign, or `push(sig||hashtype), push(pubkey), OP_TRUE` if
/// they did.
pub fn multi_pkh(signers: &[Option<MultiPkhSigner<'_>>]) -> Vec<u8> {
    let mut script = Vec::new();
    for slot in signers.iter().rev() {
        match slot {
            None => script.push(OP_FALSE),
            Some(signer) => {
                push_data(
                    &mut script,
                    &signature_push(signer.der_signature, signer.hash_type_byte),
                );
                push_data(&mut script, signer.pubkey);
                script.push(OP_TRUE);
            }
        }
    }
    script
}

/// P2SH and P2RPH are structurally sketched in `spec.md` §4.4 but not
/// implemented; callers must see a clear error rather than a silently
/// wrong (empty) unlocking script.
pub fn unsupported_template() -> Result<Vec<u8>> {
    Err(Error::WrongScriptTemplate)
}
