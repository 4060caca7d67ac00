//! Transaction construction: output assembly, funding selection, dust
//! policy, fee reconciliation, and signing.
//!
//! `TxBuilder` owns the transaction and two parallel supplement arrays
//! (`input_supplements`, `output_supplements`) kept index-aligned with
//! `tx.inputs`/`tx.outputs` — the "pointer-heavy per-input side data"
//! pattern from `DESIGN.md` modeled as plain parallel arrays, never as
//! back-references.

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::dust::{self, dust_limit};
use crate::error::{Error, Result};
use crate::keys::KeyLookup;
use crate::script::{is_provably_unspendable, ScriptTemplate};
use crate::ser::output_size;
use crate::sighash::{HashType, SigHashCache, SigHashEngine};
use crate::tx::{InputSupplement, KeyId, Outpoint, OutputSupplement, Transaction, TxInput, TxOutput};
use crate::unlocking::{self, MultiPkhSigner};

/// A candidate output the builder may consume during `add_funding`, in the
/// order the caller's selection policy (largest-first, smallest-first,
/// random) has already sorted them.
#[derive(Debug, Clone)]
pub struct SpendableOutput {
    pub outpoint: Outpoint,
    pub locking_script: Vec<u8>,
    pub value: u64,
    pub key_id: Option<KeyId>,
}

/// Maximum number of fee-reconciliation/re-sign passes `sign` will run.
const MAX_SIGN_ROUNDS: u32 = 3;

/// Stand-in serialized size for "one more P2PKH input", used only to decide
/// whether `add_funding` needs to loop over candidates at all.
const NOMINAL_NEXT_INPUT_SIZE: f64 = 189.0;

pub struct TxBuilder {
    tx: Transaction,
    input_supplements: Vec<InputSupplement>,
    output_supplements: Vec<OutputSupplement>,
    change_locking_script: Option<Vec<u8>>,
    change_key_id: Option<KeyId>,
    fee_rate: f64,
    dust_fee_rate: f64,
    send_max: bool,
    sighash_cache: SigHashCache,
}

impl TxBuilder {
    pub fn new(fee_rate: f64, dust_fee_rate: f64) -> Self {
        TxBuilder {
            tx: Transaction::new(),
            input_supplements: Vec::new(),
            output_supplements: Vec::new(),
            change_locking_script: None,
            change_key_id: None,
            fee_rate,
            dust_fee_rate,
            send_max: false,
            sighash_cache: SigHashCache::new(),
        }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub fn input_supplements(&self) -> &[InputSupplement] {
        &self.input_supplements
    }

    pub fn output_supplements(&self) -> &[OutputSupplement] {
        &self.output_supplements
    }

    pub fn send_max(&self) -> bool {
        self.send_max
    }

    /// Adds an input spending `outpoint`. Fails with [`Error::DuplicateInput`]
    /// if the outpoint is already present.
    pub fn add_input(
        &mut self,
        outpoint: Outpoint,
        locking_script: Vec<u8>,
        value: u64,
        key_id: Option<KeyId>,
    ) -> Result<()> {
        if self.tx.inputs.iter().any(|i| i.outpoint == outpoint) {
            return Err(Error::DuplicateInput(outpoint.to_string()));
        }
        self.tx.inputs.push(TxInput::new(outpoint));
        let mut supplement = InputSupplement::new(locking_script, value);
        supplement.key_id = key_id;
        self.input_supplements.push(supplement);
        self.sighash_cache.clear_inputs();
        Ok(())
    }

    /// Adds an output. Fails with [`Error::BelowDust`] when `value` is below
    /// the dust floor for `locking_script`, unless the script is provably
    /// unspendable or this is a send-max remainder.
    pub fn add_output(&mut self, locking_script: Vec<u8>, value: u64) -> Result<()> {
        let is_remainder_candidate = self.send_max && value == 0;
        if !is_remainder_candidate && !is_provably_unspendable(&locking_script) {
            let limit = dust_limit(&locking_script, self.dust_fee_rate);
            if value < limit {
                return Err(Error::BelowDust { value, limit });
            }
        }
        self.tx.outputs.push(TxOutput::new(value, locking_script.clone()));
        let mut supplement = OutputSupplement::default();
        if let Some(change_script) = &self.change_locking_script {
            if *change_script == locking_script {
                supplement.is_remainder = true;
            }
        }
        self.output_supplements.push(supplement);
        self.sighash_cache.clear_outputs();
        Ok(())
    }

    /// Convenience for a notifier output at exactly the current dust floor.
    pub fn add_dust_output(&mut self, locking_script: Vec<u8>) -> Result<()> {
        let value = dust_limit(&locking_script, self.dust_fee_rate);
        self.tx.outputs.push(TxOutput::new(value, locking_script));
        self.output_supplements.push(OutputSupplement {
            is_dust: true,
            ..Default::default()
        });
        self.sighash_cache.clear_outputs();
        Ok(())
    }

    /// Sets `send_max` and creates a zero-value remainder output that
    /// `add_funding` will fill once every candidate has been consumed.
    pub fn add_max_output(&mut self, locking_script: Vec<u8>) -> Result<()> {
        self.send_max = true;
        self.tx.outputs.push(TxOutput::new(0, locking_script));
        self.output_supplements.push(OutputSupplement {
            is_remainder: true,
            ..Default::default()
        });
        self.sighash_cache.clear_outputs();
        Ok(())
    }

    /// Records the change locking script. Any existing output whose locking
    /// script matches is reclassified as the remainder output.
    pub fn set_change_locking_script(&mut self, script: Vec<u8>, key_id: Option<KeyId>) {
        for (output, supplement) in self.tx.outputs.iter().zip(self.output_supplements.iter_mut()) {
            if output.locking_script == script {
                supplement.is_remainder = true;
            }
        }
        self.change_locking_script = Some(script);
        self.change_key_id = key_id;
    }

    fn total_in(&self) -> u64 {
        self.input_supplements.iter().map(|s| s.value).sum()
    }

    fn total_out(&self) -> u64 {
        self.tx.outputs.iter().map(|o| o.value).sum()
    }

    fn remainder_index(&self) -> Option<usize> {
        dust::remainder_index(&self.output_supplements)
    }

    /// Adds inputs from `candidates`, in the order supplied, until the
    /// transaction balances; synthesizes or tops up a change output as
    /// needed. See `spec.md` §4.5.
    pub fn add_funding(&mut self, candidates: &[SpendableOutput]) -> Result<()> {
        if !self.send_max {
            let est_fee = dust::estimated_fee(&self.tx, &self.input_supplements, self.fee_rate);
            let projected_extra = (NOMINAL_NEXT_INPUT_SIZE * self.fee_rate).ceil() as i64;
            let needed = est_fee as i64 + projected_extra + self.total_out() as i64 - self.total_in() as i64;
            if needed <= 0 {
                debug!("add_funding: already balanced, skipping candidate scan");
                self.calculate_fee()?;
                return Ok(());
            }
        }

        let mut funded = self.send_max;
        for candidate in candidates {
            if self.tx.inputs.iter().any(|i| i.outpoint == candidate.outpoint) {
                continue;
            }
            trace!("add_funding: considering {}", candidate.outpoint);
            self.tx.inputs.push(TxInput::new(candidate.outpoint));
            self.input_supplements.push(InputSupplement {
                locking_script: candidate.locking_script.clone(),
                value: candidate.value,
                key_id: candidate.key_id.clone(),
            });
            self.sighash_cache.clear_inputs();

            if self.send_max {
                continue;
            }

            let est_fee = dust::estimated_fee(&self.tx, &self.input_supplements, self.fee_rate);
            let needed = est_fee as i64 + self.total_out() as i64 - self.total_in() as i64;
            if needed <= candidate.value as i64 {
                funded = true;
                break;
            }
        }

        if !funded {
            warn!("add_funding: exhausted candidates without reaching target");
            return Err(Error::InsufficientValue);
        }

        self.calculate_fee()?;
        Ok(())
    }

    /// Reconciles the transaction's fee against its estimated fee, per
    /// `spec.md` §4.5. Returns `true` once no further adjustment pass would
    /// help (the signing loop's "terminate" signal).
    pub fn calculate_fee(&mut self) -> Result<bool> {
        let est_fee = dust::estimated_fee(&self.tx, &self.input_supplements, self.fee_rate);
        let current = dust::current_fee(&self.tx, &self.input_supplements);
        self.adjust_fee(est_fee as i64 - current as i64)
    }

    fn adjust_fee(&mut self, delta: i64) -> Result<bool> {
        use std::cmp::Ordering;
        match delta.cmp(&0) {
            Ordering::Equal => Ok(true),
            Ordering::Greater => self.adjust_fee_underpaid(delta as u64),
            Ordering::Less => {
                self.adjust_fee_overpaid((-delta) as u64)?;
                Ok(true)
            }
        }
    }

    fn adjust_fee_underpaid(&mut self, shortfall: u64) -> Result<bool> {
        let idx = self.remainder_index().ok_or(Error::InsufficientValue)?;
        let current_value = self.tx.outputs[idx].value as i64;
        let new_value = current_value - shortfall as i64;
        if new_value < 0 {
            return Err(Error::InsufficientValue);
        }
        let limit = dust_limit(&self.tx.outputs[idx].locking_script, self.dust_fee_rate);
        if (new_value as u64) < limit {
            if self.output_supplements[idx].added_for_fee {
                debug!("adjust_fee: dropping sub-dust remainder output {idx}, absorbed by fee");
                self.tx.outputs.remove(idx);
                self.output_supplements.remove(idx);
                self.sighash_cache.clear_outputs();
                return Ok(true);
            }
            return Err(Error::InsufficientValue);
        }
        self.tx.outputs[idx].value = new_value as u64;
        self.sighash_cache.clear_outputs();
        Ok(true)
    }

    fn adjust_fee_overpaid(&mut self, overpay: u64) -> Result<()> {
        if let Some(idx) = self.remainder_index() {
            self.tx.outputs[idx].value += overpay;
            self.sighash_cache.clear_outputs();
            return Ok(());
        }

        let probe_script: &[u8] = self.change_locking_script.as_deref().unwrap_or(&[]);
        let change_output_fee = (output_size(probe_script) as f64 * self.fee_rate) as u64;
        let threshold_dust = dust_limit(probe_script, self.dust_fee_rate);
        if overpay > threshold_dust + change_output_fee {
            let script = self
                .change_locking_script
                .clone()
                .ok_or(Error::ChangeAddressNeeded)?;
            let value = overpay - change_output_fee;
            self.tx.outputs.push(TxOutput::new(value, script));
            self.output_supplements.push(OutputSupplement {
                is_remainder: true,
                added_for_fee: true,
                key_id: self.change_key_id.clone(),
                ..Default::default()
            });
            self.sighash_cache.clear_outputs();
        } else {
            trace!("adjust_fee: overpayment {overpay} below threshold, left as miner fee");
        }
        Ok(())
    }

    /// Signs every input, reconciling the fee both before and (if needed)
    /// after signing. Returns the subset of key ids that were actually
    /// used. See `spec.md` §4.5 step 6.
    pub fn sign(&mut self, keys: &dyn KeyLookup) -> Result<Vec<KeyId>> {
        let out_total = self.total_out();
        let in_total = self.total_in();
        let est_fee = dust::estimated_fee(&self.tx, &self.input_supplements, self.fee_rate);
        if in_total < out_total + est_fee {
            return Err(Error::InsufficientValue);
        }

        let current = dust::current_fee(&self.tx, &self.input_supplements);
        self.adjust_fee(est_fee as i64 - current as i64)?;

        let mut used_keys: Vec<KeyId> = Vec::new();
        for round in 0..MAX_SIGN_ROUNDS {
            used_keys.clear();
            for idx in 0..self.tx.inputs.len() {
                let used = self.sign_input(idx, keys)?;
                used_keys.extend(used);
            }

            let est_fee = dust::estimated_fee(&self.tx, &self.input_supplements, self.fee_rate);
            let current = dust::current_fee(&self.tx, &self.input_supplements);
            let deviation = (est_fee as i64 - current as i64).unsigned_abs();
            let tolerance = ((est_fee as f64 * 0.05).max(1.0)) as u64;
            if deviation <= tolerance {
                break;
            }
            if round + 1 < MAX_SIGN_ROUNDS {
                warn!("sign: fee deviation {deviation} exceeds tolerance {tolerance}, re-adjusting");
                let delta = est_fee as i64 - current as i64;
                self.adjust_fee(delta)?;
                self.sighash_cache.clear_outputs();
            }
        }

        used_keys.sort();
        used_keys.dedup();
        Ok(used_keys)
    }

    fn sign_input(&mut self, idx: usize, keys: &dyn KeyLookup) -> Result<Vec<KeyId>> {
        let locking_script = self.input_supplements[idx].locking_script.clone();
        let value = self.input_supplements[idx].value;
        let key_hint = self.input_supplements[idx].key_id.clone();
        let template = ScriptTemplate::detect(&locking_script);
        let hash_type = HashType::all();

        match template {
            ScriptTemplate::P2pkh { pubkey_hash } => {
                let key_id = match keys.find_p2pkh(&pubkey_hash) {
                    Some(id) => id,
                    None => return Err(Error::MissingPrivateKey),
                };
                if let Some(hint) = &key_hint {
                    if *hint != key_id {
                        return Err(Error::WrongPrivateKey);
                    }
                }
                let digest = SigHashEngine::new(&self.tx, &mut self.sighash_cache)
                    .digest(idx, &locking_script, value, hash_type);
                let der_sig = keys.sign(&key_id, digest.as_bytes())?;
                let pubkey = keys
                    .public_key_bytes(&key_id)
                    .ok_or(Error::MissingPrivateKey)?;
                let script = unlocking::p2pkh(&der_sig, hash_type.with_fork_id(), &pubkey);
                self.tx.inputs[idx].unlocking_script = script;
                Ok(vec![key_id])
            }
            ScriptTemplate::P2pk { pubkey } => {
                let key_id = match keys.find_p2pk(&pubkey) {
                    Some(id) => id,
                    None => return Err(Error::MissingPrivateKey),
                };
                if let Some(hint) = &key_hint {
                    if *hint != key_id {
                        return Err(Error::WrongPrivateKey);
                    }
                }
                let digest = SigHashEngine::new(&self.tx, &mut self.sighash_cache)
                    .digest(idx, &locking_script, value, hash_type);
                let der_sig = keys.sign(&key_id, digest.as_bytes())?;
                let script = unlocking::p2pk(&der_sig, hash_type.with_fork_id());
                self.tx.inputs[idx].unlocking_script = script;
                Ok(vec![key_id])
            }
            ScriptTemplate::MultiPkh { required, hashes } => {
                let digest = SigHashEngine::new(&self.tx, &mut self.sighash_cache)
                    .digest(idx, &locking_script, value, hash_type);

                struct Owned {
                    der_sig: Vec<u8>,
                    pubkey: Vec<u8>,
                }
                let mut owned: Vec<Option<Owned>> = Vec::with_capacity(hashes.len());
                let mut used_keys = Vec::new();
                let mut signed = 0u8;
                for hash in &hashes {
                    if signed >= required {
                        owned.push(None);
                        continue;
                    }
                    match keys.find_p2pkh(hash) {
                        Some(key_id) => {
                            let der_sig = keys.sign(&key_id, digest.as_bytes())?;
                            let pubkey = keys
                                .public_key_bytes(&key_id)
                                .ok_or(Error::MissingPrivateKey)?;
                            owned.push(Some(Owned { der_sig, pubkey }));
                            used_keys.push(key_id);
                            signed += 1;
                        }
                        None => owned.push(None),
                    }
                }
                if signed < required {
                    return Err(Error::MissingPrivateKey);
                }
                let signers: Vec<Option<MultiPkhSigner<'_>>> = owned
                    .iter()
                    .map(|slot| {
                        slot.as_ref().map(|o| MultiPkhSigner {
                            der_signature: &o.der_sig,
                            hash_type_byte: hash_type.with_fork_id(),
                            pubkey: &o.pubkey,
                        })
                    })
                    .collect();
                let script = unlocking::multi_pkh(&signers);
                self.tx.inputs[idx].unlocking_script = script;
                Ok(used_keys)
            }
            ScriptTemplate::P2sh | ScriptTemplate::P2rph | ScriptTemplate::Unknown => {
                Err(Error::WrongScriptTemplate)
            }
        }
    }

    /// Splits `remainder` satoshis across `change_scripts` (at least two) as
    /// pseudo-random multiples of `break_amount`, the last absorbing the
    /// rounded leftover minus each output's own byte cost, then shuffles the
    /// result. Privacy heuristic, not on the critical fee path; uses a
    /// wall-clock seed by default — see [`Self::break_value_seeded`] for the
    /// deterministic test seam.
    pub fn break_value(&self, remainder: u64, break_amount: u64, change_scripts: &[Vec<u8>]) -> Vec<TxOutput> {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos() as u64;
        self.break_value_seeded(remainder, break_amount, change_scripts, seed)
    }

    /// Deterministic variant of [`Self::break_value`] taking an explicit PRNG
    /// seed, for reproducible tests.
    pub fn break_value_seeded(
        &self,
        remainder: u64,
        break_amount: u64,
        change_scripts: &[Vec<u8>],
        seed: u64,
    ) -> Vec<TxOutput> {
        assert!(change_scripts.len() >= 2, "break_value needs at least two addresses");
        let mut rng = StdRng::seed_from_u64(seed);
        let n = change_scripts.len();
        let break_amount = break_amount.max(1);
        let average_target = (remainder / n as u64).max(break_amount);
        let base_multiple = (average_target / break_amount).max(1);
        let magnitude_table: Vec<u64> = [0.5, 1.0, 1.5, 2.0]
            .iter()
            .map(|factor| ((base_multiple as f64 * factor) as u64).max(1))
            .collect();

        let mut outputs = Vec::with_capacity(n);
        let mut allocated = 0u64;
        for script in &change_scripts[..n - 1] {
            let multiple = magnitude_table[rng.gen_range(0..magnitude_table.len())];
            let value = (multiple * break_amount).min(remainder.saturating_sub(allocated));
            allocated += value;
            outputs.push(TxOutput::new(value, script.clone()));
        }

        let per_output_fee = (output_size(&change_scripts[0]) as f64 * self.fee_rate).ceil() as u64;
        let last_value = remainder
            .saturating_sub(allocated)
            .saturating_sub(per_output_fee * n as u64);
        outputs.push(TxOutput::new(last_value, change_scripts[n - 1].clone()));

        outputs.shuffle(&mut rng);
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Hash32;
    use crate::script::{hash160, p2pkh_locking_script};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// A minimal in-memory `KeyLookup` for builder tests: one P2PKH key,
    /// signatures are not real secp256k1 signatures but fixed stand-in
    /// bytes, since the builder only cares about script *shape* here. Real
    /// signature correctness is covered in `obscura-wallet`'s tests.
    struct FakeKeys {
        pubkey_hash: [u8; 20],
        pubkey: Vec<u8>,
        calls: RefCell<HashMap<String, u32>>,
    }

    impl KeyLookup for FakeKeys {
        fn find_p2pkh(&self, pubkey_hash: &[u8; 20]) -> Option<KeyId> {
            (*pubkey_hash == self.pubkey_hash).then(|| "k1".to_string())
        }
        fn find_p2pk(&self, _pubkey: &[u8]) -> Option<KeyId> {
            None
        }
        fn public_key_bytes(&self, key_id: &str) -> Option<Vec<u8>> {
            (key_id == "k1").then(|| self.pubkey.clone())
        }
        fn sign(&self, key_id: &str, digest: &[u8; 32]) -> Result<Vec<u8>> {
            *self.calls.borrow_mut().entry(key_id.to_string()).or_insert(0) += 1;
            let mut sig = vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01];
            sig.push(digest[0]);
            Ok(sig)
        }
    }

    fn fake_keys() -> FakeKeys {
        let pubkey = vec![0x02u8; 33];
        FakeKeys {
            pubkey_hash: hash160(&pubkey),
            pubkey,
            calls: RefCell::new(HashMap::new()),
        }
    }

    fn funding_outpoint(tag: &[u8]) -> Outpoint {
        Outpoint::new(Hash32::double_sha256(tag), 0)
    }

    #[test]
    fn minimal_send_produces_change_within_tolerance() {
        let keys = fake_keys();
        let prior_script = p2pkh_locking_script(&keys.pubkey_hash);

        let mut builder = TxBuilder::new(1.1, 1.0);
        builder
            .add_input(funding_outpoint(b"utxo"), prior_script.clone(), 10_000, Some("k1".into()))
            .unwrap();
        let change_script = p2pkh_locking_script(&hash160(b"change"));
        builder.set_change_locking_script(change_script.clone(), None);
        builder
            .add_output(p2pkh_locking_script(&hash160(b"payee")), 600)
            .unwrap();
        builder.add_funding(&[]).unwrap();

        assert!(builder
            .output_supplements()
            .iter()
            .any(|s| s.is_remainder));
        let change_out = builder
            .transaction()
            .outputs
            .iter()
            .find(|o| o.locking_script == change_script)
            .unwrap();
        assert!(change_out.value > 0);

        let est_fee = dust::estimated_fee(builder.transaction(), builder.input_supplements(), 1.1);
        let current = dust::current_fee(builder.transaction(), builder.input_supplements());
        let deviation = (est_fee as i64 - current as i64).unsigned_abs();
        assert!(deviation as f64 <= (est_fee as f64 * 0.05).max(1.0));
    }

    #[test]
    fn send_max_consumes_every_candidate() {
        let keys = fake_keys();
        let prior_script = p2pkh_locking_script(&keys.pubkey_hash);
        let mut builder = TxBuilder::new(1.0, 1.0);
        builder.set_change_locking_script(p2pkh_locking_script(&hash160(b"me")), None);
        builder.add_max_output(p2pkh_locking_script(&hash160(b"me"))).unwrap();

        let candidates = vec![
            SpendableOutput {
                outpoint: funding_outpoint(b"a"),
                locking_script: prior_script.clone(),
                value: 10_000,
                key_id: Some("k1".into()),
            },
            SpendableOutput {
                outpoint: funding_outpoint(b"b"),
                locking_script: prior_script.clone(),
                value: 2_000,
                key_id: Some("k1".into()),
            },
            SpendableOutput {
                outpoint: funding_outpoint(b"c"),
                locking_script: prior_script,
                value: 1_000,
                key_id: Some("k1".into()),
            },
        ];
        builder.add_funding(&candidates).unwrap();

        assert_eq!(builder.transaction().inputs.len(), 3);
        assert_eq!(builder.transaction().outputs.len(), 1);
    }

    #[test]
    fn dust_change_is_dropped_as_fee() {
        let keys = fake_keys();
        let prior_script = p2pkh_locking_script(&keys.pubkey_hash);

        let mut builder = TxBuilder::new(1.0, 1.0);
        builder
            .add_input(funding_outpoint(b"utxo"), prior_script, 700, Some("k1".into()))
            .unwrap();
        builder.set_change_locking_script(p2pkh_locking_script(&hash160(b"change")), None);
        builder
            .add_output(p2pkh_locking_script(&hash160(b"payee")), 500)
            .unwrap();
        builder.add_funding(&[]).unwrap();

        assert_eq!(builder.transaction().outputs.len(), 1);
    }

    #[test]
    fn sign_produces_p2pkh_unlocking_script_and_reports_used_key() {
        let keys = fake_keys();
        let prior_script = p2pkh_locking_script(&keys.pubkey_hash);

        let mut builder = TxBuilder::new(1.0, 1.0);
        builder
            .add_input(funding_outpoint(b"utxo"), prior_script, 10_000, Some("k1".into()))
            .unwrap();
        builder.set_change_locking_script(p2pkh_locking_script(&hash160(b"change")), None);
        builder
            .add_output(p2pkh_locking_script(&hash160(b"payee")), 1000)
            .unwrap();
        builder.add_funding(&[]).unwrap();

        let used = builder.sign(&keys).unwrap();
        assert_eq!(used, vec!["k1".to_string()]);
        assert!(!builder.transaction().inputs[0].unlocking_script.is_empty());
    }

    #[test]
    fn break_value_splits_and_preserves_addresses() {
        let builder = TxBuilder::new(1.0, 1.0);
        let scripts = vec![
            p2pkh_locking_script(&hash160(b"a")),
            p2pkh_locking_script(&hash160(b"b")),
            p2pkh_locking_script(&hash160(b"c")),
        ];
        let outputs = builder.break_value_seeded(100_000, 1000, &scripts, 42);
        assert_eq!(outputs.len(), 3);
        for out in &outputs {
            assert!(scripts.contains(&out.locking_script));
        }
    }

    #[test]
    fn duplicate_input_is_rejected() {
        let mut builder = TxBuilder::new(1.0, 1.0);
        let op = funding_outpoint(b"utxo");
        builder.add_input(op, vec![], 1000, None).unwrap();
        let err = builder.add_input(op, vec![], 1000, None).unwrap_err();
        assert!(matches!(err, Error::DuplicateInput(_)));
    }

    #[test]
    fn below_dust_output_is_rejected_unless_op_return() {
        let mut builder = TxBuilder::new(1.0, 1.0);
        let script = p2pkh_locking_script(&hash160(b"x"));
        assert!(matches!(
            builder.add_output(script, 1).unwrap_err(),
            Error::BelowDust { .. }
        ));

        let mut builder = TxBuilder::new(1.0, 1.0);
        builder.add_output(vec![crate::script::OP_RETURN, 0x01], 0).unwrap();
    }
}
