//! Dust policy and fee/size estimation helpers.
//!
//! `dust_limit` mirrors the reference formula exactly: the "148" is a fixed
//! stand-in for the input size that would be needed to spend the output,
//! independent of what template the output actually uses.

use crate::script::input_size_for_script;
use crate::ser::{output_size, TX_BASE_SIZE};
use crate::tx::{InputSupplement, OutputSupplement, Transaction};
use crate::varint::varint_size;

/// `floor(3 * (output_size(script) + 148) * dust_fee_rate)`, with a floor of
/// one satoshi once a fee rate is in effect (a rate of exactly zero yields a
/// dust limit of exactly one satoshi too, per `spec.md` §4.2).
pub fn dust_limit(locking_script: &[u8], dust_fee_rate: f64) -> u64 {
    let size = (output_size(locking_script) + 148) as f64;
    let limit = (3.0 * size * dust_fee_rate).floor() as i64;
    limit.max(1) as u64
}

/// `sum(input_values) - sum(output_values)`, clamped at zero.
pub fn current_fee(tx: &Transaction, input_supplements: &[InputSupplement]) -> u64 {
    let total_in: u64 = input_supplements.iter().map(|s| s.value).sum();
    let total_out: u64 = tx.outputs.iter().map(|o| o.value).sum();
    total_in.saturating_sub(total_out)
}

/// Size estimate using the per-template `InputSize` for each input (based
/// on the *prior* locking script, since the input may not be signed yet)
/// and the real serialized size for each output.
pub fn estimated_size(tx: &Transaction, input_supplements: &[InputSupplement]) -> usize {
    let mut size = TX_BASE_SIZE;
    size += varint_size(tx.inputs.len() as u64);
    size += input_supplements
        .iter()
        .map(|s| input_size_for_script(&s.locking_script))
        .sum::<usize>();
    size += varint_size(tx.outputs.len() as u64);
    size += tx
        .outputs
        .iter()
        .map(|o| output_size(&o.locking_script))
        .sum::<usize>();
    size
}

/// `floor(estimated_size * fee_rate)`, `fee_rate` in satoshis per byte.
pub fn estimated_fee(tx: &Transaction, input_supplements: &[InputSupplement], fee_rate: f64) -> u64 {
    (estimated_size(tx, input_supplements) as f64 * fee_rate).floor() as u64
}

/// Returns the index of the sole output marked `is_remainder`, if any.
pub fn remainder_index(supplements: &[OutputSupplement]) -> Option<usize> {
    supplements.iter().position(|s| s.is_remainder)
}
