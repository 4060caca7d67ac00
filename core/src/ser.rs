//! Canonical wire (de)serialization for transactions.
//!
//! Layout, in order: version (i32 LE) → input count (varint) → inputs →
//! output count (varint) → outputs → locktime (u32 LE). Every helper here
//! has a matching `*_size` function that computes the serialized length
//! without allocating, used by [`crate::dust`] and the fee estimator.

use std::io::{Read, Write};

use crate::error::Result;
use crate::tx::{Outpoint, Transaction, TxInput, TxOutput};
use crate::varint::{
    read_varbytes, read_varint, varbytes_size, varint_size, write_varbytes, write_varint,
    DEFAULT_MAX_VARBYTES_LEN,
};

const OUTPOINT_SIZE: usize = 32 + 4;
/// version + locktime.
pub const TX_BASE_SIZE: usize = 4 + 4;

pub fn write_outpoint<W: Write>(w: &mut W, op: &Outpoint) -> Result<()> {
    w.write_all(op.tx_hash.as_bytes())?;
    w.write_all(&op.index.to_le_bytes())?;
    Ok(())
}

pub fn read_outpoint<R: Read>(r: &mut R) -> Result<Outpoint> {
    let mut hash = [0u8; 32];
    r.read_exact(&mut hash)?;
    let mut idx = [0u8; 4];
    r.read_exact(&mut idx)?;
    Ok(Outpoint::new(crate::hash::Hash32(hash), u32::from_le_bytes(idx)))
}

pub fn write_input<W: Write>(w: &mut W, input: &TxInput) -> Result<()> {
    write_outpoint(w, &input.outpoint)?;
    write_varbytes(w, &input.unlocking_script)?;
    w.write_all(&input.sequence.to_le_bytes())?;
    Ok(())
}

pub fn read_input<R: Read>(r: &mut R) -> Result<TxInput> {
    let outpoint = read_outpoint(r)?;
    let unlocking_script = read_varbytes(r, DEFAULT_MAX_VARBYTES_LEN)?;
    let mut seq = [0u8; 4];
    r.read_exact(&mut seq)?;
    Ok(TxInput {
        outpoint,
        unlocking_script,
        sequence: u32::from_le_bytes(seq),
    })
}

/// Serialized size of `input` given its *actual* unlocking script — used
/// once an input has already been signed. See [`input_size_for_script`] for
/// the pre-signing estimate based on the template of the prior locking
/// script.
pub fn input_size(input: &TxInput) -> usize {
    OUTPOINT_SIZE + varbytes_size(&input.unlocking_script) + 4
}

pub fn write_output<W: Write>(w: &mut W, output: &TxOutput) -> Result<()> {
    w.write_all(&output.value.to_le_bytes())?;
    write_varbytes(w, &output.locking_script)?;
    Ok(())
}

pub fn read_output<R: Read>(r: &mut R) -> Result<TxOutput> {
    let mut val = [0u8; 8];
    r.read_exact(&mut val)?;
    let locking_script = read_varbytes(r, DEFAULT_MAX_VARBYTES_LEN)?;
    Ok(TxOutput {
        value: u64::from_le_bytes(val),
        locking_script,
    })
}

/// `output_size(locking_script)`: 8-byte value + varint length + script.
pub fn output_size(locking_script: &[u8]) -> usize {
    8 + varbytes_size(locking_script)
}

pub fn write_tx<W: Write>(w: &mut W, tx: &Transaction) -> Result<()> {
    w.write_all(&tx.version.to_le_bytes())?;
    write_varint(w, tx.inputs.len() as u64)?;
    for input in &tx.inputs {
        write_input(w, input)?;
    }
    write_varint(w, tx.outputs.len() as u64)?;
    for output in &tx.outputs {
        write_output(w, output)?;
    }
    w.write_all(&tx.locktime.to_le_bytes())?;
    Ok(())
}

pub fn read_tx<R: Read>(r: &mut R) -> Result<Transaction> {
    let mut version = [0u8; 4];
    r.read_exact(&mut version)?;
    let input_count = read_varint(r)?;
    let mut inputs = Vec::with_capacity(input_count.min(DEFAULT_MAX_VARBYTES_LEN) as usize);
    for _ in 0..input_count {
        inputs.push(read_input(r)?);
    }
    let output_count = read_varint(r)?;
    let mut outputs = Vec::with_capacity(output_count.min(DEFAULT_MAX_VARBYTES_LEN) as usize);
    for _ in 0..output_count {
        outputs.push(read_output(r)?);
    }
    let mut locktime = [0u8; 4];
    r.read_exact(&mut locktime)?;
    Ok(Transaction {
        version: i32::from_le_bytes(version),
        inputs,
        outputs,
        locktime: u32::from_le_bytes(locktime),
    })
}

pub fn serialize_tx(tx: &Transaction) -> Vec<u8> {
    let mut buf = Vec::with_capacity(estimated_serialized_size(tx));
    // `Vec<u8>: Write` never fails.
    write_tx(&mut buf, tx).expect("serializing into a Vec cannot fail");
    buf
}

pub fn deserialize_tx(bytes: &[u8]) -> Result<Transaction> {
    read_tx(&mut &bytes[..])
}

/// Size a full serialize of `tx` would produce, computed without
/// allocating — used for sanity checks against `EstimatedSize`, which uses
/// template-based input sizes rather than the real (possibly unsigned)
/// script lengths.
pub fn estimated_serialized_size(tx: &Transaction) -> usize {
    let mut size = TX_BASE_SIZE;
    size += varint_size(tx.inputs.len() as u64);
    size += tx.inputs.iter().map(input_size).sum::<usize>();
    size += varint_size(tx.outputs.len() as u64);
    size += tx
        .outputs
        .iter()
        .map(|o| output_size(&o.locking_script))
        .sum::<usize>();
    size
}
