use super::{HasherExtensions, PreimageWriter};
use crate::tx::{Transaction, TransactionId, TransactionInput, TransactionOutpoint, TransactionOutput};
use kastx_hashes::{Hash, Hasher, HasherBase};

bitflags::bitflags! {
    /// A bitmask defining which transaction fields we want to encode and which to ignore.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TxEncodingFlags: u8 {
        const FULL = 0;
        const EXCLUDE_SIGNATURE_SCRIPT = 1 << 0;
    }
}

/// Returns the transaction hash. Note that this is different than the transaction ID.
pub fn hash(tx: &Transaction) -> Hash {
    let mut hasher = kastx_hashes::TransactionHash::new();
    write_transaction(&mut hasher, tx, TxEncodingFlags::FULL);
    hasher.finalize()
}

/// Not intended for direct use by clients. Instead use `tx.id()`
pub fn id(tx: &Transaction) -> TransactionId {
    let mut hasher = kastx_hashes::TransactionID::new();
    // Encode the transaction, replace signature script with an empty array and skip sigop counts
    write_transaction(&mut hasher, tx, TxEncodingFlags::EXCLUDE_SIGNATURE_SCRIPT);
    hasher.finalize()
}

/// Serializes the transaction with the same framing the hashes use.
pub fn encode(tx: &Transaction, encoding_flags: TxEncodingFlags) -> Vec<u8> {
    let mut writer = PreimageWriter::default();
    write_transaction(&mut writer, tx, encoding_flags);
    writer.into_bytes()
}

/// Write the transaction into the provided hasher according to the encoding flags
fn write_transaction<T: HasherBase>(hasher: &mut T, tx: &Transaction, encoding_flags: TxEncodingFlags) {
    hasher.update(tx.version.to_le_bytes()).write_len(tx.inputs.len());
    for input in tx.inputs.iter() {
        write_input(hasher, input, encoding_flags);
    }

    hasher.write_len(tx.outputs.len());
    for output in tx.outputs.iter() {
        write_output(hasher, output);
    }

    hasher
        .update(tx.lock_time.to_le_bytes())
        .update(tx.subnetwork_id)
        .update(tx.gas.to_le_bytes())
        .write_var_bytes(&tx.payload);
}

#[inline(always)]
fn write_input<T: HasherBase>(hasher: &mut T, input: &TransactionInput, encoding_flags: TxEncodingFlags) {
    write_outpoint(hasher, &input.previous_outpoint);
    if !encoding_flags.contains(TxEncodingFlags::EXCLUDE_SIGNATURE_SCRIPT) {
        hasher.write_var_bytes(input.signature_script.as_slice()).update([input.sig_op_count]);
    } else {
        hasher.write_var_bytes(&[]);
    }
    hasher.update(input.sequence.to_le_bytes());
}

#[inline(always)]
fn write_outpoint<T: HasherBase>(hasher: &mut T, outpoint: &TransactionOutpoint) {
    hasher.update(outpoint.transaction_id).update(outpoint.index.to_le_bytes());
}

#[inline(always)]
fn write_output<T: HasherBase>(hasher: &mut T, output: &TransactionOutput) {
    hasher
        .update(output.value.to_le_bytes())
        .update(output.script_public_key.version().to_le_bytes())
        .write_var_bytes(output.script_public_key.script());
}
