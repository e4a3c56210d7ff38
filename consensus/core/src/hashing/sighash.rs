use kastx_hashes::{Hash, Hasher, HasherBase, TransactionSigningHash, TransactionSigningHashECDSA, ZERO_HASH};

use crate::{
    subnets::SUBNETWORK_ID_NATIVE,
    tx::{ScriptPublicKey, SignableTransaction, TransactionOutpoint, TransactionOutput},
};

use super::{HasherExtensions, sighash_type::SigHashType};

/// Sub-hashes shared by every input of a transaction. Computing the signature hashes of
/// all inputs with the same instance hashes each of them only once.
#[derive(Default)]
pub struct SigHashReusedValues {
    previous_outputs_hash: Option<Hash>,
    sequence_hash: Option<Hash>,
    sig_op_counts_hash: Option<Hash>,
    outputs_hash: Option<Hash>,
}

impl SigHashReusedValues {
    pub fn new() -> Self {
        Self::default()
    }
}

fn previous_outputs_hash(tx: &SignableTransaction, hash_type: SigHashType, reused_values: &mut SigHashReusedValues) -> Hash {
    if hash_type.is_sighash_anyone_can_pay() {
        return ZERO_HASH;
    }

    *reused_values.previous_outputs_hash.get_or_insert_with(|| {
        let mut hasher = TransactionSigningHash::new();
        for input in tx.tx.inputs.iter() {
            hasher.update(input.previous_outpoint.transaction_id);
            hasher.write_u32(input.previous_outpoint.index);
        }
        hasher.finalize()
    })
}

fn sequence_hash(tx: &SignableTransaction, hash_type: SigHashType, reused_values: &mut SigHashReusedValues) -> Hash {
    if hash_type.is_sighash_anyone_can_pay() {
        return ZERO_HASH;
    }

    *reused_values.sequence_hash.get_or_insert_with(|| {
        let mut hasher = TransactionSigningHash::new();
        for input in tx.tx.inputs.iter() {
            hasher.write_u64(input.sequence);
        }
        hasher.finalize()
    })
}

fn sig_op_counts_hash(tx: &SignableTransaction, hash_type: SigHashType, reused_values: &mut SigHashReusedValues) -> Hash {
    if hash_type.is_sighash_anyone_can_pay() {
        return ZERO_HASH;
    }

    *reused_values.sig_op_counts_hash.get_or_insert_with(|| {
        let mut hasher = TransactionSigningHash::new();
        for input in tx.tx.inputs.iter() {
            hasher.write_u8(input.sig_op_count);
        }
        hasher.finalize()
    })
}

fn payload_hash(tx: &SignableTransaction) -> Hash {
    if tx.tx.subnetwork_id == SUBNETWORK_ID_NATIVE {
        return ZERO_HASH;
    }

    let mut hasher = TransactionSigningHash::new();
    hasher.write_var_bytes(&tx.tx.payload);
    hasher.finalize()
}

/// Every supported hash type commits to all outputs.
fn outputs_hash(tx: &SignableTransaction, reused_values: &mut SigHashReusedValues) -> Hash {
    *reused_values.outputs_hash.get_or_insert_with(|| {
        let mut hasher = TransactionSigningHash::new();
        for output in tx.tx.outputs.iter() {
            hash_output(&mut hasher, output);
        }
        hasher.finalize()
    })
}

fn hash_outpoint(hasher: &mut impl Hasher, outpoint: &TransactionOutpoint) {
    hasher.update(outpoint.transaction_id);
    hasher.write_u32(outpoint.index);
}

fn hash_output(hasher: &mut impl Hasher, output: &TransactionOutput) {
    hasher.write_u64(output.value);
    hash_script_public_key(hasher, &output.script_public_key);
}

fn hash_script_public_key(hasher: &mut impl Hasher, script_public_key: &ScriptPublicKey) {
    hasher.write_u16(script_public_key.version());
    hasher.write_var_bytes(script_public_key.script());
}

/// Computes the signature hash of the input at `input_index`, as signed by Schnorr keys.
///
/// Panics if `input_index` is out of range.
pub fn calc_schnorr_signature_hash(
    tx: &SignableTransaction,
    input_index: usize,
    hash_type: SigHashType,
    reused_values: &mut SigHashReusedValues,
) -> Hash {
    let (input, entry) = tx.populated_input(input_index);
    let mut hasher = TransactionSigningHash::new();
    hasher
        .write_u16(tx.tx.version)
        .update(previous_outputs_hash(tx, hash_type, reused_values))
        .update(sequence_hash(tx, hash_type, reused_values))
        .update(sig_op_counts_hash(tx, hash_type, reused_values));
    hash_outpoint(&mut hasher, &input.previous_outpoint);
    hash_script_public_key(&mut hasher, &entry.script_public_key);
    hasher
        .write_u64(entry.amount)
        .write_u64(input.sequence)
        .write_u8(input.sig_op_count)
        .update(outputs_hash(tx, reused_values))
        .write_u64(tx.tx.lock_time)
        .update(tx.tx.subnetwork_id)
        .write_u64(tx.tx.gas)
        .update(payload_hash(tx))
        .write_u8(hash_type.to_u8());
    hasher.finalize()
}

/// Computes the digest ECDSA keys sign: `sha256(sha256("TransactionSigningHashECDSA") || schnorr_hash)`.
pub fn calc_ecdsa_signature_hash(
    tx: &SignableTransaction,
    input_index: usize,
    hash_type: SigHashType,
    reused_values: &mut SigHashReusedValues,
) -> Hash {
    let hash = calc_schnorr_signature_hash(tx, input_index, hash_type, reused_values);
    let mut hasher = TransactionSigningHashECDSA::new();
    hasher.update(hash);
    hasher.finalize()
}
