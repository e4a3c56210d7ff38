mod script_public_key;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub use script_public_key::{SCRIPT_VECTOR_SIZE, ScriptPublicKey, ScriptPublicKeyVersion, ScriptVec, scriptvec};

use crate::{
    constants::{GAS, LOCK_TIME, SEQUENCE, SIG_OP_COUNT, TX_VERSION},
    hashing,
    subnets::{SUBNETWORK_ID_NATIVE, SubnetworkId},
};

/// Represents the ID of a Kaspa transaction
pub type TransactionId = kastx_hashes::Hash;

/// Holds details about an individual transaction output in a utxo
/// set: how much it pays and the script that locks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoEntry {
    pub amount: u64,
    pub script_public_key: ScriptPublicKey,
}

impl UtxoEntry {
    pub fn new(amount: u64, script_public_key: ScriptPublicKey) -> Self {
        Self { amount, script_public_key }
    }
}

/// Represents a Kaspa transaction outpoint
#[derive(Eq, Hash, PartialEq, Debug, Copy, Clone, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutpoint {
    pub transaction_id: TransactionId,
    pub index: u32,
}

impl TransactionOutpoint {
    pub fn new(transaction_id: TransactionId, index: u32) -> Self {
        Self { transaction_id, index }
    }
}

impl Display for TransactionOutpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.transaction_id, self.index)
    }
}

/// Represents a Kaspa transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub previous_outpoint: TransactionOutpoint,
    pub signature_script: Vec<u8>,
    pub sequence: u64,
    pub sig_op_count: u8,
}

impl TransactionInput {
    pub fn new(previous_outpoint: TransactionOutpoint, signature_script: Vec<u8>, sequence: u64, sig_op_count: u8) -> Self {
        Self { previous_outpoint, signature_script, sequence, sig_op_count }
    }

    /// An input as this workspace builds them: zero sequence and a single signature operation.
    pub fn standard(previous_outpoint: TransactionOutpoint, signature_script: Vec<u8>) -> Self {
        Self::new(previous_outpoint, signature_script, SEQUENCE, SIG_OP_COUNT)
    }
}

/// Represents a Kaspad transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutput {
    pub value: u64,
    pub script_public_key: ScriptPublicKey,
}

impl TransactionOutput {
    pub fn new(value: u64, script_public_key: ScriptPublicKey) -> Self {
        Self { value, script_public_key }
    }
}

/// Represents a Kaspa transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u16,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u64,
    pub subnetwork_id: SubnetworkId,
    pub gas: u64,
    pub payload: Vec<u8>,
}

impl Transaction {
    pub fn new(
        version: u16,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
        lock_time: u64,
        subnetwork_id: SubnetworkId,
        gas: u64,
        payload: Vec<u8>,
    ) -> Self {
        Self { version, inputs, outputs, lock_time, subnetwork_id, gas, payload }
    }

    /// A native-subnetwork transaction with the fixed version, lock time, gas and empty payload.
    pub fn new_native(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        Self::new(TX_VERSION, inputs, outputs, LOCK_TIME, SUBNETWORK_ID_NATIVE, GAS, vec![])
    }

    /// Returns the transaction ID, which excludes signature scripts.
    pub fn id(&self) -> TransactionId {
        hashing::tx::id(self)
    }

    /// Returns the transaction hash, which commits to signature scripts.
    pub fn hash(&self) -> kastx_hashes::Hash {
        hashing::tx::hash(self)
    }
}

/// A transaction paired with the utxo entries its inputs spend, in input order.
/// This is everything needed to compute signature hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignableTransaction {
    pub tx: Transaction,
    pub entries: Vec<UtxoEntry>,
}

impl SignableTransaction {
    pub fn with_entries(tx: Transaction, entries: Vec<UtxoEntry>) -> Self {
        assert_eq!(tx.inputs.len(), entries.len(), "every input requires a utxo entry");
        Self { tx, entries }
    }

    pub fn populated_inputs(&self) -> impl ExactSizeIterator<Item = (&TransactionInput, &UtxoEntry)> {
        self.tx.inputs.iter().zip(self.entries.iter())
    }

    pub fn populated_input(&self, index: usize) -> (&TransactionInput, &UtxoEntry) {
        (&self.tx.inputs[index], &self.entries[index])
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.tx.outputs
    }

    pub fn id(&self) -> TransactionId {
        self.tx.id()
    }
}
