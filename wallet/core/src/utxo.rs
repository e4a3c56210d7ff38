//!
//! Unspent outputs held by the wallet and the capped snapshot transactions are built from.
//!

use crate::imports::*;
use crate::utils::sompi_to_kaspa;
use kastx_consensus_core::tx::{Transaction, TransactionOutpoint, UtxoEntry};
use std::collections::HashSet;
use std::str::FromStr;

/// An output of a confirmed transaction that the wallet can spend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnspentOutput {
    pub transaction_id: TransactionId,
    pub index: u32,
    pub amount: u64,
    pub script_public_key: ScriptPublicKey,
}

impl UnspentOutput {
    pub fn new(transaction_id: TransactionId, index: u32, amount: u64, script_public_key: ScriptPublicKey) -> Self {
        Self { transaction_id, index, amount, script_public_key }
    }

    /// Decodes an output from the hex strings a UTXO provider returns.
    /// Malformed hex is rejected rather than read as empty bytes.
    pub fn try_from_hex(transaction_id: &str, index: u32, amount: u64, script: &str) -> Result<Self> {
        let transaction_id = TransactionId::from_str(transaction_id)
            .map_err(|err| Error::MalformedUtxoData(format!("transaction id `{transaction_id}`: {err}")))?;

        if script.len() % 2 != 0 {
            return Err(Error::MalformedUtxoData(format!("output script `{script}` has an odd number of hex digits")));
        }
        let mut bytes = vec![0u8; script.len() / 2];
        faster_hex::hex_decode(script.as_bytes(), &mut bytes)
            .map_err(|err| Error::MalformedUtxoData(format!("output script `{script}`: {err}")))?;

        Ok(Self::new(transaction_id, index, amount, ScriptPublicKey::from_vec(STANDARD_SCRIPT_VERSION, bytes)))
    }

    pub fn outpoint(&self) -> TransactionOutpoint {
        TransactionOutpoint::new(self.transaction_id, self.index)
    }

    pub fn entry(&self) -> UtxoEntry {
        UtxoEntry::new(self.amount, self.script_public_key.clone())
    }
}

/// A UTXO as delivered by a provider, all binary fields hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoSnapshotEntry {
    pub transaction_id: String,
    pub output_index: u32,
    pub amount_sompi: u64,
    pub output_script: String,
}

impl TryFrom<&UtxoSnapshotEntry> for UnspentOutput {
    type Error = Error;

    fn try_from(entry: &UtxoSnapshotEntry) -> Result<Self> {
        UnspentOutput::try_from_hex(&entry.transaction_id, entry.output_index, entry.amount_sompi, &entry.output_script)
    }
}

/// The wallet's spendable outputs. The snapshot is replaced as a whole on every refresh
/// and readers always observe either the previous or the new snapshot.
pub struct UtxoSet {
    max_inputs: usize,
    outputs: RwLock<Arc<Vec<UnspentOutput>>>,
}

impl UtxoSet {
    pub fn new(max_inputs: usize) -> Self {
        Self { max_inputs, outputs: RwLock::new(Arc::new(Vec::new())) }
    }

    pub fn max_inputs(&self) -> usize {
        self.max_inputs
    }

    /// Replaces the snapshot. When more than `max_inputs` outputs are supplied only the largest
    /// ones are kept, in the order they were supplied; the rest can not be spent until the set shrinks.
    pub fn set_unspent_outputs(&self, outputs: Vec<UnspentOutput>) {
        let outputs = cap_by_value(outputs, self.max_inputs);
        *self.outputs.write() = Arc::new(outputs);
    }

    /// Decodes a provider snapshot and replaces the current one. Nothing is replaced if any entry is malformed.
    pub fn set_from_snapshot(&self, entries: &[UtxoSnapshotEntry]) -> Result<()> {
        let outputs = entries.iter().map(UnspentOutput::try_from).collect::<Result<Vec<_>>>()?;
        self.set_unspent_outputs(outputs);
        Ok(())
    }

    /// Applies a broadcast transaction to the snapshot: the outputs it spends are dropped and its
    /// outputs locked to `script` become spendable. Keeps later builds from spending the same
    /// outputs again before the next refresh.
    pub fn apply_transaction(&self, transaction: &Transaction, script: &ScriptPublicKey) {
        let transaction_id = transaction.id();
        let spent = transaction.inputs.iter().map(|input| input.previous_outpoint).collect::<HashSet<_>>();

        let mut outputs = self.outputs.write();
        let mut next = outputs.iter().filter(|output| !spent.contains(&output.outpoint())).cloned().collect::<Vec<_>>();
        let known = next.iter().map(UnspentOutput::outpoint).collect::<HashSet<_>>();
        next.extend(
            transaction
                .outputs
                .iter()
                .enumerate()
                .filter(|(index, output)| {
                    &output.script_public_key == script && !known.contains(&TransactionOutpoint::new(transaction_id, *index as u32))
                })
                .map(|(index, output)| UnspentOutput::new(transaction_id, index as u32, output.value, output.script_public_key.clone())),
        );
        *outputs = Arc::new(cap_by_value(next, self.max_inputs));
    }

    pub fn snapshot(&self) -> Arc<Vec<UnspentOutput>> {
        self.outputs.read().clone()
    }

    pub fn len(&self) -> usize {
        self.outputs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.read().is_empty()
    }

    pub fn available_sompi(&self) -> u64 {
        total_amount(&self.snapshot())
    }

    /// Available balance in KAS.
    pub fn available_amount(&self) -> f64 {
        sompi_to_kaspa(self.available_sompi())
    }
}

pub(crate) fn total_amount(outputs: &[UnspentOutput]) -> u64 {
    outputs.iter().map(|output| output.amount).sum()
}

fn cap_by_value(outputs: Vec<UnspentOutput>, max_inputs: usize) -> Vec<UnspentOutput> {
    if outputs.len() <= max_inputs {
        return outputs;
    }

    let mut by_value = (0..outputs.len()).collect::<Vec<_>>();
    by_value.sort_by(|a, b| outputs[*b].amount.cmp(&outputs[*a].amount));
    let (kept, dropped) = by_value.split_at(max_inputs);

    let dropped_amount: u64 = dropped.iter().map(|i| outputs[*i].amount).sum();
    warn!(
        "Wallet holds {} utxos, only the {} largest are spendable ({} sompi in {} outputs left out)",
        outputs.len(),
        max_inputs,
        dropped_amount,
        dropped.len()
    );

    let mut kept = kept.to_vec();
    kept.sort_unstable();
    let mut outputs = outputs.into_iter().map(Some).collect::<Vec<_>>();
    kept.into_iter().filter_map(|i| outputs[i].take()).collect()
}
