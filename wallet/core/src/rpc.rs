//!
//! Messages exchanged with the network layer: fee estimates coming in,
//! signed transactions going out, and the broadcast boundary.
//!

use crate::imports::*;
use kastx_consensus_core::tx::{Transaction, TransactionInput, TransactionOutpoint, TransactionOutput};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcFeerateBucket {
    /// The fee/mass ratio estimated to be required for inclusion time <= estimated_seconds
    pub feerate: f64,

    /// The estimated inclusion time for a transaction with fee/mass = feerate
    pub estimated_seconds: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcFeeEstimate {
    /// Top-priority feerate bucket, in `sompi/gram`.
    pub priority_bucket: RpcFeerateBucket,
    pub normal_buckets: Vec<RpcFeerateBucket>,
    pub low_buckets: Vec<RpcFeerateBucket>,
}

impl RpcFeeEstimate {
    pub fn ordered_buckets(&self) -> Vec<RpcFeerateBucket> {
        std::iter::once(self.priority_bucket)
            .chain(self.normal_buckets.iter().copied())
            .chain(self.low_buckets.iter().copied())
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransactionOutpoint {
    pub transaction_id: TransactionId,
    pub index: u32,
}

impl From<&TransactionOutpoint> for RpcTransactionOutpoint {
    fn from(outpoint: &TransactionOutpoint) -> Self {
        Self { transaction_id: outpoint.transaction_id, index: outpoint.index }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransactionInput {
    pub previous_outpoint: RpcTransactionOutpoint,
    /// Hex encoded signature script
    pub signature_script: String,
}

impl From<&TransactionInput> for RpcTransactionInput {
    fn from(input: &TransactionInput) -> Self {
        Self {
            previous_outpoint: (&input.previous_outpoint).into(),
            signature_script: faster_hex::hex_string(&input.signature_script),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcScriptPublicKey {
    pub version: u16,
    /// Hex encoded script
    pub script_public_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransactionOutput {
    pub amount: u64,
    pub script_public_key: RpcScriptPublicKey,
}

impl From<&TransactionOutput> for RpcTransactionOutput {
    fn from(output: &TransactionOutput) -> Self {
        Self {
            amount: output.value,
            script_public_key: RpcScriptPublicKey {
                version: output.script_public_key.version(),
                script_public_key: output.script_public_key.script_as_hex(),
            },
        }
    }
}

/// A signed transaction in the shape the broadcast endpoint accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub inputs: Vec<RpcTransactionInput>,
    pub outputs: Vec<RpcTransactionOutput>,
}

impl From<&Transaction> for RpcTransaction {
    fn from(tx: &Transaction) -> Self {
        Self { inputs: tx.inputs.iter().map(Into::into).collect(), outputs: tx.outputs.iter().map(Into::into).collect() }
    }
}

/// Submits signed transactions to the network.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Returns the id the network assigned to the accepted transaction.
    async fn broadcast(&self, transaction: &RpcTransaction) -> Result<TransactionId>;
}
