//!
//! Error type used by the transaction builder, the KRC20 token protocol
//! and the token transfer orchestrator.
//!

use kastx_addresses::AddressError;
use kastx_consensus_core::tx::TransactionId;
use kastx_txscript::script_builder::ScriptBuilderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Custom(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("Insufficient funds: {required} sompi required, {available} sompi available")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("Unable to build transaction: {0}")]
    BuildFailure(String),

    #[error("Token transfers require commit and reveal fee parameters")]
    MissingFeeParameters,

    #[error("No incomplete token transfer to resume")]
    NoResumableTransfer,

    #[error("Incomplete token transfer does not match the requested transfer")]
    StaleResumableTransfer,

    #[error("Malformed utxo data: {0}")]
    MalformedUtxoData(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Expected {expected} signatures, received {actual}")]
    SignatureCountMismatch { expected: usize, actual: usize },

    #[error("A token transfer is already pending for this wallet and token")]
    TransferInProgress,

    #[error("Commit transaction broadcast failed, no funds were committed: {0}")]
    CommitBroadcast(String),

    #[error("Reveal transaction broadcast failed, funds remain locked by commit transaction {commit_transaction_id}: {reason}")]
    RevealBroadcast { commit_transaction_id: TransactionId, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    ScriptBuilder(#[from] ScriptBuilderError),

    #[error("Hex decoding error: {0}")]
    Hex(#[from] faster_hex::Error),

    #[error(transparent)]
    Secp256k1(#[from] secp256k1::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub fn custom<T: Into<String>>(msg: T) -> Self {
        Error::Custom(msg.into())
    }

    /// `true` when a commit transaction reached the network but its reveal did not:
    /// the funds sit in the commit output until the reveal is retried.
    pub fn is_recoverable_reveal(&self) -> bool {
        matches!(self, Error::RevealBroadcast { .. })
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Self::Custom(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Self::Custom(err.to_string())
    }
}
