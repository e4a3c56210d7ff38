//!
//! Kaspa transaction construction and signing engine with KRC20 token transfers.
//!
//! The engine builds transactions from a UTXO snapshot and hands out per-input digests.
//! Signing, broadcasting and persistence are reached through the [`signer::Signer`],
//! [`rpc::Broadcaster`] and [`storage::IncompleteTransactionStore`] traits.
//!

extern crate self as kastx_wallet_core;

pub mod error;
mod imports;
pub mod krc20;
pub mod orchestrator;
pub mod result;
pub mod rpc;
pub mod settings;
pub mod signer;
pub mod storage;
pub mod tx;
pub mod utils;
pub mod utxo;

#[cfg(test)]
mod tests;

pub use error::Error;
pub use kastx_addresses::{Address, Prefix as AddressPrefix};
pub use orchestrator::{TokenTransferOrchestrator, TokenTransferReceipt, TransferState};
pub use result::Result;
pub use settings::Settings;
pub use tx::{Fee, FeeMapper, FeeParams, TransactionBuilder, Transfer, TransferAmount, UnsignedTransaction};
pub use utxo::{UnspentOutput, UtxoSet, UtxoSnapshotEntry};
