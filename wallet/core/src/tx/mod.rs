pub mod builder;
pub mod fees;

pub use builder::{TransactionBuilder, Transfer, TransferAmount};
pub use fees::{Fee, FeeMapper, FeeParams};

use crate::imports::*;
use kastx_consensus_core::hashing::sighash::{SigHashReusedValues, calc_ecdsa_signature_hash};
use kastx_consensus_core::hashing::sighash_type::SIG_HASH_ALL;
use kastx_consensus_core::tx::SignableTransaction;

/// A transaction whose inputs still need signatures, with the digest to sign for each input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub transaction: SignableTransaction,
    pub hashes: Vec<Hash>,
}

impl UnsignedTransaction {
    /// Computes the `SIG_HASH_ALL` ECDSA digest of every input.
    pub fn new(transaction: SignableTransaction) -> Self {
        let mut reused_values = SigHashReusedValues::new();
        let hashes = (0..transaction.tx.inputs.len())
            .map(|index| calc_ecdsa_signature_hash(&transaction, index, SIG_HASH_ALL, &mut reused_values))
            .collect::<Vec<_>>();
        trace!("signature hashes of transaction {}: {:?}", transaction.id(), hashes);
        Self { transaction, hashes }
    }

    pub fn id(&self) -> TransactionId {
        self.transaction.id()
    }

    pub fn input_count(&self) -> usize {
        self.transaction.tx.inputs.len()
    }
}
