//!
//! KRC20 token transfers: the envelope, the redeem script locking the commit output
//! and the structures carried between the commit and reveal phases.
//!

pub mod envelope;
pub mod redeem_script;

pub use envelope::Envelope;
pub use redeem_script::{COMPRESSED_PUBLIC_KEY_SIZE, RedeemScript};

use crate::imports::*;
use crate::tx::UnsignedTransaction;

/// State that must survive between a broadcast commit transaction and its reveal.
/// Records are replaced or removed, never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteTokenTransactionParams {
    pub commit_transaction_id: TransactionId,
    /// Token amount in the token's smallest units
    pub token_amount: u128,
    /// Value of the commit output the reveal transaction spends
    pub target_output_amount: u64,
    pub envelope: Envelope,
}

impl IncompleteTokenTransactionParams {
    pub fn try_to_bytes(&self) -> Result<Vec<u8>> {
        Ok(borsh::to_vec(self)?)
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(borsh::from_slice(bytes)?)
    }

    /// Whether this record describes the transfer of `amount` `ticker` tokens to `recipient`.
    pub fn matches(&self, ticker: &str, recipient: &str, amount: u128) -> bool {
        self.envelope.ticker == ticker && self.envelope.recipient == recipient && self.token_amount == amount
    }
}

pub struct CommitTransaction {
    pub transaction: UnsignedTransaction,
    pub redeem_script: RedeemScript,
    pub params: IncompleteTokenTransactionParams,
}

pub struct RevealTransaction {
    pub transaction: UnsignedTransaction,
    pub redeem_script: RedeemScript,
}

/// Both phases of a token transfer, built together.
pub struct TransactionGroup {
    pub commit: UnsignedTransaction,
    pub reveal: UnsignedTransaction,
}

impl TransactionGroup {
    pub fn commit_hashes(&self) -> &[Hash] {
        &self.commit.hashes
    }

    pub fn reveal_hashes(&self) -> &[Hash] {
        &self.reveal.hashes
    }
}

pub struct TransactionMeta {
    pub redeem_script: RedeemScript,
    pub incomplete_params: IncompleteTokenTransactionParams,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_incomplete_params_codec() {
        let params = IncompleteTokenTransactionParams {
            commit_transaction_id: TransactionId::from_str("81425d682c91f2e6c7a59052d70fe30f127c7608977812ed8249dae985a634e0").unwrap(),
            token_amount: 100_000_000,
            target_output_amount: 20_004_100,
            envelope: Envelope::new(100_000_000, "kaspa:qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u", "GGMF"),
        };

        let bytes = params.try_to_bytes().unwrap();
        // id, u128 amount, u64 target, u128 envelope amount, then the two length-prefixed strings
        assert_eq!(bytes.len(), 32 + 16 + 8 + 16 + (4 + 69) + (4 + 4));
        assert_eq!(&bytes[48..56], &20_004_100u64.to_le_bytes());
        assert_eq!(IncompleteTokenTransactionParams::try_from_slice(&bytes).unwrap(), params);

        assert!(IncompleteTokenTransactionParams::try_from_slice(&bytes[..40]).is_err());
        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(IncompleteTokenTransactionParams::try_from_slice(&trailing).is_err());
    }

    #[test]
    fn test_incomplete_params_match() {
        let params = IncompleteTokenTransactionParams {
            commit_transaction_id: TransactionId::default(),
            token_amount: 100,
            target_output_amount: 20_004_100,
            envelope: Envelope::new(100, "kaspa:example", "KRC20TOKEN"),
        };
        assert!(params.matches("KRC20TOKEN", "kaspa:example", 100));
        assert!(!params.matches("KRC20TOKEN", "kaspa:example", 101));
        assert!(!params.matches("OTHER", "kaspa:example", 100));
        assert!(!params.matches("KRC20TOKEN", "kaspa:other", 100));
    }
}
