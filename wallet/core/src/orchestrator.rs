//!
//! Two-phase KRC20 token transfers: a commit transaction locks funds under the
//! redeem script, a reveal transaction spends them and publishes the envelope.
//!
//! The commit parameters are persisted before the reveal is attempted, so a transfer
//! interrupted between the two phases can be completed later, after a restart included.
//! At most one transfer per `(wallet, token)` pair is in flight at any time.
//!

use crate::imports::*;
use crate::krc20::IncompleteTokenTransactionParams;
use crate::rpc::{Broadcaster, RpcTransaction};
use crate::signer::Signer;
use crate::storage::{IncompleteTransactionStore, IncompleteTransactions, TransferKey};
use crate::tx::{FeeParams, TransactionBuilder, Transfer, TransferAmount};
use std::fmt::{Display, Formatter};
use tokio::sync::Mutex as AsyncMutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferState {
    NoPendingTransfer,
    CommitBuilt,
    /// The commit transaction is on the network and its parameters are persisted
    CommitBroadcast,
    RevealBuilt,
    RevealBroadcast,
    Complete,
}

impl Display for TransferState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransferState::NoPendingTransfer => "no-pending-transfer",
            TransferState::CommitBuilt => "commit-built",
            TransferState::CommitBroadcast => "commit-broadcast",
            TransferState::RevealBuilt => "reveal-built",
            TransferState::RevealBroadcast => "reveal-broadcast",
            TransferState::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Result of a completed token transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransferReceipt {
    pub commit_transaction_id: TransactionId,
    pub reveal_transaction_id: TransactionId,
    /// `true` when the commit was broadcast by an earlier attempt
    pub resumed: bool,
}

pub struct TokenTransferOrchestrator {
    builder: Arc<TransactionBuilder>,
    signer: Arc<dyn Signer>,
    broadcaster: Arc<dyn Broadcaster>,
    incomplete: IncompleteTransactions,
    locks: DashMap<TransferKey, Arc<AsyncMutex<()>>>,
    states: DashMap<TransferKey, TransferState>,
}

impl TokenTransferOrchestrator {
    pub fn new(
        builder: Arc<TransactionBuilder>,
        signer: Arc<dyn Signer>,
        broadcaster: Arc<dyn Broadcaster>,
        store: Arc<dyn IncompleteTransactionStore>,
    ) -> Self {
        Self {
            builder,
            signer,
            broadcaster,
            incomplete: IncompleteTransactions::new(store),
            locks: DashMap::new(),
            states: DashMap::new(),
        }
    }

    pub fn builder(&self) -> &Arc<TransactionBuilder> {
        &self.builder
    }

    pub fn incomplete_transactions(&self) -> &IncompleteTransactions {
        &self.incomplete
    }

    /// Key of the wallet's transfers of `ticker`.
    pub fn transfer_key(&self, ticker: &str) -> TransferKey {
        TransferKey::new(self.builder.address().to_string(), ticker)
    }

    /// Last observed state of the wallet's transfer of `ticker`.
    pub fn state(&self, ticker: &str) -> TransferState {
        self.states.get(&self.transfer_key(ticker)).map(|state| *state).unwrap_or(TransferState::NoPendingTransfer)
    }

    /// The persisted commit of an unfinished transfer of `ticker`, if any.
    pub async fn pending(&self, ticker: &str) -> Result<Option<Arc<IncompleteTokenTransactionParams>>> {
        self.incomplete.get(&self.transfer_key(ticker)).await
    }

    /// Sends a token transfer.
    ///
    /// A persisted commit matching the request is completed instead of issuing a new one.
    /// A persisted commit for a different request is revealed first, the new commit is only
    /// issued once that reveal went through. A record that can not be decoded is discarded.
    ///
    /// Fails with [`Error::CommitBroadcast`] when nothing reached the network, and with
    /// [`Error::RevealBroadcast`] when the commit is on chain but the reveal is not.
    pub async fn send(&self, transfer: &Transfer) -> Result<TokenTransferReceipt> {
        let TransferAmount::Token { ticker, amount } = &transfer.amount else {
            return Err(Error::BuildFailure("expected a token amount".to_string()));
        };
        // records carry the canonical recipient form
        let recipient = Address::try_from(transfer.destination.as_str())?.to_string();

        let key = self.transfer_key(ticker);
        let lock = self.lock(&key);
        let _guard = lock.lock().await;

        let result = match self.resume(&key, transfer, ticker, &recipient, *amount).await {
            Err(Error::NoResumableTransfer) => self.send_new(&key, transfer).await,
            Err(Error::StaleResumableTransfer) => self.complete_stale(&key, transfer).await,
            Err(err @ Error::Io(_)) => {
                warn!("discarding undecodable incomplete token transfer {key}: {err}");
                self.incomplete.remove(&key).await?;
                self.send_new(&key, transfer).await
            }
            result => result,
        };
        self.settle(&key, &result);
        result
    }

    /// Completes a persisted transfer of `ticker` without the original request.
    /// `fee` must carry a reveal fee.
    pub async fn resume_pending(&self, ticker: &str, source: &str, fee: &FeeParams) -> Result<TokenTransferReceipt> {
        let key = self.transfer_key(ticker);
        let lock = self.lock(&key);
        let _guard = lock.lock().await;

        let params = self.incomplete.get(&key).await?.ok_or(Error::NoResumableTransfer)?;
        info!("resuming token transfer {key} from commit {}", params.commit_transaction_id);
        let result = self.reveal(&key, source, &params, fee, true).await;
        self.settle(&key, &result);
        result
    }

    async fn resume(&self, key: &TransferKey, transfer: &Transfer, ticker: &str, recipient: &str, amount: u128) -> Result<TokenTransferReceipt> {
        let params = self.incomplete.get(key).await?.ok_or(Error::NoResumableTransfer)?;
        if !params.matches(ticker, recipient, amount) {
            return Err(Error::StaleResumableTransfer);
        }

        info!("resuming token transfer {key} from commit {}", params.commit_transaction_id);
        self.reveal(key, &transfer.source, &params, &transfer.fee, true).await
    }

    /// Reveals the commit of an earlier, different request, then sends `transfer`.
    /// The earlier record stays persisted if its reveal fails.
    async fn complete_stale(&self, key: &TransferKey, transfer: &Transfer) -> Result<TokenTransferReceipt> {
        let params = self.incomplete.get(key).await?.ok_or(Error::NoResumableTransfer)?;
        warn!("token transfer {key} has an unfinished commit {} for another request, revealing it first", params.commit_transaction_id);
        let receipt = self.reveal(key, &transfer.source, &params, &transfer.fee, true).await?;
        info!("earlier token transfer {key} completed by reveal {}", receipt.reveal_transaction_id);

        self.send_new(key, transfer).await
    }

    async fn send_new(&self, key: &TransferKey, transfer: &Transfer) -> Result<TokenTransferReceipt> {
        // the record slot must be free before anything reaches the network
        if self.incomplete.get(key).await?.is_some() {
            return Err(Error::TransferInProgress);
        }

        let commit = self.builder.build_commit(transfer)?;
        self.transition(key, TransferState::CommitBuilt);

        let signatures = self.signer.sign(&commit.transaction.hashes, self.builder.public_key()).await?;
        let transaction = self.builder.build_for_send(&commit.transaction, &signatures)?;
        let accepted = self
            .broadcaster
            .broadcast(&RpcTransaction::from(&transaction))
            .await
            .map_err(|err| Error::CommitBroadcast(err.to_string()))?;
        self.builder.apply_transaction(&transaction);

        let commit_transaction_id = commit.params.commit_transaction_id;
        if accepted != commit_transaction_id {
            warn!("network reported commit {accepted}, expected {commit_transaction_id}");
        }

        let params = self.incomplete.insert(key, commit.params).await.map_err(|err| reveal_failure(commit_transaction_id, err))?;
        self.transition(key, TransferState::CommitBroadcast);

        self.reveal(key, &transfer.source, &params, &transfer.fee, false).await
    }

    /// Builds, signs and broadcasts the reveal of a broadcast commit, then drops the persisted record.
    /// Every failure leaves the record in place. Once the reveal is accepted the transfer counts as
    /// complete, even if the record can not be dropped.
    async fn reveal(
        &self,
        key: &TransferKey,
        source: &str,
        params: &IncompleteTokenTransactionParams,
        fee: &FeeParams,
        resumed: bool,
    ) -> Result<TokenTransferReceipt> {
        let commit_transaction_id = params.commit_transaction_id;
        let failure = |err| reveal_failure(commit_transaction_id, err);

        let reveal = self.builder.build_reveal(source, params, fee).map_err(failure)?;
        self.transition(key, TransferState::RevealBuilt);

        let signatures = self.signer.sign(&reveal.transaction.hashes, self.builder.public_key()).await.map_err(failure)?;
        let transaction = self.builder.build_reveal_for_send(&reveal.transaction, &reveal.redeem_script, &signatures).map_err(failure)?;
        let reveal_transaction_id = self.broadcaster.broadcast(&RpcTransaction::from(&transaction)).await.map_err(failure)?;
        self.builder.apply_transaction(&transaction);
        self.transition(key, TransferState::RevealBroadcast);

        if let Err(err) = self.incomplete.remove(key).await {
            warn!("token transfer {key} revealed by {reveal_transaction_id} but its record was not removed: {err}");
        }
        self.transition(key, TransferState::Complete);

        Ok(TokenTransferReceipt { commit_transaction_id, reveal_transaction_id, resumed })
    }

    fn lock(&self, key: &TransferKey) -> Arc<AsyncMutex<()>> {
        self.locks.entry(key.clone()).or_default().clone()
    }

    fn transition(&self, key: &TransferKey, state: TransferState) {
        info!("token transfer {key}: {state}");
        self.states.insert(key.clone(), state);
    }

    /// Records where an attempt left the pair once it returns.
    fn settle(&self, key: &TransferKey, result: &Result<TokenTransferReceipt>) {
        match result {
            Err(err) if err.is_recoverable_reveal() => {
                warn!("token transfer {key} awaits its reveal: {err}");
                self.states.insert(key.clone(), TransferState::CommitBroadcast);
            }
            _ => {
                self.states.remove(key);
            }
        }
    }
}

fn reveal_failure(commit_transaction_id: TransactionId, err: Error) -> Error {
    match err {
        err @ Error::RevealBroadcast { .. } => err,
        err => Error::RevealBroadcast { commit_transaction_id, reason: err.to_string() },
    }
}
