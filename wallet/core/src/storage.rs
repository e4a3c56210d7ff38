//!
//! Persistence of incomplete token transfers. The store behind [`IncompleteTransactionStore`]
//! is the source of truth; [`IncompleteTransactions`] reads through it and caches what it finds.
//!

use crate::imports::*;
use crate::krc20::IncompleteTokenTransactionParams;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Key-value persistence boundary. Storing `None` removes the key.
#[async_trait]
pub trait IncompleteTransactionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn store(&self, key: &str, value: Option<Vec<u8>>) -> Result<()>;
}

/// A process-local [`IncompleteTransactionStore`].
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }
}

#[async_trait]
impl IncompleteTransactionStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.map.lock().get(key).cloned())
    }

    async fn store(&self, key: &str, value: Option<Vec<u8>>) -> Result<()> {
        let mut map = self.map.lock();
        match value {
            Some(value) => map.insert(key.to_string(), value),
            None => map.remove(key),
        };
        Ok(())
    }
}

/// Identifies the single pending token transfer a wallet may have per token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferKey {
    pub wallet_address: String,
    pub token: String,
}

impl TransferKey {
    pub fn new<W: Into<String>, T: Into<String>>(wallet_address: W, token: T) -> Self {
        Self { wallet_address: wallet_address.into(), token: token.into() }
    }

    /// Key under which the record is persisted.
    pub fn storage_key(&self) -> String {
        format!("krc20-incomplete-transaction:{}:{}", self.wallet_address, self.token)
    }
}

impl Display for TransferKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.wallet_address, self.token)
    }
}

/// Incomplete token transfers by `(wallet, token)`, read through from the store.
///
/// A record loaded concurrently by several readers is cached once: the first one
/// inserted wins and every reader gets that instance.
pub struct IncompleteTransactions {
    store: Arc<dyn IncompleteTransactionStore>,
    cache: DashMap<TransferKey, Arc<IncompleteTokenTransactionParams>>,
}

impl IncompleteTransactions {
    pub fn new(store: Arc<dyn IncompleteTransactionStore>) -> Self {
        Self { store, cache: DashMap::new() }
    }

    pub fn store(&self) -> &Arc<dyn IncompleteTransactionStore> {
        &self.store
    }

    pub async fn get(&self, key: &TransferKey) -> Result<Option<Arc<IncompleteTokenTransactionParams>>> {
        if let Some(params) = self.cache.get(key) {
            return Ok(Some(params.clone()));
        }

        let Some(bytes) = self.store.get(&key.storage_key()).await? else {
            return Ok(None);
        };
        let params = Arc::new(IncompleteTokenTransactionParams::try_from_slice(&bytes)?);
        let params = self.cache.entry(key.clone()).or_insert(params).clone();
        Ok(Some(params))
    }

    /// Persists a new record. Fails with [`Error::TransferInProgress`] if one already exists for the key.
    /// Writers of the same key must be serialized by the caller.
    pub async fn insert(&self, key: &TransferKey, params: IncompleteTokenTransactionParams) -> Result<Arc<IncompleteTokenTransactionParams>> {
        if self.cache.contains_key(key) || self.store.get(&key.storage_key()).await?.is_some() {
            return Err(Error::TransferInProgress);
        }

        self.store.store(&key.storage_key(), Some(params.try_to_bytes()?)).await?;
        let params = Arc::new(params);
        self.cache.insert(key.clone(), params.clone());
        Ok(params)
    }

    /// Removes the record from the store, then from the cache.
    pub async fn remove(&self, key: &TransferKey) -> Result<()> {
        self.store.store(&key.storage_key(), None).await?;
        self.cache.remove(key);
        Ok(())
    }

    /// Drops cached records, the next read goes to the store.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
