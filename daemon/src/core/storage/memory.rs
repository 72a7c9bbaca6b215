use crate::core::{
    error::LedgerError,
    storage::{ClientProvider, SnapshotProvider, TransactionProvider},
};
use async_trait::async_trait;
use ledger_common::{
    account::{ClientAccount, ClientId},
    transaction::{Snapshot, Transaction},
};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct MemoryInner {
    clients: HashMap<ClientId, ClientAccount>,
    // Per-account logs stay in append (= revision) order.
    transactions: HashMap<ClientId, Vec<Transaction>>,
    snapshots: HashMap<ClientId, Vec<Snapshot>>,
}

/// Storage backend that keeps everything in process memory. Selected by
/// `APP_IN_MEMORY`; also the backend the test suite runs against.
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<MemoryInner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientProvider for MemoryStorage {
    async fn get_client(&self, client_id: ClientId) -> Result<Option<ClientAccount>, LedgerError> {
        let inner = self.inner.lock().await;
        Ok(inner.clients.get(&client_id).cloned())
    }

    async fn register_client(&self, account: ClientAccount) -> Result<(), LedgerError> {
        let mut inner = self.inner.lock().await;
        inner.clients.entry(account.client_id).or_insert(account);
        Ok(())
    }

    async fn count_clients(&self) -> Result<u64, LedgerError> {
        let inner = self.inner.lock().await;
        Ok(inner.clients.len() as u64)
    }
}

#[async_trait]
impl TransactionProvider for MemoryStorage {
    async fn append_transaction(&self, transaction: &Transaction) -> Result<(), LedgerError> {
        let mut inner = self.inner.lock().await;
        inner
            .transactions
            .entry(transaction.client_id)
            .or_default()
            .push(transaction.clone());
        Ok(())
    }

    async fn get_transactions_since(
        &self,
        client_id: ClientId,
        from_revision: u64,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .transactions
            .get(&client_id)
            .map(|log| {
                log.iter()
                    .filter(|tx| tx.revision >= from_revision)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl SnapshotProvider for MemoryStorage {
    async fn store_snapshot(&self, snapshot: Snapshot) -> Result<(), LedgerError> {
        let mut inner = self.inner.lock().await;
        inner
            .snapshots
            .entry(snapshot.client_id)
            .or_default()
            .push(snapshot);
        Ok(())
    }

    async fn get_latest_snapshot(
        &self,
        client_id: ClientId,
    ) -> Result<Option<Snapshot>, LedgerError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .snapshots
            .get(&client_id)
            .and_then(|snapshots| snapshots.last().cloned()))
    }
}
