use crate::core::{
    error::LedgerError,
    storage::{ClientProvider, SnapshotProvider, TransactionProvider},
};
use async_trait::async_trait;
use ledger_common::{
    account::{ClientAccount, ClientId},
    transaction::{Snapshot, Transaction},
};
use sled::Tree;

// Tree names, one per persisted collection.
const CLIENTS_TREE: &str = "clients";
const TRANSACTIONS_TREE: &str = "transactions";
const SNAPSHOTS_TREE: &str = "snapshots";

/// Durable storage backend on an embedded sled database.
///
/// The document-store indexes on `client_id` and `revision` become
/// big-endian composite keys `client_id | revision`, so every
/// per-account read is a single prefix range scan in revision order.
/// Per-account key ranges are disjoint, which keeps concurrent appends
/// for different accounts from contending on anything but the tree.
pub struct SledStorage {
    db: sled::Db,
    clients: Tree,
    transactions: Tree,
    snapshots: Tree,
}

impl SledStorage {
    pub fn open(path: &str) -> Result<Self, LedgerError> {
        let db = sled::open(path)?;
        Ok(Self {
            clients: db.open_tree(CLIENTS_TREE)?,
            transactions: db.open_tree(TRANSACTIONS_TREE)?,
            snapshots: db.open_tree(SNAPSHOTS_TREE)?,
            db,
        })
    }

    // Test-only full reset, honored on DROP_DB_ON_START.
    pub fn reset(&self) -> Result<(), LedgerError> {
        warn!("dropping all persisted ledger data");
        self.clients.clear()?;
        self.transactions.clear()?;
        self.snapshots.clear()?;
        self.db.flush()?;
        Ok(())
    }

    pub async fn flush(&self) -> Result<(), LedgerError> {
        self.db.flush_async().await?;
        Ok(())
    }

    fn client_key(client_id: ClientId) -> [u8; 8] {
        client_id.to_be_bytes()
    }

    fn revision_key(client_id: ClientId, revision: u64) -> [u8; 16] {
        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&client_id.to_be_bytes());
        key[8..].copy_from_slice(&revision.to_be_bytes());
        key
    }
}

#[async_trait]
impl ClientProvider for SledStorage {
    async fn get_client(&self, client_id: ClientId) -> Result<Option<ClientAccount>, LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get client {}", client_id);
        }
        match self.clients.get(Self::client_key(client_id))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn register_client(&self, account: ClientAccount) -> Result<(), LedgerError> {
        let key = Self::client_key(account.client_id);
        if self.clients.contains_key(key)? {
            debug!("client {} already registered", account.client_id);
            return Ok(());
        }
        self.clients.insert(key, bincode::serialize(&account)?)?;
        Ok(())
    }

    async fn count_clients(&self) -> Result<u64, LedgerError> {
        Ok(self.clients.len() as u64)
    }
}

#[async_trait]
impl TransactionProvider for SledStorage {
    async fn append_transaction(&self, transaction: &Transaction) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!(
                "append transaction client {} revision {}",
                transaction.client_id,
                transaction.revision
            );
        }
        let key = Self::revision_key(transaction.client_id, transaction.revision);
        self.transactions
            .insert(key, bincode::serialize(transaction)?)?;
        Ok(())
    }

    async fn get_transactions_since(
        &self,
        client_id: ClientId,
        from_revision: u64,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let start = Self::revision_key(client_id, from_revision);
        let end = Self::revision_key(client_id, u64::MAX);
        let mut events = Vec::new();
        for entry in self.transactions.range(start..=end) {
            let (_, bytes) = entry?;
            events.push(bincode::deserialize(&bytes)?);
        }
        Ok(events)
    }
}

#[async_trait]
impl SnapshotProvider for SledStorage {
    async fn store_snapshot(&self, snapshot: Snapshot) -> Result<(), LedgerError> {
        debug!(
            "storing snapshot for client {} at revision {}",
            snapshot.client_id, snapshot.revision
        );
        let key = Self::revision_key(snapshot.client_id, snapshot.revision);
        self.snapshots.insert(key, bincode::serialize(&snapshot)?)?;
        Ok(())
    }

    async fn get_latest_snapshot(
        &self,
        client_id: ClientId,
    ) -> Result<Option<Snapshot>, LedgerError> {
        // Last key under the account prefix is the highest revision,
        // which is also the most recently created snapshot.
        match self
            .snapshots
            .scan_prefix(Self::client_key(client_id))
            .last()
        {
            Some(entry) => {
                let (_, bytes) = entry?;
                Ok(Some(bincode::deserialize(&bytes)?))
            }
            None => Ok(None),
        }
    }
}
