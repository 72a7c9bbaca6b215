mod memory;
mod providers;

pub mod sled;

pub use self::{memory::MemoryStorage, providers::*, sled::SledStorage};

use crate::core::error::LedgerError;
use async_trait::async_trait;
use ledger_common::{
    account::ClientId,
    config::{HISTORY_SIZE, SNAPSHOT_EVERY},
    time::now,
    transaction::{Snapshot, Transaction},
};

#[async_trait]
pub trait Storage:
    ClientProvider + TransactionProvider + SnapshotProvider + Sync + Send + 'static
{
    // Append one committed transaction and, when its revision lands on
    // the snapshot policy, persist a snapshot of the post-commit
    // balance. A failed snapshot write never fails the commit; the next
    // eligible revision supersedes it.
    async fn commit(&self, post_balance: i64, transaction: Transaction) -> Result<(), LedgerError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!(
                "commit client {} revision {} balance {}",
                transaction.client_id,
                transaction.revision,
                post_balance
            );
        }

        self.append_transaction(&transaction).await?;

        if transaction.revision > 0 && transaction.revision % SNAPSHOT_EVERY == 0 {
            let snapshot = Snapshot {
                client_id: transaction.client_id,
                revision: transaction.revision,
                balance: post_balance,
                created_at: now(),
            };
            if let Err(err) = self.store_snapshot(snapshot).await {
                warn!(
                    "snapshot write failed for client {} at revision {}: {}",
                    transaction.client_id, transaction.revision, err
                );
            }
        }

        Ok(())
    }

    // Latest snapshot plus every event needed to restore balance and
    // the statement window: revision >= snapshot.revision - HISTORY_SIZE + 1,
    // or the whole log when no snapshot exists. Events come back
    // ascending by revision.
    async fn replay(
        &self,
        client_id: ClientId,
    ) -> Result<(Option<Snapshot>, Vec<Transaction>), LedgerError> {
        let snapshot = self.get_latest_snapshot(client_id).await?;
        let from_revision = match &snapshot {
            Some(snapshot) => snapshot
                .revision
                .saturating_sub(HISTORY_SIZE as u64 - 1),
            None => 0,
        };
        let events = self
            .get_transactions_since(client_id, from_revision)
            .await?;
        debug!(
            "replay client {}: snapshot revision {:?}, {} events",
            client_id,
            snapshot.as_ref().map(|s| s.revision),
            events.len()
        );
        Ok((snapshot, events))
    }
}

// Every provider bundle is a full storage backend.
impl<T> Storage for T where
    T: ClientProvider + TransactionProvider + SnapshotProvider + Sync + Send + 'static
{
}
