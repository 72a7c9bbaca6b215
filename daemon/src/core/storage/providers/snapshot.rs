use crate::core::error::LedgerError;
use async_trait::async_trait;
use ledger_common::{account::ClientId, transaction::Snapshot};

// Balance snapshots, written by the store on the snapshot policy and
// read back as the replay starting point.
#[async_trait]
pub trait SnapshotProvider {
    async fn store_snapshot(&self, snapshot: Snapshot) -> Result<(), LedgerError>;

    async fn get_latest_snapshot(
        &self,
        client_id: ClientId,
    ) -> Result<Option<Snapshot>, LedgerError>;
}
