use crate::core::error::LedgerError;
use async_trait::async_trait;
use ledger_common::{account::ClientId, transaction::Transaction};

// Append-only log of committed transactions. The caller guarantees
// appends for one account are serialized and arrive in revision order;
// appends for different accounts may run concurrently.
#[async_trait]
pub trait TransactionProvider {
    async fn append_transaction(&self, transaction: &Transaction) -> Result<(), LedgerError>;

    // All events of the account with revision >= from_revision,
    // ascending by revision.
    async fn get_transactions_since(
        &self,
        client_id: ClientId,
        from_revision: u64,
    ) -> Result<Vec<Transaction>, LedgerError>;
}
