use crate::core::error::LedgerError;
use async_trait::async_trait;
use ledger_common::account::{ClientAccount, ClientId};

// Read-only registry of account static attributes, loaded once per
// actor on first spawn. Registration only happens at bootstrap.
#[async_trait]
pub trait ClientProvider {
    async fn get_client(&self, client_id: ClientId) -> Result<Option<ClientAccount>, LedgerError>;

    // Insert the account if it is not registered yet.
    async fn register_client(&self, account: ClientAccount) -> Result<(), LedgerError>;

    async fn count_clients(&self) -> Result<u64, LedgerError>;
}
