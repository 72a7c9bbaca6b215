use serde::{Deserialize, Serialize};

// Account identifiers are small positive integers assigned at bootstrap.
pub type ClientId = u64;

/// Static attributes of a credit account, immutable after registry load.
///
/// `initial_balance` may be negative, but never beyond `-credit_limit`.
/// Serde field names follow the persisted `clients` document layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAccount {
    pub client_id: ClientId,
    #[serde(rename = "limit")]
    pub credit_limit: u64,
    pub initial_balance: i64,
}

impl ClientAccount {
    pub fn new(client_id: ClientId, credit_limit: u64) -> Self {
        Self {
            client_id,
            credit_limit,
            initial_balance: 0,
        }
    }
}
