use crate::{
    account::ClientId,
    config::{DESCRIPTION_MAX_LEN, DESCRIPTION_MIN_LEN},
    time::Timestamp,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a committed transaction. Wire and document form is the
/// single-character tag `"c"` / `"d"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "c")]
    Credit,
    #[serde(rename = "d")]
    Debit,
}

impl TransactionKind {
    // Parse the wire tag. Unknown tags return None so the caller can
    // reject them in its own validation order.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "c" => Some(Self::Credit),
            "d" => Some(Self::Debit),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Credit => "c",
            Self::Debit => "d",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One applied credit or debit. Immutable once emitted by the owning
/// actor; `revision` is unique per account and strictly increasing by 1.
///
/// Serde field names follow the persisted `transactions` document layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub client_id: ClientId,
    pub amount: u64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub description: String,
    pub created_at: Timestamp,
    pub revision: u64,
}

/// Durable record of "after applying every transaction with revision <=
/// `revision`, the balance equals `balance`". Purely a replay shortcut;
/// correctness never depends on one existing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub client_id: ClientId,
    pub revision: u64,
    pub balance: i64,
    pub created_at: Timestamp,
}

// Trim and bound-check a transaction description. Returns the trimmed
// form; the content itself is opaque.
pub fn normalize_description(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if (DESCRIPTION_MIN_LEN..=DESCRIPTION_MAX_LEN).contains(&len) {
        Some(trimmed.to_string())
    } else {
        None
    }
}
