use crate::core::error::LedgerError;
use ledger_common::api::{AccountStatement, TransactionRequest, TransactionSuccess};
use tokio::sync::oneshot;

/// The closed set of commands an account actor understands.
///
/// `Refresh` is only ever sent by the manager, as the first message
/// after spawn; the external surfaces send the other two.
#[derive(Debug)]
pub enum AccountMessage {
    Refresh,
    Transact(TransactionRequest),
    QueryHistory,
}

/// The closed set of successful outcomes, one variant per message.
#[derive(Debug)]
pub enum AccountResponse {
    Refreshed,
    Transacted(TransactionSuccess),
    Statement(AccountStatement),
}

pub type MessageResult = Result<AccountResponse, LedgerError>;

// One inbox slot: the command plus the channel the reply goes out on.
// A dropped receiver means the caller went away; the actor still
// processes the message and discards the reply.
pub struct Envelope {
    pub message: AccountMessage,
    pub reply: oneshot::Sender<MessageResult>,
}
