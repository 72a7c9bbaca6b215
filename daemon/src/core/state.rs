use crate::core::{error::LedgerError, history::HistoryBuffer};
use ledger_common::{
    account::{ClientAccount, ClientId},
    api::{AccountStatement, StatementBalance, StatementEntry, TransactionRequest},
    time::now,
    transaction::{normalize_description, Snapshot, Transaction, TransactionKind},
};

/// In-memory state of one account, owned exclusively by its actor.
///
/// Invariant: `balance >= -credit_limit` after every mutation, and
/// `revision` counts the applied transactions without gaps.
#[derive(Debug)]
pub struct ClientState {
    client_id: ClientId,
    credit_limit: u64,
    initial_balance: i64,
    balance: i64,
    revision: u64,
    history: HistoryBuffer,
}

impl ClientState {
    pub fn new(account: &ClientAccount) -> Self {
        Self {
            client_id: account.client_id,
            credit_limit: account.credit_limit,
            initial_balance: account.initial_balance,
            balance: account.initial_balance,
            revision: 0,
            history: HistoryBuffer::new(),
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn credit_limit(&self) -> u64 {
        self.credit_limit
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Validate and apply one transaction request, returning the
    /// committed event.
    ///
    /// The validation order is fixed: amount first, then kind, then
    /// description, then the limit check on the candidate balance. No
    /// state is touched until every check has passed.
    pub fn process_transaction(
        &mut self,
        request: &TransactionRequest,
    ) -> Result<Transaction, LedgerError> {
        if request.amount <= 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let amount = request.amount as u64;

        let kind = TransactionKind::from_tag(&request.kind).ok_or(LedgerError::InvalidKind)?;

        let description =
            normalize_description(&request.description).ok_or(LedgerError::InvalidDescription)?;

        let candidate = match kind {
            TransactionKind::Credit => self.balance.checked_add(amount as i64),
            TransactionKind::Debit => self.balance.checked_sub(amount as i64),
        }
        .ok_or(LedgerError::BalanceOverflow)?;

        if candidate < -(self.credit_limit as i64) {
            return Err(LedgerError::LimitExceeded);
        }

        self.revision += 1;
        self.balance = candidate;

        let transaction = Transaction {
            client_id: self.client_id,
            amount,
            kind,
            description,
            created_at: now(),
            revision: self.revision,
        };
        self.history.record(transaction.clone());

        Ok(transaction)
    }

    /// Rebuild from the latest snapshot plus the events returned next to
    /// it. Balance and revision advance only through events strictly
    /// newer than the snapshot; the history window takes every event.
    pub fn rebuild(&mut self, snapshot: Option<Snapshot>, events: &[Transaction]) {
        match snapshot {
            Some(snapshot) => {
                self.balance = snapshot.balance;
                self.revision = snapshot.revision;
            }
            None => {
                self.balance = self.initial_balance;
                self.revision = 0;
            }
        }
        self.history.clear();

        for event in events {
            if event.revision > self.revision {
                match event.kind {
                    TransactionKind::Credit => self.balance += event.amount as i64,
                    TransactionKind::Debit => self.balance -= event.amount as i64,
                }
                self.revision = event.revision;
            }
            self.history.record(event.clone());
        }
    }

    /// Pure read of the recent-history view.
    pub fn statement(&self) -> AccountStatement {
        AccountStatement {
            balance: StatementBalance {
                total: self.balance,
                as_of: now(),
                credit_limit: self.credit_limit,
            },
            last_transactions: self.history.iter().map(StatementEntry::from).collect(),
        }
    }
}
