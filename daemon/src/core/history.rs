use ledger_common::{config::HISTORY_SIZE, transaction::Transaction};
use std::collections::VecDeque;

/// Bounded window of the most recent transactions of one account,
/// ordered newest-first by the timestamp of application.
///
/// The owning actor applies transactions serially, so inserts arrive in
/// timestamp order and land at the front. Replay feeds events oldest
/// first and keeps the same invariant.
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    entries: VecDeque<Transaction>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_SIZE + 1),
        }
    }

    // Insert a transaction, keeping newest-first order and truncating
    // to the window size. Entries with equal timestamps keep their
    // application order.
    pub fn record(&mut self, transaction: Transaction) {
        let mut index = 0;
        while index < self.entries.len()
            && self.entries[index].created_at > transaction.created_at
        {
            index += 1;
        }
        self.entries.insert(index, transaction);

        if self.entries.len() > HISTORY_SIZE {
            self.entries.truncate(HISTORY_SIZE);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }
}
