// End-to-end exercises of the actor core against the in-memory
// backend: seed scenarios, concurrency properties, replay fidelity.

use crate::core::{
    actor::ActorHandle,
    error::LedgerError,
    manager::ActorManager,
    message::{AccountMessage, AccountResponse},
    state::ClientState,
    storage::{ClientProvider, MemoryStorage, Storage, TransactionProvider},
};
use ledger_common::{
    account::ClientAccount,
    api::{AccountStatement, TransactionRequest, TransactionSuccess},
    config::INITIAL_ACCOUNTS,
};
use proptest::prelude::*;
use std::sync::Arc;

async fn seeded_manager() -> (Arc<MemoryStorage>, ActorManager<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    for (client_id, credit_limit) in INITIAL_ACCOUNTS {
        storage
            .register_client(ClientAccount::new(client_id, credit_limit))
            .await
            .unwrap();
    }
    let manager = ActorManager::new(storage.clone());
    (storage, manager)
}

fn request(amount: i64, kind: &str, description: &str) -> TransactionRequest {
    TransactionRequest {
        amount,
        kind: kind.to_string(),
        description: description.to_string(),
    }
}

async fn transact(handle: &ActorHandle, req: TransactionRequest) -> Result<TransactionSuccess, LedgerError> {
    match handle.send(AccountMessage::Transact(req)).await? {
        AccountResponse::Transacted(success) => Ok(success),
        other => panic!("unexpected response: {:?}", other),
    }
}

async fn statement(handle: &ActorHandle) -> AccountStatement {
    match handle.send(AccountMessage::QueryHistory).await.unwrap() {
        AccountResponse::Statement(statement) => statement,
        other => panic!("unexpected response: {:?}", other),
    }
}

#[tokio::test]
async fn test_simple_credit() {
    let (_storage, manager) = seeded_manager().await;
    let handle = manager.spawn(1).await.unwrap();
    let success = transact(&handle, request(100, "c", "x")).await.unwrap();
    assert_eq!(success.credit_limit, 100_000);
    assert_eq!(success.balance, 100);
}

#[tokio::test]
async fn test_limit_boundary() {
    let (_storage, manager) = seeded_manager().await;
    let handle = manager.spawn(2).await.unwrap();

    let success = transact(&handle, request(80_000, "d", "ok")).await.unwrap();
    assert_eq!(success.credit_limit, 80_000);
    assert_eq!(success.balance, -80_000);

    let err = transact(&handle, request(1, "d", "no")).await.unwrap_err();
    assert!(matches!(err, LedgerError::LimitExceeded));

    // the refused debit left no trace
    let statement = statement(&handle).await;
    assert_eq!(statement.balance.total, -80_000);
    assert_eq!(statement.last_transactions.len(), 1);
}

#[tokio::test]
async fn test_unknown_account() {
    let (_storage, manager) = seeded_manager().await;
    let err = manager.spawn(999).await.unwrap_err();
    assert!(matches!(err, LedgerError::ClientNotFound(999)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_serialized_balances_under_concurrency() {
    let (storage, manager) = seeded_manager().await;
    let manager = Arc::new(manager);

    const OPS: usize = 1000;
    let mut joins = Vec::with_capacity(OPS);
    for _ in 0..OPS {
        let manager = manager.clone();
        joins.push(tokio::spawn(async move {
            let handle = manager.spawn(3).await.unwrap();
            transact(&handle, request(1, "c", "c")).await.unwrap().balance
        }));
    }

    let mut balances = Vec::with_capacity(OPS);
    for join in joins {
        balances.push(join.await.unwrap());
    }

    // every reply observed a distinct serial balance: {1, 2, ..., OPS}
    balances.sort_unstable();
    let expected: Vec<i64> = (1..=OPS as i64).collect();
    assert_eq!(balances, expected);

    let handle = manager.spawn(3).await.unwrap();
    assert_eq!(statement(&handle).await.balance.total, OPS as i64);
    drop(handle);

    // drain the durability queues, then check the committed log is a
    // gapless revision prefix in order
    manager.shutdown().await;
    let log = storage.get_transactions_since(3, 0).await.unwrap();
    let revisions: Vec<u64> = log.iter().map(|tx| tx.revision).collect();
    assert_eq!(revisions, (1..=OPS as u64).collect::<Vec<u64>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_spawn_race_creates_one_actor() {
    let (_storage, manager) = seeded_manager().await;
    let manager = Arc::new(manager);

    let mut joins = Vec::new();
    for _ in 0..100 {
        let manager = manager.clone();
        joins.push(tokio::spawn(async move { manager.spawn(1).await.unwrap() }));
    }
    for join in joins {
        let handle = join.await.unwrap();
        // every handle addresses a live actor
        let _ = statement(&handle).await;
    }
    assert_eq!(manager.active_actors().await, 1);
}

#[tokio::test]
async fn test_history_truncation() {
    let (_storage, manager) = seeded_manager().await;
    let handle = manager.spawn(4).await.unwrap();

    for _ in 0..15 {
        transact(&handle, request(1, "c", "c")).await.unwrap();
    }

    let statement = statement(&handle).await;
    assert_eq!(statement.last_transactions.len(), 10);
    assert!(statement
        .last_transactions
        .iter()
        .all(|entry| entry.amount == 1));
    // strictly newest-first
    for pair in statement.last_transactions.windows(2) {
        assert!(pair[0].performed_at >= pair[1].performed_at);
    }
}

#[tokio::test]
async fn test_replay_fidelity_across_restart() {
    let (storage, manager) = seeded_manager().await;
    let handle = manager.spawn(5).await.unwrap();

    // 120 transactions: credits with periodic valid debits
    for index in 0..120u64 {
        let req = if index % 4 == 3 {
            request(5, "d", "debit")
        } else {
            request(10, "c", "credit")
        };
        transact(&handle, req).await.unwrap();
    }
    let before = statement(&handle).await;
    drop(handle);

    // restart: drain this process's actors, then bring up a fresh
    // manager over the same durable log
    manager.shutdown().await;

    let manager = ActorManager::new(storage.clone());
    let handle = manager.spawn(5).await.unwrap();
    let after = statement(&handle).await;

    assert_eq!(after.balance.total, before.balance.total);
    assert_eq!(
        after.last_transactions.len(),
        before.last_transactions.len()
    );
    for (lhs, rhs) in before
        .last_transactions
        .iter()
        .zip(after.last_transactions.iter())
    {
        assert_eq!(lhs.amount, rhs.amount);
        assert_eq!(lhs.kind, rhs.kind);
        assert_eq!(lhs.description, rhs.description);
        assert_eq!(lhs.performed_at, rhs.performed_at);
    }

    // the log holds revisions 1..=120 without gaps, and a snapshot plus
    // its tail reproduces the live balance
    let log = storage.get_transactions_since(5, 0).await.unwrap();
    let revisions: Vec<u64> = log.iter().map(|tx| tx.revision).collect();
    assert_eq!(revisions, (1..=120).collect::<Vec<u64>>());

    let (snapshot, events) = storage.replay(5).await.unwrap();
    let snapshot = snapshot.expect("snapshot policy fired at revision 100");
    assert_eq!(snapshot.revision, 100);
    let mut replayed = snapshot.balance;
    for event in events.iter().filter(|event| event.revision > snapshot.revision) {
        match event.kind {
            ledger_common::transaction::TransactionKind::Credit => {
                replayed += event.amount as i64
            }
            ledger_common::transaction::TransactionKind::Debit => replayed -= event.amount as i64,
        }
    }
    assert_eq!(replayed, before.balance.total);
}

#[tokio::test]
async fn test_restart_resumes_from_durable_prefix() {
    // simulate a crash inside the durability window: only a prefix of
    // the applied events reached the store
    let (storage, _) = seeded_manager().await;
    for revision in 1..=7u64 {
        let event = ledger_common::transaction::Transaction {
            client_id: 1,
            amount: 10,
            kind: ledger_common::transaction::TransactionKind::Credit,
            description: "pre".to_string(),
            created_at: ledger_common::time::now(),
            revision,
        };
        storage.commit(10 * revision as i64, event).await.unwrap();
    }

    let manager = ActorManager::new(storage.clone());
    let handle = manager.spawn(1).await.unwrap();
    let statement = statement(&handle).await;
    assert_eq!(statement.balance.total, 70);

    // the next transaction continues the revision sequence
    transact(&handle, request(1, "c", "next")).await.unwrap();
    drop(handle);
    manager.shutdown().await;
    let log = storage.get_transactions_since(1, 0).await.unwrap();
    assert_eq!(log.last().unwrap().revision, 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_accounts_progress_independently() {
    let (_storage, manager) = seeded_manager().await;
    let manager = Arc::new(manager);

    let mut joins = Vec::new();
    for client_id in [1u64, 2, 3, 4, 5] {
        let manager = manager.clone();
        joins.push(tokio::spawn(async move {
            let handle = manager.spawn(client_id).await.unwrap();
            for _ in 0..50 {
                transact(&handle, request(1, "c", "par")).await.unwrap();
            }
            (client_id, statement(&handle).await.balance.total)
        }));
    }
    for join in joins {
        let (client_id, total) = join.await.unwrap();
        assert_eq!(total, 50, "client {} interfered with", client_id);
    }
    assert_eq!(manager.active_actors().await, 5);
}

// Storage wrapper that can be told to fail replay reads, for the
// spawn-abort path.
struct FlakyStorage {
    inner: MemoryStorage,
    fail_reads: std::sync::atomic::AtomicBool,
}

impl FlakyStorage {
    fn failing() -> Self {
        Self {
            inner: MemoryStorage::new(),
            fail_reads: std::sync::atomic::AtomicBool::new(true),
        }
    }

    fn recover(&self) {
        self.fail_reads
            .store(false, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl crate::core::storage::ClientProvider for FlakyStorage {
    async fn get_client(
        &self,
        client_id: u64,
    ) -> Result<Option<ClientAccount>, LedgerError> {
        self.inner.get_client(client_id).await
    }

    async fn register_client(&self, account: ClientAccount) -> Result<(), LedgerError> {
        self.inner.register_client(account).await
    }

    async fn count_clients(&self) -> Result<u64, LedgerError> {
        self.inner.count_clients().await
    }
}

#[async_trait::async_trait]
impl crate::core::storage::TransactionProvider for FlakyStorage {
    async fn append_transaction(
        &self,
        transaction: &ledger_common::transaction::Transaction,
    ) -> Result<(), LedgerError> {
        self.inner.append_transaction(transaction).await
    }

    async fn get_transactions_since(
        &self,
        client_id: u64,
        from_revision: u64,
    ) -> Result<Vec<ledger_common::transaction::Transaction>, LedgerError> {
        if self.fail_reads.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(LedgerError::Storage("injected read failure".to_string()));
        }
        self.inner
            .get_transactions_since(client_id, from_revision)
            .await
    }
}

#[async_trait::async_trait]
impl crate::core::storage::SnapshotProvider for FlakyStorage {
    async fn store_snapshot(
        &self,
        snapshot: ledger_common::transaction::Snapshot,
    ) -> Result<(), LedgerError> {
        self.inner.store_snapshot(snapshot).await
    }

    async fn get_latest_snapshot(
        &self,
        client_id: u64,
    ) -> Result<Option<ledger_common::transaction::Snapshot>, LedgerError> {
        self.inner.get_latest_snapshot(client_id).await
    }
}

#[tokio::test]
async fn test_replay_failure_aborts_spawn() {
    let storage = Arc::new(FlakyStorage::failing());
    storage
        .register_client(ClientAccount::new(1, 100))
        .await
        .unwrap();
    let manager = ActorManager::new(storage.clone());

    let err = manager.spawn(1).await.unwrap_err();
    assert!(matches!(err, LedgerError::Storage(_)));
    assert_eq!(manager.active_actors().await, 0);

    // once the store recovers, the account spawns cleanly
    storage.recover();
    let handle = manager.spawn(1).await.unwrap();
    assert_eq!(manager.active_actors().await, 1);
    let success = transact(&handle, request(5, "c", "ok")).await.unwrap();
    assert_eq!(success.balance, 5);
}

proptest! {
    // Final balance equals initial + accepted credits - accepted
    // debits, independent of where rejections land in the sequence.
    #[test]
    fn prop_balance_equals_accepted_sum(
        ops in prop::collection::vec((1i64..2000, prop::bool::ANY), 1..200)
    ) {
        let account = ClientAccount::new(1, 1000);
        let mut state = ClientState::new(&account);
        let mut expected: i64 = 0;

        for (amount, is_credit) in ops {
            let kind = if is_credit { "c" } else { "d" };
            let req = TransactionRequest {
                amount,
                kind: kind.to_string(),
                description: "p".to_string(),
            };
            match state.process_transaction(&req) {
                Ok(_) => {
                    expected += if is_credit { amount } else { -amount };
                }
                Err(LedgerError::LimitExceeded) => {
                    // rejected debit: no state change
                }
                Err(err) => panic!("unexpected error: {}", err),
            }
            prop_assert!(state.balance() >= -(account.credit_limit as i64));
        }

        prop_assert_eq!(state.balance(), expected);
    }
}
