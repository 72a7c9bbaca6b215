use crate::core::{
    error::LedgerError,
    message::{AccountMessage, AccountResponse, Envelope, MessageResult},
    state::ClientState,
    storage::Storage,
};
use ledger_common::{
    account::{ClientAccount, ClientId},
    api::TransactionSuccess,
    config::{DEFAULT_INBOX_CAPACITY, DURABILITY_QUEUE_CAPACITY},
    transaction::Transaction,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Cloneable address of an account actor. Holding one only grants the
/// ability to enqueue messages; the state stays with the actor.
#[derive(Clone, Debug)]
pub struct ActorHandle {
    inbox: mpsc::Sender<Envelope>,
}

impl ActorHandle {
    /// Send one message and wait for its reply. A full inbox
    /// backpressures here until a slot frees up; replies come back
    /// one-for-one in send order.
    pub async fn send(&self, message: AccountMessage) -> MessageResult {
        let (reply, receiver) = oneshot::channel();
        self.inbox
            .send(Envelope { message, reply })
            .await
            .map_err(|_| LedgerError::ActorClosed)?;
        receiver.await.map_err(|_| LedgerError::ActorClosed)?
    }
}

/// Single-writer task owning one account's state. Messages are taken
/// off the inbox strictly one at a time; nothing else can touch the
/// state, so every caller observes a serial view of the account.
pub struct AccountActor<S: Storage> {
    state: ClientState,
    // flips on the first successful Refresh; the manager guarantees
    // that message is delivered before any external one
    ready: bool,
    storage: Arc<S>,
    inbox: mpsc::Receiver<Envelope>,
    durability: mpsc::Sender<(i64, Transaction)>,
}

impl<S: Storage> AccountActor<S> {
    pub fn new(
        account: &ClientAccount,
        storage: Arc<S>,
    ) -> (ActorHandle, AccountActor<S>, DurabilityWriter<S>) {
        let (inbox_tx, inbox_rx) = mpsc::channel(DEFAULT_INBOX_CAPACITY);
        let (durability_tx, durability_rx) = mpsc::channel(DURABILITY_QUEUE_CAPACITY);

        let actor = AccountActor {
            state: ClientState::new(account),
            ready: false,
            storage: storage.clone(),
            inbox: inbox_rx,
            durability: durability_tx,
        };
        let writer = DurabilityWriter {
            client_id: account.client_id,
            storage,
            queue: durability_rx,
        };
        (ActorHandle { inbox: inbox_tx }, actor, writer)
    }

    pub async fn run(mut self) {
        let client_id = self.state.client_id();
        debug!("actor for client {} started", client_id);

        while let Some(Envelope { message, reply }) = self.inbox.recv().await {
            match message {
                AccountMessage::Transact(request) => {
                    if !self.ready {
                        let _ = reply.send(Err(LedgerError::NotReady));
                        continue;
                    }
                    match self.state.process_transaction(&request) {
                        Ok(event) => {
                            let success = TransactionSuccess {
                                credit_limit: self.state.credit_limit(),
                                balance: self.state.balance(),
                            };
                            // reply as soon as the change is applied in
                            // memory; the durable append trails behind
                            if reply
                                .send(Ok(AccountResponse::Transacted(success)))
                                .is_err()
                            {
                                trace!("caller of client {} went away", client_id);
                            }
                            if self
                                .durability
                                .send((success.balance, event))
                                .await
                                .is_err()
                            {
                                error!("durability queue of client {} is closed", client_id);
                            }
                        }
                        Err(err) => {
                            let _ = reply.send(Err(err));
                        }
                    }
                }
                AccountMessage::QueryHistory => {
                    let result = if self.ready {
                        Ok(AccountResponse::Statement(self.state.statement()))
                    } else {
                        Err(LedgerError::NotReady)
                    };
                    let _ = reply.send(result);
                }
                AccountMessage::Refresh => {
                    let _ = reply.send(self.refresh().await);
                }
            }
        }

        // inbox closed: dropping self also closes the durability queue,
        // letting the writer drain what is left and exit
        debug!("actor for client {} stopped", client_id);
    }

    async fn refresh(&mut self) -> MessageResult {
        let client_id = self.state.client_id();
        debug!("refreshing state of client {}", client_id);
        let (snapshot, events) = self.storage.replay(client_id).await?;
        self.state.rebuild(snapshot, &events);
        self.ready = true;
        info!(
            "client {} ready at revision {} with balance {}",
            client_id,
            self.state.revision(),
            self.state.balance()
        );
        Ok(AccountResponse::Refreshed)
    }
}

/// Drains one account's durability queue in revision order. Runs as its
/// own task so the actor can reply before the append lands; a store
/// failure here is logged and never rolls back the in-memory state.
pub struct DurabilityWriter<S: Storage> {
    client_id: ClientId,
    storage: Arc<S>,
    queue: mpsc::Receiver<(i64, Transaction)>,
}

impl<S: Storage> DurabilityWriter<S> {
    pub async fn run(mut self) {
        while let Some((post_balance, event)) = self.queue.recv().await {
            let revision = event.revision;
            if let Err(err) = self.storage.commit(post_balance, event).await {
                error!(
                    "append failed for client {} at revision {}: {}",
                    self.client_id, revision, err
                );
            }
        }
        trace!("durability writer of client {} drained", self.client_id);
    }
}
