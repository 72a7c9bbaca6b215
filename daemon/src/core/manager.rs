use crate::core::{
    actor::{AccountActor, ActorHandle},
    error::LedgerError,
    message::AccountMessage,
    storage::{ClientProvider, Storage},
};
use futures::future::join_all;
use ledger_common::account::ClientId;
use std::{collections::HashMap, sync::Arc};
use tokio::{sync::Mutex, task::JoinHandle};

/// On-demand spawn and cache of account actors.
///
/// The registry map is the only process-wide mutable state; it
/// guarantees at most one live actor per account id in this process.
/// The shard router extends that guarantee across the fleet by pinning
/// each id to one backend.
pub struct ActorManager<S: Storage> {
    storage: Arc<S>,
    actors: Mutex<HashMap<ClientId, ActorHandle>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: Storage> ActorManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            actors: Mutex::new(HashMap::new()),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Return the actor owning `client_id`, creating it on first use.
    ///
    /// A new actor replays its durable history before the handle
    /// becomes visible, so a replay failure aborts the spawn and no
    /// half-initialized actor is ever reachable. The registry lock is
    /// held for the whole miss path; concurrent spawners wait, but
    /// sends to already-spawned actors never do.
    pub async fn spawn(&self, client_id: ClientId) -> Result<ActorHandle, LedgerError> {
        let mut actors = self.actors.lock().await;
        if let Some(handle) = actors.get(&client_id) {
            return Ok(handle.clone());
        }

        let account = self
            .storage
            .get_client(client_id)
            .await?
            .ok_or(LedgerError::ClientNotFound(client_id))?;

        debug!("spawning actor for client {}", client_id);
        let (handle, actor, writer) = AccountActor::new(&account, self.storage.clone());
        let actor_task = tokio::spawn(actor.run());
        let writer_task = tokio::spawn(writer.run());
        {
            let mut tasks = self.tasks.lock().await;
            tasks.push(actor_task);
            tasks.push(writer_task);
        }

        if let Err(err) = handle.send(AccountMessage::Refresh).await {
            // dropping the only handle closes the inbox and winds the
            // tasks down; they are still awaited on shutdown
            error!("initial replay of client {} failed: {}", client_id, err);
            return Err(err);
        }

        actors.insert(client_id, handle.clone());
        Ok(handle)
    }

    pub async fn active_actors(&self) -> usize {
        self.actors.lock().await.len()
    }

    /// Drop every actor handle and wait for the actors and their
    /// durability writers to drain their queues.
    pub async fn shutdown(&self) {
        info!("shutting down actor manager");
        {
            let mut actors = self.actors.lock().await;
            actors.clear();
        }
        let tasks = {
            let mut tasks = self.tasks.lock().await;
            std::mem::take(&mut *tasks)
        };
        for result in join_all(tasks).await {
            if let Err(err) = result {
                warn!("actor task ended abnormally: {}", err);
            }
        }
        info!("all account actors drained");
    }
}
