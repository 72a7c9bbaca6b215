use anyhow::{Context, Result};
use clap::Parser;
use ledger_common::{account::ClientAccount, config::INITIAL_ACCOUNTS};
use ledger_daemon::{
    config::Config,
    core::{
        manager::ActorManager,
        storage::{ClientProvider, MemoryStorage, SledStorage, Storage},
    },
    rpc::DaemonRpcServer,
};
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    if config.in_memory {
        info!("using in-memory storage");
        run(Arc::new(MemoryStorage::new()), &config).await
    } else {
        info!("opening database at {}", config.db_path);
        let storage = SledStorage::open(&config.db_path).context("failed to open database")?;
        if config.drop_db_on_start {
            storage.reset().context("failed to reset database")?;
        }
        run(Arc::new(storage), &config).await
    }
}

async fn run<S: Storage>(storage: Arc<S>, config: &Config) -> Result<()> {
    seed_accounts(storage.as_ref()).await?;

    let manager = Arc::new(ActorManager::new(storage));
    let server = DaemonRpcServer::new(manager.clone(), config.listen_address()).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown signal received");

    // stop accepting requests first, then let the actors drain their
    // inboxes and durability queues
    server.stop(true).await;
    manager.shutdown().await;
    Ok(())
}

async fn seed_accounts<S: Storage>(storage: &S) -> Result<()> {
    for (client_id, credit_limit) in INITIAL_ACCOUNTS {
        storage
            .register_client(ClientAccount::new(client_id, credit_limit))
            .await?;
    }
    info!("{} accounts registered", storage.count_clients().await?);
    Ok(())
}
