use clap::Parser;
use ledger_common::config::DEFAULT_APP_PORT;

/// Runtime configuration of the daemon. Every option is also
/// recognized as an environment variable for container deployments.
#[derive(Debug, Parser)]
#[command(name = "ledger_daemon", about = "Credit-account transaction daemon")]
pub struct Config {
    /// Listening port of the HTTP/RPC surface
    #[arg(long, env = "APP_PORT", default_value_t = DEFAULT_APP_PORT)]
    pub port: u16,

    /// Address to bind on
    #[arg(long, default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Keep all state in memory instead of the durable backend
    #[arg(long, env = "APP_IN_MEMORY", default_value_t = false)]
    pub in_memory: bool,

    /// Path of the embedded database
    #[arg(long, default_value = "ledger_db")]
    pub db_path: String,

    /// Test-only: wipe the durable state before serving
    #[arg(long, env = "DROP_DB_ON_START", default_value_t = false)]
    pub drop_db_on_start: bool,
}

impl Config {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
