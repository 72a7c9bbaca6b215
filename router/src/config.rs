use clap::Parser;
use ledger_common::config::DEFAULT_ROUTER_PORT;
use std::time::Duration;

/// Router configuration. The backend list must be identical on every
/// router instance and only change on a coordinated redeploy; the
/// account-to-backend binding depends on its order and length.
#[derive(Debug, Parser)]
#[command(name = "ledger_router", about = "Shard-routing reverse proxy")]
pub struct RouterConfig {
    /// Listening port
    #[arg(long, env = "APP_PORT", default_value_t = DEFAULT_ROUTER_PORT)]
    pub port: u16,

    /// Address to bind on
    #[arg(long, default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Ordered backend base URLs, e.g. http://web01:8080,http://web02:8080
    #[arg(long, env = "APP_BACKENDS", value_delimiter = ',', required = true)]
    pub backends: Vec<String>,

    /// Cap on in-flight requests per backend; unlimited when absent
    #[arg(long, env = "APP_MAX_CONNS_PER_HOST")]
    pub max_conns_per_host: Option<usize>,

    /// Total idle-connection budget, split across backends when the
    /// per-host setting is absent
    #[arg(long, env = "APP_MAX_IDLE_CONNS")]
    pub max_idle_conns: Option<usize>,

    /// Idle connections kept per backend
    #[arg(long, env = "APP_MAX_IDLE_CONNS_PER_HOST")]
    pub max_idle_conns_per_host: Option<usize>,

    /// Idle connection timeout in seconds
    #[arg(long, env = "APP_IDLE_CONN_TIMEOUT_SECONDS", default_value_t = 90)]
    pub idle_conn_timeout_seconds: u64,
}

impl RouterConfig {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn idle_conn_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_conn_timeout_seconds)
    }

    // Idle pool size per backend: the explicit per-host value wins,
    // otherwise the global budget is split evenly.
    pub fn idle_per_host(&self) -> Option<usize> {
        self.max_idle_conns_per_host.or_else(|| {
            self.max_idle_conns
                .map(|total| (total / self.backends.len().max(1)).max(1))
        })
    }
}
