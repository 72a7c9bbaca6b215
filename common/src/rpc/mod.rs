#[cfg(feature = "rpc-server")]
pub mod server;

mod error;
mod rpc_handler;
mod types;

pub use error::*;
pub use rpc_handler::*;
pub use types::*;
