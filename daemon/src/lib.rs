// Credit-account transaction daemon
// Exposes internal modules for integration testing

#[macro_use]
extern crate log;

pub mod config;
pub mod core;
pub mod rpc;
