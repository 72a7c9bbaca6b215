mod client;
mod snapshot;
mod transaction;

pub use self::{client::*, snapshot::*, transaction::*};
