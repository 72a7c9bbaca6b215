// Wall-clock timestamps used across the service.
//
// Timestamps are only ever assigned by the single writer of an account
// (the owning actor or the store taking a snapshot), so they are safe to
// use for the newest-first ordering of the statement window. They are
// NOT suitable for ordering events across accounts.

use chrono::{DateTime, Utc};

pub type Timestamp = DateTime<Utc>;

#[inline]
pub fn now() -> Timestamp {
    Utc::now()
}
