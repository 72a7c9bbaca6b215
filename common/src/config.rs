use crate::static_assert;

// How many recent transactions an account keeps in memory and returns
// on a statement read. The window is newest-first.
pub const HISTORY_SIZE: usize = 10;

// A snapshot is written whenever a committed revision is a positive
// multiple of this value. It must never be smaller than HISTORY_SIZE:
// replay rebuilds the statement window purely from the events returned
// alongside the snapshot.
pub const SNAPSHOT_EVERY: u64 = 50;

static_assert!(
    SNAPSHOT_EVERY >= HISTORY_SIZE as u64,
    "snapshot interval must cover the history window"
);

// Bounded capacity of an actor inbox. A full inbox backpressures the
// sender instead of dropping messages.
pub const DEFAULT_INBOX_CAPACITY: usize = 1024;

// Capacity of the per-account durability queue sitting between the
// actor reply and the store append. Bounds how many committed events
// can be lost on a crash.
pub const DURABILITY_QUEUE_CAPACITY: usize = 1024;

// Description bounds, in characters after trimming.
pub const DESCRIPTION_MIN_LEN: usize = 1;
pub const DESCRIPTION_MAX_LEN: usize = 10;

// Fixed seed set loaded at bootstrap: (client id, credit limit).
// Every seeded account starts with a zero balance.
pub const INITIAL_ACCOUNTS: [(u64, u64); 5] = [
    (1, 100_000),
    (2, 80_000),
    (3, 1_000_000),
    (4, 10_000_000),
    (5, 500_000),
];

// Default listening ports for the daemon and the shard router.
pub const DEFAULT_APP_PORT: u16 = 8080;
pub const DEFAULT_ROUTER_PORT: u16 = 9999;
