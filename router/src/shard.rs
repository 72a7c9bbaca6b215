use ledger_common::account::ClientId;

// Fixed binding of an account to one backend. With the same ordered
// backend list on every router, each id lands on exactly one process,
// which is what keeps the single-writer guarantee fleet-wide.
pub fn shard_index(client_id: ClientId, backend_count: usize) -> usize {
    (client_id % backend_count as u64) as usize
}

// Pull the client id out of a `/clientes/{id}/...` path. Anything that
// does not parse routes like id 0, so malformed requests still get a
// deterministic backend (which will answer with its own error).
pub fn extract_client_id(path: &str) -> ClientId {
    path.split('/')
        .nth(2)
        .and_then(|segment| segment.parse().ok())
        .unwrap_or(0)
}
