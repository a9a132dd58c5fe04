//! Registry of active relay connections.
//!
//! The registry's lifetime is scoped to the serving process, and
//! `accept`/`remove` are the only mutation points.

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// Registry of live relay connections, keyed by a per-connection id.
#[derive(Default)]
pub struct ConnectionManager {
    active: DashMap<Uuid, String>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection on `channel` and return its id.
    pub fn accept(&self, channel: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.active.insert(id, channel.to_string());
        debug!(%id, %channel, "connection accepted");
        id
    }

    /// Remove a connection. Returns `true` if it was registered.
    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.active.remove(id).is_some();
        if removed {
            debug!(%id, "connection removed");
        }
        removed
    }

    /// Number of live connections across all channels.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("active", &self.active.len())
            .finish()
    }
}
