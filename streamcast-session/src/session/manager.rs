use crate::session::command::SessionHandle;
use dashmap::DashMap;
use std::sync::Arc;
use streamcast_core::{Role, StreamId};
use tracing::info;

/// Registry of running sessions, keyed by stream and role so that one
/// process can host a stream while viewing others. Handles are removed when
/// the session is stopped through the manager; a handle whose session has
/// already finished simply reports `Closed` on use.
#[derive(Clone, Default)]
pub struct SessionManager {
    sessions: Arc<DashMap<(StreamId, Role), SessionHandle>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a session spawned by the caller. Replaces any earlier handle
    /// for the same stream and role.
    pub fn register(&self, stream_id: StreamId, role: Role, handle: SessionHandle) {
        info!("Registering {} session for {}", role, stream_id);
        self.sessions.insert((stream_id, role), handle);
    }

    pub fn get(&self, stream_id: &StreamId, role: Role) -> Option<SessionHandle> {
        self.sessions
            .get(&(stream_id.clone(), role))
            .map(|h| h.value().clone())
    }

    /// Stop one session and forget its handle.
    pub async fn stop(&self, stream_id: &StreamId, role: Role) {
        if let Some((_, handle)) = self.sessions.remove(&(stream_id.clone(), role)) {
            handle.stop().await;
        }
    }

    pub async fn stop_all(&self) {
        let keys: Vec<_> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for (stream_id, role) in keys {
            self.stop(&stream_id, role).await;
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
