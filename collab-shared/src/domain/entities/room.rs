use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::editor_session::EditorSession;

/// In-memory collaboration room keyed by workflow id (section 3, I8).
///
/// Pure data: the concurrency wrapper (one lock/mailbox per room) lives in
/// the server crate's room registry, not here. A room exists iff
/// `active_connections() > 0`; the registry destroys it on reaching zero.
#[derive(Debug, Clone)]
pub struct Room {
    pub workflow_id: Uuid,
    pub sessions: HashMap<Uuid, EditorSession>,
    pub last_modified: DateTime<Utc>,
}

impl Room {
    pub fn new(workflow_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            workflow_id,
            sessions: HashMap::new(),
            last_modified: now,
        }
    }

    pub fn active_connections(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn insert(&mut self, session: EditorSession) {
        self.sessions.insert(session.connection_id, session);
    }

    pub fn remove(&mut self, connection_id: Uuid) -> Option<EditorSession> {
        self.sessions.remove(&connection_id)
    }

    /// Deduplicate by `user_id` for "unique user" accounting while keeping
    /// one entry per connection for per-socket targeting elsewhere.
    pub fn unique_user_count(&self) -> usize {
        self.sessions
            .values()
            .map(|s| s.user_id)
            .collect::<std::collections::HashSet<_>>()
            .len()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified = now;
    }
}
