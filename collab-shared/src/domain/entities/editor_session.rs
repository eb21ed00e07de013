use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pointer position broadcast as part of presence (`cursor-update`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

/// What the editor currently has selected (`selection-update`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Option<Uuid>,
}

/// One live connection's presence and identity (section 3, I9).
///
/// Transient: created on a successful `join-workflow`, destroyed on
/// `leave-workflow` or disconnect. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSession {
    pub connection_id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub workflow_id: Uuid,
    pub joined_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub cursor: Option<Cursor>,
    pub selection: Option<Selection>,
}

impl EditorSession {
    pub fn new(connection_id: Uuid, user_id: Uuid, display_name: String, workflow_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            connection_id,
            user_id,
            display_name,
            workflow_id,
            joined_at: now,
            last_activity: now,
            cursor: None,
            selection: None,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }
}
