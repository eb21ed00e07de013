//! Room Registry & Session Manager (4.3, 5).
//!
//! Grounded on the teacher's `RelationshipStore`'s `Arc<dyn ...>`-behind-a-
//! registry shape and `GraphCache`'s sharded-state-over-`DashMap` pattern.
//! One [`RoomHandle`] per workflow, keyed in a `DashMap` so cross-workflow
//! contention is zero. Per-room serialization for structural operations is
//! realized by holding the handle's `tokio::sync::Mutex<Room>` for the
//! entire authorize-mutate-broadcast critical section — the same commit
//! order is therefore the same broadcast order (invariant 4).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use collab_shared::domain::entities::{EditorSession, Room};

use crate::protocol::{OutboundEvent, PresenceEntry};

pub type OutboundSender = mpsc::UnboundedSender<OutboundEvent>;

/// A live room plus the outbound channels needed to reach each connection
/// in it. `room` is the structural-serialization lock (5): whoever holds it
/// owns the right to commit-then-broadcast next.
pub struct RoomHandle {
    pub room: Mutex<Room>,
    subscribers: Mutex<HashMap<Uuid, OutboundSender>>,
}

impl RoomHandle {
    fn new(workflow_id: Uuid) -> Self {
        Self {
            room: Mutex::new(Room::new(workflow_id, Utc::now())),
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// Sends to every connection except `exclude`, if given. Dead channels
    /// (client gone, receiver dropped) are pruned silently.
    pub async fn broadcast(&self, event: &OutboundEvent, exclude: Option<Uuid>) {
        let mut subscribers = self.subscribers.lock().await;
        subscribers.retain(|connection_id, sender| {
            if Some(*connection_id) == exclude {
                return true;
            }
            sender.send(event.clone()).is_ok()
        });
    }

    pub async fn send_to(&self, connection_id: Uuid, event: OutboundEvent) {
        let subscribers = self.subscribers.lock().await;
        if let Some(sender) = subscribers.get(&connection_id) {
            let _ = sender.send(event);
        }
    }

    /// Updates `connection_id`'s cursor and bumps `last_modified`. No-op
    /// (returns `false`) if the session already left the room.
    pub async fn update_cursor(&self, connection_id: Uuid, cursor: collab_shared::domain::entities::Cursor) -> bool {
        let mut room = self.room.lock().await;
        let Some(session) = room.sessions.get_mut(&connection_id) else {
            return false;
        };
        session.cursor = Some(cursor);
        let now = Utc::now();
        session.touch(now);
        room.touch(now);
        true
    }

    pub async fn update_selection(
        &self,
        connection_id: Uuid,
        selection: collab_shared::domain::entities::Selection,
    ) -> bool {
        let mut room = self.room.lock().await;
        let Some(session) = room.sessions.get_mut(&connection_id) else {
            return false;
        };
        session.selection = Some(selection);
        let now = Utc::now();
        session.touch(now);
        room.touch(now);
        true
    }

    pub async fn presence_snapshot(&self) -> Vec<PresenceEntry> {
        let room = self.room.lock().await;
        room.sessions
            .values()
            .map(|s| PresenceEntry {
                socket_id: s.connection_id,
                user_id: s.user_id,
                user_name: s.display_name.clone(),
                cursor: s.cursor,
                selection: s.selection.clone(),
            })
            .collect()
    }
}

/// `Clone` is derivable on `OutboundEvent` only where needed for broadcast,
/// hence the explicit bound here instead of deriving it workspace-wide.
impl Clone for OutboundEvent {
    fn clone(&self) -> Self {
        serde_json::from_value(serde_json::to_value(self).expect("OutboundEvent always serializes"))
            .expect("OutboundEvent round-trips through its own JSON shape")
    }
}

#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<Uuid, Arc<RoomHandle>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, workflow_id: Uuid) -> Option<Arc<RoomHandle>> {
        self.rooms.get(&workflow_id).map(|r| r.clone())
    }

    fn get_or_create(&self, workflow_id: Uuid) -> Arc<RoomHandle> {
        self.rooms
            .entry(workflow_id)
            .or_insert_with(|| Arc::new(RoomHandle::new(workflow_id)))
            .clone()
    }

    /// Registers `session` in `workflow_id`'s room (creating it if needed)
    /// and its outbound channel. Returns the handle for subsequent sends.
    pub async fn join(&self, workflow_id: Uuid, session: EditorSession, sender: OutboundSender) -> Arc<RoomHandle> {
        let handle = self.get_or_create(workflow_id);
        let connection_id = session.connection_id;
        {
            let mut room = handle.room.lock().await;
            room.insert(session);
            room.touch(Utc::now());
        }
        {
            let mut subscribers = handle.subscribers.lock().await;
            subscribers.insert(connection_id, sender);
        }
        handle
    }

    /// Removes `connection_id` from `workflow_id`'s room. Destroys the room
    /// if it becomes empty (4.3). Returns `true` if the session was present.
    pub async fn leave(&self, workflow_id: Uuid, connection_id: Uuid) -> bool {
        let Some(handle) = self.get(workflow_id) else {
            return false;
        };

        let (removed, now_empty) = {
            let mut room = handle.room.lock().await;
            let removed = room.remove(connection_id).is_some();
            (removed, room.is_empty())
        };
        {
            let mut subscribers = handle.subscribers.lock().await;
            subscribers.remove(&connection_id);
        }
        if now_empty {
            self.rooms.remove(&workflow_id);
        }
        removed
    }

    /// Side-band workflow deletion (4.3): broadcast, force every session
    /// out, and drop the room unconditionally.
    pub async fn destroy(&self, workflow_id: Uuid) -> Option<Arc<RoomHandle>> {
        self.rooms.remove(&workflow_id).map(|(_, handle)| handle)
    }

    pub fn active_room_count(&self) -> usize {
        self.rooms.len()
    }
}
