//! Broadcaster (4.6).
//!
//! A thin layer over [`RoomHandle`] that composes the outbound envelopes the
//! Lifecycle Controller needs, keeping event-shape knowledge out of the
//! connection-handling loop.

use uuid::Uuid;

use crate::collab::room_registry::RoomHandle;
use crate::protocol::events::{PresenceEntry, SubblockUpdateBroadcast, WorkflowOperationBroadcast};
use crate::protocol::OutboundEvent;

pub struct Broadcaster;

impl Broadcaster {
    pub async fn workflow_operation(
        room: &RoomHandle,
        sender_id: Uuid,
        operation: String,
        target: String,
        payload: serde_json::Value,
        timestamp: i64,
        operation_id: Option<String>,
    ) {
        let event = OutboundEvent::WorkflowOperationBroadcast(WorkflowOperationBroadcast {
            operation,
            target,
            payload,
            timestamp,
            sender_id,
            operation_id,
        });
        room.broadcast(&event, Some(sender_id)).await;
    }

    pub async fn position_update(
        room: &RoomHandle,
        sender_id: Uuid,
        payload: serde_json::Value,
        timestamp: i64,
        operation_id: Option<String>,
    ) {
        // Fast path (4.7): broadcast carries the client's own timestamp,
        // issued before the DB write is observable (invariant 5).
        Self::workflow_operation(
            room,
            sender_id,
            "update-position".to_string(),
            "block".to_string(),
            payload,
            timestamp,
            operation_id,
        )
        .await;
    }

    pub async fn sub_block_update(
        room: &RoomHandle,
        sender_id: Uuid,
        block_id: Uuid,
        sub_block_id: String,
        value: serde_json::Value,
        timestamp: i64,
        operation_id: Option<String>,
    ) {
        let event = OutboundEvent::SubblockUpdateBroadcast(SubblockUpdateBroadcast {
            block_id,
            subblock_id: sub_block_id,
            value,
            timestamp,
            sender_id,
            operation_id,
        });
        room.broadcast(&event, Some(sender_id)).await;
    }

    pub async fn cursor_update(
        room: &RoomHandle,
        socket_id: Uuid,
        user_id: Uuid,
        user_name: String,
        cursor: collab_shared::domain::entities::Cursor,
    ) {
        room.broadcast(
            &OutboundEvent::CursorUpdate {
                socket_id,
                user_id,
                user_name,
                cursor,
            },
            Some(socket_id),
        )
        .await;
    }

    pub async fn selection_update(
        room: &RoomHandle,
        socket_id: Uuid,
        user_id: Uuid,
        user_name: String,
        selection: collab_shared::domain::entities::Selection,
    ) {
        room.broadcast(
            &OutboundEvent::SelectionUpdate {
                socket_id,
                user_id,
                user_name,
                selection,
            },
            Some(socket_id),
        )
        .await;
    }

    pub async fn presence_update(room: &RoomHandle) {
        let entries: Vec<PresenceEntry> = room.presence_snapshot().await;
        room.broadcast(&OutboundEvent::PresenceUpdate(entries), None).await;
    }

    pub async fn workflow_deleted(room: &RoomHandle, workflow_id: Uuid, message: String, timestamp: i64) {
        room.broadcast(
            &OutboundEvent::WorkflowDeleted {
                workflow_id,
                message,
                timestamp,
            },
            None,
        )
        .await;
    }
}
