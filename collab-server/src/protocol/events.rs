//! Wire protocol (section 6, 6.1).
//!
//! Every frame, inbound or outbound, is one WebSocket text frame carrying
//! `{"event": <name>, "data": <payload>}` — realized here as two
//! internally-tagged enums (`tag = "event", content = "data"`), the same
//! shape the teacher's DTOs use for request/response bodies.

use collab_shared::domain::entities::{Cursor, Selection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Several of the outbound DTOs below derive `Deserialize` too, even though
// the server only ever serializes them — integration tests parse frames
// back off the wire to assert on them.

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum InboundEvent {
    #[serde(rename = "join-workflow")]
    JoinWorkflow { #[serde(rename = "workflowId")] workflow_id: Uuid },

    #[serde(rename = "request-sync")]
    RequestSync { #[serde(rename = "workflowId")] workflow_id: Uuid },

    #[serde(rename = "leave-workflow")]
    LeaveWorkflow,

    #[serde(rename = "workflow-operation")]
    WorkflowOperation(WorkflowOperationFrame),

    #[serde(rename = "subblock-update")]
    SubblockUpdate(SubblockUpdateFrame),

    #[serde(rename = "cursor-update")]
    CursorUpdate { cursor: Cursor },

    #[serde(rename = "selection-update")]
    SelectionUpdate { selection: Selection },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOperationFrame {
    pub operation: String,
    pub target: String,
    pub payload: serde_json::Value,
    pub timestamp: i64,
    #[serde(default)]
    pub operation_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubblockUpdateFrame {
    pub block_id: Uuid,
    pub subblock_id: String,
    pub value: serde_json::Value,
    pub timestamp: i64,
    #[serde(default)]
    pub operation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub socket_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOperationBroadcast {
    pub operation: String,
    pub target: String,
    pub payload: serde_json::Value,
    pub timestamp: i64,
    pub sender_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubblockUpdateBroadcast {
    pub block_id: Uuid,
    pub subblock_id: String,
    pub value: serde_json::Value,
    pub timestamp: i64,
    pub sender_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum OutboundEvent {
    #[serde(rename = "workflow-state")]
    WorkflowState(crate::snapshot::WorkflowSnapshot),

    #[serde(rename = "join-workflow-error")]
    JoinWorkflowError { error: String },

    #[serde(rename = "workflow-operation")]
    WorkflowOperationBroadcast(WorkflowOperationBroadcast),

    #[serde(rename = "operation-confirmed")]
    OperationConfirmed {
        #[serde(skip_serializing_if = "Option::is_none")]
        operation_id: Option<String>,
        server_timestamp: i64,
    },

    #[serde(rename = "operation-failed")]
    OperationFailed {
        #[serde(skip_serializing_if = "Option::is_none")]
        operation_id: Option<String>,
        error: String,
        retryable: bool,
    },

    #[serde(rename = "operation-forbidden")]
    OperationForbidden {
        #[serde(rename = "type")]
        kind: String,
        message: String,
        operation: String,
        target: String,
    },

    #[serde(rename = "operation-error")]
    OperationError {
        #[serde(rename = "type")]
        kind: String,
        message: String,
    },

    #[serde(rename = "subblock-update")]
    SubblockUpdateBroadcast(SubblockUpdateBroadcast),

    #[serde(rename = "cursor-update")]
    CursorUpdate {
        socket_id: Uuid,
        user_id: Uuid,
        user_name: String,
        cursor: Cursor,
    },

    #[serde(rename = "selection-update")]
    SelectionUpdate {
        socket_id: Uuid,
        user_id: Uuid,
        user_name: String,
        selection: Selection,
    },

    #[serde(rename = "presence-update")]
    PresenceUpdate(Vec<PresenceEntry>),

    #[serde(rename = "workflow-deleted")]
    WorkflowDeleted {
        workflow_id: Uuid,
        message: String,
        timestamp: i64,
    },

    #[serde(rename = "workflow-reverted")]
    WorkflowReverted {
        workflow_id: Uuid,
        message: String,
        timestamp: i64,
    },

    #[serde(rename = "error")]
    Error {
        #[serde(rename = "type")]
        kind: String,
        message: String,
    },
}
