//! Operation Validator (4.4).
//!
//! Tagged variant parsing grounded on `serde`'s internally-tagged enum
//! pattern used throughout the teacher's DTOs. `parse` maps a raw
//! `(target, operation, payload)` triple onto a typed variant or fails with
//! `ValidationError` — schema-invalid frames never reach the Mutation
//! Engine (invariant 10).

use collab_shared::shared::CollabError;
use serde::Deserialize;
use uuid::Uuid;

use crate::protocol::events::WorkflowOperationFrame;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PositionPayload {
    pub x: f64,
    pub y: f64,
}

/// Auto-Connect Edge (4.5): optional on block *add*/*duplicate*, wires the
/// new block to a suggested predecessor inside the same transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoConnectEdge {
    pub id: Uuid,
    pub source_block_id: Uuid,
    pub target_block_id: Uuid,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ParsedOperation {
    Block(BlockOp),
    Edge(EdgeOp),
    Subflow(SubflowOp),
}

#[derive(Debug, Clone)]
pub enum BlockOp {
    Add {
        id: Uuid,
        block_type: String,
        name: String,
        position: PositionPayload,
        data: serde_json::Value,
        parent_id: Option<Uuid>,
        extent: Option<String>,
        auto_connect_edge: Option<AutoConnectEdge>,
    },
    Remove {
        id: Uuid,
    },
    Update {
        id: Uuid,
        sub_blocks: Option<serde_json::Value>,
        outputs: Option<serde_json::Value>,
        data: Option<serde_json::Value>,
        height: Option<f64>,
    },
    UpdatePosition {
        id: Uuid,
        position: PositionPayload,
    },
    UpdateName {
        id: Uuid,
        name: String,
    },
    ToggleEnabled {
        id: Uuid,
    },
    UpdateParent {
        id: Uuid,
        parent_id: Option<Uuid>,
        extent: Option<String>,
    },
    UpdateWide {
        id: Uuid,
        is_wide: bool,
    },
    UpdateAdvancedMode {
        id: Uuid,
        advanced_mode: bool,
    },
    ToggleHandles {
        id: Uuid,
    },
    Duplicate {
        /// Fresh id for the copy (4.5 *duplicate*).
        id: Uuid,
        /// The original block's id, carried for logging only.
        source_id: Option<Uuid>,
        block_type: String,
        name: String,
        position: PositionPayload,
        data: serde_json::Value,
        parent_id: Option<Uuid>,
        extent: Option<String>,
        auto_connect_edge: Option<AutoConnectEdge>,
    },
}

#[derive(Debug, Clone)]
pub enum EdgeOp {
    Add {
        id: Uuid,
        source_block_id: Uuid,
        target_block_id: Uuid,
        source_handle: Option<String>,
        target_handle: Option<String>,
    },
    Remove {
        id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub enum SubflowOp {
    Update { id: Uuid, config: serde_json::Value },
    /// *add*/*remove*: accepted at the protocol boundary but implicit
    /// through block add/remove (4.5) — carries no work of its own.
    Noop,
}

impl BlockOp {
    pub fn target_id(&self) -> Uuid {
        match self {
            BlockOp::Add { id, .. }
            | BlockOp::Remove { id }
            | BlockOp::Update { id, .. }
            | BlockOp::UpdatePosition { id, .. }
            | BlockOp::UpdateName { id, .. }
            | BlockOp::ToggleEnabled { id }
            | BlockOp::UpdateParent { id, .. }
            | BlockOp::UpdateWide { id, .. }
            | BlockOp::UpdateAdvancedMode { id, .. }
            | BlockOp::ToggleHandles { id }
            | BlockOp::Duplicate { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockOp::Add { .. } => "add",
            BlockOp::Remove { .. } => "remove",
            BlockOp::Update { .. } => "update",
            BlockOp::UpdatePosition { .. } => "update-position",
            BlockOp::UpdateName { .. } => "update-name",
            BlockOp::ToggleEnabled { .. } => "toggle-enabled",
            BlockOp::UpdateParent { .. } => "update-parent",
            BlockOp::UpdateWide { .. } => "update-wide",
            BlockOp::UpdateAdvancedMode { .. } => "update-advanced-mode",
            BlockOp::ToggleHandles { .. } => "toggle-handles",
            BlockOp::Duplicate { .. } => "duplicate",
        }
    }
}

impl EdgeOp {
    pub fn name(&self) -> &'static str {
        match self {
            EdgeOp::Add { .. } => "add",
            EdgeOp::Remove { .. } => "remove",
        }
    }
}

#[derive(Deserialize)]
struct IdOnly {
    id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBlockPayload {
    id: Uuid,
    #[serde(rename = "type")]
    block_type: String,
    name: String,
    position: PositionPayload,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    parent_id: Option<Uuid>,
    #[serde(default)]
    extent: Option<String>,
    #[serde(default)]
    auto_connect_edge: Option<AutoConnectEdge>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBlockPayload {
    id: Uuid,
    #[serde(default)]
    sub_blocks: Option<serde_json::Value>,
    #[serde(default)]
    outputs: Option<serde_json::Value>,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    height: Option<f64>,
}

#[derive(Deserialize)]
struct UpdatePositionPayload {
    id: Uuid,
    position: PositionPayload,
}

#[derive(Deserialize)]
struct UpdateNamePayload {
    id: Uuid,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateParentPayload {
    id: Uuid,
    #[serde(default)]
    parent_id: Option<Uuid>,
    #[serde(default)]
    extent: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateWidePayload {
    id: Uuid,
    is_wide: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAdvancedModePayload {
    id: Uuid,
    advanced_mode: bool,
}

/// *duplicate* carries the fresh `id` for the copy plus `sourceId` for
/// logging only (4.5) — everything else mirrors `AddBlockPayload`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DuplicatePayload {
    id: Uuid,
    #[serde(default)]
    source_id: Option<Uuid>,
    #[serde(rename = "type")]
    block_type: String,
    name: String,
    position: PositionPayload,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    parent_id: Option<Uuid>,
    #[serde(default)]
    extent: Option<String>,
    #[serde(default)]
    auto_connect_edge: Option<AutoConnectEdge>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddEdgePayload {
    id: Uuid,
    source_block_id: Uuid,
    target_block_id: Uuid,
    #[serde(default)]
    source_handle: Option<String>,
    #[serde(default)]
    target_handle: Option<String>,
}

#[derive(Deserialize)]
struct UpdateSubflowPayload {
    id: Uuid,
    config: serde_json::Value,
}

fn from_payload<T: for<'de> Deserialize<'de>>(payload: &serde_json::Value) -> Result<T, CollabError> {
    serde_json::from_value(payload.clone()).map_err(|e| CollabError::ValidationError(e.to_string()))
}

/// Parses `{operation, target, payload}` into a typed operation, or fails
/// with `ValidationError` (invariant 10: malformed frames never reach the DB).
pub fn parse(frame: &WorkflowOperationFrame) -> Result<ParsedOperation, CollabError> {
    match (frame.target.as_str(), frame.operation.as_str()) {
        ("block", "add") => {
            let p: AddBlockPayload = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Block(BlockOp::Add {
                id: p.id,
                block_type: p.block_type,
                name: p.name,
                position: p.position,
                data: p.data,
                parent_id: p.parent_id,
                extent: p.extent,
                auto_connect_edge: p.auto_connect_edge,
            }))
        }
        ("block", "remove") => {
            let p: IdOnly = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Block(BlockOp::Remove { id: p.id }))
        }
        ("block", "update") => {
            let p: UpdateBlockPayload = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Block(BlockOp::Update {
                id: p.id,
                sub_blocks: p.sub_blocks,
                outputs: p.outputs,
                data: p.data,
                height: p.height,
            }))
        }
        ("block", "update-position") => {
            let p: UpdatePositionPayload = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Block(BlockOp::UpdatePosition {
                id: p.id,
                position: p.position,
            }))
        }
        ("block", "update-name") => {
            let p: UpdateNamePayload = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Block(BlockOp::UpdateName { id: p.id, name: p.name }))
        }
        ("block", "toggle-enabled") => {
            let p: IdOnly = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Block(BlockOp::ToggleEnabled { id: p.id }))
        }
        ("block", "update-parent") => {
            let p: UpdateParentPayload = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Block(BlockOp::UpdateParent {
                id: p.id,
                parent_id: p.parent_id,
                extent: p.extent,
            }))
        }
        ("block", "update-wide") => {
            let p: UpdateWidePayload = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Block(BlockOp::UpdateWide { id: p.id, is_wide: p.is_wide }))
        }
        ("block", "update-advanced-mode") => {
            let p: UpdateAdvancedModePayload = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Block(BlockOp::UpdateAdvancedMode {
                id: p.id,
                advanced_mode: p.advanced_mode,
            }))
        }
        ("block", "toggle-handles") => {
            let p: IdOnly = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Block(BlockOp::ToggleHandles { id: p.id }))
        }
        ("block", "duplicate") => {
            let p: DuplicatePayload = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Block(BlockOp::Duplicate {
                id: p.id,
                source_id: p.source_id,
                block_type: p.block_type,
                name: p.name,
                position: p.position,
                data: p.data,
                parent_id: p.parent_id,
                extent: p.extent,
                auto_connect_edge: p.auto_connect_edge,
            }))
        }
        ("edge", "add") => {
            let p: AddEdgePayload = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Edge(EdgeOp::Add {
                id: p.id,
                source_block_id: p.source_block_id,
                target_block_id: p.target_block_id,
                source_handle: p.source_handle,
                target_handle: p.target_handle,
            }))
        }
        ("edge", "remove") => {
            let p: IdOnly = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Edge(EdgeOp::Remove { id: p.id }))
        }
        ("subflow", "update") => {
            let p: UpdateSubflowPayload = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Subflow(SubflowOp::Update { id: p.id, config: p.config }))
        }
        ("subflow", "add") | ("subflow", "remove") => {
            let _p: IdOnly = from_payload(&frame.payload)?;
            Ok(ParsedOperation::Subflow(SubflowOp::Noop))
        }
        (target, operation) => Err(CollabError::ValidationError(format!(
            "unsupported operation \"{operation}\" on target \"{target}\""
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(target: &str, operation: &str, payload: serde_json::Value) -> WorkflowOperationFrame {
        WorkflowOperationFrame {
            operation: operation.to_string(),
            target: target.to_string(),
            payload,
            timestamp: 1000,
            operation_id: Some("op1".to_string()),
        }
    }

    #[test]
    fn parses_add_block_s1() {
        let f = frame(
            "block",
            "add",
            serde_json::json!({"id": "00000000-0000-0000-0000-0000000000b1", "type": "agent", "name": "A", "position": {"x": 10.0, "y": 20.0}}),
        );
        let parsed = parse(&f).unwrap();
        match parsed {
            ParsedOperation::Block(BlockOp::Add { position, .. }) => {
                assert_eq!(position.x, 10.0);
                assert_eq!(position.y, 20.0);
            }
            _ => panic!("expected BlockOp::Add"),
        }
    }

    #[test]
    fn parses_duplicate_with_auto_connect_edge() {
        let f = frame(
            "block",
            "duplicate",
            serde_json::json!({
                "id": "00000000-0000-0000-0000-0000000000b2",
                "sourceId": "00000000-0000-0000-0000-0000000000b1",
                "type": "agent",
                "name": "A copy",
                "position": {"x": 30.0, "y": 40.0},
                "parentId": "00000000-0000-0000-0000-0000000000c1",
                "autoConnectEdge": {
                    "id": "00000000-0000-0000-0000-0000000000e1",
                    "sourceBlockId": "00000000-0000-0000-0000-0000000000b1",
                    "targetBlockId": "00000000-0000-0000-0000-0000000000b2"
                }
            }),
        );
        let parsed = parse(&f).unwrap();
        match parsed {
            ParsedOperation::Block(BlockOp::Duplicate { id, source_id, parent_id, auto_connect_edge, .. }) => {
                assert_eq!(id.to_string(), "00000000-0000-0000-0000-0000000000b2");
                assert!(source_id.is_some());
                assert!(parent_id.is_some());
                assert!(auto_connect_edge.is_some());
            }
            _ => panic!("expected BlockOp::Duplicate"),
        }
    }

    #[test]
    fn accepts_subflow_add_and_remove_as_noop() {
        let id = Uuid::new_v4();
        for op in ["add", "remove"] {
            let f = frame("subflow", op, serde_json::json!({"id": id}));
            let parsed = parse(&f).unwrap();
            assert!(matches!(parsed, ParsedOperation::Subflow(SubflowOp::Noop)));
        }
    }

    #[test]
    fn rejects_unsupported_target_operation_pair() {
        let f = frame("block", "not-a-real-op", serde_json::json!({"id": Uuid::new_v4()}));
        let err = parse(&f).unwrap_err();
        assert_eq!(err.wire_type(), "ValidationError");
    }

    #[test]
    fn rejects_malformed_payload() {
        let f = frame("block", "add", serde_json::json!({"id": "not-a-uuid"}));
        let err = parse(&f).unwrap_err();
        assert_eq!(err.wire_type(), "ValidationError");
    }
}
