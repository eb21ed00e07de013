//! Factory functions for building realistic test entities without the
//! boilerplate of filling in every field by hand.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::{
    block::{is_container_type, CONTAINER_TYPE_LOOP},
    AccessGrant, Block, Edge, EditorSession, Role, Room, Subflow, Workflow,
};

pub struct WorkflowFactory;

impl WorkflowFactory {
    pub fn build() -> Workflow {
        Workflow::new(Uuid::new_v4(), Uuid::new_v4(), "test workflow".to_string())
    }

    pub fn build_with<F: FnOnce(&mut Workflow)>(modifier: F) -> Workflow {
        let mut workflow = Self::build();
        modifier(&mut workflow);
        workflow
    }

    pub fn build_owned_by(owner_user_id: Uuid) -> Workflow {
        Self::build_with(|w| w.owner_user_id = owner_user_id)
    }
}

pub struct BlockFactory;

impl BlockFactory {
    pub fn build(workflow_id: Uuid) -> Block {
        let now = Utc::now();
        Block {
            id: Uuid::new_v4(),
            workflow_id,
            block_type: "agent".to_string(),
            name: "test block".to_string(),
            position_x: 0.0,
            position_y: 0.0,
            enabled: true,
            horizontal_handles: true,
            is_wide: false,
            advanced_mode: false,
            height: 0.0,
            sub_blocks: serde_json::json!({}),
            outputs: serde_json::json!({}),
            data: serde_json::json!({}),
            parent_id: None,
            extent: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn build_with<F: FnOnce(&mut Block)>(workflow_id: Uuid, modifier: F) -> Block {
        let mut block = Self::build(workflow_id);
        modifier(&mut block);
        block
    }

    /// A `loop` container block (see `SubflowFactory::build_for` for its subflow row).
    pub fn build_container(workflow_id: Uuid) -> Block {
        Self::build_with(workflow_id, |b| b.block_type = CONTAINER_TYPE_LOOP.to_string())
    }

    pub fn build_child_of(workflow_id: Uuid, parent: &Block) -> Block {
        assert!(is_container_type(&parent.block_type), "parent fixture must be a container");
        Self::build_with(workflow_id, |b| {
            b.parent_id = Some(parent.id);
            b.extent = Some("parent".to_string());
        })
    }
}

pub struct EdgeFactory;

impl EdgeFactory {
    pub fn build(workflow_id: Uuid, source_block_id: Uuid, target_block_id: Uuid) -> Edge {
        Edge {
            id: Uuid::new_v4(),
            workflow_id,
            source_block_id,
            target_block_id,
            source_handle: None,
            target_handle: None,
            created_at: Utc::now(),
        }
    }
}

pub struct SubflowFactory;

impl SubflowFactory {
    /// A subflow row for `container`, matching the id/workflow_id/type invariant (I6).
    pub fn build_for(container: &Block) -> Subflow {
        assert!(is_container_type(&container.block_type), "container fixture must be a container type");
        let now = Utc::now();
        Subflow {
            id: container.id,
            workflow_id: container.workflow_id,
            subflow_type: container.block_type.clone(),
            config: Subflow::default_loop_config(container.id, &serde_json::json!({})),
            created_at: now,
            updated_at: now,
        }
    }
}

pub struct EditorSessionFactory;

impl EditorSessionFactory {
    pub fn build(workflow_id: Uuid) -> EditorSession {
        let now = Utc::now();
        EditorSession::new(Uuid::new_v4(), Uuid::new_v4(), "test editor".to_string(), workflow_id, now)
    }

    pub fn build_for_user(workflow_id: Uuid, user_id: Uuid) -> EditorSession {
        let now = Utc::now();
        EditorSession::new(Uuid::new_v4(), user_id, "test editor".to_string(), workflow_id, now)
    }
}

pub struct RoomFactory;

impl RoomFactory {
    pub fn build(workflow_id: Uuid) -> Room {
        Room::new(workflow_id, Utc::now())
    }

    pub fn build_with_sessions(workflow_id: Uuid, count: usize) -> Room {
        let mut room = Self::build(workflow_id);
        for _ in 0..count {
            room.insert(EditorSessionFactory::build(workflow_id));
        }
        room
    }
}

pub struct AccessGrantFactory;

impl AccessGrantFactory {
    pub fn build(user_id: Uuid, workflow_id: Uuid, role: Role) -> AccessGrant {
        AccessGrant {
            user_id,
            entity_type: "workflow".to_string(),
            entity_id: workflow_id,
            permission_type: role.as_str().to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_factory_builds_unique_ids() {
        let a = WorkflowFactory::build();
        let b = WorkflowFactory::build();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn block_factory_defaults_match_add_semantics() {
        let block = BlockFactory::build(Uuid::new_v4());
        assert!(block.enabled);
        assert!(block.horizontal_handles);
        assert!(!block.is_wide);
        assert_eq!(block.height, 0.0);
    }

    #[test]
    fn subflow_factory_matches_its_container() {
        let workflow_id = Uuid::new_v4();
        let container = BlockFactory::build_container(workflow_id);
        let subflow = SubflowFactory::build_for(&container);
        assert_eq!(subflow.id, container.id);
        assert_eq!(subflow.workflow_id, container.workflow_id);
    }

    #[test]
    fn room_factory_builds_requested_session_count() {
        let room = RoomFactory::build_with_sessions(Uuid::new_v4(), 3);
        assert_eq!(room.active_connections(), 3);
    }
}
