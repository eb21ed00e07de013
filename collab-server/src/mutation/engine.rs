//! Mutation Engine (4.5).
//!
//! Grounded on `VisualWorkflowRepositoryImpl`'s transactional `sqlx::query_as!`
//! pattern and its Tiger Style `assert!`/`assert_eq!` checks at entry/exit of
//! each repository method. Every structural operation runs inside one
//! transaction pulled from the pool; the container/subflow cascade rules and
//! the Subflow Node-List Rule are maintained within that same transaction so
//! the two sources of truth (child rows and parent `config.nodes`) never
//! diverge (section 9).

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use collab_shared::domain::entities::block::{is_container_type, CONTAINER_TYPE_PARALLEL};
use collab_shared::domain::entities::{Block, Edge, Subflow};
use collab_shared::domain::repositories::{BlockRepository, EdgeRepository, SubflowRepository, WorkflowRepository};
use collab_shared::shared::{CollabError, CollabResult};

use crate::protocol::{AutoConnectEdge, BlockOp, EdgeOp, ParsedOperation, SubflowOp};

pub struct MutationEngine {
    pool: PgPool,
    workflow_repository: Arc<dyn WorkflowRepository>,
    block_repository: Arc<dyn BlockRepository>,
    edge_repository: Arc<dyn EdgeRepository>,
    subflow_repository: Arc<dyn SubflowRepository>,
}

impl MutationEngine {
    pub fn new(
        pool: PgPool,
        workflow_repository: Arc<dyn WorkflowRepository>,
        block_repository: Arc<dyn BlockRepository>,
        edge_repository: Arc<dyn EdgeRepository>,
        subflow_repository: Arc<dyn SubflowRepository>,
    ) -> Self {
        Self {
            pool,
            workflow_repository,
            block_repository,
            edge_repository,
            subflow_repository,
        }
    }

    /// Applies one structural operation inside a single transaction. The
    /// shared prelude (4.5) — advancing the workflow's `updated_at` to the
    /// server clock — runs inside the same transaction as the operation
    /// itself, so a failed commit never leaves the timestamp ahead of the
    /// structural change it was meant to describe.
    pub async fn apply(&self, workflow_id: Uuid, op: &ParsedOperation) -> CollabResult<()> {
        let mut tx = self.pool.begin().await.map_err(CollabError::Database)?;

        match op {
            ParsedOperation::Block(op) => self.apply_block_op(&mut tx, workflow_id, op).await?,
            ParsedOperation::Edge(op) => self.apply_edge_op(&mut tx, workflow_id, op).await?,
            ParsedOperation::Subflow(op) => self.apply_subflow_op(&mut tx, workflow_id, op).await?,
        }

        self.workflow_repository.touch_updated_at(&mut tx, workflow_id, Utc::now()).await?;
        tx.commit().await.map_err(CollabError::Database)?;
        Ok(())
    }

    /// Position updates use the fast path (4.7): the broadcast already
    /// happened before this call. Failures here are reported to the
    /// originator only and are always retryable (section 7). Per the
    /// shared prelude (4.5), the workflow's `updated_at` is still advanced
    /// in the same transaction as the position write, but preserves the
    /// client's timestamp rather than the server clock.
    pub async fn apply_position_update(
        &self,
        workflow_id: Uuid,
        id: Uuid,
        x: f64,
        y: f64,
        client_timestamp_ms: i64,
    ) -> CollabResult<()> {
        let mut tx = self.pool.begin().await.map_err(CollabError::Database)?;
        let updated = self.block_repository.update_position(&mut tx, workflow_id, id, x, y).await?;
        if !updated {
            return Err(CollabError::ResourceNotFound(format!("block {id}")));
        }

        let client_timestamp = chrono::DateTime::<Utc>::from_timestamp_millis(client_timestamp_ms).unwrap_or_else(Utc::now);
        self.workflow_repository
            .touch_updated_at(&mut tx, workflow_id, client_timestamp)
            .await?;
        tx.commit().await.map_err(CollabError::Database)?;
        Ok(())
    }

    /// Sub-block value path (4.8). Distinguishes "block gone" from a generic
    /// DB failure per the Open Question resolution in section 9 (9c): only
    /// the former should make the caller clean up the session.
    pub async fn apply_sub_block_update(
        &self,
        workflow_id: Uuid,
        block_id: Uuid,
        sub_block_id: &str,
        value: serde_json::Value,
    ) -> CollabResult<()> {
        let mut tx = self.pool.begin().await.map_err(CollabError::Database)?;
        let updated = self
            .block_repository
            .update_sub_block_value(&mut tx, workflow_id, block_id, sub_block_id, value)
            .await?;
        if !updated {
            return Err(CollabError::BlockGone(block_id.to_string()));
        }
        tx.commit().await.map_err(CollabError::Database)?;
        Ok(())
    }

    async fn apply_block_op(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        workflow_id: Uuid,
        op: &BlockOp,
    ) -> CollabResult<()> {
        match op {
            BlockOp::Add {
                id,
                block_type,
                name,
                position,
                data,
                parent_id,
                extent,
                auto_connect_edge,
            } => {
                assert!(!id.is_nil(), "new block id must not be nil");
                let now = Utc::now();
                let block = Block {
                    id: *id,
                    workflow_id,
                    block_type: block_type.clone(),
                    name: name.clone(),
                    position_x: position.x,
                    position_y: position.y,
                    enabled: true,
                    horizontal_handles: true,
                    is_wide: false,
                    advanced_mode: false,
                    height: 0.0,
                    sub_blocks: serde_json::json!({}),
                    outputs: serde_json::json!({}),
                    data: data.clone(),
                    parent_id: *parent_id,
                    extent: extent.clone(),
                    created_at: now,
                    updated_at: now,
                };
                self.insert_block_with_cascades(tx, workflow_id, block, data, auto_connect_edge).await
            }

            BlockOp::Remove { id } => {
                let block = self
                    .block_repository
                    .find_by_id(tx, workflow_id, *id)
                    .await?
                    .ok_or_else(|| CollabError::ResourceNotFound(format!("block {id}")))?;

                if block.is_container() {
                    let child_ids = self.block_repository.delete_children_of(tx, workflow_id, *id).await?;
                    let mut touched = child_ids.clone();
                    touched.push(*id);
                    self.edge_repository.delete_touching_any(tx, workflow_id, &touched).await?;
                    self.subflow_repository.delete(tx, workflow_id, *id).await?;
                    self.block_repository.delete(tx, workflow_id, *id).await?;
                } else {
                    self.edge_repository.delete_touching(tx, workflow_id, *id).await?;
                    self.block_repository.delete(tx, workflow_id, *id).await?;
                }

                if let Some(parent_id) = block.parent_id {
                    self.recompute_subflow_nodes(tx, workflow_id, parent_id).await?;
                }

                Ok(())
            }

            BlockOp::Update {
                id,
                sub_blocks,
                outputs,
                data,
                height,
            } => {
                let updated = self
                    .block_repository
                    .update_fields(tx, workflow_id, *id, sub_blocks.clone(), outputs.clone(), data.clone(), *height)
                    .await?;
                if !updated {
                    return Err(CollabError::ResourceNotFound(format!("block {id}")));
                }
                Ok(())
            }

            BlockOp::UpdatePosition { id, position } => {
                let updated = self
                    .block_repository
                    .update_position(tx, workflow_id, *id, position.x, position.y)
                    .await?;
                if !updated {
                    return Err(CollabError::ResourceNotFound(format!("block {id}")));
                }
                Ok(())
            }

            BlockOp::UpdateName { id, name } => {
                let updated = self.block_repository.update_name(tx, workflow_id, *id, name).await?;
                if !updated {
                    return Err(CollabError::ResourceNotFound(format!("block {id}")));
                }
                Ok(())
            }

            BlockOp::ToggleEnabled { id } => {
                let result = self.block_repository.toggle_enabled(tx, workflow_id, *id).await?;
                if result.is_none() {
                    return Err(CollabError::ResourceNotFound(format!("block {id}")));
                }
                Ok(())
            }

            BlockOp::UpdateParent { id, parent_id, extent } => {
                let previous = self
                    .block_repository
                    .find_by_id(tx, workflow_id, *id)
                    .await?
                    .ok_or_else(|| CollabError::ResourceNotFound(format!("block {id}")))?;

                let updated = self
                    .block_repository
                    .update_parent(tx, workflow_id, *id, *parent_id, extent.as_deref())
                    .await?;
                if !updated {
                    return Err(CollabError::ResourceNotFound(format!("block {id}")));
                }

                if let Some(old_parent) = previous.parent_id {
                    if Some(old_parent) != *parent_id {
                        self.recompute_subflow_nodes(tx, workflow_id, old_parent).await?;
                    }
                }
                if let Some(new_parent) = parent_id {
                    self.recompute_subflow_nodes(tx, workflow_id, *new_parent).await?;
                }

                Ok(())
            }

            BlockOp::UpdateWide { id, is_wide } => {
                let updated = self.block_repository.update_wide(tx, workflow_id, *id, *is_wide).await?;
                if !updated {
                    return Err(CollabError::ResourceNotFound(format!("block {id}")));
                }
                Ok(())
            }

            BlockOp::UpdateAdvancedMode { id, advanced_mode } => {
                let updated = self
                    .block_repository
                    .update_advanced_mode(tx, workflow_id, *id, *advanced_mode)
                    .await?;
                if !updated {
                    return Err(CollabError::ResourceNotFound(format!("block {id}")));
                }
                Ok(())
            }

            BlockOp::ToggleHandles { id } => {
                let result = self.block_repository.toggle_handles(tx, workflow_id, *id).await?;
                if result.is_none() {
                    return Err(CollabError::ResourceNotFound(format!("block {id}")));
                }
                Ok(())
            }

            BlockOp::Duplicate {
                id,
                source_id,
                block_type,
                name,
                position,
                data,
                parent_id,
                extent,
                auto_connect_edge,
            } => {
                // `id` is the fresh id the client minted for the copy;
                // `sourceId` is carried only for logging (4.5 *duplicate*).
                assert!(!id.is_nil(), "duplicated block id must not be nil");
                if let Some(source_id) = source_id {
                    tracing::debug!(source_id = %source_id, new_id = %id, "duplicating block");
                }

                let now = Utc::now();
                let block = Block {
                    id: *id,
                    workflow_id,
                    block_type: block_type.clone(),
                    name: name.clone(),
                    position_x: position.x,
                    position_y: position.y,
                    enabled: true,
                    horizontal_handles: true,
                    is_wide: false,
                    advanced_mode: false,
                    height: 0.0,
                    sub_blocks: serde_json::json!({}),
                    outputs: serde_json::json!({}),
                    data: data.clone(),
                    parent_id: *parent_id,
                    extent: extent.clone(),
                    created_at: now,
                    updated_at: now,
                };
                self.insert_block_with_cascades(tx, workflow_id, block, data, auto_connect_edge).await
            }
        }
    }

    /// Shared by *add* and *duplicate* (4.5: "same rules as add"): insert
    /// the row, auto-create its subflow if it's a container, auto-connect
    /// the optional edge, then recompute the parent's node list if one was
    /// set — all inside the caller's transaction.
    async fn insert_block_with_cascades(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        workflow_id: Uuid,
        block: Block,
        data: &serde_json::Value,
        auto_connect_edge: &Option<AutoConnectEdge>,
    ) -> CollabResult<()> {
        let id = block.id;
        let block_type = block.block_type.clone();
        let parent_id = block.parent_id;
        let now = block.created_at;

        self.block_repository.insert(tx, &block).await?;

        if is_container_type(&block_type) {
            let config = if block_type == CONTAINER_TYPE_PARALLEL {
                Subflow::default_parallel_config(id, data)
            } else {
                Subflow::default_loop_config(id, data)
            };
            let subflow = Subflow {
                id,
                workflow_id,
                subflow_type: block_type,
                config,
                created_at: now,
                updated_at: now,
            };
            self.subflow_repository.insert(tx, &subflow).await?;
        }

        if let Some(edge) = auto_connect_edge {
            self.insert_auto_connect_edge(tx, workflow_id, edge).await?;
        }

        if let Some(parent_id) = parent_id {
            self.recompute_subflow_nodes(tx, workflow_id, parent_id).await?;
        }

        Ok(())
    }

    /// Auto-Connect Edge (4.5): an edge bundled into the same transaction
    /// as a block *add*/*duplicate*, wiring the new block to a suggested
    /// predecessor.
    async fn insert_auto_connect_edge(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        workflow_id: Uuid,
        edge: &AutoConnectEdge,
    ) -> CollabResult<()> {
        let edge = Edge {
            id: edge.id,
            workflow_id,
            source_block_id: edge.source_block_id,
            target_block_id: edge.target_block_id,
            source_handle: edge.source_handle.clone(),
            target_handle: edge.target_handle.clone(),
            created_at: Utc::now(),
        };
        self.edge_repository.insert(tx, &edge).await
    }

    async fn apply_edge_op(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        workflow_id: Uuid,
        op: &EdgeOp,
    ) -> CollabResult<()> {
        match op {
            EdgeOp::Add {
                id,
                source_block_id,
                target_block_id,
                source_handle,
                target_handle,
            } => {
                assert!(!id.is_nil(), "new edge id must not be nil");
                let edge = Edge {
                    id: *id,
                    workflow_id,
                    source_block_id: *source_block_id,
                    target_block_id: *target_block_id,
                    source_handle: source_handle.clone(),
                    target_handle: target_handle.clone(),
                    created_at: Utc::now(),
                };
                self.edge_repository.insert(tx, &edge).await
            }

            EdgeOp::Remove { id } => {
                let removed = self.edge_repository.delete(tx, workflow_id, *id).await?;
                if !removed {
                    return Err(CollabError::ResourceNotFound(format!("edge {id}")));
                }
                Ok(())
            }
        }
    }

    async fn apply_subflow_op(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        workflow_id: Uuid,
        op: &SubflowOp,
    ) -> CollabResult<()> {
        match op {
            SubflowOp::Update { id, config } => {
                let updated = self.subflow_repository.update_config(tx, workflow_id, *id, config.clone()).await?;
                if !updated {
                    return Err(CollabError::ResourceNotFound(format!("subflow {id}")));
                }
                Ok(())
            }
            // *add*/*remove* are accepted at the protocol boundary but are
            // implicit through block add/remove (4.5) — nothing to do here.
            SubflowOp::Noop => Ok(()),
        }
    }

    /// Subflow Node-List Rule (section 9): recompute `config.nodes` for the
    /// container at `parent_id` from the children table, in the same
    /// transaction as whatever just changed a child's `parent_id`.
    async fn recompute_subflow_nodes(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        workflow_id: Uuid,
        parent_id: Uuid,
    ) -> CollabResult<()> {
        let subflow = match self.subflow_repository.find_by_id(tx, workflow_id, parent_id).await? {
            Some(subflow) => subflow,
            // The parent isn't a container (or was just deleted) — nothing to recompute.
            None => return Ok(()),
        };

        let child_ids = self.block_repository.find_children_ids(tx, workflow_id, parent_id).await?;
        let mut config = subflow.config;
        Subflow::set_nodes(&mut config, child_ids);
        self.subflow_repository.update_config(tx, workflow_id, parent_id, config).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use collab_shared::domain::entities::block::CONTAINER_TYPE_PARALLEL;
    use collab_shared::domain::entities::{Block, Workflow};
    use collab_shared::domain::repositories::WorkflowRepository;
    use collab_shared::infrastructure::repositories::{
        BlockRepositoryImpl, EdgeRepositoryImpl, SubflowRepositoryImpl, WorkflowRepositoryImpl,
    };
    use collab_shared::testing::{BlockFactory, WorkflowFactory};

    use super::*;

    async fn test_engine() -> (MutationEngine, PgPool, Workflow) {
        let pool = collab_shared::testing::setup_clean_test_db().await;
        let workflow_repository = Arc::new(WorkflowRepositoryImpl::new(pool.clone()));
        let workflow = workflow_repository.create(WorkflowFactory::build()).await.expect("seed workflow");

        let engine = MutationEngine::new(
            pool.clone(),
            workflow_repository,
            Arc::new(BlockRepositoryImpl::new()),
            Arc::new(EdgeRepositoryImpl::new()),
            Arc::new(SubflowRepositoryImpl::new()),
        );
        (engine, pool, workflow)
    }

    fn add_op(block: &Block, auto_connect_edge: Option<AutoConnectEdge>) -> ParsedOperation {
        ParsedOperation::Block(BlockOp::Add {
            id: block.id,
            block_type: block.block_type.clone(),
            name: block.name.clone(),
            position: crate::protocol::validator::PositionPayload { x: block.position_x, y: block.position_y },
            data: block.data.clone(),
            parent_id: block.parent_id,
            extent: block.extent.clone(),
            auto_connect_edge,
        })
    }

    #[tokio::test]
    #[ignore]
    async fn add_loop_container_seeds_a_loop_config() {
        let (engine, pool, workflow) = test_engine().await;
        let container = BlockFactory::build_container(workflow.id);

        engine.apply(workflow.id, &add_op(&container, None)).await.expect("add container");

        let subflow_repository = SubflowRepositoryImpl::new();
        let mut tx = pool.begin().await.unwrap();
        let subflow = subflow_repository
            .find_by_id(&mut tx, workflow.id, container.id)
            .await
            .unwrap()
            .expect("subflow row must exist for a container block");
        assert_eq!(subflow.config["loopType"], "for");
        assert_eq!(subflow.config["nodes"], serde_json::json!([]));

        collab_shared::testing::cleanup_database(&pool).await;
    }

    #[tokio::test]
    #[ignore]
    async fn add_parallel_container_seeds_a_parallel_config_not_a_loop_config() {
        let (engine, pool, workflow) = test_engine().await;
        let mut container = BlockFactory::build_container(workflow.id);
        container.block_type = CONTAINER_TYPE_PARALLEL.to_string();

        engine.apply(workflow.id, &add_op(&container, None)).await.expect("add container");

        let subflow_repository = SubflowRepositoryImpl::new();
        let mut tx = pool.begin().await.unwrap();
        let subflow = subflow_repository
            .find_by_id(&mut tx, workflow.id, container.id)
            .await
            .unwrap()
            .expect("subflow row must exist for a container block");
        assert!(subflow.config.get("loopType").is_none(), "parallel config must not carry loop fields");
        assert!(subflow.config.get("distribution").is_some());

        collab_shared::testing::cleanup_database(&pool).await;
    }

    #[tokio::test]
    #[ignore]
    async fn adding_a_child_recomputes_the_parent_node_list() {
        let (engine, pool, workflow) = test_engine().await;
        let container = BlockFactory::build_container(workflow.id);
        engine.apply(workflow.id, &add_op(&container, None)).await.expect("add container");

        let child = BlockFactory::build_child_of(workflow.id, &container);
        engine.apply(workflow.id, &add_op(&child, None)).await.expect("add child");

        let subflow_repository = SubflowRepositoryImpl::new();
        let mut tx = pool.begin().await.unwrap();
        let subflow = subflow_repository.find_by_id(&mut tx, workflow.id, container.id).await.unwrap().unwrap();
        let nodes = subflow.config["nodes"].as_array().unwrap();
        assert_eq!(nodes, &vec![serde_json::Value::String(child.id.to_string())]);

        collab_shared::testing::cleanup_database(&pool).await;
    }

    #[tokio::test]
    #[ignore]
    async fn removing_a_container_cascades_children_edges_and_subflow() {
        let (engine, pool, workflow) = test_engine().await;
        let container = BlockFactory::build_container(workflow.id);
        engine.apply(workflow.id, &add_op(&container, None)).await.expect("add container");
        let child = BlockFactory::build_child_of(workflow.id, &container);
        engine.apply(workflow.id, &add_op(&child, None)).await.expect("add child");

        engine
            .apply(workflow.id, &ParsedOperation::Block(BlockOp::Remove { id: container.id }))
            .await
            .expect("remove container");

        let block_repository = BlockRepositoryImpl::new();
        let mut tx = pool.begin().await.unwrap();
        assert!(block_repository.find_by_id(&mut tx, workflow.id, container.id).await.unwrap().is_none());
        assert!(block_repository.find_by_id(&mut tx, workflow.id, child.id).await.unwrap().is_none());

        let subflow_repository = SubflowRepositoryImpl::new();
        assert!(subflow_repository.find_by_id(&mut tx, workflow.id, container.id).await.unwrap().is_none());

        collab_shared::testing::cleanup_database(&pool).await;
    }

    #[tokio::test]
    #[ignore]
    async fn removing_a_nested_container_recomputes_its_own_parents_node_list() {
        let (engine, pool, workflow) = test_engine().await;
        let grandparent = BlockFactory::build_container(workflow.id);
        engine.apply(workflow.id, &add_op(&grandparent, None)).await.expect("add grandparent");

        let mut parent = BlockFactory::build_child_of(workflow.id, &grandparent);
        parent.block_type = collab_shared::domain::entities::block::CONTAINER_TYPE_LOOP.to_string();
        engine.apply(workflow.id, &add_op(&parent, None)).await.expect("add nested container");

        engine
            .apply(workflow.id, &ParsedOperation::Block(BlockOp::Remove { id: parent.id }))
            .await
            .expect("remove nested container");

        let subflow_repository = SubflowRepositoryImpl::new();
        let mut tx = pool.begin().await.unwrap();
        let subflow = subflow_repository.find_by_id(&mut tx, workflow.id, grandparent.id).await.unwrap().unwrap();
        assert_eq!(subflow.config["nodes"], serde_json::json!([]));

        collab_shared::testing::cleanup_database(&pool).await;
    }

    #[tokio::test]
    #[ignore]
    async fn sub_block_update_on_a_deleted_block_reports_block_gone() {
        let (engine, pool, workflow) = test_engine().await;
        let block = BlockFactory::build(workflow.id);
        engine.apply(workflow.id, &add_op(&block, None)).await.expect("add block");
        engine
            .apply(workflow.id, &ParsedOperation::Block(BlockOp::Remove { id: block.id }))
            .await
            .expect("remove block");

        let err = engine
            .apply_sub_block_update(workflow.id, block.id, "input1", serde_json::json!("value"))
            .await
            .expect_err("sub-block update on a gone block must fail");
        assert!(matches!(err, CollabError::BlockGone(_)));

        collab_shared::testing::cleanup_database(&pool).await;
    }

    #[tokio::test]
    #[ignore]
    async fn duplicate_preserves_container_type_and_recomputes_parent_node_list() {
        let (engine, pool, workflow) = test_engine().await;
        let container = BlockFactory::build_container(workflow.id);
        engine.apply(workflow.id, &add_op(&container, None)).await.expect("add container");
        let child = BlockFactory::build_child_of(workflow.id, &container);
        engine.apply(workflow.id, &add_op(&child, None)).await.expect("add child");

        let copy_id = Uuid::new_v4();
        let duplicate = ParsedOperation::Block(BlockOp::Duplicate {
            id: copy_id,
            source_id: Some(child.id),
            block_type: child.block_type.clone(),
            name: "child copy".to_string(),
            position: crate::protocol::validator::PositionPayload { x: 5.0, y: 5.0 },
            data: child.data.clone(),
            parent_id: child.parent_id,
            extent: child.extent.clone(),
            auto_connect_edge: None,
        });
        engine.apply(workflow.id, &duplicate).await.expect("duplicate child");

        let subflow_repository = SubflowRepositoryImpl::new();
        let mut tx = pool.begin().await.unwrap();
        let subflow = subflow_repository.find_by_id(&mut tx, workflow.id, container.id).await.unwrap().unwrap();
        let nodes = subflow.config["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 2, "duplicate must appear in the parent's node list alongside the original");

        collab_shared::testing::cleanup_database(&pool).await;
    }

    #[tokio::test]
    #[ignore]
    async fn duplicate_with_an_auto_connect_edge_inserts_the_edge_in_the_same_transaction() {
        let (engine, pool, workflow) = test_engine().await;
        let original = BlockFactory::build(workflow.id);
        engine.apply(workflow.id, &add_op(&original, None)).await.expect("add original");

        let copy_id = Uuid::new_v4();
        let edge_id = Uuid::new_v4();
        let duplicate = ParsedOperation::Block(BlockOp::Duplicate {
            id: copy_id,
            source_id: Some(original.id),
            block_type: original.block_type.clone(),
            name: "copy".to_string(),
            position: crate::protocol::validator::PositionPayload { x: 5.0, y: 5.0 },
            data: original.data.clone(),
            parent_id: None,
            extent: None,
            auto_connect_edge: Some(AutoConnectEdge {
                id: edge_id,
                source_block_id: original.id,
                target_block_id: copy_id,
                source_handle: None,
                target_handle: None,
            }),
        });
        engine.apply(workflow.id, &duplicate).await.expect("duplicate with auto-connect edge");

        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM workflow_edges WHERE id = $1")
            .bind(edge_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.0, 1);

        collab_shared::testing::cleanup_database(&pool).await;
    }
}
