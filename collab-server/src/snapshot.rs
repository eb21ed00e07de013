//! Workflow Snapshot composition (4.10).
//!
//! Assembled fresh on every `join-workflow`/`request-sync` — never cached
//! alongside the room, since normalized-table data must be free to override
//! any state fields preserved from the `workflows` row.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use collab_shared::domain::entities::{Block, Edge, Subflow};
use collab_shared::domain::repositories::{BlockRepository, EdgeRepository, SubflowRepository, WorkflowRepository};
use collab_shared::shared::{CollabError, CollabResult};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub blocks: Vec<Block>,
    pub edges: Vec<Edge>,
    pub loops: Vec<Subflow>,
    pub parallels: Vec<Subflow>,
    pub last_saved: Option<chrono::DateTime<chrono::Utc>>,
    pub is_deployed: bool,
    pub deployed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub deployment_statuses: serde_json::Value,
    pub has_active_schedule: bool,
    pub has_active_webhook: bool,
}

pub struct SnapshotComposer {
    pool: PgPool,
    workflow_repository: Arc<dyn WorkflowRepository>,
    block_repository: Arc<dyn BlockRepository>,
    edge_repository: Arc<dyn EdgeRepository>,
    subflow_repository: Arc<dyn SubflowRepository>,
}

impl SnapshotComposer {
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

    pub async fn compose(&self, workflow_id: Uuid) -> CollabResult<WorkflowSnapshot> {
        let workflow = self
            .workflow_repository
            .find_by_id(workflow_id)
            .await?
            .ok_or_else(|| CollabError::ResourceNotFound(format!("workflow {workflow_id}")))?;

        let blocks = self.block_repository.find_by_workflow(&self.pool, workflow_id).await?;
        let edges = self.edge_repository.find_by_workflow(&self.pool, workflow_id).await?;
        let subflows = self.subflow_repository.find_by_workflow(&self.pool, workflow_id).await?;

        let (loops, parallels): (Vec<Subflow>, Vec<Subflow>) = subflows
            .into_iter()
            .partition(|s| s.subflow_type == collab_shared::domain::entities::block::CONTAINER_TYPE_LOOP);

        Ok(WorkflowSnapshot {
            blocks,
            edges,
            loops,
            parallels,
            last_saved: workflow.last_saved,
            is_deployed: workflow.is_deployed,
            deployed_at: workflow.deployed_at,
            deployment_statuses: workflow.deployment_statuses,
            has_active_schedule: workflow.has_active_schedule,
            has_active_webhook: workflow.has_active_webhook,
        })
    }
}
