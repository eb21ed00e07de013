use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::Workflow;
use crate::domain::repositories::WorkflowRepository;
use crate::infrastructure::database::RepositoryErrorExt;
use crate::shared::CollabResult;

pub struct WorkflowRepositoryImpl {
    pool: PgPool,
}

impl WorkflowRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowRepository for WorkflowRepositoryImpl {
    async fn find_by_id(&self, id: Uuid) -> CollabResult<Option<Workflow>> {
        assert!(!id.is_nil(), "workflow id must not be nil");

        sqlx::query_as!(
            Workflow,
            r#"
            SELECT id, workspace_id, owner_user_id, name, updated_at, last_saved,
                   is_deployed, deployed_at, deployment_statuses, has_active_schedule,
                   has_active_webhook, created_at
            FROM workflows
            WHERE id = $1
            "#,
            id
        )
        .fetch_optional(&self.pool)
        .await
        .map_db_error("fetch", "workflow")
    }

    async fn touch_updated_at(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid, at: DateTime<Utc>) -> CollabResult<()> {
        assert!(!id.is_nil(), "workflow id must not be nil");

        let result = sqlx::query!("UPDATE workflows SET updated_at = $2 WHERE id = $1", id, at)
            .execute(&mut **tx)
            .await
            .map_db_error("update", "workflow")?;

        assert!(result.rows_affected() <= 1, "updated more than one workflow by id");
        Ok(())
    }

    async fn create(&self, workflow: Workflow) -> CollabResult<Workflow> {
        assert!(!workflow.name.is_empty(), "workflow name must not be empty");

        let row = sqlx::query_as!(
            Workflow,
            r#"
            INSERT INTO workflows (
                id, workspace_id, owner_user_id, name, updated_at, last_saved,
                is_deployed, deployed_at, deployment_statuses, has_active_schedule,
                has_active_webhook, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, workspace_id, owner_user_id, name, updated_at, last_saved,
                      is_deployed, deployed_at, deployment_statuses, has_active_schedule,
                      has_active_webhook, created_at
            "#,
            workflow.id,
            workflow.workspace_id,
            workflow.owner_user_id,
            workflow.name,
            workflow.updated_at,
            workflow.last_saved,
            workflow.is_deployed,
            workflow.deployed_at,
            workflow.deployment_statuses,
            workflow.has_active_schedule,
            workflow.has_active_webhook,
            workflow.created_at,
        )
        .fetch_one(&self.pool)
        .await
        .map_db_error("create", "workflow")?;

        assert_eq!(row.id, workflow.id, "created workflow id mismatch");
        Ok(row)
    }
}
