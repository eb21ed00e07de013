use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::Edge;
use crate::domain::repositories::EdgeRepository;
use crate::infrastructure::database::RepositoryErrorExt;
use crate::shared::CollabResult;

pub struct EdgeRepositoryImpl;

impl EdgeRepositoryImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EdgeRepositoryImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EdgeRepository for EdgeRepositoryImpl {
    async fn find_by_workflow(&self, pool: &PgPool, workflow_id: Uuid) -> CollabResult<Vec<Edge>> {
        sqlx::query_as!(
            Edge,
            r#"
            SELECT id, workflow_id, source_block_id, target_block_id, source_handle, target_handle, created_at
            FROM workflow_edges
            WHERE workflow_id = $1
            ORDER BY created_at ASC
            "#,
            workflow_id
        )
        .fetch_all(pool)
        .await
        .map_db_error("fetch", "edges")
    }

    async fn insert(&self, tx: &mut Transaction<'_, Postgres>, edge: &Edge) -> CollabResult<()> {
        assert!(!edge.id.is_nil(), "edge id must not be nil");

        sqlx::query!(
            r#"
            INSERT INTO workflow_edges (id, workflow_id, source_block_id, target_block_id, source_handle, target_handle, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
            edge.id,
            edge.workflow_id,
            edge.source_block_id,
            edge.target_block_id,
            edge.source_handle,
            edge.target_handle,
            edge.created_at,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("insert", "edge")?;

        Ok(())
    }

    async fn delete(&self, tx: &mut Transaction<'_, Postgres>, workflow_id: Uuid, id: Uuid) -> CollabResult<bool> {
        let result = sqlx::query!("DELETE FROM workflow_edges WHERE workflow_id = $1 AND id = $2", workflow_id, id)
            .execute(&mut **tx)
            .await
            .map_db_error("delete", "edge")?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_touching(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        block_id: Uuid,
    ) -> CollabResult<u64> {
        let result = sqlx::query!(
            "DELETE FROM workflow_edges WHERE workflow_id = $1 AND (source_block_id = $2 OR target_block_id = $2)",
            workflow_id,
            block_id,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("delete", "edges touching block")?;

        Ok(result.rows_affected())
    }

    async fn delete_touching_any(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        block_ids: &[Uuid],
    ) -> CollabResult<u64> {
        if block_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query!(
            "DELETE FROM workflow_edges
             WHERE workflow_id = $1 AND (source_block_id = ANY($2) OR target_block_id = ANY($2))",
            workflow_id,
            block_ids,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("delete", "edges touching blocks")?;

        Ok(result.rows_affected())
    }

    async fn find_orphans(&self, pool: &PgPool, workflow_id: Uuid) -> CollabResult<Vec<Edge>> {
        sqlx::query_as!(
            Edge,
            r#"
            SELECT e.id, e.workflow_id, e.source_block_id, e.target_block_id, e.source_handle, e.target_handle, e.created_at
            FROM workflow_edges e
            LEFT JOIN workflow_blocks b ON b.id = e.source_block_id AND b.workflow_id = e.workflow_id
            WHERE e.workflow_id = $1 AND b.id IS NULL
            "#,
            workflow_id
        )
        .fetch_all(pool)
        .await
        .map_db_error("fetch", "orphan edges")
    }
}
