use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::Block;
use crate::domain::repositories::BlockRepository;
use crate::infrastructure::database::RepositoryErrorExt;
use crate::shared::CollabResult;

const BLOCK_COLUMNS: &str = r#"
    id, workflow_id, type AS "block_type!", name, position_x, position_y, enabled,
    horizontal_handles, is_wide, advanced_mode, height, sub_blocks, outputs, data,
    parent_id, extent, created_at, updated_at
"#;

pub struct BlockRepositoryImpl;

impl BlockRepositoryImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BlockRepositoryImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockRepository for BlockRepositoryImpl {
    async fn find_by_workflow(&self, pool: &PgPool, workflow_id: Uuid) -> CollabResult<Vec<Block>> {
        let sql = format!("SELECT {BLOCK_COLUMNS} FROM workflow_blocks WHERE workflow_id = $1 ORDER BY created_at ASC");
        sqlx::query_as::<_, Block>(&sql)
            .bind(workflow_id)
            .fetch_all(pool)
            .await
            .map_db_error("fetch", "blocks")
    }

    async fn find_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
    ) -> CollabResult<Option<Block>> {
        let sql = format!("SELECT {BLOCK_COLUMNS} FROM workflow_blocks WHERE workflow_id = $1 AND id = $2");
        sqlx::query_as::<_, Block>(&sql)
            .bind(workflow_id)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_db_error("fetch", "block")
    }

    async fn insert(&self, tx: &mut Transaction<'_, Postgres>, block: &Block) -> CollabResult<()> {
        assert!(!block.id.is_nil(), "block id must not be nil");
        assert!(!block.name.is_empty(), "block name must not be empty");

        sqlx::query!(
            r#"
            INSERT INTO workflow_blocks (
                id, workflow_id, type, name, position_x, position_y, enabled,
                horizontal_handles, is_wide, advanced_mode, height, sub_blocks,
                outputs, data, parent_id, extent, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
            block.id,
            block.workflow_id,
            block.block_type,
            block.name,
            block.position_x,
            block.position_y,
            block.enabled,
            block.horizontal_handles,
            block.is_wide,
            block.advanced_mode,
            block.height,
            block.sub_blocks,
            block.outputs,
            block.data,
            block.parent_id,
            block.extent,
            block.created_at,
            block.updated_at,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("insert", "block")?;

        Ok(())
    }

    async fn update_position(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        x: f64,
        y: f64,
    ) -> CollabResult<bool> {
        let result = sqlx::query!(
            "UPDATE workflow_blocks SET position_x = $3, position_y = $4, updated_at = now()
             WHERE workflow_id = $1 AND id = $2",
            workflow_id,
            id,
            x,
            y,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("update", "block position")?;

        assert!(result.rows_affected() <= 1, "position update touched more than one row");
        Ok(result.rows_affected() == 1)
    }

    async fn update_name(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        name: &str,
    ) -> CollabResult<bool> {
        let result = sqlx::query!(
            "UPDATE workflow_blocks SET name = $3, updated_at = now() WHERE workflow_id = $1 AND id = $2",
            workflow_id,
            id,
            name,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("update", "block name")?;

        Ok(result.rows_affected() == 1)
    }

    async fn toggle_enabled(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
    ) -> CollabResult<Option<bool>> {
        let row = sqlx::query!(
            "UPDATE workflow_blocks SET enabled = NOT enabled, updated_at = now()
             WHERE workflow_id = $1 AND id = $2 RETURNING enabled",
            workflow_id,
            id,
        )
        .fetch_optional(&mut **tx)
        .await
        .map_db_error("toggle", "block enabled")?;

        Ok(row.map(|r| r.enabled))
    }

    async fn update_parent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        parent_id: Option<Uuid>,
        extent: Option<&str>,
    ) -> CollabResult<bool> {
        let result = sqlx::query!(
            "UPDATE workflow_blocks SET parent_id = $3, extent = $4, updated_at = now()
             WHERE workflow_id = $1 AND id = $2",
            workflow_id,
            id,
            parent_id,
            extent,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("update", "block parent")?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_wide(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        is_wide: bool,
    ) -> CollabResult<bool> {
        let result = sqlx::query!(
            "UPDATE workflow_blocks SET is_wide = $3, updated_at = now() WHERE workflow_id = $1 AND id = $2",
            workflow_id,
            id,
            is_wide,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("update", "block wide flag")?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_advanced_mode(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        advanced_mode: bool,
    ) -> CollabResult<bool> {
        let result = sqlx::query!(
            "UPDATE workflow_blocks SET advanced_mode = $3, updated_at = now() WHERE workflow_id = $1 AND id = $2",
            workflow_id,
            id,
            advanced_mode,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("update", "block advanced mode")?;

        Ok(result.rows_affected() == 1)
    }

    async fn toggle_handles(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
    ) -> CollabResult<Option<bool>> {
        let row = sqlx::query!(
            "UPDATE workflow_blocks SET horizontal_handles = NOT horizontal_handles, updated_at = now()
             WHERE workflow_id = $1 AND id = $2 RETURNING horizontal_handles",
            workflow_id,
            id,
        )
        .fetch_optional(&mut **tx)
        .await
        .map_db_error("toggle", "block handles")?;

        Ok(row.map(|r| r.horizontal_handles))
    }

    async fn update_fields(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        sub_blocks: Option<serde_json::Value>,
        outputs: Option<serde_json::Value>,
        data: Option<serde_json::Value>,
        height: Option<f64>,
    ) -> CollabResult<bool> {
        let result = sqlx::query!(
            r#"
            UPDATE workflow_blocks SET
                sub_blocks = COALESCE($3, sub_blocks),
                outputs = COALESCE($4, outputs),
                data = COALESCE($5, data),
                height = COALESCE($6, height),
                updated_at = now()
            WHERE workflow_id = $1 AND id = $2
            "#,
            workflow_id,
            id,
            sub_blocks,
            outputs,
            data,
            height,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("update", "block fields")?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_sub_block_value(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        sub_block_id: &str,
        value: serde_json::Value,
    ) -> CollabResult<bool> {
        // Preserves the existing record's `id`/`type`, or seeds a minimal
        // `{id, type:"unknown"}` record if this sub-block key is new (4.8).
        let result = sqlx::query!(
            r#"
            UPDATE workflow_blocks SET
                sub_blocks = jsonb_set(
                    COALESCE(sub_blocks, '{}'::jsonb),
                    ARRAY[$3],
                    COALESCE(sub_blocks -> $3, jsonb_build_object('id', $3, 'type', 'unknown'))
                        || jsonb_build_object('value', $4),
                    true
                ),
                updated_at = now()
            WHERE workflow_id = $1 AND id = $2
            "#,
            workflow_id,
            id,
            sub_block_id,
            value,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("update", "sub-block value")?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, tx: &mut Transaction<'_, Postgres>, workflow_id: Uuid, id: Uuid) -> CollabResult<bool> {
        let result = sqlx::query!("DELETE FROM workflow_blocks WHERE workflow_id = $1 AND id = $2", workflow_id, id)
            .execute(&mut **tx)
            .await
            .map_db_error("delete", "block")?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_children_ids(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        parent_id: Uuid,
    ) -> CollabResult<Vec<Uuid>> {
        let rows = sqlx::query!(
            "SELECT id FROM workflow_blocks WHERE workflow_id = $1 AND parent_id = $2 ORDER BY created_at ASC",
            workflow_id,
            parent_id,
        )
        .fetch_all(&mut **tx)
        .await
        .map_db_error("fetch", "block children")?;

        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    async fn delete_children_of(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        parent_id: Uuid,
    ) -> CollabResult<Vec<Uuid>> {
        let rows = sqlx::query!(
            "DELETE FROM workflow_blocks WHERE workflow_id = $1 AND parent_id = $2 RETURNING id",
            workflow_id,
            parent_id,
        )
        .fetch_all(&mut **tx)
        .await
        .map_db_error("delete", "block children")?;

        Ok(rows.into_iter().map(|r| r.id).collect())
    }
}
