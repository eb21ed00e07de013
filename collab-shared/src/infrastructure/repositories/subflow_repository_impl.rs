use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::Subflow;
use crate::domain::repositories::SubflowRepository;
use crate::infrastructure::database::RepositoryErrorExt;
use crate::shared::CollabResult;

const SUBFLOW_COLUMNS: &str = r#"id, workflow_id, type AS "subflow_type!", config, created_at, updated_at"#;

pub struct SubflowRepositoryImpl;

impl SubflowRepositoryImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SubflowRepositoryImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubflowRepository for SubflowRepositoryImpl {
    async fn find_by_workflow(&self, pool: &PgPool, workflow_id: Uuid) -> CollabResult<Vec<Subflow>> {
        let sql = format!("SELECT {SUBFLOW_COLUMNS} FROM workflow_subflows WHERE workflow_id = $1");
        sqlx::query_as::<_, Subflow>(&sql)
            .bind(workflow_id)
            .fetch_all(pool)
            .await
            .map_db_error("fetch", "subflows")
    }

    async fn find_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
    ) -> CollabResult<Option<Subflow>> {
        let sql = format!("SELECT {SUBFLOW_COLUMNS} FROM workflow_subflows WHERE workflow_id = $1 AND id = $2");
        sqlx::query_as::<_, Subflow>(&sql)
            .bind(workflow_id)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_db_error("fetch", "subflow")
    }

    async fn insert(&self, tx: &mut Transaction<'_, Postgres>, subflow: &Subflow) -> CollabResult<()> {
        assert!(!subflow.id.is_nil(), "subflow id must not be nil");

        sqlx::query!(
            r#"
            INSERT INTO workflow_subflows (id, workflow_id, type, config, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
            subflow.id,
            subflow.workflow_id,
            subflow.subflow_type,
            subflow.config,
            subflow.created_at,
            subflow.updated_at,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("insert", "subflow")?;

        Ok(())
    }

    async fn update_config(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        config: serde_json::Value,
    ) -> CollabResult<bool> {
        let result = sqlx::query!(
            "UPDATE workflow_subflows SET config = $3, updated_at = now() WHERE workflow_id = $1 AND id = $2",
            workflow_id,
            id,
            config,
        )
        .execute(&mut **tx)
        .await
        .map_db_error("update", "subflow config")?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, tx: &mut Transaction<'_, Postgres>, workflow_id: Uuid, id: Uuid) -> CollabResult<bool> {
        let result = sqlx::query!("DELETE FROM workflow_subflows WHERE workflow_id = $1 AND id = $2", workflow_id, id)
            .execute(&mut **tx)
            .await
            .map_db_error("delete", "subflow")?;

        Ok(result.rows_affected() == 1)
    }
}
