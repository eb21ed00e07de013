use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::Subflow;
use crate::shared::CollabResult;

#[async_trait]
pub trait SubflowRepository: Send + Sync {
    async fn find_by_workflow(&self, pool: &PgPool, workflow_id: Uuid) -> CollabResult<Vec<Subflow>>;

    async fn find_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
    ) -> CollabResult<Option<Subflow>>;

    async fn insert(&self, tx: &mut Transaction<'_, Postgres>, subflow: &Subflow) -> CollabResult<()>;

    /// Overwrites `config` wholesale (Subflow Node-List Rule and
    /// `subflow-operation update` both rewrite the full config blob).
    async fn update_config(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workflow_id: Uuid,
        id: Uuid,
        config: serde_json::Value,
    ) -> CollabResult<bool>;

    async fn delete(&self, tx: &mut Transaction<'_, Postgres>, workflow_id: Uuid, id: Uuid) -> CollabResult<bool>;
}
