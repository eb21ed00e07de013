use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entities::Workflow;
use crate::shared::CollabResult;

#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> CollabResult<Option<Workflow>>;

    /// Touch `updated_at`. `update-position` preserves the client's chosen
    /// timestamp; every other mutation uses the server clock (4.5 prelude).
    /// Takes the Mutation Engine's per-frame transaction: this is part of
    /// the shared prelude, not a statement of its own (4.5).
    async fn touch_updated_at(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid, at: DateTime<Utc>) -> CollabResult<()>;

    async fn create(&self, workflow: Workflow) -> CollabResult<Workflow>;
}
