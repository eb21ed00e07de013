use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Role;
use crate::domain::repositories::AccessGrantRepository;
use crate::infrastructure::database::RepositoryErrorExt;
use crate::shared::CollabResult;

pub struct AccessGrantRepositoryImpl;

impl AccessGrantRepositoryImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AccessGrantRepositoryImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccessGrantRepository for AccessGrantRepositoryImpl {
    async fn find_role(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        entity_type: &str,
        entity_id: Uuid,
    ) -> CollabResult<Option<Role>> {
        let row = sqlx::query!(
            r#"
            SELECT permission_type FROM permissions
            WHERE user_id = $1 AND entity_type = $2 AND entity_id = $3
            "#,
            user_id,
            entity_type,
            entity_id,
        )
        .fetch_optional(pool)
        .await
        .map_db_error("fetch", "access grant")?;

        Ok(row.and_then(|r| Role::from_str_opt(&r.permission_type)))
    }
}
