use std::time::Duration;

use sqlx::PgPool;

use crate::shared::{CollabError, CollabResult};

const HEALTH_CHECK: &str = "SELECT 1";
const VERSION_SELECT: &str = "SELECT version()";

/// Thin wrapper around a [`PgPool`] exposing the health and diagnostics
/// operations the collaboration server needs at startup and on `/health`.
pub struct DatabaseService {
    pool: PgPool,
}

impl DatabaseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> CollabResult<bool> {
        sqlx::query(HEALTH_CHECK)
            .execute(&self.pool)
            .await
            .map(|_| true)
            .map_err(CollabError::Database)
    }

    pub async fn health_check_with_timeout(&self, timeout: Duration) -> CollabResult<bool> {
        tokio::time::timeout(timeout, self.health_check())
            .await
            .map_err(|_| CollabError::OperationFailed("database health check timed out".to_string()))?
    }

    pub async fn get_connection_info(&self) -> CollabResult<String> {
        let row: (String,) = sqlx::query_as(VERSION_SELECT)
            .fetch_one(&self.pool)
            .await
            .map_err(CollabError::Database)?;
        Ok(row.0)
    }

    pub fn active_connections(&self) -> u32 {
        self.pool.size()
    }

    pub fn idle_connections(&self) -> usize {
        self.pool.num_idle()
    }

    pub async fn test_connection(&self) -> CollabResult<()> {
        self.health_check().await?;
        Ok(())
    }

    /// Execute a raw SQL statement. Used by the migration bootstrap path only.
    pub async fn execute_raw(&self, sql: &str) -> CollabResult<u64> {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(CollabError::Database)
    }
}

pub async fn create_pool(database_url: &str) -> CollabResult<PgPool> {
    PgPool::connect(database_url).await.map_err(CollabError::Database)
}

pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
    min_connections: u32,
    connect_timeout: Duration,
) -> CollabResult<PgPool> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(min_connections)
        .acquire_timeout(connect_timeout)
        .connect(database_url)
        .await
        .map_err(CollabError::Database)
}
