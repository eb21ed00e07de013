mod collab;
mod consistency;
mod mutation;
mod presentation;
mod protocol;
mod snapshot;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use collab_authz::HttpTokenVerifier;
use collab_shared::config::Settings;
use collab_shared::infrastructure::database::{create_pool_with_options, DatabaseService};
use collab_shared::infrastructure::logging;
use collab_shared::infrastructure::repositories::{
    AccessGrantRepositoryImpl, BlockRepositoryImpl, EdgeRepositoryImpl, SubflowRepositoryImpl, WorkflowRepositoryImpl,
};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let settings = Settings::from_env().map_err(|e| format!("failed to load configuration: {e}"))?;
    logging::init_from_settings_with_deployment(&settings.logging, &settings.deployment);

    info!("starting collab-server on {}:{}", settings.server.host, settings.server.port);

    info!("connecting to database...");
    let pool = create_pool_with_options(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        Duration::from_secs(10),
    )
    .await
    .map_err(|e| format!("failed to connect to database: {e}"))?;

    let database_service = DatabaseService::new(pool.clone());
    database_service
        .health_check()
        .await
        .map_err(|e| format!("database health check failed: {e}"))?;
    info!("database health check passed");

    info!("running database migrations...");
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new("./migrations"))
        .await
        .map_err(|e| format!("failed to initialize migrator: {e}"))?;
    migrator
        .run(&pool)
        .await
        .map_err(|e| format!("failed to run migrations: {e}"))?;
    info!("database migrations completed");

    let workflow_repository = Arc::new(WorkflowRepositoryImpl::new(pool.clone()));
    let block_repository = Arc::new(BlockRepositoryImpl::new());
    let edge_repository = Arc::new(EdgeRepositoryImpl::new());
    let subflow_repository = Arc::new(SubflowRepositoryImpl::new());
    let access_grant_repository = Arc::new(AccessGrantRepositoryImpl::new());
    let token_verifier = Arc::new(HttpTokenVerifier::new(settings.auth.token_verification_url.clone()));

    let state = Arc::new(AppState::new(
        pool,
        Arc::new(settings.clone()),
        workflow_repository,
        block_repository,
        edge_repository,
        subflow_repository,
        access_grant_repository,
        token_verifier,
    ));

    let app = presentation::api::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("collaboration server listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
