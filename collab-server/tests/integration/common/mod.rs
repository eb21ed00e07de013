//! Shared setup for the collaboration server's integration tests.
//!
//! Boots a real `collab-server` app (router + a bound TCP listener) against
//! a throwaway Postgres database, the same `setup_test_app`/`teardown_test_app`
//! shape the teacher's `api-service` harness uses, generalized from a single
//! in-process `oneshot` router to a bound listener since the collaboration
//! protocol is WebSocket-based and needs a real socket to upgrade.

use std::sync::Arc;

use collab_authz::{HandshakeIdentity, StaticTokenVerifier};
use collab_shared::config::settings::{AuthConfig, CollabConfig, DatabaseConfig, LoggingConfig, ServerConfig};
use collab_shared::config::{DeploymentConfig, Settings};
use collab_shared::config::deployment::{CloudProvider, DeploymentEnvironment};
use collab_shared::domain::entities::{Role, Workflow};
use collab_shared::infrastructure::repositories::{
    AccessGrantRepositoryImpl, BlockRepositoryImpl, EdgeRepositoryImpl, SubflowRepositoryImpl, WorkflowRepositoryImpl,
};
use collab_shared::testing::fixtures::{TEST_EDITOR_USER_UUID, TEST_OWNER_USER_UUID, TEST_READ_ONLY_USER_UUID};
use collab_shared::testing::WorkflowFactory;
use collab_server::state::AppState;
use futures::{SinkExt, StreamExt};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

pub const OWNER_TOKEN: &str = "test-owner-token";
pub const EDITOR_TOKEN: &str = "test-write-token";
pub const READ_ONLY_TOKEN: &str = "test-read-token";

pub type TestSocket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub struct TestApp {
    pub pool: PgPool,
    pub base_url: String,
    pub ws_url: String,
    _server: tokio::task::JoinHandle<()>,
}

fn identity(user_id: Uuid, display_name: &str) -> HandshakeIdentity {
    HandshakeIdentity {
        user_id,
        display_name: display_name.to_string(),
        email: format!("{display_name}@example.com"),
        active_org_id: None,
    }
}

fn test_token_verifier() -> StaticTokenVerifier {
    StaticTokenVerifier::new()
        .with_token(OWNER_TOKEN, identity(*TEST_OWNER_USER_UUID, "owner"))
        .with_token(EDITOR_TOKEN, identity(*TEST_EDITOR_USER_UUID, "editor"))
        .with_token(READ_ONLY_TOKEN, identity(*TEST_READ_ONLY_USER_UUID, "reader"))
}

fn test_settings() -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        database: DatabaseConfig {
            url: collab_shared::testing::test_database_url(),
            max_connections: 5,
            min_connections: 1,
        },
        auth: AuthConfig {
            token_verification_url: "http://localhost/unused".to_string(),
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            rust_log: "info".to_string(),
        },
        deployment: DeploymentConfig {
            environment: DeploymentEnvironment::Development,
            cloud_provider: CloudProvider::None,
        },
        collab: CollabConfig {
            db_soft_budget_ms: 100,
            ping_interval_secs: 25,
            pool_size: 5,
        },
    }
}

/// Boots a fresh server bound to an ephemeral port, backed by a clean test database.
pub async fn setup_test_app() -> TestApp {
    let pool = collab_shared::testing::setup_clean_test_db().await;

    let workflow_repository = Arc::new(WorkflowRepositoryImpl::new(pool.clone()));
    let block_repository = Arc::new(BlockRepositoryImpl::new());
    let edge_repository = Arc::new(EdgeRepositoryImpl::new());
    let subflow_repository = Arc::new(SubflowRepositoryImpl::new());
    let access_grant_repository = Arc::new(AccessGrantRepositoryImpl::new());
    let token_verifier = Arc::new(test_token_verifier());

    let state = Arc::new(AppState::new(
        pool.clone(),
        Arc::new(test_settings()),
        workflow_repository,
        block_repository,
        edge_repository,
        subflow_repository,
        access_grant_repository,
        token_verifier,
    ));

    let router = collab_server::presentation::api::build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("failed to bind test listener");
    let addr = listener.local_addr().expect("failed to read bound test address");

    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server exited unexpectedly");
    });

    TestApp {
        pool,
        base_url: format!("http://{addr}"),
        ws_url: format!("ws://{addr}/ws"),
        _server: server,
    }
}

pub async fn teardown_test_app(app: &TestApp) {
    collab_shared::testing::cleanup_database(&app.pool).await;
}

/// Inserts a workflow owned by `TEST_OWNER_USER_UUID` (admin via ownership,
/// no grant row needed — see `AuthorizationService::resolve_access`).
pub async fn seed_owned_workflow(app: &TestApp) -> Workflow {
    let workflow = WorkflowFactory::build_owned_by(*TEST_OWNER_USER_UUID);
    let repository = WorkflowRepositoryImpl::new(app.pool.clone());
    use collab_shared::domain::repositories::WorkflowRepository;
    repository.create(workflow).await.expect("failed to seed workflow")
}

/// Grants `role` on `workflow_id` to `user_id` via the `permissions` table.
/// No write method exists on `AccessGrantRepository` (the service only ever
/// reads grants), so tests seed directly through the pool.
pub async fn grant_role(app: &TestApp, user_id: Uuid, workflow_id: Uuid, role: Role) {
    sqlx::query!(
        r#"
        INSERT INTO permissions (user_id, entity_type, entity_id, permission_type)
        VALUES ($1, 'workflow', $2, $3)
        "#,
        user_id,
        workflow_id,
        role.as_str(),
    )
    .execute(&app.pool)
    .await
    .expect("failed to seed permission grant");
}

pub async fn connect_ws(app: &TestApp, token: &str) -> TestSocket {
    let url = format!("{}?token={token}", app.ws_url);
    let (socket, _response) = connect_async(url).await.expect("failed to open test websocket");
    socket
}

pub async fn send_json(socket: &mut TestSocket, value: &serde_json::Value) {
    let text = serde_json::to_string(value).expect("failed to serialize test frame");
    socket.send(WsMessage::Text(text.into())).await.expect("failed to send test frame");
}

/// Reads the next text frame and parses it as an `OutboundEvent`, skipping
/// ping/pong control frames a real browser client never surfaces to app code.
pub async fn recv_event(socket: &mut TestSocket) -> collab_server::protocol::OutboundEvent {
    loop {
        let message = socket
            .next()
            .await
            .expect("websocket closed before expected frame")
            .expect("websocket read error");

        if let WsMessage::Text(text) = message {
            return serde_json::from_str(&text).expect("failed to parse outbound event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires test database
    async fn test_setup_test_app() {
        let app = setup_test_app().await;
        assert!(app.pool.size() > 0);
        teardown_test_app(&app).await;
    }
}
