//! Shared application state handed to every connection handler.
//!
//! Grounded on the teacher's `AppState<R>` composition-root pattern: one
//! struct built once at startup in `main.rs`, wrapped in `Arc` and passed
//! by reference into every handler rather than re-resolved per request.

use std::sync::Arc;

use collab_authz::{AuthorizationService, TokenVerifier};
use collab_shared::domain::repositories::{
    AccessGrantRepository, BlockRepository, EdgeRepository, SubflowRepository, WorkflowRepository,
};
use collab_shared::Settings;
use sqlx::PgPool;

use crate::collab::RoomRegistry;
use crate::consistency::ConsistencyChecker;
use crate::mutation::MutationEngine;
use crate::snapshot::SnapshotComposer;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub settings: Arc<Settings>,
    pub workflow_repository: Arc<dyn WorkflowRepository>,
    pub block_repository: Arc<dyn BlockRepository>,
    pub edge_repository: Arc<dyn EdgeRepository>,
    pub subflow_repository: Arc<dyn SubflowRepository>,
    pub access_grant_repository: Arc<dyn AccessGrantRepository>,
    pub authorization: Arc<AuthorizationService>,
    pub token_verifier: Arc<dyn TokenVerifier>,
    pub rooms: Arc<RoomRegistry>,
    pub mutation_engine: Arc<MutationEngine>,
    pub snapshot_composer: Arc<SnapshotComposer>,
    pub consistency_checker: Arc<ConsistencyChecker>,
}

#[allow(clippy::too_many_arguments)]
impl AppState {
    pub fn new(
        pool: PgPool,
        settings: Arc<Settings>,
        workflow_repository: Arc<dyn WorkflowRepository>,
        block_repository: Arc<dyn BlockRepository>,
        edge_repository: Arc<dyn EdgeRepository>,
        subflow_repository: Arc<dyn SubflowRepository>,
        access_grant_repository: Arc<dyn AccessGrantRepository>,
        token_verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let authorization = Arc::new(AuthorizationService::new(
            workflow_repository.clone(),
            access_grant_repository.clone(),
            pool.clone(),
        ));
        let mutation_engine = Arc::new(MutationEngine::new(
            pool.clone(),
            workflow_repository.clone(),
            block_repository.clone(),
            edge_repository.clone(),
            subflow_repository.clone(),
        ));
        let snapshot_composer = Arc::new(SnapshotComposer::new(
            pool.clone(),
            workflow_repository.clone(),
            block_repository.clone(),
            edge_repository.clone(),
            subflow_repository.clone(),
        ));
        let consistency_checker = Arc::new(ConsistencyChecker::new(pool.clone(), edge_repository.clone()));

        Self {
            pool,
            settings,
            workflow_repository,
            block_repository,
            edge_repository,
            subflow_repository,
            access_grant_repository,
            authorization,
            token_verifier,
            rooms: Arc::new(RoomRegistry::new()),
            mutation_engine,
            snapshot_composer,
            consistency_checker,
        }
    }
}
