//! WebSocket Lifecycle Controller (4.3, 4.9).
//!
//! One task per connection, grounded on the teacher's Axum handler shape
//! (`State<Arc<AppState>>` extractor, `axum::extract::ws`). Everything
//! downstream of the handshake — join/leave, structural operations,
//! presence — is dispatched from the single read loop below so that one
//! connection never has two frames in flight concurrently.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use collab_authz::HandshakeIdentity;
use collab_shared::domain::entities::EditorSession;
use collab_shared::shared::CollabError;

use crate::collab::Broadcaster;
use crate::protocol::validator::{self, BlockOp, ParsedOperation};
use crate::protocol::{InboundEvent, OutboundEvent, SubblockUpdateFrame, WorkflowOperationFrame};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

pub async fn ws_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.token))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, token: Option<String>) {
    let identity = match state.token_verifier.verify(token.as_deref()).await {
        Ok(identity) => identity,
        Err(err) => {
            warn!(error = %err, "handshake rejected");
            let _ = close_with_error(socket, &err).await;
            return;
        }
    };

    let connection_id = Uuid::new_v4();
    info!(connection_id = %connection_id, user_id = %identity.user_id, "connection established");

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<OutboundEvent>();

    let pump = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut connection = Connection {
        state,
        identity,
        connection_id,
        sender: tx,
        current_workflow: None,
    };

    while let Some(frame) = stream.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, connection_id = %connection_id, "websocket read error");
                break;
            }
        };

        match message {
            Message::Text(text) => connection.handle_text(&text).await,
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => {}
        }
    }

    connection.cleanup().await;
    pump.abort();
    info!(connection_id = %connection_id, "connection closed");
}

async fn close_with_error(mut socket: WebSocket, err: &CollabError) {
    let event = OutboundEvent::Error {
        kind: err.wire_type().to_string(),
        message: err.to_string(),
    };
    if let Ok(text) = serde_json::to_string(&event) {
        let _ = socket.send(Message::Text(text.into())).await;
    }
    let _ = socket.close().await;
}

struct Connection {
    state: Arc<AppState>,
    identity: HandshakeIdentity,
    connection_id: Uuid,
    sender: mpsc::UnboundedSender<OutboundEvent>,
    current_workflow: Option<Uuid>,
}

impl Connection {
    fn send(&self, event: OutboundEvent) {
        let _ = self.sender.send(event);
    }

    async fn handle_text(&mut self, text: &str) {
        let event: InboundEvent = match serde_json::from_str(text) {
            Ok(event) => event,
            Err(err) => {
                self.send(OutboundEvent::Error {
                    kind: CollabError::ValidationError(err.to_string()).wire_type().to_string(),
                    message: err.to_string(),
                });
                return;
            }
        };

        match event {
            InboundEvent::JoinWorkflow { workflow_id } => self.join_workflow(workflow_id).await,
            InboundEvent::RequestSync { workflow_id } => self.request_sync(workflow_id).await,
            InboundEvent::LeaveWorkflow => self.leave_workflow().await,
            InboundEvent::WorkflowOperation(frame) => self.workflow_operation(frame).await,
            InboundEvent::SubblockUpdate(frame) => self.subblock_update(frame).await,
            InboundEvent::CursorUpdate { cursor } => self.cursor_update(cursor).await,
            InboundEvent::SelectionUpdate { selection } => self.selection_update(selection).await,
        }
    }

    async fn join_workflow(&mut self, workflow_id: Uuid) {
        if self.current_workflow.is_some() {
            self.leave_workflow().await;
        }

        let access = match self
            .state
            .authorization
            .resolve_access(self.identity.user_id, workflow_id)
            .await
        {
            Ok(access) => access,
            Err(err) => {
                self.send(OutboundEvent::JoinWorkflowError { error: err.to_string() });
                return;
            }
        };

        if !access.has_access {
            self.send(OutboundEvent::JoinWorkflowError {
                error: "access denied".to_string(),
            });
            return;
        }

        let snapshot = match self.state.snapshot_composer.compose(workflow_id).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.send(OutboundEvent::JoinWorkflowError { error: err.to_string() });
                return;
            }
        };

        let session = EditorSession::new(
            self.connection_id,
            self.identity.user_id,
            self.identity.display_name.clone(),
            workflow_id,
            Utc::now(),
        );
        let handle = self.state.rooms.join(workflow_id, session, self.sender.clone()).await;
        self.current_workflow = Some(workflow_id);

        self.send(OutboundEvent::WorkflowState(snapshot));
        Broadcaster::presence_update(&handle).await;
    }

    async fn request_sync(&mut self, workflow_id: Uuid) {
        if self.current_workflow != Some(workflow_id) {
            self.send(OutboundEvent::Error {
                kind: CollabError::NotJoined.wire_type().to_string(),
                message: CollabError::NotJoined.to_string(),
            });
            return;
        }

        match self.state.snapshot_composer.compose(workflow_id).await {
            Ok(snapshot) => self.send(OutboundEvent::WorkflowState(snapshot)),
            Err(err) => self.send(OutboundEvent::Error {
                kind: err.wire_type().to_string(),
                message: err.to_string(),
            }),
        }
    }

    async fn leave_workflow(&mut self) {
        let Some(workflow_id) = self.current_workflow.take() else {
            return;
        };

        self.state.rooms.leave(workflow_id, self.connection_id).await;
        if let Some(handle) = self.state.rooms.get(workflow_id) {
            Broadcaster::presence_update(&handle).await;
        }
    }

    async fn workflow_operation(&mut self, frame: WorkflowOperationFrame) {
        let Some(workflow_id) = self.current_workflow else {
            self.fail_operation(&frame.operation_id, &CollabError::NotJoined);
            return;
        };

        let parsed = match validator::parse(&frame) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.fail_operation(&frame.operation_id, &err);
                return;
            }
        };

        let decision = match self
            .state
            .authorization
            .authorize_operation(self.identity.user_id, workflow_id, &frame.operation, &frame.target)
            .await
        {
            Ok(decision) => decision,
            Err(err) => {
                self.fail_operation(&frame.operation_id, &err);
                return;
            }
        };

        if !decision.allowed {
            self.send(OutboundEvent::OperationForbidden {
                kind: "InsufficientPermissions".to_string(),
                message: decision.reason.unwrap_or_else(|| "operation not permitted".to_string()),
                operation: frame.operation.clone(),
                target: frame.target.clone(),
            });
            return;
        }

        let Some(room) = self.state.rooms.get(workflow_id) else {
            self.fail_operation(&frame.operation_id, &CollabError::RoomNotFound(workflow_id.to_string()));
            return;
        };

        // Fast path (4.7): broadcast with the client's timestamp before the
        // write is observable, then persist.
        if let ParsedOperation::Block(BlockOp::UpdatePosition { id, position }) = &parsed {
            Broadcaster::position_update(
                &room,
                self.identity.user_id,
                frame.payload.clone(),
                frame.timestamp,
                frame.operation_id.clone(),
            )
            .await;

            match self
                .state
                .mutation_engine
                .apply_position_update(workflow_id, *id, position.x, position.y, frame.timestamp)
                .await
            {
                Ok(()) => self.confirm_operation(&frame.operation_id),
                Err(err) => self.fail_operation(&frame.operation_id, &err),
            }
            return;
        }

        // Structural path: hold the room's serialization lock across
        // commit-then-broadcast so commit order matches broadcast order (I4).
        let guard = room.room.lock().await;
        let result = self.state.mutation_engine.apply(workflow_id, &parsed).await;
        drop(guard);

        match result {
            Ok(()) => {
                Broadcaster::workflow_operation(
                    &room,
                    self.identity.user_id,
                    frame.operation.clone(),
                    frame.target.clone(),
                    frame.payload.clone(),
                    Utc::now().timestamp_millis(),
                    frame.operation_id.clone(),
                )
                .await;
                self.confirm_operation(&frame.operation_id);
            }
            Err(err) => self.fail_operation(&frame.operation_id, &err),
        }
    }

    async fn subblock_update(&mut self, frame: SubblockUpdateFrame) {
        let Some(workflow_id) = self.current_workflow else {
            self.fail_operation(&frame.operation_id, &CollabError::NotJoined);
            return;
        };

        let decision = match self
            .state
            .authorization
            .authorize_operation(self.identity.user_id, workflow_id, "update", "block")
            .await
        {
            Ok(decision) => decision,
            Err(err) => {
                self.fail_operation(&frame.operation_id, &err);
                return;
            }
        };

        if !decision.allowed {
            self.send(OutboundEvent::OperationForbidden {
                kind: "InsufficientPermissions".to_string(),
                message: decision.reason.unwrap_or_else(|| "operation not permitted".to_string()),
                operation: "update".to_string(),
                target: "block".to_string(),
            });
            return;
        }

        let result = self
            .state
            .mutation_engine
            .apply_sub_block_update(workflow_id, frame.block_id, &frame.subblock_id, frame.value.clone())
            .await;

        match result {
            Ok(()) => {
                if let Some(room) = self.state.rooms.get(workflow_id) {
                    Broadcaster::sub_block_update(
                        &room,
                        self.identity.user_id,
                        frame.block_id,
                        frame.subblock_id.clone(),
                        frame.value.clone(),
                        Utc::now().timestamp_millis(),
                        frame.operation_id.clone(),
                    )
                    .await;
                }
                self.confirm_operation(&frame.operation_id);
            }
            Err(err) => {
                // `BlockGone` means the session's target no longer exists in
                // this workflow; any other DB error leaves the session alive
                // so the client can retry (9c).
                self.fail_operation(&frame.operation_id, &err);
                if matches!(err, CollabError::BlockGone(_)) {
                    self.leave_workflow().await;
                }
            }
        }
    }

    async fn cursor_update(&mut self, cursor: collab_shared::domain::entities::Cursor) {
        let Some(workflow_id) = self.current_workflow else {
            return;
        };
        let Some(room) = self.state.rooms.get(workflow_id) else {
            return;
        };
        if room.update_cursor(self.connection_id, cursor).await {
            Broadcaster::cursor_update(
                &room,
                self.connection_id,
                self.identity.user_id,
                self.identity.display_name.clone(),
                cursor,
            )
            .await;
        }
    }

    async fn selection_update(&mut self, selection: collab_shared::domain::entities::Selection) {
        let Some(workflow_id) = self.current_workflow else {
            return;
        };
        let Some(room) = self.state.rooms.get(workflow_id) else {
            return;
        };
        if room.update_selection(self.connection_id, selection.clone()).await {
            Broadcaster::selection_update(
                &room,
                self.connection_id,
                self.identity.user_id,
                self.identity.display_name.clone(),
                selection,
            )
            .await;
        }
    }

    async fn cleanup(&mut self) {
        self.leave_workflow().await;
    }

    fn confirm_operation(&self, operation_id: &Option<String>) {
        self.send(OutboundEvent::OperationConfirmed {
            operation_id: operation_id.clone(),
            server_timestamp: Utc::now().timestamp_millis(),
        });
    }

    fn fail_operation(&self, operation_id: &Option<String>, err: &CollabError) {
        self.send(OutboundEvent::OperationFailed {
            operation_id: operation_id.clone(),
            error: err.to_string(),
            retryable: err.retryable(),
        });
    }
}

