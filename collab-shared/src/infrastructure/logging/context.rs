use tracing::Span;
use uuid::Uuid;

/// Fields attached to a tracing span for the lifetime of a request or
/// collaboration session.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub request_id: String,
    pub user_id: Option<Uuid>,
    pub workflow_id: Option<Uuid>,
}

impl LogContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user_id: None,
            workflow_id: None,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_workflow(mut self, workflow_id: Uuid) -> Self {
        self.workflow_id = Some(workflow_id);
        self
    }
}

/// Create a span carrying the fields of an arbitrary [`LogContext`].
pub fn span_with_context(name: &'static str, ctx: &LogContext) -> Span {
    tracing::info_span!(
        "request",
        otel.name = name,
        request_id = %ctx.request_id,
        user_id = tracing::field::Empty,
        workflow_id = tracing::field::Empty,
    )
    .in_scope(|| {
        let span = Span::current();
        if let Some(user_id) = ctx.user_id {
            span.record("user_id", tracing::field::display(user_id));
        }
        if let Some(workflow_id) = ctx.workflow_id {
            span.record("workflow_id", tracing::field::display(workflow_id));
        }
        span
    })
}
