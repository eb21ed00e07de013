// API Response Types
// Standard response structures for HTTP APIs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::{CollabError, ErrorKind};

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(code: String, message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ErrorResponse {
                code,
                message,
                details: None,
            }),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// API Error type that can be returned from handlers
pub struct ApiError(pub CollabError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::ResourceNotFound | ErrorKind::RoomNotFound | ErrorKind::BlockGone => {
                StatusCode::NOT_FOUND
            }
            ErrorKind::AuthRequired | ErrorKind::InvalidSession => StatusCode::UNAUTHORIZED,
            ErrorKind::AccessDenied | ErrorKind::InsufficientPermissions => StatusCode::FORBIDDEN,
            ErrorKind::ValidationError | ErrorKind::NotJoined => StatusCode::BAD_REQUEST,
            ErrorKind::DuplicateResource => StatusCode::CONFLICT,
            ErrorKind::Database | ErrorKind::OperationFailed | ErrorKind::Configuration | ErrorKind::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let response = ApiResponse::<()>::error(self.0.wire_type().to_string(), self.0.to_string());

        (status, Json(response)).into_response()
    }
}

impl From<CollabError> for ApiError {
    fn from(err: CollabError) -> Self {
        ApiError(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError(CollabError::from(err))
    }
}
