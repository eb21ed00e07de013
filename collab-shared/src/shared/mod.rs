pub mod api_response;
pub mod error;
pub mod result;

pub use api_response::{ApiError, ApiResponse, ErrorResponse};
pub use error::{CollabError, ErrorKind};
pub use result::CollabResult;
