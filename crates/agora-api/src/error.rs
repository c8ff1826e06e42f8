use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use agora_core::MessagingError;
use agora_types::api::ErrorBody;

/// Handler error: a [`MessagingError`] rendered as a JSON body with the
/// matching status code.
#[derive(Debug)]
pub struct ApiError(pub MessagingError);

impl ApiError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self(MessagingError::InvalidArgument(msg.into()))
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(MessagingError::Unauthorized(msg.into()))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self(MessagingError::Internal(msg.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            MessagingError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            MessagingError::Forbidden(_) => StatusCode::FORBIDDEN,
            MessagingError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            MessagingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MessagingError> for ApiError {
    fn from(e: MessagingError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self.0);
        } else {
            warn!("Request rejected ({}): {}", self.0.kind(), self.0.message());
        }

        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
