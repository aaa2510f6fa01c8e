use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{config::StatusPolicy, models::ErrorResponse};

/// Failures a caller can see. The `Display` text is the exact string placed
/// in the `error` field of the JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("invalid url")]
    InvalidUrl,
    #[error("invalid id")]
    InvalidId,
    /// A stored entry could not be served. Not a client mistake.
    #[error("internal error")]
    Internal,
}

impl AppError {
    /// HTTP status for this error under the configured policy.
    pub fn status(self, policy: StatusPolicy) -> StatusCode {
        match (policy, self) {
            (_, AppError::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
            (StatusPolicy::Compat, _) => StatusCode::OK,
            (StatusPolicy::Strict, AppError::InvalidUrl) => StatusCode::BAD_REQUEST,
            (StatusPolicy::Strict, AppError::InvalidId) => StatusCode::NOT_FOUND,
        }
    }

    pub fn with_policy(self, policy: StatusPolicy) -> ApiError {
        ApiError {
            error: self,
            policy,
        }
    }
}

/// An [`AppError`] paired with the status policy it should be rendered under.
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub policy: StatusPolicy,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.error.to_string(),
        };

        (self.error.status(self.policy), Json(body)).into_response()
    }
}
