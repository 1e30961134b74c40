use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

use warden_infra::ServiceError;

const RETRY_MESSAGE: &str = "Something went wrong. Please try again.";

/// Handler error: a [`ServiceError`] rendered through [`service_error_to_response`].
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        service_error_to_response(self.0)
    }
}

pub fn service_error_to_response(err: ServiceError) -> Response {
    match err {
        ServiceError::Unauthenticated => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication required",
        ),
        ServiceError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        ServiceError::InvalidOrExpiredToken => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_or_expired_token",
            "This reset link is invalid or has expired. Please request a new link.",
        ),
        ServiceError::PolicyViolation(result) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "policy_violation",
                "message": result.summary_message,
                "violations": result.violations,
            })),
        )
            .into_response(),
        ServiceError::ConfirmationMismatch => json_error(
            StatusCode::BAD_REQUEST,
            "confirmation_mismatch",
            "Passwords do not match",
        ),
        ServiceError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ServiceError::ProviderFailure(detail) => {
            warn!(%detail, "identity provider failure");
            json_error(StatusCode::BAD_REQUEST, "provider_failure", RETRY_MESSAGE)
        }
        ServiceError::Store(detail) => {
            warn!(%detail, "directory store failure");
            json_error(StatusCode::BAD_REQUEST, "store_failure", RETRY_MESSAGE)
        }
        ServiceError::InconsistentState(detail) => {
            error!(%detail, "inconsistent state surfaced to caller");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "inconsistent_state",
                "The request was only partially applied. Please contact an administrator.",
            )
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
