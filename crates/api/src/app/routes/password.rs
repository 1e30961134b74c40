//! Public password endpoints: strength check and self-service reset.

use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use warden_auth::extract_reset_token;
use warden_infra::ServiceError;

use crate::app::dto::{CheckPasswordRequest, ForgotPasswordRequest, ResetPasswordRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// POST /password/check - advisory strength check
pub async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<CheckPasswordRequest>,
) -> Response {
    Json(services.lifecycle.check_password(&body.password)).into_response()
}

/// POST /password/forgot - always 202, whether or not the account exists
pub async fn forgot(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Response, ApiError> {
    let return_url = body
        .return_url
        .unwrap_or_else(|| services.reset_return_url.clone());
    services
        .lifecycle
        .request_reset(&body.email, &return_url)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "If an account exists for that email, a reset link has been sent.",
        })),
    )
        .into_response())
}

/// POST /password/reset - redeem a reset token
pub async fn reset(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Response, ApiError> {
    let token = body
        .token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| body.return_url.as_deref().and_then(extract_reset_token))
        .ok_or(ServiceError::InvalidOrExpiredToken)?;

    services
        .lifecycle
        .redeem_reset(&token, &body.new_password, body.confirm_password.as_deref())
        .await?;

    Ok(Json(json!({ "message": "Password has been reset. You can now sign in." })).into_response())
}
