use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use warden_infra::ServiceError;

use crate::app::dto::{SignInRequest, SignInResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// POST /auth/sign-in - exchange email + password for a session token
pub async fn sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<SignInRequest>,
) -> Result<Response, ApiError> {
    let token = services
        .provider
        .sign_in(&body.email, &body.password)
        .await
        .map_err(ServiceError::from)?;

    let principal = match services.store.find_by_email(&body.email).await {
        Ok(Some(p)) if p.active => p,
        Ok(_) => {
            revoke_unusable_session(&services, &token).await;
            return Err(ServiceError::forbidden("account is inactive or not provisioned").into());
        }
        Err(e) => {
            warn!(error = %e, "directory lookup failed during sign-in");
            revoke_unusable_session(&services, &token).await;
            return Err(ServiceError::forbidden("account could not be resolved").into());
        }
    };

    info!(principal_id = %principal.id, "signed in");
    Ok(Json(SignInResponse {
        token,
        needs_password_reset: principal.needs_password_reset,
    })
    .into_response())
}

async fn revoke_unusable_session(services: &AppServices, token: &str) {
    if let Err(e) = services.provider.sign_out(token).await {
        warn!(error = %e, "session minted for a refused sign-in could not be revoked");
    }
}

/// POST /auth/sign-out - revoke the presented session
pub async fn sign_out(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    services
        .provider
        .sign_out(ctx.credential())
        .await
        .map_err(ServiceError::from)?;
    info!(principal_id = %ctx.principal_id(), "signed out");
    Ok(StatusCode::NO_CONTENT.into_response())
}
