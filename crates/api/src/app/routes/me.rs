//! Self-service endpoints for the authenticated principal.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::app::dto::{AccessQuery, ChangePasswordRequest, MeResponse, PrincipalResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::Guard;
use crate::context::PrincipalContext;

/// GET /me - principal, credential state, and allowed (resource, action) pairs
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    let guard: Guard = services.guard();
    guard.require_access(&ctx, "profile", "read")?;

    let principal = ctx.principal().clone();
    let allowed = guard
        .policy()
        .allowed_pairs(&principal.role)
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(MeResponse {
        principal: PrincipalResponse::from(principal),
        allowed,
    })
    .into_response())
}

/// GET /me/access?resource=&action= - explain an access decision
pub async fn access(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Query(query): Query<AccessQuery>,
) -> Response {
    let explanation = services
        .policy_table
        .explain(Some(ctx.principal()), &query.resource, &query.action);
    Json(explanation).into_response()
}

/// PUT /me/password - change own password
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Response, ApiError> {
    services
        .lifecycle
        .change_password(
            ctx.principal_id(),
            &body.new_password,
            Some(body.confirm_password.as_str()),
        )
        .await?;
    Ok(Json(json!({ "message": "Password updated" })).into_response())
}
