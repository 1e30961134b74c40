//! Admin user management.
//!
//! Mounted behind both the auth and admin layers: handlers can assume an
//! authenticated administrator with no outstanding forced reset.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use warden_core::PrincipalId;
use warden_infra::ServiceError;

use crate::app::dto::{CreateAdminUserRequest, PrincipalResponse, UpdateAdminUserRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

fn parse_id(raw: &str) -> Result<PrincipalId, ServiceError> {
    raw.parse::<PrincipalId>().map_err(ServiceError::from)
}

/// GET /admin-users
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, ApiError> {
    let users: Vec<PrincipalResponse> = services
        .accounts
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(json!({ "users": users })).into_response())
}

/// POST /admin-users
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<CreateAdminUserRequest>,
) -> Result<Response, ApiError> {
    let created = services.accounts.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(PrincipalResponse::from(created))).into_response())
}

/// GET /admin-users/:id
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let principal = services.accounts.get(parse_id(&id)?).await?;
    Ok(Json(PrincipalResponse::from(principal)).into_response())
}

/// PUT /admin-users/:id
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateAdminUserRequest>,
) -> Result<Response, ApiError> {
    let updated = services
        .accounts
        .update(parse_id(&id)?, body.into())
        .await?;
    Ok(Json(PrincipalResponse::from(updated)).into_response())
}

/// DELETE /admin-users/:id
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    services
        .accounts
        .delete(ctx.principal_id(), parse_id(&id)?)
        .await?;
    Ok(Json(json!({ "message": "User deleted" })).into_response())
}
