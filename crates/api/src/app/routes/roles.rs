use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// GET /roles - role catalogue
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, ApiError> {
    let roles = services.accounts.roles().await?;
    Ok(Json(json!({ "roles": roles })).into_response())
}
