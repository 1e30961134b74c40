//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: provider/store/policy wiring and the services built over them
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: `ServiceError` → JSON error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = AppServices::from_config(config).await?;
    Ok(build_app_with(services))
}

/// Build the router over already-wired services.
pub fn build_app_with(services: AppServices) -> Router {
    let guard = services.guard();

    // Protected routes: auth layer resolves the principal before any handler runs.
    let authenticated = routes::authenticated_router().layer(
        axum::middleware::from_fn_with_state(guard.clone(), middleware::auth_middleware),
    );

    // Admin routes: auth (outer) then admin check (inner).
    let admin = routes::admin_router()
        .layer(axum::middleware::from_fn_with_state(
            guard.clone(),
            middleware::admin_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            guard,
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(routes::public_router())
        .merge(authenticated)
        .merge(admin)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::log_requests))
                .layer(Extension(Arc::new(services))),
        )
}
