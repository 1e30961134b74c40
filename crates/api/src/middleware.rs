use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, info};

use warden_infra::ServiceError;

use crate::app::errors::service_error_to_response;
use crate::authz::Guard;
use crate::context::PrincipalContext;

/// Resolve the caller and attach a [`PrincipalContext`]; 401/403 otherwise.
pub async fn auth_middleware(
    State(guard): State<Guard>,
    mut req: Request,
    next: Next,
) -> Response {
    match guard.authenticate(req.headers()).await {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(e) => {
            debug!(path = %req.uri().path(), error = %e, "request not authenticated");
            service_error_to_response(e)
        }
    }
}

/// Second layer for admin routes. Must run after [`auth_middleware`].
pub async fn admin_middleware(State(guard): State<Guard>, req: Request, next: Next) -> Response {
    let Some(ctx) = req.extensions().get::<PrincipalContext>() else {
        return service_error_to_response(ServiceError::Unauthenticated);
    };
    if let Err(e) = guard.require_admin(ctx) {
        debug!(principal_id = %ctx.principal_id(), error = %e, "admin route refused");
        return service_error_to_response(e);
    }
    next.run(req).await
}

/// One log line per request.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = std::time::Instant::now();

    let res = next.run(req).await;

    info!(
        %method,
        %path,
        status = res.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    res
}
