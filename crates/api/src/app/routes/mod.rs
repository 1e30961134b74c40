use axum::{
    Router,
    routing::{get, post, put},
};

pub mod admin_users;
pub mod auth;
pub mod me;
pub mod password;
pub mod roles;
pub mod system;

/// Endpoints reachable without a session.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/password/check", post(password::check))
        .route("/password/forgot", post(password::forgot))
        .route("/password/reset", post(password::reset))
        .route("/auth/sign-in", post(auth::sign_in))
}

/// Endpoints for any authenticated principal.
pub fn authenticated_router() -> Router {
    Router::new()
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/me", get(me::me))
        .route("/me/access", get(me::access))
        .route("/me/password", put(me::change_password))
}

/// Endpoints for administrators only.
pub fn admin_router() -> Router {
    Router::new()
        .nest("/admin-users", admin_users::router())
        .route("/roles", get(roles::list_roles))
}
