use axum::{Router, routing::get};

pub mod abac;
pub mod access;
pub mod directory;
pub mod policies;
pub mod system;

/// Router for all authenticated (organization-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/roles", get(system::roles))
        .nest("/abac", abac::router())
        .nest("/authz", access::router())
        .nest("/directory", directory::router())
}
