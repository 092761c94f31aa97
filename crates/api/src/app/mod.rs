//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: policy store, directory, and registry wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use orgadmin_infra::policy_store::PolicyStoreError;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: ApiConfig) -> Result<Router, PolicyStoreError> {
    let services = Arc::new(services::build_services(&config).await?);
    Ok(router_with_services(&config, services))
}

/// Router over already-built services.
pub fn router_with_services(config: &ApiConfig, services: Arc<services::AppServices>) -> Router {
    let jwt = Arc::new(orgadmin_auth::Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require auth + organization context.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
