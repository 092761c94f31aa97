//! ABAC tooling endpoints: policy simulation and the resource catalogue.

use std::sync::Arc;

use axum::{
    extract::{Extension, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use orgadmin_auth::abac::{AccessRequest, explain, validate_policy_set};
use orgadmin_auth::permissions::org;
use orgadmin_infra::policy_store::PolicyStore;

use crate::app::routes::policies;
use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::{OrgContext, PrincipalContext};

pub fn router() -> Router {
    Router::new()
        .nest("/policies", policies::router())
        .route("/simulate", post(simulate))
        .route("/resources", get(list_resources))
}

/// POST /abac/simulate - explain a decision for caller-supplied attributes,
/// against the stored set or a draft set from the body
pub async fn simulate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::SimulateRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::POLICIES_READ) {
        return resp;
    }
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let (policies, warnings) = match body.policies {
        Some(draft) => match validate_policy_set(draft) {
            Ok(draft) => {
                let warnings = draft
                    .iter()
                    .flat_map(|p| services.registry.lint_policy(p))
                    .collect();
                (draft, warnings)
            }
            Err(e) => return errors::validation_error_to_response(e),
        },
        None => match services.policies.list(org_ctx.org_id()).await {
            Ok(stored) => (stored, Vec::new()),
            Err(e) => return errors::store_error_to_response(e),
        },
    };

    let request = AccessRequest::new(body.action, body.resource_type);
    let trace = explain(&policies, &request, &body.subject, &body.resource);

    Json(dto::SimulateResponse { trace, warnings }).into_response()
}

/// GET /abac/resources - registered resource types and their actions
pub async fn list_resources(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::POLICIES_READ) {
        return resp;
    }
    let resources: Vec<_> = services
        .registry
        .resources()
        .map(|r| {
            serde_json::json!({
                "resourceType": r.resource_type,
                "description": r.description,
                "actions": r.actions().collect::<Vec<_>>(),
            })
        })
        .collect();

    Json(serde_json::json!({ "resources": resources })).into_response()
}
