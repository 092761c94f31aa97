//! Access checks through the full guard (org isolation, owner bypass, ABAC).

use std::sync::Arc;

use axum::{
    extract::{Extension, rejection::JsonRejection},
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use orgadmin_auth::abac::{AccessRequest, ResourceRef};

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::{OrgContext, PrincipalContext};

pub fn router() -> Router {
    Router::new().route("/check", post(check_access))
}

/// POST /authz/check - may the caller perform `action` on the resource?
pub async fn check_access(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CheckAccessRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let request = AccessRequest::new(body.action, body.resource_type);
    let resource = match body.resource_id {
        Some(id) => ResourceRef::instance(request.resource_type.clone(), id),
        None => ResourceRef::of_type(request.resource_type.clone()),
    };

    let decision = match authz::check(&services, &org_ctx, &principal, &request, &resource).await {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    tracing::info!(
        org_id = %org_ctx.org_id(),
        user_id = %principal.user_id(),
        action = %request.action,
        resource_type = %request.resource_type,
        decision = %decision.decision,
        "access checked"
    );

    Json(dto::CheckAccessResponse {
        decision,
        action: request.action,
        resource_type: request.resource_type,
    })
    .into_response()
}
