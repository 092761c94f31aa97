use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use orgadmin_auth::permissions::org;
use orgadmin_auth::{default_role_permissions, role_catalog};

use crate::authz;
use crate::context::{OrgContext, PrincipalContext};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(org): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> impl IntoResponse {
    let mut permissions: Vec<String> = principal
        .roles()
        .iter()
        .flat_map(default_role_permissions)
        .map(|p| p.as_str().to_string())
        .collect();
    permissions.sort();
    permissions.dedup();

    Json(serde_json::json!({
        "orgId": org.org_id().to_string(),
        "userId": principal.user_id().to_string(),
        "roles": principal.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "permissions": permissions,
    }))
}

/// GET /roles - built-in roles, their permissions and whether they bypass ABAC
pub async fn roles(
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::POLICIES_READ) {
        return resp;
    }
    Json(serde_json::json!({ "roles": role_catalog() })).into_response()
}
