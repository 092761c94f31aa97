//! Directory maintenance: member profiles and resource records that feed
//! the attribute provider.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::put,
    Json, Router,
};

use orgadmin_auth::permissions::org;
use orgadmin_core::UserId;
use orgadmin_infra::directory::{MemberProfile, ResourceRecord};

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::{OrgContext, PrincipalContext};

pub fn router() -> Router {
    Router::new()
        .route("/members/:user_id", put(put_member).delete(delete_member))
        .route("/resources/:resource_type/:resource_id", put(put_resource))
}

/// PUT /directory/members/:user_id
pub async fn put_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(user_id): Path<String>,
    body: Result<Json<dto::PutMemberRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::DIRECTORY_MANAGE) {
        return resp;
    }
    let user_id: UserId = match user_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("user"),
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let profile = MemberProfile {
        user_id,
        roles: body.roles,
        department_id: body.department_id,
        title: body.title,
        attributes: body.attributes,
    };
    services.directory.put_member(org_ctx.org_id(), profile.clone());

    Json(profile).into_response()
}

/// DELETE /directory/members/:user_id
pub async fn delete_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(user_id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::DIRECTORY_MANAGE) {
        return resp;
    }
    let user_id: UserId = match user_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::invalid_id("user"),
    };

    match services.directory.remove_member(org_ctx.org_id(), user_id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "member not found"),
    }
}

/// PUT /directory/resources/:resource_type/:resource_id
pub async fn put_resource(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path((resource_type, resource_id)): Path<(String, String)>,
    body: Result<Json<dto::PutResourceRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::DIRECTORY_MANAGE) {
        return resp;
    }
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    if services.registry.get(&resource_type).is_none() {
        tracing::warn!(resource_type = %resource_type, "storing record for unregistered resource type");
    }

    let record = ResourceRecord::new(resource_type, resource_id, body.attributes);
    services.directory.put_resource(org_ctx.org_id(), record.clone());

    Json(record).into_response()
}
