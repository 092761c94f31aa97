//! ABAC policy administration: CRUD over the organization's policy set plus
//! document export/import.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use orgadmin_auth::abac::{AbacPolicy, PolicyDocument};
use orgadmin_auth::permissions::org;
use orgadmin_infra::policy_store::PolicyStore;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::{OrgContext, PrincipalContext};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_policies).put(replace_policies))
        .route("/export", get(export_policies))
        .route("/import", post(import_policies))
        .route("/:id", get(get_policy).put(put_policy).delete(delete_policy))
}

/// GET /abac/policies
pub async fn list_policies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::POLICIES_READ) {
        return resp;
    }

    match services.policies.list(org_ctx.org_id()).await {
        Ok(policies) => Json(dto::PolicyListResponse { policies }).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT /abac/policies - replace the whole set
pub async fn replace_policies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<Vec<AbacPolicy>>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::POLICIES_MANAGE) {
        return resp;
    }
    let Json(policies) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.policies.replace_all(org_ctx.org_id(), policies).await {
        Ok(policies) => Json(dto::PolicyListResponse { policies }).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /abac/policies/:id
pub async fn get_policy(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::POLICIES_READ) {
        return resp;
    }

    match services.policies.get(org_ctx.org_id(), &id).await {
        Ok(Some(policy)) => Json(policy).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", format!("policy '{id}' not found")),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT /abac/policies/:id - insert or replace one policy
pub async fn put_policy(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<AbacPolicy>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::POLICIES_MANAGE) {
        return resp;
    }
    let Json(policy) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    if policy.id.trim() != id {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "id_mismatch",
            format!("body id '{}' does not match path id '{id}'", policy.id),
        );
    }

    let warnings = services.registry.lint_policy(&policy);
    match services.policies.upsert(org_ctx.org_id(), policy).await {
        Ok(policy) => Json(serde_json::json!({
            "policy": policy,
            "warnings": warnings,
        }))
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /abac/policies/:id
pub async fn delete_policy(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::POLICIES_MANAGE) {
        return resp;
    }

    match services.policies.delete(org_ctx.org_id(), &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /abac/policies/export
pub async fn export_policies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::POLICIES_READ) {
        return resp;
    }

    match services.policies.list(org_ctx.org_id()).await {
        Ok(policies) => Json(PolicyDocument::new(policies)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /abac/policies/import - validate a document, report registry
/// warnings, then replace the set
pub async fn import_policies(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(org_ctx): Extension<OrgContext>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<PolicyDocument>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&org_ctx, &principal, &org::POLICIES_MANAGE) {
        return resp;
    }
    let Json(document) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let policies = match document.into_validated() {
        Ok(p) => p,
        Err(e) => return errors::validation_error_to_response(e),
    };
    let warnings: Vec<_> = policies
        .iter()
        .flat_map(|p| services.registry.lint_policy(p))
        .collect();

    match services.policies.replace_all(org_ctx.org_id(), policies).await {
        Ok(policies) => {
            tracing::info!(
                org_id = %org_ctx.org_id(),
                imported = policies.len(),
                warnings = warnings.len(),
                "policy document imported"
            );
            Json(dto::ImportResponse {
                imported: policies.len(),
                policies,
                warnings,
            })
            .into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
