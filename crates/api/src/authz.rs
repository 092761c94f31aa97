//! API-side authorization: RBAC gates for administrative routes and the
//! staged access guard for HR/organization actions.

use axum::http::StatusCode;
use axum::response::Response;

use orgadmin_auth::abac::{AccessRequest, AttributeResolver, ResourceRef, SubjectRef};
use orgadmin_auth::{AccessDecision, AuthzError, Permission, Principal, authorize, check_access};
use orgadmin_infra::policy_store::PolicyStore;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::{OrgContext, PrincipalContext};

/// Principal for the current request, acting in the token's organization.
pub fn principal(org: &OrgContext, principal: &PrincipalContext) -> Principal {
    Principal::from_roles(principal.user_id(), org.org_id(), principal.roles().to_vec())
}

/// RBAC gate for administrative routes.
pub fn require(
    org: &OrgContext,
    principal_ctx: &PrincipalContext,
    permission: &Permission,
) -> Result<(), Response> {
    authorize(&principal(org, principal_ctx), permission).map_err(|e| {
        tracing::debug!(permission = %permission, error = %e, "administrative request rejected");
        authz_error_to_response(e)
    })
}

/// Run the access guard for `request` against the org's stored policies and
/// directory-resolved attributes.
pub async fn check(
    services: &AppServices,
    org: &OrgContext,
    principal_ctx: &PrincipalContext,
    request: &AccessRequest,
    resource: &ResourceRef,
) -> Result<AccessDecision, Response> {
    let policies = services
        .policies
        .list(org.org_id())
        .await
        .map_err(errors::store_error_to_response)?;

    let subject = SubjectRef {
        org_id: org.org_id(),
        user_id: principal_ctx.user_id(),
    };
    let attributes = services.attributes.resolve(&subject, resource);

    Ok(check_access(
        &principal(org, principal_ctx),
        request,
        &policies,
        &attributes,
    ))
}

pub fn authz_error_to_response(err: AuthzError) -> Response {
    match err {
        AuthzError::OrgMismatch => errors::json_error(StatusCode::FORBIDDEN, "org_mismatch", err.to_string()),
        AuthzError::Forbidden(_) => errors::json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        AuthzError::PolicyDenied { .. } => {
            errors::json_error(StatusCode::FORBIDDEN, "policy_denied", err.to_string())
        }
    }
}
