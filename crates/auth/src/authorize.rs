use serde::Serialize;
use thiserror::Error;

use orgadmin_core::{OrgId, UserId};

use crate::permissions::org;
use crate::{OrgMembership, Permission, Role};

/// A fully resolved principal for authorization decisions.
///
/// Construction of this object is intentionally decoupled from storage and
/// transport: the API derives it from verified token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub active_org_id: OrgId,
    pub membership: OrgMembership,
}

impl Principal {
    pub fn new(user_id: UserId, active_org_id: OrgId, membership: OrgMembership) -> Self {
        Self {
            user_id,
            active_org_id,
            membership,
        }
    }

    /// Principal acting in the org its roles were granted in.
    pub fn from_roles(user_id: UserId, org_id: OrgId, roles: Vec<Role>) -> Self {
        Self::new(user_id, org_id, OrgMembership::from_roles(org_id, roles))
    }

    pub fn in_active_org(&self) -> bool {
        self.active_org_id == self.membership.org_id
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("organization mismatch")]
    OrgMismatch,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),

    #[error("denied by policy: {action} on {resource_type}")]
    PolicyDenied {
        action: String,
        resource_type: String,
    },
}

/// Authorize an administrative operation (RBAC) within the active organization.
///
/// - No IO
/// - No panics
/// - No business logic (pure permission check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if !principal.in_active_org() {
        return Err(AuthzError::OrgMismatch);
    }

    if principal
        .membership
        .permissions
        .iter()
        .any(|granted| granted.grants(required))
    {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Default role → permission mapping.
///
/// Owners and admins manage everything; managers read policies and act in the
/// `hr` namespace; plain members hold no administrative permissions.
pub fn default_role_permissions(role: &Role) -> Vec<Permission> {
    match role.as_str() {
        "owner" | "admin" => vec![Permission::new("*")],
        "manager" => vec![org::POLICIES_READ, Permission::new("hr.*")],
        _ => Vec::new(),
    }
}

/// Role definition with its granted permissions (for audit/display).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinition {
    pub name: String,
    pub permissions: Vec<String>,
    pub description: Option<String>,
    pub bypasses_abac: bool,
}

/// Well-known roles and what they grant.
pub fn role_catalog() -> Vec<RoleDefinition> {
    [Role::OWNER, Role::ADMIN, Role::MANAGER, Role::MEMBER]
        .into_iter()
        .map(|role| RoleDefinition {
            name: role.as_str().to_string(),
            permissions: default_role_permissions(&role)
                .into_iter()
                .map(|p| p.as_str().to_string())
                .collect(),
            description: role_description(&role),
            bypasses_abac: role.is_owner(),
        })
        .collect()
}

fn role_description(role: &Role) -> Option<String> {
    match role.as_str() {
        "owner" => Some("Organization owner; bypasses attribute-based policies".to_string()),
        "admin" => Some("Organization administrator with all administrative permissions".to_string()),
        "manager" => Some("People manager; reads policies and acts on HR records".to_string()),
        "member" => Some("Regular member; access governed by policies only".to_string()),
        _ => None,
    }
}
