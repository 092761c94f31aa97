use serde::{Deserialize, Serialize};

use orgadmin_core::OrgId;

use crate::{Permission, Role};

/// A principal's membership in an organization.
///
/// This is an authorization boundary object: it states *which organization*
/// the principal is acting within and which roles/permissions are granted there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgMembership {
    pub org_id: OrgId,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
}

impl OrgMembership {
    /// Membership whose permissions are expanded from `roles` with
    /// [`default_role_permissions`](crate::authorize::default_role_permissions).
    pub fn from_roles(org_id: OrgId, roles: Vec<Role>) -> Self {
        let mut permissions: Vec<Permission> = roles
            .iter()
            .flat_map(crate::authorize::default_role_permissions)
            .collect();
        permissions.sort();
        permissions.dedup();

        Self {
            org_id,
            roles,
            permissions,
        }
    }

    pub fn is_owner(&self) -> bool {
        self.roles.iter().any(Role::is_owner)
    }
}
