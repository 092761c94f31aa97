use orgadmin_auth::Role;
use orgadmin_core::{OrgId, UserId};

/// Organization context for a request.
///
/// Derived from the verified token; immutable and present on all protected routes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OrgContext {
    org_id: OrgId,
}

impl OrgContext {
    pub fn new(org_id: OrgId) -> Self {
        Self { org_id }
    }

    pub fn org_id(&self) -> OrgId {
        self.org_id
    }
}

/// Principal context for a request (authenticated user + roles in the org).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}
