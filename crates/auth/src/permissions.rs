use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::abac::pattern_matches;

/// Administrative permission identifier (RBAC).
///
/// Permissions are dot-delimited names (e.g. "org.policies.manage"). A granted
/// permission may be a pattern: `"*"` grants everything and `"hr.*"` grants the
/// whole `hr` namespace, using the same segment matching as ABAC policies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Does holding `self` satisfy a requirement for `required`?
    pub fn grants(&self, required: &Permission) -> bool {
        pattern_matches(self.as_str(), required.as_str())
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Organization administration permissions.
pub mod org {
    use super::Permission;

    pub const POLICIES_READ: Permission = Permission::from_static("org.policies.read");
    pub const POLICIES_MANAGE: Permission = Permission::from_static("org.policies.manage");
    pub const DIRECTORY_MANAGE: Permission = Permission::from_static("org.directory.manage");
}
