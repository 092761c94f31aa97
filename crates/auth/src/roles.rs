use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role held by a member within an organization.
///
/// Roles are opaque strings; the well-known ones below drive the owner bypass
/// and the default role-to-permission mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const OWNER: Role = Role(Cow::Borrowed("owner"));
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const MANAGER: Role = Role(Cow::Borrowed("manager"));
    pub const MEMBER: Role = Role(Cow::Borrowed("member"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Organization owners bypass ABAC entirely.
    pub fn is_owner(&self) -> bool {
        self.as_str() == Self::OWNER.as_str()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
