use serde::{Deserialize, Serialize};

use orgadmin_auth::Role;
use orgadmin_auth::abac::AttributeSet;
use orgadmin_core::UserId;

/// HR profile of an organization member, as seen by the attribute provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub user_id: UserId,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Free-form attributes (employment type, level, location, ...).
    #[serde(default)]
    pub attributes: AttributeSet,
}

impl MemberProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            roles: Vec::new(),
            department_id: None,
            title: None,
            attributes: AttributeSet::new(),
        }
    }
}

/// `(resource type, resource id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    pub resource_type: String,
    pub resource_id: String,
}

impl ResourceKey {
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }
}

/// Attributes of one guarded record (owner, department, classification, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub resource_type: String,
    pub resource_id: String,
    #[serde(default)]
    pub attributes: AttributeSet,
}

impl ResourceRecord {
    pub fn new(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        attributes: AttributeSet,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            attributes,
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.resource_type.clone(), self.resource_id.clone())
    }
}
