//! Attribute resolution contract.
//!
//! Resolvers turn a subject reference and a resource reference into the two
//! attribute sets the evaluator reads. Resolution never fails: unknown
//! subjects or resources simply yield fewer attributes, and every predicate
//! over a missing attribute evaluates `false`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use orgadmin_core::{OrgId, UserId};

use super::attribute::AttributeSet;

/// The acting identity of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRef {
    pub org_id: OrgId,
    pub user_id: UserId,
}

/// The target of an access check. `resource_id` is absent for type-level
/// checks (e.g. "create a leave request").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    pub resource_type: String,
    #[serde(default)]
    pub resource_id: Option<String>,
}

impl ResourceRef {
    pub fn of_type(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: None,
        }
    }

    pub fn instance(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: Some(resource_id.into()),
        }
    }
}

/// Subject and resource attributes for one access check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAttributes {
    pub subject: AttributeSet,
    pub resource: AttributeSet,
}

/// Supplies attributes at evaluation time.
pub trait AttributeResolver: Send + Sync {
    fn resolve(&self, subject: &SubjectRef, resource: &ResourceRef) -> ResolvedAttributes;
}

impl<R> AttributeResolver for Arc<R>
where
    R: AttributeResolver + ?Sized,
{
    fn resolve(&self, subject: &SubjectRef, resource: &ResourceRef) -> ResolvedAttributes {
        (**self).resolve(subject, resource)
    }
}

/// Resolver that returns the same attributes for every request (tests,
/// simulation with caller-supplied attributes).
#[derive(Debug, Clone, Default)]
pub struct StaticAttributes(pub ResolvedAttributes);

impl AttributeResolver for StaticAttributes {
    fn resolve(&self, _subject: &SubjectRef, _resource: &ResourceRef) -> ResolvedAttributes {
        self.0.clone()
    }
}
