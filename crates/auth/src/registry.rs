//! Permission resource registry.
//!
//! Catalogue of the resource types the application guards and the verbs each
//! supports. Action names are `<resource type>.<verb>`, e.g.
//! `hr.leave.request.approve`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::abac::{AbacPolicy, pattern_matches};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub resource_type: String,
    pub verbs: Vec<String>,
    pub description: Option<String>,
}

impl ResourceDefinition {
    pub fn new<V>(resource_type: impl Into<String>, verbs: V, description: &str) -> Self
    where
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Self {
            resource_type: resource_type.into(),
            verbs: verbs.into_iter().map(Into::into).collect(),
            description: Some(description.to_string()),
        }
    }

    /// Fully-qualified action names.
    pub fn actions(&self) -> impl Iterator<Item = String> + '_ {
        self.verbs
            .iter()
            .map(move |v| format!("{}.{}", self.resource_type, v))
    }
}

/// A pattern in a policy that matches nothing registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryWarning {
    pub policy_id: String,
    pub field: &'static str,
    pub pattern: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<String, ResourceDefinition>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a resource type.
    pub fn register(&mut self, definition: ResourceDefinition) {
        self.resources
            .insert(definition.resource_type.clone(), definition);
    }

    pub fn get(&self, resource_type: &str) -> Option<&ResourceDefinition> {
        self.resources.get(resource_type)
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources.values()
    }

    /// Flag action/resource patterns that match no registered entry.
    ///
    /// These are warnings: a policy may legitimately target a resource that is
    /// registered later.
    pub fn lint_policy(&self, policy: &AbacPolicy) -> Vec<RegistryWarning> {
        let mut warnings = Vec::new();

        for pattern in &policy.actions {
            let known = self
                .resources()
                .flat_map(|r| r.actions())
                .any(|a| pattern_matches(pattern, &a));
            if !known {
                warnings.push(RegistryWarning {
                    policy_id: policy.id.clone(),
                    field: "actions",
                    pattern: pattern.clone(),
                });
            }
        }

        for pattern in &policy.resources {
            let known = self
                .resources
                .keys()
                .any(|r| pattern_matches(pattern, r));
            if !known {
                warnings.push(RegistryWarning {
                    policy_id: policy.id.clone(),
                    field: "resources",
                    pattern: pattern.clone(),
                });
            }
        }

        warnings
    }

    /// The resources of the HR/organization administration application.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for definition in [
            ResourceDefinition::new(
                "hr.employee",
                ["read", "create", "update", "delete"],
                "Employee profiles",
            ),
            ResourceDefinition::new(
                "hr.department",
                ["read", "create", "update", "delete"],
                "Departments and reporting lines",
            ),
            ResourceDefinition::new(
                "hr.leave.request",
                ["read", "create", "approve", "reject", "cancel"],
                "Leave requests",
            ),
            ResourceDefinition::new(
                "org.members",
                ["read", "invite", "update", "remove"],
                "Organization membership",
            ),
            ResourceDefinition::new("org.settings", ["read", "update"], "Organization settings"),
            ResourceDefinition::new(
                "org.billing",
                ["read", "update", "cancel"],
                "Billing subscription",
            ),
            ResourceDefinition::new("org.security", ["read", "update"], "Security settings"),
            ResourceDefinition::new(
                "org.policies",
                ["read", "manage"],
                "Access policies (RBAC/ABAC)",
            ),
        ] {
            registry.register(definition);
        }
        registry
    }
}
