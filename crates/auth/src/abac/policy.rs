//! ABAC policy data model.

use serde::{Deserialize, Serialize};

use super::condition::{ConditionBlock, EvalContext, PolicyCondition, Predicate};
use super::pattern::any_matches;

/// Priority of a policy that does not declare one.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Outcome a policy contributes when it is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
    Deny,
}

/// The `(action, resourceType)` pair being authorized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    pub action: String,
    pub resource_type: String,
}

impl AccessRequest {
    pub fn new(action: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            resource_type: resource_type.into(),
        }
    }
}

/// A named allow/deny rule scoped to one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AbacPolicy {
    pub id: String,
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<PolicyCondition>,
}

impl AbacPolicy {
    pub fn new<A, R>(id: impl Into<String>, effect: Effect, actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            id: id.into(),
            effect,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
            priority: None,
            description: None,
            condition: None,
        }
    }

    pub fn allow<A, R>(id: impl Into<String>, actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self::new(id, Effect::Allow, actions, resources)
    }

    pub fn deny<A, R>(id: impl Into<String>, actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self::new(id, Effect::Deny, actions, resources)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a predicate to the subject condition block.
    pub fn when_subject(mut self, key: impl Into<String>, predicate: Predicate) -> Self {
        let condition = self.condition.get_or_insert_with(PolicyCondition::default);
        let block = condition.subject.take().unwrap_or_default();
        condition.subject = Some(block.with(key, predicate));
        self
    }

    /// Add a predicate to the resource condition block.
    pub fn when_resource(mut self, key: impl Into<String>, predicate: Predicate) -> Self {
        let condition = self.condition.get_or_insert_with(PolicyCondition::default);
        let block: ConditionBlock = condition.resource.take().unwrap_or_default();
        condition.resource = Some(block.with(key, predicate));
        self
    }

    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }

    /// Both the action list and the resource list match the request.
    ///
    /// An empty list never matches.
    pub fn matches_request(&self, request: &AccessRequest) -> bool {
        any_matches(&self.actions, &request.action)
            && any_matches(&self.resources, &request.resource_type)
    }

    /// The condition (if any) holds for the given attributes.
    pub fn condition_holds(&self, ctx: &EvalContext<'_>) -> bool {
        self.condition.as_ref().is_none_or(|c| c.holds(ctx))
    }
}
