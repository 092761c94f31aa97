//! Write-time policy validation and normalization.
//!
//! Everything a store accepts goes through [`validate_policy_set`] (or
//! [`validate_policy`] for single upserts). The evaluator never sees a policy
//! that failed here.

use std::collections::HashSet;

use thiserror::Error;

use super::attribute::AbacAttribute;
use super::condition::{Operand, Operator};
use super::pattern::{PatternError, check_pattern};
use super::policy::AbacPolicy;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyValidationError {
    #[error("policy id must not be empty")]
    EmptyId,

    #[error("duplicate policy id '{0}'")]
    DuplicateId(String),

    #[error("policy '{0}' has no actions")]
    EmptyActions(String),

    #[error("policy '{0}' has no resources")]
    EmptyResources(String),

    #[error("policy '{policy}': invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        policy: String,
        pattern: String,
        source: PatternError,
    },

    #[error("policy '{policy}': condition key must not be empty")]
    EmptyConditionKey { policy: String },

    #[error("policy '{policy}': condition key '{key}' has leading or trailing whitespace")]
    PaddedConditionKey { policy: String, key: String },

    #[error("policy '{policy}': condition '{key}' uses 'in' with a non-array value")]
    InRequiresArray { policy: String, key: String },

    #[error("policy '{policy}': condition '{key}' contains a nested array")]
    NestedArray { policy: String, key: String },

    #[error("policy '{policy}': condition '{key}' references an empty attribute path")]
    EmptyReference { policy: String, key: String },

    #[error("malformed policy document: {0}")]
    Malformed(String),

    #[error("unsupported policy document version {0}")]
    UnsupportedVersion(u32),
}

/// Trim entries, drop blanks, and dedupe keeping the first occurrence.
fn normalize_list(entries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .filter(|e| seen.insert(e.clone()))
        .collect()
}

/// Normalize a single policy without checking it.
pub fn normalize_policy(mut policy: AbacPolicy) -> AbacPolicy {
    policy.id = policy.id.trim().to_string();
    policy.actions = normalize_list(policy.actions);
    policy.resources = normalize_list(policy.resources);
    policy.description = policy
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    policy
}

/// Normalize and check one policy.
pub fn validate_policy(policy: AbacPolicy) -> Result<AbacPolicy, PolicyValidationError> {
    let policy = normalize_policy(policy);

    if policy.id.is_empty() {
        return Err(PolicyValidationError::EmptyId);
    }
    if policy.actions.is_empty() {
        return Err(PolicyValidationError::EmptyActions(policy.id));
    }
    if policy.resources.is_empty() {
        return Err(PolicyValidationError::EmptyResources(policy.id));
    }

    for pattern in policy.actions.iter().chain(policy.resources.iter()) {
        check_pattern(pattern).map_err(|source| PolicyValidationError::InvalidPattern {
            policy: policy.id.clone(),
            pattern: pattern.clone(),
            source,
        })?;
    }

    if let Some(condition) = &policy.condition {
        for (_side, key, predicate) in condition.predicates() {
            if key.trim().is_empty() {
                return Err(PolicyValidationError::EmptyConditionKey {
                    policy: policy.id.clone(),
                });
            }
            if key.trim() != key.as_str() {
                return Err(PolicyValidationError::PaddedConditionKey {
                    policy: policy.id.clone(),
                    key: key.to_string(),
                });
            }

            match &predicate.value {
                Operand::Reference { path, .. } if path.is_empty() => {
                    return Err(PolicyValidationError::EmptyReference {
                        policy: policy.id.clone(),
                        key: key.clone(),
                    });
                }
                Operand::Reference { .. } => {}
                Operand::Literal(value) => {
                    if value.has_nested_list() {
                        return Err(PolicyValidationError::NestedArray {
                            policy: policy.id.clone(),
                            key: key.clone(),
                        });
                    }
                    if predicate.op == Operator::In && !matches!(value, AbacAttribute::List(_)) {
                        return Err(PolicyValidationError::InRequiresArray {
                            policy: policy.id.clone(),
                            key: key.clone(),
                        });
                    }
                }
            }
        }
    }

    Ok(policy)
}

/// Validate a whole set (replace-all semantics): every policy must be valid
/// and ids must be unique. Declaration order is preserved.
pub fn validate_policy_set(
    policies: Vec<AbacPolicy>,
) -> Result<Vec<AbacPolicy>, PolicyValidationError> {
    let mut ids = HashSet::new();
    let mut out = Vec::with_capacity(policies.len());

    for policy in policies {
        let policy = validate_policy(policy)?;
        if !ids.insert(policy.id.clone()) {
            return Err(PolicyValidationError::DuplicateId(policy.id));
        }
        out.push(policy);
    }

    Ok(out)
}

/// Parse a JSON array of policies and validate it as a set.
pub fn parse_policy_set(json: &str) -> Result<Vec<AbacPolicy>, PolicyValidationError> {
    let policies: Vec<AbacPolicy> =
        serde_json::from_str(json).map_err(|e| PolicyValidationError::Malformed(e.to_string()))?;
    validate_policy_set(policies)
}
