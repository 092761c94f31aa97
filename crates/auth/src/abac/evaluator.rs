//! Decision combinator: deny overrides, default deny.
//!
//! 1. Keep the policies whose actions and resources match the request and
//!    whose condition holds (the *active* policies).
//! 2. No active policy: deny.
//! 3. Order active policies by priority descending, then id ascending, then
//!    declaration order.
//! 4. Any deny in the top priority tier: deny.
//! 5. Otherwise any allow: allow. Otherwise deny.
//!
//! Evaluation is pure; the same inputs always produce the same decision.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::attribute::AttributeSet;
use super::condition::EvalContext;
use super::policy::{AbacPolicy, AccessRequest, Effect};

/// Final outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl core::fmt::Display for Decision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        })
    }
}

/// Why the combinator reached its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// No policy was active for the request.
    NoApplicablePolicy,
    /// A deny policy sat in the top priority tier.
    DeniedByPolicy,
    /// The top tier held only allow policies.
    AllowedByPolicy,
}

/// Full account of one evaluation, for simulation and audit logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTrace {
    pub decision: Decision,
    pub reason: DecisionReason,
    /// Policy that decided the outcome (absent for default deny).
    pub deciding_policy: Option<String>,
    /// Priority of the top tier of active policies.
    pub top_priority: Option<i32>,
    /// Policies whose actions/resources matched, in declaration order.
    pub matched_policies: Vec<String>,
    /// Matched policies whose condition held, in evaluation order.
    pub active_policies: Vec<String>,
}

/// Evaluate `policies` for `request`.
#[instrument(
    level = "debug",
    skip_all,
    fields(
        action = %request.action,
        resource_type = %request.resource_type,
        policies = policies.len(),
    )
)]
pub fn evaluate(
    policies: &[AbacPolicy],
    request: &AccessRequest,
    subject: &AttributeSet,
    resource: &AttributeSet,
) -> Decision {
    let trace = explain(policies, request, subject, resource);
    tracing::debug!(
        decision = %trace.decision,
        reason = ?trace.reason,
        deciding_policy = trace.deciding_policy.as_deref().unwrap_or("-"),
        "abac decision"
    );
    trace.decision
}

/// Evaluate and report how the decision was reached.
pub fn explain(
    policies: &[AbacPolicy],
    request: &AccessRequest,
    subject: &AttributeSet,
    resource: &AttributeSet,
) -> DecisionTrace {
    let ctx = EvalContext::new(subject, resource);

    let mut matched_policies = Vec::new();
    let mut active: Vec<(usize, &AbacPolicy)> = Vec::new();
    for (index, policy) in policies.iter().enumerate() {
        if !policy.matches_request(request) {
            continue;
        }
        matched_policies.push(policy.id.clone());
        if policy.condition_holds(&ctx) {
            active.push((index, policy));
        }
    }

    active.sort_by(|(ia, a), (ib, b)| {
        b.effective_priority()
            .cmp(&a.effective_priority())
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| ia.cmp(ib))
    });
    let active_policies: Vec<String> = active.iter().map(|(_, p)| p.id.clone()).collect();

    let Some(top_priority) = active.first().map(|(_, p)| p.effective_priority()) else {
        return DecisionTrace {
            decision: Decision::Deny,
            reason: DecisionReason::NoApplicablePolicy,
            deciding_policy: None,
            top_priority: None,
            matched_policies,
            active_policies,
        };
    };

    let top_tier_deny = active
        .iter()
        .take_while(|(_, p)| p.effective_priority() == top_priority)
        .find(|(_, p)| p.effect == Effect::Deny);

    let (decision, reason, deciding) = if let Some((_, p)) = top_tier_deny {
        (Decision::Deny, DecisionReason::DeniedByPolicy, Some(p.id.clone()))
    } else if let Some((_, p)) = active.iter().find(|(_, p)| p.effect == Effect::Allow) {
        (Decision::Allow, DecisionReason::AllowedByPolicy, Some(p.id.clone()))
    } else {
        (Decision::Deny, DecisionReason::NoApplicablePolicy, None)
    };

    DecisionTrace {
        decision,
        reason,
        deciding_policy: deciding,
        top_priority: Some(top_priority),
        matched_policies,
        active_policies,
    }
}
