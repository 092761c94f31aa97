//! Access guard: the staged check in front of every HR/organization mutation.
//!
//! Stages, in order:
//! 1. organization isolation (principal must act in its membership org)
//! 2. owner bypass (organization owners skip ABAC)
//! 3. ABAC evaluation over the org's policy snapshot
//!
//! The guard takes already-resolved attributes, so it stays pure.

use serde::Serialize;
use tracing::instrument;

use crate::abac::{
    AbacPolicy, AccessRequest, Decision, DecisionReason, ResolvedAttributes, explain,
};
use crate::{AuthzError, Principal};

/// Which stage produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    OrgMismatch,
    OwnerBypass,
    PolicyAllow,
    PolicyDeny,
    NoApplicablePolicy,
}

impl From<DecisionReason> for AccessReason {
    fn from(value: DecisionReason) -> Self {
        match value {
            DecisionReason::NoApplicablePolicy => Self::NoApplicablePolicy,
            DecisionReason::DeniedByPolicy => Self::PolicyDeny,
            DecisionReason::AllowedByPolicy => Self::PolicyAllow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub decision: Decision,
    pub reason: AccessReason,
    pub deciding_policy: Option<String>,
}

impl AccessDecision {
    fn stage(decision: Decision, reason: AccessReason) -> Self {
        Self {
            decision,
            reason,
            deciding_policy: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.decision.is_allow()
    }

    /// Convert into the error type used at the command boundary.
    pub fn into_result(self, request: &AccessRequest) -> Result<(), AuthzError> {
        match (self.decision, self.reason) {
            (Decision::Allow, _) => Ok(()),
            (Decision::Deny, AccessReason::OrgMismatch) => Err(AuthzError::OrgMismatch),
            (Decision::Deny, _) => Err(AuthzError::PolicyDenied {
                action: request.action.clone(),
                resource_type: request.resource_type.clone(),
            }),
        }
    }
}

/// Decide whether `principal` may perform `request`.
#[instrument(
    level = "debug",
    skip_all,
    fields(
        user_id = %principal.user_id,
        org_id = %principal.active_org_id,
        action = %request.action,
        resource_type = %request.resource_type,
    )
)]
pub fn check_access(
    principal: &Principal,
    request: &AccessRequest,
    policies: &[AbacPolicy],
    attributes: &ResolvedAttributes,
) -> AccessDecision {
    if !principal.in_active_org() {
        tracing::debug!("access denied: organization mismatch");
        return AccessDecision::stage(Decision::Deny, AccessReason::OrgMismatch);
    }

    if principal.membership.is_owner() {
        tracing::debug!("access allowed: owner bypass");
        return AccessDecision::stage(Decision::Allow, AccessReason::OwnerBypass);
    }

    let trace = explain(policies, request, &attributes.subject, &attributes.resource);
    tracing::debug!(
        decision = %trace.decision,
        deciding_policy = trace.deciding_policy.as_deref().unwrap_or("-"),
        "access decided by policy"
    );

    AccessDecision {
        decision: trace.decision,
        reason: trace.reason.into(),
        deciding_policy: trace.deciding_policy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abac::{AttributeSet, Predicate};
    use crate::{OrgMembership, Role};
    use orgadmin_core::{OrgId, UserId};

    fn deny_all() -> Vec<AbacPolicy> {
        vec![AbacPolicy::deny("lockdown", ["*"], ["*"]).with_priority(1000)]
    }

    #[test]
    fn owner_bypasses_policies() {
        let principal = Principal::from_roles(UserId::new(), OrgId::new(), vec![Role::OWNER]);
        let request = AccessRequest::new("org.billing.update", "org.billing");

        let decision = check_access(&principal, &request, &deny_all(), &ResolvedAttributes::default());
        assert_eq!(decision.decision, Decision::Allow);
        assert_eq!(decision.reason, AccessReason::OwnerBypass);
    }

    #[test]
    fn admin_does_not_bypass_policies() {
        let principal = Principal::from_roles(UserId::new(), OrgId::new(), vec![Role::ADMIN]);
        let request = AccessRequest::new("org.billing.update", "org.billing");

        let decision = check_access(&principal, &request, &deny_all(), &ResolvedAttributes::default());
        assert_eq!(decision.reason, AccessReason::PolicyDeny);
        assert_eq!(decision.deciding_policy.as_deref(), Some("lockdown"));
        assert_eq!(
            decision.into_result(&request),
            Err(AuthzError::PolicyDenied {
                action: "org.billing.update".into(),
                resource_type: "org.billing".into(),
            })
        );
    }

    #[test]
    fn owner_in_another_org_is_not_bypassed() {
        let membership = OrgMembership::from_roles(OrgId::new(), vec![Role::OWNER]);
        let principal = Principal::new(UserId::new(), OrgId::new(), membership);
        let request = AccessRequest::new("hr.employee.read", "hr.employee");

        let decision = check_access(&principal, &request, &[], &ResolvedAttributes::default());
        assert_eq!(decision.reason, AccessReason::OrgMismatch);
        assert_eq!(decision.into_result(&request), Err(AuthzError::OrgMismatch));
    }

    #[test]
    fn member_gets_policy_decision_with_attributes() {
        let principal = Principal::from_roles(UserId::new(), OrgId::new(), vec![Role::MEMBER]);
        let policies = vec![
            AbacPolicy::allow("own-profile", ["hr.employee.*"], ["hr.employee"])
                .when_resource("ownerId", Predicate::equals("$subject.userId")),
        ];
        let request = AccessRequest::new("hr.employee.update", "hr.employee");
        let user = principal.user_id.to_string();

        let own = ResolvedAttributes {
            subject: AttributeSet::new().with("userId", user.clone()),
            resource: AttributeSet::new().with("ownerId", user),
        };
        let other = ResolvedAttributes {
            subject: own.subject.clone(),
            resource: AttributeSet::new().with("ownerId", UserId::new().to_string()),
        };

        assert!(check_access(&principal, &request, &policies, &own).is_allowed());
        let denied = check_access(&principal, &request, &policies, &other);
        assert_eq!(denied.reason, AccessReason::NoApplicablePolicy);
    }
}
