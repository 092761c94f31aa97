//! Per-organization ABAC policy persistence.
//!
//! Stores validate on every write (whole set for `replace_all`, single policy
//! for `upsert`) so the evaluator only ever receives well-formed policies.
//! Reads return a snapshot ordered by priority descending, then id ascending.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryPolicyStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresPolicyStore;

use std::sync::Arc;

use thiserror::Error;

use orgadmin_auth::abac::{AbacPolicy, PolicyValidationError};
use orgadmin_core::OrgId;

#[derive(Debug, Error)]
pub enum PolicyStoreError {
    #[error(transparent)]
    Validation(#[from] PolicyValidationError),

    #[error("policy '{0}' not found")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Policy store abstraction.
#[async_trait::async_trait]
pub trait PolicyStore: Send + Sync {
    /// Current policy set of an organization, in listing order.
    async fn list(&self, org_id: OrgId) -> Result<Vec<AbacPolicy>, PolicyStoreError>;

    async fn get(&self, org_id: OrgId, policy_id: &str) -> Result<Option<AbacPolicy>, PolicyStoreError>;

    /// Replace the whole set atomically. Returns the stored (normalized) set.
    async fn replace_all(
        &self,
        org_id: OrgId,
        policies: Vec<AbacPolicy>,
    ) -> Result<Vec<AbacPolicy>, PolicyStoreError>;

    /// Insert or replace one policy by id. Returns the stored (normalized) policy.
    async fn upsert(&self, org_id: OrgId, policy: AbacPolicy) -> Result<AbacPolicy, PolicyStoreError>;

    /// Remove one policy; `NotFound` if it does not exist.
    async fn delete(&self, org_id: OrgId, policy_id: &str) -> Result<(), PolicyStoreError>;
}

#[async_trait::async_trait]
impl<S> PolicyStore for Arc<S>
where
    S: PolicyStore + ?Sized,
{
    async fn list(&self, org_id: OrgId) -> Result<Vec<AbacPolicy>, PolicyStoreError> {
        (**self).list(org_id).await
    }

    async fn get(&self, org_id: OrgId, policy_id: &str) -> Result<Option<AbacPolicy>, PolicyStoreError> {
        (**self).get(org_id, policy_id).await
    }

    async fn replace_all(
        &self,
        org_id: OrgId,
        policies: Vec<AbacPolicy>,
    ) -> Result<Vec<AbacPolicy>, PolicyStoreError> {
        (**self).replace_all(org_id, policies).await
    }

    async fn upsert(&self, org_id: OrgId, policy: AbacPolicy) -> Result<AbacPolicy, PolicyStoreError> {
        (**self).upsert(org_id, policy).await
    }

    async fn delete(&self, org_id: OrgId, policy_id: &str) -> Result<(), PolicyStoreError> {
        (**self).delete(org_id, policy_id).await
    }
}

/// Listing order: priority descending, then id ascending.
pub fn sort_for_listing(policies: &mut [AbacPolicy]) {
    policies.sort_by(|a, b| {
        b.effective_priority()
            .cmp(&a.effective_priority())
            .then_with(|| a.id.cmp(&b.id))
    });
}
