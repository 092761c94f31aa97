use std::collections::HashMap;
use std::sync::RwLock;

use orgadmin_auth::abac::{AbacPolicy, validate_policy, validate_policy_set};
use orgadmin_core::OrgId;

use super::{PolicyStore, PolicyStoreError, sort_for_listing};

/// In-memory policy store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    inner: RwLock<HashMap<OrgId, Vec<AbacPolicy>>>,
}

impl InMemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> PolicyStoreError {
    PolicyStoreError::Storage("policy store lock poisoned".to_string())
}

#[async_trait::async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn list(&self, org_id: OrgId) -> Result<Vec<AbacPolicy>, PolicyStoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut policies = map.get(&org_id).cloned().unwrap_or_default();
        sort_for_listing(&mut policies);
        Ok(policies)
    }

    async fn get(&self, org_id: OrgId, policy_id: &str) -> Result<Option<AbacPolicy>, PolicyStoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .get(&org_id)
            .and_then(|set| set.iter().find(|p| p.id == policy_id))
            .cloned())
    }

    async fn replace_all(
        &self,
        org_id: OrgId,
        policies: Vec<AbacPolicy>,
    ) -> Result<Vec<AbacPolicy>, PolicyStoreError> {
        let validated = validate_policy_set(policies)?;

        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(org_id, validated.clone());
        tracing::info!(%org_id, count = validated.len(), "policy set replaced");

        let mut listed = validated;
        sort_for_listing(&mut listed);
        Ok(listed)
    }

    async fn upsert(&self, org_id: OrgId, policy: AbacPolicy) -> Result<AbacPolicy, PolicyStoreError> {
        let policy = validate_policy(policy)?;

        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let set = map.entry(org_id).or_default();
        match set.iter_mut().find(|p| p.id == policy.id) {
            Some(existing) => *existing = policy.clone(),
            None => set.push(policy.clone()),
        }
        tracing::info!(%org_id, policy_id = %policy.id, "policy upserted");
        Ok(policy)
    }

    async fn delete(&self, org_id: OrgId, policy_id: &str) -> Result<(), PolicyStoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let set = map
            .get_mut(&org_id)
            .ok_or_else(|| PolicyStoreError::NotFound(policy_id.to_string()))?;

        let before = set.len();
        set.retain(|p| p.id != policy_id);
        if set.len() == before {
            return Err(PolicyStoreError::NotFound(policy_id.to_string()));
        }
        tracing::info!(%org_id, policy_id, "policy deleted");
        Ok(())
    }
}
