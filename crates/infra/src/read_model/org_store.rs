use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use orgadmin_core::OrgId;

/// Organization-isolated key/value store abstraction.
pub trait OrgStore<K, V>: Send + Sync {
    fn get(&self, org_id: OrgId, key: &K) -> Option<V>;
    fn upsert(&self, org_id: OrgId, key: K, value: V);
    fn remove(&self, org_id: OrgId, key: &K) -> Option<V>;
}

impl<K, V, S> OrgStore<K, V> for Arc<S>
where
    S: OrgStore<K, V> + ?Sized,
{
    fn get(&self, org_id: OrgId, key: &K) -> Option<V> {
        (**self).get(org_id, key)
    }

    fn upsert(&self, org_id: OrgId, key: K, value: V) {
        (**self).upsert(org_id, key, value)
    }

    fn remove(&self, org_id: OrgId, key: &K) -> Option<V> {
        (**self).remove(org_id, key)
    }
}

/// In-memory organization-isolated store for tests/dev.
#[derive(Debug)]
pub struct InMemoryOrgStore<K, V> {
    inner: RwLock<HashMap<(OrgId, K), V>>,
}

impl<K, V> InMemoryOrgStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryOrgStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> OrgStore<K, V> for InMemoryOrgStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, org_id: OrgId, key: &K) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(&(org_id, key.clone())).cloned()
    }

    fn upsert(&self, org_id: OrgId, key: K, value: V) {
        if let Ok(mut map) = self.inner.write() {
            map.insert((org_id, key), value);
        }
    }

    fn remove(&self, org_id: OrgId, key: &K) -> Option<V> {
        let mut map = self.inner.write().ok()?;
        map.remove(&(org_id, key.clone()))
    }
}
