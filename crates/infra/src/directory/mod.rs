//! Employee/resource directory and the attribute provider built on it.

pub mod profile;
pub mod resolver;

pub use profile::{MemberProfile, ResourceKey, ResourceRecord};
pub use resolver::DirectoryAttributeResolver;

use std::sync::Arc;

use orgadmin_core::{OrgId, UserId};

use crate::read_model::{InMemoryOrgStore, OrgStore};

/// Organization-scoped directory of member profiles and guarded resources.
#[derive(Clone)]
pub struct Directory {
    members: Arc<dyn OrgStore<UserId, MemberProfile>>,
    resources: Arc<dyn OrgStore<ResourceKey, ResourceRecord>>,
}

impl Directory {
    pub fn new(
        members: Arc<dyn OrgStore<UserId, MemberProfile>>,
        resources: Arc<dyn OrgStore<ResourceKey, ResourceRecord>>,
    ) -> Self {
        Self { members, resources }
    }

    /// Directory over in-memory stores (dev/test).
    pub fn in_memory() -> Self {
        let members: InMemoryOrgStore<UserId, MemberProfile> = InMemoryOrgStore::new();
        let resources: InMemoryOrgStore<ResourceKey, ResourceRecord> = InMemoryOrgStore::new();
        Self::new(Arc::new(members), Arc::new(resources))
    }

    pub fn put_member(&self, org_id: OrgId, profile: MemberProfile) {
        self.members.upsert(org_id, profile.user_id, profile);
    }

    pub fn member(&self, org_id: OrgId, user_id: UserId) -> Option<MemberProfile> {
        self.members.get(org_id, &user_id)
    }

    pub fn put_resource(&self, org_id: OrgId, record: ResourceRecord) {
        self.resources.upsert(org_id, record.key(), record);
    }

    pub fn resource(&self, org_id: OrgId, key: &ResourceKey) -> Option<ResourceRecord> {
        self.resources.get(org_id, key)
    }

    pub fn remove_member(&self, org_id: OrgId, user_id: UserId) -> Option<MemberProfile> {
        self.members.remove(org_id, &user_id)
    }
}
