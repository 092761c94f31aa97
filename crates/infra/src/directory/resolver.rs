use orgadmin_auth::abac::{
    AbacAttribute, AttributeResolver, AttributeSet, ResolvedAttributes, ResourceRef, SubjectRef,
};

use super::{Directory, ResourceKey};

/// Attribute provider backed by the [`Directory`].
///
/// Subject attributes: `userId`, `orgId`, and when a profile exists `role`
/// (primary role), `roles`, `departmentId`, `title`, plus free-form profile
/// attributes. Resource attributes: `type`, and for instance checks `id`,
/// `orgId`, plus the stored record attributes. Built-in keys win over stored
/// ones of the same name.
#[derive(Clone)]
pub struct DirectoryAttributeResolver {
    directory: Directory,
}

impl DirectoryAttributeResolver {
    pub fn new(directory: Directory) -> Self {
        Self { directory }
    }

    fn subject_attributes(&self, subject: &SubjectRef) -> AttributeSet {
        let mut attrs = AttributeSet::new()
            .with("userId", subject.user_id.to_string())
            .with("orgId", subject.org_id.to_string());

        let Some(profile) = self.directory.member(subject.org_id, subject.user_id) else {
            tracing::debug!(user_id = %subject.user_id, "no member profile; identity attributes only");
            return attrs;
        };

        if let Some(primary) = profile.roles.first() {
            attrs.insert("role", primary.as_str());
        }
        attrs.insert(
            "roles",
            AbacAttribute::List(
                profile
                    .roles
                    .iter()
                    .map(|r| AbacAttribute::from(r.as_str()))
                    .collect(),
            ),
        );
        if let Some(department) = &profile.department_id {
            attrs.insert("departmentId", department.as_str());
        }
        if let Some(title) = &profile.title {
            attrs.insert("title", title.as_str());
        }
        attrs.merge_missing(&profile.attributes);
        attrs
    }

    fn resource_attributes(&self, subject: &SubjectRef, resource: &ResourceRef) -> AttributeSet {
        let mut attrs = AttributeSet::new().with("type", resource.resource_type.as_str());

        let Some(resource_id) = &resource.resource_id else {
            return attrs;
        };
        attrs.insert("id", resource_id.as_str());
        attrs.insert("orgId", subject.org_id.to_string());

        let key = ResourceKey::new(resource.resource_type.clone(), resource_id.clone());
        if let Some(record) = self.directory.resource(subject.org_id, &key) {
            attrs.merge_missing(&record.attributes);
        }
        attrs
    }
}

impl AttributeResolver for DirectoryAttributeResolver {
    fn resolve(&self, subject: &SubjectRef, resource: &ResourceRef) -> ResolvedAttributes {
        ResolvedAttributes {
            subject: self.subject_attributes(subject),
            resource: self.resource_attributes(subject, resource),
        }
    }
}
