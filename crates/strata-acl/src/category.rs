//! Categories, groups and category access entries.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strata_core::{CategoryKey, GroupKey};

use crate::access::{AccessRights, CategoryAccessType};

/// A user group that can be granted category access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group key.
    pub key: GroupKey,
    /// Display name.
    pub name: String,
}

impl Group {
    /// Create a group.
    pub fn new(key: impl Into<GroupKey>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// Access held by one group on one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAccess {
    category: CategoryKey,
    group: Group,
    rights: AccessRights,
}

impl CategoryAccess {
    /// Create an access entry.
    pub fn new(category: CategoryKey, group: Group, rights: AccessRights) -> Self {
        Self {
            category,
            group,
            rights,
        }
    }

    /// Category the entry belongs to.
    pub fn category(&self) -> CategoryKey {
        self.category
    }

    /// Group the entry grants access to.
    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Granted rights.
    pub fn rights(&self) -> AccessRights {
        self.rights
    }

    /// Overwrite the granted rights.
    pub fn set_rights(&mut self, rights: AccessRights) {
        self.rights = rights;
    }
}

/// A permission specification: which rights a group should hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAccessControl {
    /// Group the specification is for.
    pub group: GroupKey,
    /// Rights the group should hold.
    pub rights: AccessRights,
}

impl CategoryAccessControl {
    /// Create a specification.
    pub fn new(group: impl Into<GroupKey>, rights: AccessRights) -> Self {
        Self {
            group: group.into(),
            rights,
        }
    }
}

/// A content category and its access list.
///
/// The access list holds at most one entry per group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    key: CategoryKey,
    name: String,
    parent: Option<CategoryKey>,
    acl: BTreeMap<GroupKey, CategoryAccess>,
}

impl Category {
    /// Create a top-level category with an empty access list.
    pub fn new(key: CategoryKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            parent: None,
            acl: BTreeMap::new(),
        }
    }

    /// Place the category under `parent`.
    pub fn with_parent(mut self, parent: CategoryKey) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Category key.
    pub fn key(&self) -> CategoryKey {
        self.key
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent category, if any.
    pub fn parent(&self) -> Option<CategoryKey> {
        self.parent
    }

    /// Whether `group` has an entry.
    pub fn has_access_for_group(&self, group: &GroupKey) -> bool {
        self.acl.contains_key(group)
    }

    /// Entry for `group`.
    pub fn access(&self, group: &GroupKey) -> Option<&CategoryAccess> {
        self.acl.get(group)
    }

    /// Rights held by `group`, if it has an entry.
    pub fn rights_for(&self, group: &GroupKey) -> Option<AccessRights> {
        self.acl.get(group).map(CategoryAccess::rights)
    }

    /// All entries, ordered by group key.
    pub fn access_entries(&self) -> impl Iterator<Item = &CategoryAccess> {
        self.acl.values()
    }

    /// Number of entries.
    pub fn access_count(&self) -> usize {
        self.acl.len()
    }

    /// Groups whose rights include `access`.
    pub fn groups_with(&self, access: CategoryAccessType) -> BTreeSet<GroupKey> {
        self.acl
            .iter()
            .filter(|(_, entry)| entry.rights.contains(access))
            .map(|(group, _)| group.clone())
            .collect()
    }

    /// Remove the entries of the given groups, returning how many existed.
    ///
    /// Groups without an entry are ignored.
    pub fn remove_access_rights<'a, I>(&mut self, groups: I) -> usize
    where
        I: IntoIterator<Item = &'a GroupKey>,
    {
        let mut removed = 0;
        for group in groups {
            if self.acl.remove(group).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Grant `rights` to `group`, overwriting an existing entry.
    ///
    /// Returns `true` when a new entry was created.
    pub fn upsert_access(&mut self, group: Group, rights: AccessRights) -> bool {
        match self.acl.get_mut(&group.key) {
            Some(entry) => {
                entry.set_rights(rights);
                false
            }
            None => {
                let key = group.key.clone();
                self.acl
                    .insert(key, CategoryAccess::new(self.key, group, rights));
                true
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rights(spec: &str) -> AccessRights {
        spec.parse().unwrap()
    }

    fn category() -> Category {
        Category::new(CategoryKey::new(1), "News")
    }

    #[test]
    fn test_upsert_creates_entry() {
        let mut cat = category();
        let created = cat.upsert_access(Group::new("G1", "Readers"), rights("read"));

        assert!(created);
        assert!(cat.has_access_for_group(&GroupKey::new("G1")));
        assert_eq!(
            cat.access(&GroupKey::new("G1")).unwrap().category(),
            CategoryKey::new(1)
        );
    }

    #[test]
    fn test_upsert_overwrites_existing() {
        let mut cat = category();
        cat.upsert_access(Group::new("G1", "Readers"), rights("read"));
        let created = cat.upsert_access(Group::new("G1", "Readers"), rights("approve"));

        assert!(!created);
        assert_eq!(cat.access_count(), 1);
        assert_eq!(
            cat.rights_for(&GroupKey::new("G1")),
            Some(rights("approve"))
        );
    }

    #[test]
    fn test_remove_ignores_missing_groups() {
        let mut cat = category();
        cat.upsert_access(Group::new("G1", "Readers"), rights("read"));

        let removed = cat.remove_access_rights(&[GroupKey::new("G1"), GroupKey::new("G2")]);

        assert_eq!(removed, 1);
        assert_eq!(cat.access_count(), 0);
    }

    #[test]
    fn test_groups_with() {
        let mut cat = category();
        cat.upsert_access(Group::new("G1", "Readers"), rights("read"));
        cat.upsert_access(Group::new("G2", "Editors"), rights("read, admin_browse"));

        assert_eq!(cat.groups_with(CategoryAccessType::Read).len(), 2);
        assert_eq!(
            cat.groups_with(CategoryAccessType::AdminBrowse),
            BTreeSet::from([GroupKey::new("G2")])
        );
    }

    #[test]
    fn test_parent() {
        let cat = Category::new(CategoryKey::new(2), "Sports").with_parent(CategoryKey::new(1));
        assert_eq!(cat.parent(), Some(CategoryKey::new(1)));
        assert_eq!(cat.name(), "Sports");
    }
}
