//! Read and write access to the entities the ACL processor works on.
//!
//! The traits are the seam to the persistence layer. [`MemoryStore`]
//! implements all of them, plus [`DocumentSource`] so that an index store can
//! re-read content and category access at commit time.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use strata_core::{CategoryKey, ContentKey, EntityKind, Error, GroupKey, Result};
use strata_index::{DocumentSource, IndexDocument};

use crate::access::CategoryAccessType;
use crate::category::{Category, Group};

/// Group lookup.
pub trait GroupStore: Send + Sync {
    /// Fails with [`Error::NotFound`] for unknown keys.
    fn find_group_by_key(&self, key: &GroupKey) -> Result<Group>;
}

/// Content classification lookup.
pub trait ContentStore: Send + Sync {
    /// Keys of every content item directly under `category`.
    fn find_content_keys_by_category(&self, category: CategoryKey) -> Result<BTreeSet<ContentKey>>;
}

/// Category persistence.
pub trait CategoryStore: Send + Sync {
    /// Fails with [`Error::NotFound`] for unknown keys.
    fn find_category_by_key(&self, key: CategoryKey) -> Result<Category>;

    /// Persist a category, replacing the stored version.
    fn save_category(&self, category: &Category) -> Result<()>;
}

#[derive(Debug, Clone)]
struct ContentRecord {
    title: String,
    category: CategoryKey,
}

#[derive(Debug, Default)]
struct Tables {
    groups: BTreeMap<GroupKey, Group>,
    categories: BTreeMap<CategoryKey, Category>,
    contents: BTreeMap<ContentKey, ContentRecord>,
}

/// In-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| Error::index("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| Error::index("memory store lock poisoned"))
    }

    /// Insert or replace a group.
    pub fn insert_group(&self, group: Group) -> Result<()> {
        self.write()?.groups.insert(group.key.clone(), group);
        Ok(())
    }

    /// Insert or replace a category.
    pub fn insert_category(&self, category: Category) -> Result<()> {
        self.write()?.categories.insert(category.key(), category);
        Ok(())
    }

    /// Insert or replace a content item under `category`.
    pub fn insert_content(
        &self,
        key: ContentKey,
        title: impl Into<String>,
        category: CategoryKey,
    ) -> Result<()> {
        self.write()?.contents.insert(
            key,
            ContentRecord {
                title: title.into(),
                category,
            },
        );
        Ok(())
    }

    /// Remove a content item.
    pub fn remove_content(&self, key: ContentKey) -> Result<()> {
        self.write()?.contents.remove(&key);
        Ok(())
    }

    fn access_document(category: &Category, title: String) -> IndexDocument {
        IndexDocument {
            title,
            category: category.key(),
            read_groups: category.groups_with(CategoryAccessType::Read),
            browse_groups: category.groups_with(CategoryAccessType::AdminBrowse),
        }
    }
}

impl GroupStore for MemoryStore {
    fn find_group_by_key(&self, key: &GroupKey) -> Result<Group> {
        self.read()?
            .groups
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(EntityKind::Group, key))
    }
}

impl ContentStore for MemoryStore {
    fn find_content_keys_by_category(&self, category: CategoryKey) -> Result<BTreeSet<ContentKey>> {
        Ok(self
            .read()?
            .contents
            .iter()
            .filter(|(_, record)| record.category == category)
            .map(|(key, _)| *key)
            .collect())
    }
}

impl CategoryStore for MemoryStore {
    fn find_category_by_key(&self, key: CategoryKey) -> Result<Category> {
        self.read()?
            .categories
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::not_found(EntityKind::Category, key))
    }

    fn save_category(&self, category: &Category) -> Result<()> {
        self.write()?
            .categories
            .insert(category.key(), category.clone());
        Ok(())
    }
}

impl DocumentSource for MemoryStore {
    fn content_document(&self, key: ContentKey) -> Result<Option<IndexDocument>> {
        let tables = self.read()?;
        let Some(record) = tables.contents.get(&key) else {
            return Ok(None);
        };
        let category = tables
            .categories
            .get(&record.category)
            .ok_or_else(|| Error::not_found(EntityKind::Category, record.category))?;
        Ok(Some(Self::access_document(category, record.title.clone())))
    }

    fn category_document(&self, key: CategoryKey) -> Result<Option<IndexDocument>> {
        let tables = self.read()?;
        Ok(tables
            .categories
            .get(&key)
            .map(|category| Self::access_document(category, category.name().to_string())))
    }
}
