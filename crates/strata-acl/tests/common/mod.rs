//! Common fixtures for strata-acl integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use strata_acl::{
    AdministrateAccessChecker, Category, CategoryAccessControl, CategoryAclProcessor, Group,
    MemoryStore,
};
use strata_core::{CategoryKey, ContentKey};
use strata_index::{IndexCommitter, IndexTransactionService};

/// Group administrating categories 1 and 3.
pub const EDITORS: &str = "editors";
/// Group with read access everywhere.
pub const READERS: &str = "readers";

/// Store with three categories, two content items each.
///
/// Category 2 is not administrated by [`EDITORS`].
pub fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let editors = Group::new(EDITORS, "Editors");
    let readers = Group::new(READERS, "Readers");
    store.insert_group(editors.clone()).unwrap();
    store.insert_group(readers.clone()).unwrap();
    store.insert_group(Group::new("G1", "Group one")).unwrap();

    for key in 1..=3u32 {
        let mut category = Category::new(CategoryKey::new(key), format!("Category {key}"));
        category.upsert_access(readers.clone(), "read".parse().unwrap());
        if key != 2 {
            category.upsert_access(editors.clone(), "administrate, read".parse().unwrap());
        }
        store.insert_category(category).unwrap();
        for item in 0..2 {
            store
                .insert_content(ContentKey::new(key * 100 + item), "Item", CategoryKey::new(key))
                .unwrap();
        }
    }
    store
}

/// Processor over `store` committing through `committer`.
pub fn processor(
    store: Arc<MemoryStore>,
    committer: Arc<dyn IndexCommitter>,
) -> CategoryAclProcessor {
    CategoryAclProcessor::with_store(
        Arc::new(AdministrateAccessChecker),
        store,
        IndexTransactionService::new(committer),
    )
}

/// Permission specification shorthand.
pub fn spec(group: &str, rights: &str) -> CategoryAccessControl {
    CategoryAccessControl::new(group, rights.parse().unwrap())
}

/// Snapshot of every category in the store.
pub fn snapshot(store: &MemoryStore) -> Vec<Category> {
    use strata_acl::CategoryStore;
    (1..=3u32)
        .map(|key| store.find_category_by_key(CategoryKey::new(key)).unwrap())
        .collect()
}
