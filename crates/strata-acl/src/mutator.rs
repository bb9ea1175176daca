//! Applies access-control deltas to categories and registers the index
//! updates they cause.

use std::collections::BTreeMap;

use strata_core::{CategoryKey, Result};
use strata_index::IndexTransactionLog;

use crate::category::{Category, CategoryAccessControl};
use crate::command::AccessControlDelta;
use crate::store::{ContentStore, GroupStore};

/// Categories of one command, iterated in key order.
pub type CategoryBatch = BTreeMap<CategoryKey, Category>;

/// Applies deltas category by category.
///
/// Authorization is the caller's job and must happen for the whole batch
/// first. A failing group lookup aborts the batch and may leave the category
/// being processed partially changed; the enclosing unit of work discards it.
pub struct AclMutator<'a> {
    groups: &'a dyn GroupStore,
    contents: &'a dyn ContentStore,
}

impl<'a> AclMutator<'a> {
    /// Create a mutator resolving groups and content through the given stores.
    pub fn new(groups: &'a dyn GroupStore, contents: &'a dyn ContentStore) -> Self {
        Self { groups, contents }
    }

    /// Apply `delta` to every category in key order.
    ///
    /// `immediate` is passed on to the content re-index registrations.
    pub fn apply(
        &self,
        delta: &AccessControlDelta,
        categories: &mut CategoryBatch,
        index_log: &mut IndexTransactionLog,
        immediate: bool,
    ) -> Result<()> {
        for category in categories.values_mut() {
            self.apply_to_category(delta, category, index_log, immediate)?;
        }
        Ok(())
    }

    /// Apply `delta` to one category and register its index updates.
    pub fn apply_to_category(
        &self,
        delta: &AccessControlDelta,
        category: &mut Category,
        index_log: &mut IndexTransactionLog,
        immediate: bool,
    ) -> Result<()> {
        let removed = category.remove_access_rights(&delta.to_remove);
        let added = self.upsert_all(&delta.to_add, category)?;
        let modified = self.upsert_all(&delta.to_modify, category)?;
        log::debug!(
            "category {}: removed {removed}, created {} via add and {} via modify",
            category.key(),
            added,
            modified
        );

        index_log.update_category(category.key())?;
        let content_keys = self.contents.find_content_keys_by_category(category.key())?;
        log::debug!(
            "category {}: re-indexing {} content items (immediate={immediate})",
            category.key(),
            content_keys.len()
        );
        index_log.register_update(content_keys, immediate)
    }

    // Returns how many entries were created rather than overwritten.
    fn upsert_all(
        &self,
        specs: &[CategoryAccessControl],
        category: &mut Category,
    ) -> Result<usize> {
        let mut created = 0;
        for spec in specs {
            let group = self.groups.find_group_by_key(&spec.group)?;
            if category.upsert_access(group, spec.rights) {
                created += 1;
            }
        }
        Ok(created)
    }
}
