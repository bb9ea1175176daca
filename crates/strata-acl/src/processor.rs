//! Executes access-list commands end to end.
//!
//! Every command goes through the same steps:
//!
//! 1. Load the categories through the [`CategoryStore`].
//! 2. Authorize the updater for the whole batch.
//! 3. Mutate each category and register its index updates.
//! 4. Save the categories and commit the index transaction.
//!
//! Any error before step 4 leaves both the store and the index untouched. If
//! a save or the commit fails, the categories are written back as loaded.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use strata_core::{CategoryKey, Result};
use strata_index::{IndexTransactionLog, IndexTransactionService};

use crate::category::Category;
use crate::checker::{CategoryAccessChecker, check_all};
use crate::command::{
    AccessControlDelta, ModifyCategoryAclCommand, SynchronizeCategoryAclCommand, TransactionScope,
};
use crate::mutator::{AclMutator, CategoryBatch};
use crate::store::{CategoryStore, ContentStore, GroupStore};

/// What a command changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AclChangeSummary {
    /// Categories updated.
    pub categories: usize,
    /// Index intents handed to the committer.
    pub intents: usize,
    /// Index transactions committed.
    pub commits: usize,
}

/// Runs [`ModifyCategoryAclCommand`] and [`SynchronizeCategoryAclCommand`].
#[derive(Clone)]
pub struct CategoryAclProcessor {
    checker: Arc<dyn CategoryAccessChecker>,
    groups: Arc<dyn GroupStore>,
    contents: Arc<dyn ContentStore>,
    categories: Arc<dyn CategoryStore>,
    index: IndexTransactionService,
}

impl CategoryAclProcessor {
    /// Create a processor from separate stores.
    pub fn new(
        checker: Arc<dyn CategoryAccessChecker>,
        groups: Arc<dyn GroupStore>,
        contents: Arc<dyn ContentStore>,
        categories: Arc<dyn CategoryStore>,
        index: IndexTransactionService,
    ) -> Self {
        Self {
            checker,
            groups,
            contents,
            categories,
            index,
        }
    }

    /// Create a processor backed by one store implementing every store trait.
    pub fn with_store<S>(
        checker: Arc<dyn CategoryAccessChecker>,
        store: Arc<S>,
        index: IndexTransactionService,
    ) -> Self
    where
        S: GroupStore + ContentStore + CategoryStore + 'static,
    {
        Self::new(checker, store.clone(), store.clone(), store, index)
    }

    /// Apply the command's delta to every listed category.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`](strata_core::Error::NotFound) for an unknown
    ///   category or group
    /// - [`Error::AccessDenied`](strata_core::Error::AccessDenied) if the
    ///   updater may not change one of the categories
    /// - any store or committer error
    pub fn modify(&self, command: &ModifyCategoryAclCommand) -> Result<AclChangeSummary> {
        let batch = self.load(&command.categories)?;
        check_all(self.checker.as_ref(), &command.updater, batch.values())?;
        log::debug!(
            "{} modifying access on {} categories",
            command.updater.user,
            batch.len()
        );

        self.run(batch, command.scope, command.include_content, |_| {
            command.delta.clone()
        })
    }

    /// Replace the access list of every listed category.
    ///
    /// # Errors
    ///
    /// Same as [`modify`](Self::modify).
    pub fn synchronize(&self, command: &SynchronizeCategoryAclCommand) -> Result<AclChangeSummary> {
        let batch = self.load(&command.categories)?;
        check_all(self.checker.as_ref(), &command.updater, batch.values())?;
        log::debug!(
            "{} synchronizing access on {} categories",
            command.updater.user,
            batch.len()
        );

        self.run(batch, command.scope, command.include_content, |category| {
            AccessControlDelta::replacing(category, &command.acl)
        })
    }

    fn load(&self, keys: &BTreeSet<CategoryKey>) -> Result<CategoryBatch> {
        keys.iter()
            .map(|key| {
                self.categories
                    .find_category_by_key(*key)
                    .map(|category| (*key, category))
            })
            .collect()
    }

    fn run<F>(
        &self,
        mut batch: CategoryBatch,
        scope: TransactionScope,
        include_content: bool,
        delta_for: F,
    ) -> Result<AclChangeSummary>
    where
        F: Fn(&Category) -> AccessControlDelta,
    {
        let mut summary = AclChangeSummary {
            categories: batch.len(),
            ..Default::default()
        };
        if batch.is_empty() {
            log::debug!("empty category batch; nothing to do");
            return Ok(summary);
        }

        let mutator = AclMutator::new(self.groups.as_ref(), self.contents.as_ref());
        match scope {
            TransactionScope::Single => {
                let loaded = batch.clone();
                let mut index_log = self.index.begin();
                for category in batch.values_mut() {
                    let delta = delta_for(category);
                    mutator.apply_to_category(&delta, category, &mut index_log, include_content)?;
                }
                match self.save_and_commit(batch.values(), &mut index_log) {
                    Ok(intents) => summary.intents += intents,
                    Err(e) => {
                        self.restore(loaded.values());
                        return Err(e);
                    }
                }
                summary.commits += 1;
            }
            TransactionScope::PerCategory => {
                for category in batch.values_mut() {
                    let loaded = category.clone();
                    let mut index_log = self.index.begin();
                    let delta = delta_for(category);
                    mutator.apply_to_category(&delta, category, &mut index_log, include_content)?;
                    match self.save_and_commit([&*category], &mut index_log) {
                        Ok(intents) => summary.intents += intents,
                        Err(e) => {
                            self.restore([&loaded]);
                            return Err(e);
                        }
                    }
                    summary.commits += 1;
                }
            }
        }

        log::info!(
            "updated access on {} categories ({} index intents, {} commits)",
            summary.categories,
            summary.intents,
            summary.commits
        );
        Ok(summary)
    }

    fn save_and_commit<'a, I>(
        &self,
        changed: I,
        index_log: &mut IndexTransactionLog,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Category>,
    {
        for category in changed {
            self.categories.save_category(category)?;
        }
        index_log.commit()
    }

    fn restore<'a, I>(&self, loaded: I)
    where
        I: IntoIterator<Item = &'a Category>,
    {
        for category in loaded {
            match self.categories.save_category(category) {
                Ok(()) => log::warn!("restored access list of category {}", category.key()),
                Err(e) => log::error!(
                    "Failed to restore access list of category {}: {e}",
                    category.key()
                ),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::category::{CategoryAccessControl, Group};
    use crate::checker::{Actor, AdministrateAccessChecker};
    use crate::store::MemoryStore;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strata_core::{ContentKey, Error, GroupKey};
    use strata_index::{DirectCommitter, IndexBatch, IndexCommitter, IndexTarget, MemoryIndex};

    /// Accepts the first `accept` commits, then fails.
    struct FlakyCommitter {
        accept: usize,
        calls: AtomicUsize,
    }

    impl IndexCommitter for FlakyCommitter {
        fn commit(&self, _batch: IndexBatch) -> Result<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.accept {
                Ok(())
            } else {
                Err(Error::index("store offline"))
            }
        }
    }

    fn flaky_processor(store: Arc<MemoryStore>, accept: usize) -> CategoryAclProcessor {
        CategoryAclProcessor::with_store(
            Arc::new(AdministrateAccessChecker),
            store,
            IndexTransactionService::new(Arc::new(FlakyCommitter {
                accept,
                calls: AtomicUsize::new(0),
            })),
        )
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        index: Arc<Mutex<MemoryIndex>>,
        processor: CategoryAclProcessor,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        store.insert_group(Group::new("G1", "Readers")).unwrap();
        store.insert_group(Group::new("G2", "Editors")).unwrap();
        for key in 1..=3 {
            store
                .insert_category(Category::new(CategoryKey::new(key), format!("Category {key}")))
                .unwrap();
            store
                .insert_content(ContentKey::new(key * 10), "Item", CategoryKey::new(key))
                .unwrap();
        }

        let committer = Arc::new(DirectCommitter::new(MemoryIndex::new()));
        let index = committer.store();
        let processor = CategoryAclProcessor::with_store(
            Arc::new(AdministrateAccessChecker),
            store.clone(),
            IndexTransactionService::new(committer),
        );
        Fixture {
            store,
            index,
            processor,
        }
    }

    fn spec(group: &str, rights: &str) -> CategoryAccessControl {
        CategoryAccessControl::new(group, rights.parse().unwrap())
    }

    #[test]
    fn test_modify_saves_and_indexes() {
        let fx = fixture();
        let mut command = ModifyCategoryAclCommand::new(Actor::admin("admin"));
        command
            .add_category(CategoryKey::new(1))
            .add_category(CategoryKey::new(2))
            .add_to_be_added(spec("G1", "read"));

        let summary = fx.processor.modify(&command).unwrap();

        assert_eq!(
            summary,
            AclChangeSummary {
                categories: 2,
                intents: 4,
                commits: 1
            }
        );
        let saved = fx.store.find_category_by_key(CategoryKey::new(2)).unwrap();
        assert!(saved.has_access_for_group(&GroupKey::new("G1")));

        let index = fx.index.lock().unwrap();
        assert_eq!(index.batch_count(), 1);
        assert!(index.contains(&IndexTarget::Content(ContentKey::new(10))));
        assert!(!index.contains(&IndexTarget::Content(ContentKey::new(30))));
    }

    #[test]
    fn test_per_category_scope_commits_each() {
        let fx = fixture();
        let mut command = ModifyCategoryAclCommand::new(Actor::admin("admin"));
        command
            .add_category(CategoryKey::new(1))
            .add_category(CategoryKey::new(2))
            .add_category(CategoryKey::new(3))
            .add_to_be_modified(spec("G2", "read, approve"))
            .scope(TransactionScope::PerCategory);

        let summary = fx.processor.modify(&command).unwrap();

        assert_eq!(summary.commits, 3);
        assert_eq!(fx.index.lock().unwrap().batch_count(), 3);
    }

    #[test]
    fn test_denied_batch_changes_nothing() {
        let fx = fixture();
        let mut command = ModifyCategoryAclCommand::new(Actor::new("bob").member_of("G1"));
        command
            .add_category(CategoryKey::new(1))
            .add_to_be_added(spec("G1", "read"));

        let err = fx.processor.modify(&command).unwrap_err();

        assert!(matches!(err, Error::AccessDenied { .. }));
        assert_eq!(
            fx.store
                .find_category_by_key(CategoryKey::new(1))
                .unwrap()
                .access_count(),
            0
        );
        assert!(fx.index.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_category_is_not_found() {
        let fx = fixture();
        let mut command = ModifyCategoryAclCommand::new(Actor::admin("admin"));
        command.add_category(CategoryKey::new(42));

        let err = fx.processor.modify(&command).unwrap_err();
        assert_eq!(err.to_string(), "category not found: 42");
    }

    #[test]
    fn test_synchronize_replaces_acl() {
        let fx = fixture();
        let mut seed = ModifyCategoryAclCommand::new(Actor::admin("admin"));
        seed.add_category(CategoryKey::new(1))
            .add_to_be_added(spec("G1", "read"))
            .add_to_be_added(spec("G2", "administrate"));
        fx.processor.modify(&seed).unwrap();

        let mut command = SynchronizeCategoryAclCommand::new(Actor::admin("admin"));
        command
            .add_category(CategoryKey::new(1))
            .add_access(spec("G2", "read"));
        fx.processor.synchronize(&command).unwrap();

        let category = fx.store.find_category_by_key(CategoryKey::new(1)).unwrap();
        assert_eq!(category.access_count(), 1);
        assert_eq!(
            category.rights_for(&GroupKey::new("G2")),
            Some("read".parse().unwrap())
        );
    }

    #[test]
    fn test_empty_batch_commits_nothing() {
        let fx = fixture();
        let command = ModifyCategoryAclCommand::new(Actor::admin("admin"));

        let summary = fx.processor.modify(&command).unwrap();

        assert_eq!(summary, AclChangeSummary::default());
        assert_eq!(fx.index.lock().unwrap().batch_count(), 0);
    }

    #[test]
    fn test_failed_commit_restores_loaded_acl() {
        let fx = fixture();
        let processor = flaky_processor(fx.store.clone(), 0);
        let mut command = ModifyCategoryAclCommand::new(Actor::admin("admin"));
        command
            .add_category(CategoryKey::new(1))
            .add_category(CategoryKey::new(2))
            .add_to_be_added(spec("G1", "read"));

        let err = processor.modify(&command).unwrap_err();

        assert_eq!(err.to_string(), "Index error: store offline");
        for key in [1, 2] {
            let category = fx.store.find_category_by_key(CategoryKey::new(key)).unwrap();
            assert!(!category.has_access_for_group(&GroupKey::new("G1")));
        }
    }

    #[test]
    fn test_per_category_failure_keeps_earlier_commits() {
        let fx = fixture();
        let processor = flaky_processor(fx.store.clone(), 1);
        let mut command = ModifyCategoryAclCommand::new(Actor::admin("admin"));
        command
            .add_category(CategoryKey::new(1))
            .add_category(CategoryKey::new(2))
            .add_to_be_added(spec("G1", "read"))
            .scope(TransactionScope::PerCategory);

        processor.modify(&command).unwrap_err();

        let first = fx.store.find_category_by_key(CategoryKey::new(1)).unwrap();
        let second = fx.store.find_category_by_key(CategoryKey::new(2)).unwrap();
        assert!(first.has_access_for_group(&GroupKey::new("G1")));
        assert!(!second.has_access_for_group(&GroupKey::new("G1")));
    }
}
