//! Access-list change commands.
//!
//! - [`ModifyCategoryAclCommand`]: apply one three-way delta to a batch of
//!   categories.
//! - [`SynchronizeCategoryAclCommand`]: make each category's access list
//!   exactly the given specifications.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strata_core::{CategoryKey, GroupKey};

use crate::category::{Category, CategoryAccessControl};
use crate::checker::Actor;

/// Three-way change to a category access list.
///
/// Applied in order: removals, additions, modifications. Additions and
/// modifications share one upsert policy: adding an existing group overwrites
/// its rights, modifying a missing group creates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlDelta {
    /// Groups whose entries are removed.
    #[serde(default)]
    pub to_remove: Vec<GroupKey>,
    /// Specifications expected to be new.
    #[serde(default)]
    pub to_add: Vec<CategoryAccessControl>,
    /// Specifications expected to exist.
    #[serde(default)]
    pub to_modify: Vec<CategoryAccessControl>,
}

impl AccessControlDelta {
    /// An empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta turning `current`'s access list into exactly `target`.
    pub fn replacing(current: &Category, target: &[CategoryAccessControl]) -> Self {
        let keep: BTreeSet<&GroupKey> = target.iter().map(|spec| &spec.group).collect();
        let to_remove = current
            .access_entries()
            .map(|entry| &entry.group().key)
            .filter(|group| !keep.contains(group))
            .cloned()
            .collect();

        Self {
            to_remove,
            to_add: Vec::new(),
            to_modify: target.to_vec(),
        }
    }

    /// Whether the delta changes nothing.
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty() && self.to_modify.is_empty()
    }
}

/// How many index transactions a command runs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionScope {
    /// One transaction for the whole batch.
    #[default]
    Single,
    /// One transaction per category, committed before the next begins.
    PerCategory,
}

/// Apply a delta to the access lists of several categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyCategoryAclCommand {
    /// Categories to change; processed in key order.
    pub categories: BTreeSet<CategoryKey>,
    /// Change to apply to every category.
    pub delta: AccessControlDelta,
    /// Re-index content under each category before the commit returns.
    #[serde(default)]
    pub include_content: bool,
    /// User making the change.
    pub updater: Actor,
    /// Transaction boundaries.
    #[serde(default)]
    pub scope: TransactionScope,
}

impl ModifyCategoryAclCommand {
    /// An empty command for `updater`.
    pub fn new(updater: Actor) -> Self {
        Self {
            categories: BTreeSet::new(),
            delta: AccessControlDelta::new(),
            include_content: false,
            updater,
            scope: TransactionScope::default(),
        }
    }

    /// Add a category to the batch.
    pub fn add_category(&mut self, key: CategoryKey) -> &mut Self {
        self.categories.insert(key);
        self
    }

    /// Grant a group access.
    pub fn add_to_be_added(&mut self, spec: CategoryAccessControl) -> &mut Self {
        self.delta.to_add.push(spec);
        self
    }

    /// Change a group's access.
    pub fn add_to_be_modified(&mut self, spec: CategoryAccessControl) -> &mut Self {
        self.delta.to_modify.push(spec);
        self
    }

    /// Revoke a group's access.
    pub fn add_to_be_removed(&mut self, group: GroupKey) -> &mut Self {
        self.delta.to_remove.push(group);
        self
    }

    /// Re-index content synchronously.
    pub fn include_content(&mut self) -> &mut Self {
        self.include_content = true;
        self
    }

    /// Set the transaction scope.
    pub fn scope(&mut self, scope: TransactionScope) -> &mut Self {
        self.scope = scope;
        self
    }
}

/// Replace the access lists of several categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronizeCategoryAclCommand {
    /// Categories to change; processed in key order.
    pub categories: BTreeSet<CategoryKey>,
    /// The complete access list every category ends up with.
    pub acl: Vec<CategoryAccessControl>,
    /// Re-index content under each category before the commit returns.
    #[serde(default)]
    pub include_content: bool,
    /// User making the change.
    pub updater: Actor,
    /// Transaction boundaries.
    #[serde(default)]
    pub scope: TransactionScope,
}

impl SynchronizeCategoryAclCommand {
    /// An empty command for `updater`.
    pub fn new(updater: Actor) -> Self {
        Self {
            categories: BTreeSet::new(),
            acl: Vec::new(),
            include_content: false,
            updater,
            scope: TransactionScope::default(),
        }
    }

    /// Add a category to the batch.
    pub fn add_category(&mut self, key: CategoryKey) -> &mut Self {
        self.categories.insert(key);
        self
    }

    /// Add an entry to the target access list.
    pub fn add_access(&mut self, spec: CategoryAccessControl) -> &mut Self {
        self.acl.push(spec);
        self
    }

    /// Re-index content synchronously.
    pub fn include_content(&mut self) -> &mut Self {
        self.include_content = true;
        self
    }

    /// Set the transaction scope.
    pub fn scope(&mut self, scope: TransactionScope) -> &mut Self {
        self.scope = scope;
        self
    }
}
