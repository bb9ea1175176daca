//! Indexed document representation and the source it is loaded from.
//!
//! Stores that write real documents (rather than just recording intents)
//! resolve each [`IndexTarget`] through a [`DocumentSource`] at apply time,
//! so an update always indexes the entity's state as of the commit.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strata_core::{CategoryKey, ContentKey, GroupKey, Result};

use crate::intent::IndexTarget;

/// Fields indexed for one content item or category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Display title.
    pub title: String,
    /// Category the entity lives in (the category itself for category documents).
    pub category: CategoryKey,
    /// Groups holding read access on the category.
    #[serde(default)]
    pub read_groups: BTreeSet<GroupKey>,
    /// Groups holding admin-browse access on the category.
    #[serde(default)]
    pub browse_groups: BTreeSet<GroupKey>,
}

impl IndexDocument {
    /// Create a document without any group access.
    pub fn new(title: impl Into<String>, category: CategoryKey) -> Self {
        Self {
            title: title.into(),
            category,
            read_groups: BTreeSet::new(),
            browse_groups: BTreeSet::new(),
        }
    }

    /// Add a group with read access.
    pub fn with_read_group(mut self, group: GroupKey) -> Self {
        self.read_groups.insert(group);
        self
    }

    /// Add a group with admin-browse access.
    pub fn with_browse_group(mut self, group: GroupKey) -> Self {
        self.browse_groups.insert(group);
        self
    }
}

/// Loads the current state of indexed entities.
///
/// `Ok(None)` means the entity no longer exists; stores drop its entry.
pub trait DocumentSource: Send + Sync {
    /// Current document for a content item.
    fn content_document(&self, key: ContentKey) -> Result<Option<IndexDocument>>;

    /// Current document for a category.
    fn category_document(&self, key: CategoryKey) -> Result<Option<IndexDocument>>;

    /// Current document for any target.
    fn document(&self, target: &IndexTarget) -> Result<Option<IndexDocument>> {
        match target {
            IndexTarget::Content(key) => self.content_document(*key),
            IndexTarget::Category(key) => self.category_document(*key),
        }
    }
}
