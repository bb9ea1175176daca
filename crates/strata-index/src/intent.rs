//! Index intents and the batches handed to committers.
//!
//! An intent is a buffered instruction to update or delete one search-index
//! entry. Intents are keyed by [`IndexTarget`]; the transaction log keeps at
//! most one intent per target and hands them over as an [`IndexBatch`].

use serde::{Deserialize, Serialize};
use std::fmt;
use strata_core::{CategoryKey, ContentKey};

/// Entity an index entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "key")]
pub enum IndexTarget {
    /// A content item's document.
    Content(ContentKey),
    /// A category's metadata document.
    Category(CategoryKey),
}

impl IndexTarget {
    /// Stable document identifier, e.g. `content:12`.
    pub fn document_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexTarget::Content(key) => write!(f, "content:{key}"),
            IndexTarget::Category(key) => write!(f, "category:{key}"),
        }
    }
}

/// What to do with an index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexAction {
    /// Re-index the entity from its current state.
    Update,
    /// Remove the entity from the index.
    Delete,
}

/// One coalesced instruction for the index store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexIntent {
    /// Entry to act on.
    pub target: IndexTarget,
    /// Action to take.
    pub action: IndexAction,
    /// Whether the change must be visible when the commit returns.
    pub immediate: bool,
}

/// Ordered intents flushed by one commit.
///
/// Order is first-registration order within the transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexBatch {
    intents: Vec<IndexIntent>,
}

impl IndexBatch {
    /// Create a batch from intents.
    pub fn new(intents: Vec<IndexIntent>) -> Self {
        Self { intents }
    }

    /// Number of intents.
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Whether the batch carries no intents.
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Iterate over the intents in order.
    pub fn iter(&self) -> std::slice::Iter<'_, IndexIntent> {
        self.intents.iter()
    }

    /// Borrow the intents.
    pub fn intents(&self) -> &[IndexIntent] {
        &self.intents
    }

    /// Split into (immediate, deferred) batches, preserving order in each.
    pub fn partition_immediate(self) -> (IndexBatch, IndexBatch) {
        let (immediate, deferred): (Vec<_>, Vec<_>) =
            self.intents.into_iter().partition(|intent| intent.immediate);
        (IndexBatch::new(immediate), IndexBatch::new(deferred))
    }
}

impl IntoIterator for IndexBatch {
    type Item = IndexIntent;
    type IntoIter = std::vec::IntoIter<IndexIntent>;

    fn into_iter(self) -> Self::IntoIter {
        self.intents.into_iter()
    }
}

impl<'a> IntoIterator for &'a IndexBatch {
    type Item = &'a IndexIntent;
    type IntoIter = std::slice::Iter<'a, IndexIntent>;

    fn into_iter(self) -> Self::IntoIter {
        self.intents.iter()
    }
}
