//! Index store trait and factory.
//!
//! # Stores
//!
//! - `MemoryIndex`: records which entries exist and how often each was written
//! - `TantivyIndexStore`: real documents in a Tantivy index (requires
//!   `index-tantivy` feature)

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use strata_core::{Error, Result};

use crate::config::IndexConfig;
use crate::document::DocumentSource;
use crate::intent::{IndexAction, IndexBatch, IndexIntent, IndexTarget};

/// Destination of committed index intents.
pub trait IndexStore: Send {
    /// Apply every intent of `batch`, in order, as one write.
    fn apply(&mut self, batch: &IndexBatch) -> Result<()>;

    /// Store name for diagnostics.
    fn name(&self) -> &str;
}

impl<S: IndexStore + ?Sized> IndexStore for Box<S> {
    fn apply(&mut self, batch: &IndexBatch) -> Result<()> {
        (**self).apply(batch)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Create an index store based on configuration.
///
/// Selection logic:
/// 1. `"tantivy"` with the `index-tantivy` feature and an `index_path` → `TantivyIndexStore`
/// 2. `"tantivy"` otherwise → `MemoryIndex`, with a warning
/// 3. `"memory"` → `MemoryIndex`
///
/// # Errors
///
/// Returns [`Error::Config`] for an unknown backend or invalid settings, or
/// the error from opening the Tantivy index.
pub fn create_index_store(
    config: &IndexConfig,
    source: Arc<dyn DocumentSource>,
) -> Result<Box<dyn IndexStore>> {
    config.validate()?;
    match config.backend.as_str() {
        "memory" => Ok(Box::new(MemoryIndex::new())),
        "tantivy" => create_tantivy_store(config, source),
        other => Err(Error::config(format!("Unknown index backend '{other}'"))),
    }
}

#[cfg(feature = "index-tantivy")]
fn create_tantivy_store(
    config: &IndexConfig,
    source: Arc<dyn DocumentSource>,
) -> Result<Box<dyn IndexStore>> {
    match config.index_path {
        Some(ref path) => {
            let store = crate::tantivy_store::TantivyIndexStore::open(
                std::path::Path::new(path),
                config.writer_buffer_size,
                source,
            )?;
            Ok(Box::new(store))
        }
        None => {
            log::warn!("Tantivy backend configured without index_path, falling back to memory");
            Ok(Box::new(MemoryIndex::new()))
        }
    }
}

#[cfg(not(feature = "index-tantivy"))]
fn create_tantivy_store(
    _config: &IndexConfig,
    _source: Arc<dyn DocumentSource>,
) -> Result<Box<dyn IndexStore>> {
    log::warn!("Tantivy backend requested without index-tantivy, falling back to memory");
    Ok(Box::new(MemoryIndex::new()))
}

/// In-memory index that records entries and writes.
///
/// Used in tests and wherever only the effect of committed intents matters.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    entries: BTreeSet<IndexTarget>,
    writes: BTreeMap<IndexTarget, usize>,
    applied: Vec<IndexIntent>,
    batches: usize,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an entry exists for `target`.
    pub fn contains(&self, target: &IndexTarget) -> bool {
        self.entries.contains(target)
    }

    /// Number of writes (updates or deletes) applied for `target`.
    pub fn write_count(&self, target: &IndexTarget) -> usize {
        self.writes.get(target).copied().unwrap_or(0)
    }

    /// Every applied intent, in application order.
    pub fn applied(&self) -> &[IndexIntent] {
        &self.applied
    }

    /// Number of batches applied.
    pub fn batch_count(&self) -> usize {
        self.batches
    }

    /// Number of existing entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries exist.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IndexStore for MemoryIndex {
    fn apply(&mut self, batch: &IndexBatch) -> Result<()> {
        for intent in batch {
            match intent.action {
                IndexAction::Update => {
                    self.entries.insert(intent.target);
                }
                IndexAction::Delete => {
                    self.entries.remove(&intent.target);
                }
            }
            *self.writes.entry(intent.target).or_insert(0) += 1;
            self.applied.push(*intent);
        }
        self.batches += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::IndexDocument;
    use strata_core::{CategoryKey, ContentKey};

    struct EmptySource;

    impl DocumentSource for EmptySource {
        fn content_document(&self, _key: ContentKey) -> Result<Option<IndexDocument>> {
            Ok(None)
        }

        fn category_document(&self, _key: CategoryKey) -> Result<Option<IndexDocument>> {
            Ok(None)
        }
    }

    fn intent(key: u32, action: IndexAction) -> IndexIntent {
        IndexIntent {
            target: IndexTarget::Content(ContentKey::new(key)),
            action,
            immediate: false,
        }
    }

    #[test]
    fn test_memory_index_update_and_delete() {
        let mut index = MemoryIndex::new();
        index
            .apply(&IndexBatch::new(vec![
                intent(1, IndexAction::Update),
                intent(2, IndexAction::Update),
            ]))
            .unwrap();
        index
            .apply(&IndexBatch::new(vec![intent(1, IndexAction::Delete)]))
            .unwrap();

        let one = IndexTarget::Content(ContentKey::new(1));
        assert!(!index.contains(&one));
        assert_eq!(index.write_count(&one), 2);
        assert_eq!(index.len(), 1);
        assert_eq!(index.batch_count(), 2);
        assert_eq!(index.applied().len(), 3);
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn IndexStore> = Box::new(MemoryIndex::new());
        store
            .apply(&IndexBatch::new(vec![intent(1, IndexAction::Update)]))
            .unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn test_create_memory_store() {
        let config = IndexConfig::default();
        let store = create_index_store(&config, Arc::new(EmptySource)).unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn test_create_tantivy_without_path_falls_back() {
        let config = IndexConfig {
            backend: "tantivy".to_string(),
            ..Default::default()
        };
        let store = create_index_store(&config, Arc::new(EmptySource)).unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn test_create_unknown_backend_fails() {
        let config = IndexConfig {
            backend: "solr".to_string(),
            ..Default::default()
        };
        let Err(err) = create_index_store(&config, Arc::new(EmptySource)) else {
            unreachable!("Expected unknown backend to be rejected");
        };
        assert!(matches!(err, Error::Config(_)));
    }
}
