//! Tantivy-backed index store.
//!
//! Each committed batch is applied as one Tantivy commit: every target's old
//! document is deleted by id, updated targets are re-read from the
//! [`DocumentSource`] and added back, then the writer commits and the reader
//! reloads so the batch is searchable when `apply` returns.
//!
//! # Usage
//!
//! ```rust,ignore
//! use strata_index::{AccessQuery, IndexedAccess, TantivyIndexStore};
//!
//! let store = TantivyIndexStore::open(&index_path, 50_000_000, source)?;
//! let visible = store.count(
//!     &AccessQuery::for_group(group).require(IndexedAccess::Read),
//! )?;
//! ```

use std::path::Path;
use std::sync::Arc;

use strata_core::{ContentKey, Error, GroupKey, Result};
use tantivy::collector::Count;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::IndexRecordOption;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use crate::document::{DocumentSource, IndexDocument};
use crate::intent::{IndexAction, IndexBatch, IndexTarget};
use crate::schema::{IndexSchema, KIND_CATEGORY, KIND_CONTENT};
use crate::store::IndexStore;

/// Access types recorded in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexedAccess {
    /// Read access on the owning category.
    Read,
    /// Admin-browse access on the owning category.
    AdminBrowse,
}

/// Count query over content documents visible to one group.
///
/// Every required access type must be held (AND policy).
#[derive(Debug, Clone)]
pub struct AccessQuery {
    group: GroupKey,
    required: Vec<IndexedAccess>,
    content: Option<ContentKey>,
}

impl AccessQuery {
    /// Query content for `group`.
    pub fn for_group(group: GroupKey) -> Self {
        Self {
            group,
            required: Vec::new(),
            content: None,
        }
    }

    /// Require an access type.
    pub fn require(mut self, access: IndexedAccess) -> Self {
        if !self.required.contains(&access) {
            self.required.push(access);
        }
        self
    }

    /// Restrict to one content item.
    pub fn content(mut self, key: ContentKey) -> Self {
        self.content = Some(key);
        self
    }
}

/// Index store writing documents to Tantivy.
pub struct TantivyIndexStore {
    index: Index,
    writer: IndexWriter,
    reader: IndexReader,
    schema: IndexSchema,
    source: Arc<dyn DocumentSource>,
}

impl TantivyIndexStore {
    /// Create or open an index at `index_path`.
    pub fn open(
        index_path: &Path,
        writer_buffer_size: usize,
        source: Arc<dyn DocumentSource>,
    ) -> Result<Self> {
        if !index_path.exists() {
            std::fs::create_dir_all(index_path).map_err(|e| Error::io_with_path(e, index_path))?;
        }

        let schema = IndexSchema::build();
        let index = if index_path.join("meta.json").exists() {
            Index::open_in_dir(index_path)
                .map_err(|e| Error::index(format!("Failed to open index: {e}")))?
        } else {
            Index::create_in_dir(index_path, schema.schema().clone())
                .map_err(|e| Error::index(format!("Failed to create index: {e}")))?
        };

        Self::with_index(index, schema, writer_buffer_size, source)
    }

    /// Create an in-memory index (for testing).
    pub fn in_memory(source: Arc<dyn DocumentSource>) -> Result<Self> {
        let schema = IndexSchema::build();
        let index = Index::create_in_ram(schema.schema().clone());
        Self::with_index(index, schema, crate::config::MIN_WRITER_BUFFER_SIZE, source)
    }

    fn with_index(
        index: Index,
        schema: IndexSchema,
        writer_buffer_size: usize,
        source: Arc<dyn DocumentSource>,
    ) -> Result<Self> {
        let writer = index
            .writer_with_num_threads(1, writer_buffer_size)
            .map_err(|e| Error::index(format!("Failed to create index writer: {e}")))?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::index(format!("Failed to create index reader: {e}")))?;

        Ok(Self {
            index,
            writer,
            reader,
            schema,
            source,
        })
    }

    /// Count content documents matching `query`.
    pub fn count(&self, query: &AccessQuery) -> Result<usize> {
        let s = &self.schema;
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![term_clause(s.kind, KIND_CONTENT)];

        for access in &query.required {
            let field = match access {
                IndexedAccess::Read => s.read_group,
                IndexedAccess::AdminBrowse => s.browse_group,
            };
            clauses.push(term_clause(field, query.group.as_str()));
        }
        if let Some(key) = query.content {
            let id = IndexTarget::Content(key).document_id();
            clauses.push(term_clause(s.id, &id));
        }

        let searcher = self.reader.searcher();
        searcher
            .search(&BooleanQuery::new(clauses), &Count)
            .map_err(|e| Error::index(format!("Search failed: {e}")))
    }

    /// Number of documents (content and category) in the index.
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Get reference to the underlying Tantivy index.
    pub fn index(&self) -> &Index {
        &self.index
    }

    fn to_tantivy_doc(&self, target: &IndexTarget, doc: &IndexDocument) -> TantivyDocument {
        let s = &self.schema;
        let (kind, key) = match target {
            IndexTarget::Content(key) => (KIND_CONTENT, key.to_string()),
            IndexTarget::Category(key) => (KIND_CATEGORY, key.to_string()),
        };

        let mut tantivy_doc = TantivyDocument::new();
        tantivy_doc.add_text(s.id, target.document_id());
        tantivy_doc.add_text(s.kind, kind);
        tantivy_doc.add_text(s.key, key);
        tantivy_doc.add_text(s.category, doc.category.to_string());
        tantivy_doc.add_text(s.title, &doc.title);
        for group in &doc.read_groups {
            tantivy_doc.add_text(s.read_group, group.as_str());
        }
        for group in &doc.browse_groups {
            tantivy_doc.add_text(s.browse_group, group.as_str());
        }
        tantivy_doc
    }
}

fn term_clause(field: tantivy::schema::Field, value: &str) -> (Occur, Box<dyn Query>) {
    let term = Term::from_field_text(field, value);
    (
        Occur::Must,
        Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
    )
}

impl TantivyIndexStore {
    fn write_batch(&mut self, batch: &IndexBatch) -> Result<()> {
        for intent in batch {
            let id = intent.target.document_id();
            self.writer
                .delete_term(Term::from_field_text(self.schema.id, &id));

            if intent.action == IndexAction::Delete {
                continue;
            }
            match self.source.document(&intent.target)? {
                Some(doc) => {
                    let tantivy_doc = self.to_tantivy_doc(&intent.target, &doc);
                    self.writer
                        .add_document(tantivy_doc)
                        .map_err(|e| Error::index(format!("Failed to add document {id}: {e}")))?;
                }
                None => log::debug!("{id} no longer exists; removed from index"),
            }
        }

        self.writer
            .commit()
            .map_err(|e| Error::index(format!("Failed to commit index: {e}")))?;
        Ok(())
    }
}

impl IndexStore for TantivyIndexStore {
    /// Apply `batch` as one Tantivy commit.
    ///
    /// On failure the writer is rolled back, so none of the batch's deletes
    /// or additions reach a later commit.
    fn apply(&mut self, batch: &IndexBatch) -> Result<()> {
        if let Err(e) = self.write_batch(batch) {
            if let Err(rollback) = self.writer.rollback() {
                log::error!("Failed to roll back index writer: {rollback}");
            }
            return Err(e);
        }

        self.reader
            .reload()
            .map_err(|e| Error::index(format!("Failed to reload index reader: {e}")))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "tantivy"
    }
}

impl std::fmt::Debug for TantivyIndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyIndexStore")
            .field("index", &"<tantivy::Index>")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
