//! Transactional search-index synchronization for Strata.
//!
//! Entity changes made inside a unit of work register index intents with an
//! [`IndexTransactionLog`]; when the unit of work commits, the log hands the
//! coalesced intents to an [`IndexCommitter`] exactly once.
//!
//! # Features
//!
//! - `index-tantivy`: Enable the Tantivy-backed index store
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      strata-index                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IndexTransactionService → IndexTransactionLog              │
//! │    Inactive → Active → Committed                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IndexCommitter trait                                       │
//! │  ├── DirectCommitter (everything synchronous)               │
//! │  └── DeferredCommitter (immediate sync, rest → IndexWorker) │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IndexStore trait                                           │
//! │  ├── MemoryIndex                                            │
//! │  └── TantivyIndexStore (reads a DocumentSource)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use strata_core::ContentKey;
//! use strata_index::{DirectCommitter, IndexTransactionService, MemoryIndex};
//!
//! let committer = Arc::new(DirectCommitter::new(MemoryIndex::new()));
//! let service = IndexTransactionService::new(committer.clone());
//!
//! let mut log = service.open();
//! log.start_transaction()?;
//! log.register_update([ContentKey::new(1), ContentKey::new(1)], true)?;
//! assert_eq!(log.commit()?, 1);
//! # Ok::<(), strata_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

// Core modules (always available)
pub mod committer;
pub mod config;
pub mod document;
pub mod intent;
pub mod store;
pub mod transaction;
pub mod worker;

// Feature-gated Tantivy modules
#[cfg(feature = "index-tantivy")]
pub mod schema;

#[cfg(feature = "index-tantivy")]
pub mod tantivy_store;

// Re-exports
pub use committer::{DeferredCommitter, DirectCommitter, IndexCommitter, SharedStore};
pub use config::IndexConfig;
pub use document::{DocumentSource, IndexDocument};
pub use intent::{IndexAction, IndexBatch, IndexIntent, IndexTarget};
pub use store::{IndexStore, MemoryIndex, create_index_store};
pub use transaction::{IndexTransactionLog, IndexTransactionService, TransactionState};
pub use worker::{IndexWorker, WorkerStats, create_committer, deferred, deferred_shared};

#[cfg(feature = "index-tantivy")]
pub use schema::IndexSchema;

#[cfg(feature = "index-tantivy")]
pub use tantivy_store::{AccessQuery, IndexedAccess, TantivyIndexStore};
