//! Common helpers for strata-index integration tests.

use std::sync::{Arc, Mutex};

use strata_core::ContentKey;
use strata_index::{DirectCommitter, IndexTarget, IndexTransactionService, MemoryIndex};

/// Service committing straight into a shared in-memory index.
pub fn direct_service() -> (IndexTransactionService, Arc<Mutex<MemoryIndex>>) {
    let committer = DirectCommitter::new(MemoryIndex::new());
    let store = committer.store();
    (IndexTransactionService::new(Arc::new(committer)), store)
}

/// Content target shorthand.
pub fn content(key: u32) -> IndexTarget {
    IndexTarget::Content(ContentKey::new(key))
}

/// Content keys shorthand.
pub fn keys(values: &[u32]) -> Vec<ContentKey> {
    values.iter().copied().map(ContentKey::new).collect()
}
