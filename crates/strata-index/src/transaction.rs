//! Per-unit-of-work index transaction log.
//!
//! [`IndexTransactionLog`] buffers index intents while a unit of work
//! (one request, one batch command) mutates entities, and flushes them once
//! through an injected [`IndexCommitter`] when the work commits.
//!
//! # States
//!
//! ```text
//!  Inactive ──start_transaction()──▶ Active ──commit()──▶ Committed
//!                                     │  ▲
//!                                     └──┘ start_transaction() (no-op)
//! ```
//!
//! `Committed` is terminal: a new unit of work gets a new log from
//! [`IndexTransactionService`]. Dropping a log without committing discards
//! its intents, which is how an aborted unit of work rolls back.
//!
//! A log is owned by one unit of work and is never shared between threads.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use strata_core::{CategoryKey, ContentKey, Error, Result};

use crate::committer::IndexCommitter;
use crate::intent::{IndexAction, IndexBatch, IndexIntent, IndexTarget};

/// Lifecycle state of an [`IndexTransactionLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Created, not yet started.
    Inactive,
    /// Accepting registrations.
    Active,
    /// Flushed; no further use.
    Committed,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionState::Inactive => "inactive",
            TransactionState::Active => "active",
            TransactionState::Committed => "committed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingIntent {
    action: IndexAction,
    immediate: bool,
}

/// Buffered index intents for one unit of work.
pub struct IndexTransactionLog {
    state: TransactionState,
    pending: IndexMap<IndexTarget, PendingIntent>,
    committer: Arc<dyn IndexCommitter>,
}

impl IndexTransactionLog {
    /// Create an inactive log that commits through `committer`.
    pub fn new(committer: Arc<dyn IndexCommitter>) -> Self {
        Self {
            state: TransactionState::Inactive,
            pending: IndexMap::new(),
            committer,
        }
    }

    /// Current state.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Whether the log accepts registrations.
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Move from `Inactive` to `Active`.
    ///
    /// Starting an already active log is tolerated and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::State`] if the log has already committed.
    pub fn start_transaction(&mut self) -> Result<()> {
        match self.state {
            TransactionState::Inactive => {
                self.state = TransactionState::Active;
                Ok(())
            }
            TransactionState::Active => {
                log::debug!("index transaction already active; nested start ignored");
                Ok(())
            }
            TransactionState::Committed => Err(Error::state("start", self.state)),
        }
    }

    /// Register re-indexing of every given content item.
    ///
    /// With `immediate`, the updates are applied before [`commit`](Self::commit)
    /// returns; otherwise the committer may defer them. Registering the same
    /// key twice yields a single index write.
    pub fn register_update<I>(&mut self, content_keys: I, immediate: bool) -> Result<()>
    where
        I: IntoIterator<Item = ContentKey>,
    {
        self.ensure_active("register update on")?;
        let before = self.pending.len();
        for key in content_keys {
            self.record(IndexTarget::Content(key), IndexAction::Update, immediate);
        }
        log::debug!(
            "registered content updates (immediate={immediate}); {} new, {} pending",
            self.pending.len() - before,
            self.pending.len()
        );
        Ok(())
    }

    /// Register re-indexing of one content item.
    pub fn update_content(&mut self, key: ContentKey) -> Result<()> {
        self.ensure_active("update content in")?;
        self.record(IndexTarget::Content(key), IndexAction::Update, false);
        Ok(())
    }

    /// Register removal of one content item from the index.
    pub fn delete_content(&mut self, key: ContentKey) -> Result<()> {
        self.ensure_active("delete content in")?;
        self.record(IndexTarget::Content(key), IndexAction::Delete, false);
        Ok(())
    }

    /// Register re-indexing of a category's metadata.
    pub fn update_category(&mut self, key: CategoryKey) -> Result<()> {
        self.ensure_active("update category in")?;
        self.record(IndexTarget::Category(key), IndexAction::Update, false);
        Ok(())
    }

    /// Number of distinct targets buffered.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Snapshot of the buffered intents in registration order.
    pub fn pending(&self) -> Vec<IndexIntent> {
        self.pending
            .iter()
            .map(|(target, intent)| IndexIntent {
                target: *target,
                action: intent.action,
                immediate: intent.immediate,
            })
            .collect()
    }

    /// Flush every buffered intent exactly once and move to `Committed`.
    ///
    /// Returns the number of intents handed to the committer. An empty log
    /// commits without calling the committer. The log is `Committed` even if
    /// the committer fails; the enclosing unit of work is expected to abort.
    ///
    /// # Errors
    ///
    /// Returns [`Error::State`] unless the log is active, or whatever the
    /// committer returns.
    pub fn commit(&mut self) -> Result<usize> {
        self.ensure_active("commit")?;
        let batch = IndexBatch::new(self.pending());
        self.pending.clear();
        self.state = TransactionState::Committed;

        if batch.is_empty() {
            log::debug!("committing empty index transaction");
            return Ok(0);
        }

        let count = batch.len();
        self.committer.commit(batch)?;
        log::info!("committed index transaction with {count} intents");
        Ok(count)
    }

    fn ensure_active(&self, operation: &'static str) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::state(operation, self.state))
        }
    }

    // Last write wins for the action; immediacy is sticky.
    fn record(&mut self, target: IndexTarget, action: IndexAction, immediate: bool) {
        match self.pending.entry(target) {
            Entry::Occupied(mut entry) => {
                let pending = entry.get_mut();
                pending.action = action;
                pending.immediate |= immediate;
            }
            Entry::Vacant(entry) => {
                entry.insert(PendingIntent { action, immediate });
            }
        }
    }
}

impl Drop for IndexTransactionLog {
    fn drop(&mut self) {
        if self.is_active() && !self.pending.is_empty() {
            log::debug!(
                "discarding {} uncommitted index intents",
                self.pending.len()
            );
        }
    }
}

impl fmt::Debug for IndexTransactionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexTransactionLog")
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Hands out one [`IndexTransactionLog`] per unit of work.
#[derive(Clone)]
pub struct IndexTransactionService {
    committer: Arc<dyn IndexCommitter>,
}

impl IndexTransactionService {
    /// Create a service committing through `committer`.
    pub fn new(committer: Arc<dyn IndexCommitter>) -> Self {
        Self { committer }
    }

    /// A fresh, inactive log.
    pub fn open(&self) -> IndexTransactionLog {
        IndexTransactionLog::new(Arc::clone(&self.committer))
    }

    /// A fresh log that is already active.
    pub fn begin(&self) -> IndexTransactionLog {
        let mut log = self.open();
        log.state = TransactionState::Active;
        log
    }
}

impl fmt::Debug for IndexTransactionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexTransactionService").finish_non_exhaustive()
    }
}
