//! Committers: what happens to a batch when a transaction log commits.
//!
//! - [`DirectCommitter`]: applies the whole batch to the store before
//!   returning.
//! - [`DeferredCommitter`]: applies immediate intents before returning and
//!   queues the rest for an [`IndexWorker`](crate::worker::IndexWorker).
//!
//! Deferred batches wait in a backlog shared with the worker. An immediate
//! commit applies that backlog first, under the same store lock, so a key
//! always ends up with the intent of the last commit that touched it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use strata_core::{Error, Result};
use tokio::sync::mpsc::UnboundedSender;

use crate::intent::IndexBatch;
use crate::store::IndexStore;
use crate::worker::drain_backlog;

/// Receives the coalesced batch of a committing transaction log.
pub trait IndexCommitter: Send + Sync {
    /// Flush `batch`. Called at most once per log and never with an empty batch.
    fn commit(&self, batch: IndexBatch) -> Result<()>;
}

/// A store shared between committers and the deferred worker.
pub type SharedStore<S> = Arc<Mutex<S>>;

/// Deferred batches not yet applied, oldest first.
pub(crate) type Backlog = Arc<Mutex<VecDeque<IndexBatch>>>;

pub(crate) fn lock_store<S>(store: &Mutex<S>) -> Result<MutexGuard<'_, S>> {
    store
        .lock()
        .map_err(|_| Error::index("index store lock poisoned"))
}

pub(crate) fn lock_backlog(
    backlog: &Mutex<VecDeque<IndexBatch>>,
) -> Result<MutexGuard<'_, VecDeque<IndexBatch>>> {
    backlog
        .lock()
        .map_err(|_| Error::index("deferred backlog lock poisoned"))
}

/// Applies every intent synchronously.
pub struct DirectCommitter<S> {
    store: SharedStore<S>,
}

impl<S: IndexStore> DirectCommitter<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(Mutex::new(store)))
    }

    /// Use a store that is shared with other components.
    pub fn from_shared(store: SharedStore<S>) -> Self {
        Self { store }
    }

    /// Handle to the underlying store.
    pub fn store(&self) -> SharedStore<S> {
        Arc::clone(&self.store)
    }
}

impl<S: IndexStore> IndexCommitter for DirectCommitter<S> {
    fn commit(&self, batch: IndexBatch) -> Result<()> {
        let mut store = lock_store(&self.store)?;
        log::debug!("applying {} intents to {}", batch.len(), store.name());
        store.apply(&batch)
    }
}

/// Applies immediate intents synchronously, queues deferred ones.
pub struct DeferredCommitter<S> {
    store: SharedStore<S>,
    backlog: Backlog,
    wake: UnboundedSender<()>,
}

impl<S: IndexStore> DeferredCommitter<S> {
    pub(crate) fn new(store: SharedStore<S>, backlog: Backlog, wake: UnboundedSender<()>) -> Self {
        Self {
            store,
            backlog,
            wake,
        }
    }

    /// Handle to the underlying store.
    pub fn store(&self) -> SharedStore<S> {
        Arc::clone(&self.store)
    }

    /// Number of deferred batches the worker has not applied yet.
    pub fn backlog_len(&self) -> Result<usize> {
        Ok(lock_backlog(&self.backlog)?.len())
    }
}

impl<S: IndexStore> IndexCommitter for DeferredCommitter<S> {
    fn commit(&self, batch: IndexBatch) -> Result<()> {
        let (immediate, deferred) = batch.partition_immediate();

        if !deferred.is_empty() && self.wake.is_closed() {
            return Err(Error::index("deferred index worker has shut down"));
        }

        if !immediate.is_empty() {
            let mut store = lock_store(&self.store)?;
            let caught_up = drain_backlog(&mut *store, &self.backlog)?;
            if caught_up.batches + caught_up.failures > 0 {
                log::debug!(
                    "applied {} older deferred batches ahead of an immediate commit",
                    caught_up.batches + caught_up.failures
                );
            }
            log::debug!(
                "applying {} immediate intents to {}",
                immediate.len(),
                store.name()
            );
            store.apply(&immediate)?;
        }

        if !deferred.is_empty() {
            log::debug!("queueing {} deferred intents", deferred.len());
            lock_backlog(&self.backlog)?.push_back(deferred);
            self.wake
                .send(())
                .map_err(|_| Error::index("deferred index worker has shut down"))?;
        }

        Ok(())
    }
}
