//! Background worker applying deferred index intents.
//!
//! ```rust,ignore
//! use strata_index::{IndexTransactionService, MemoryIndex, deferred};
//!
//! let (committer, worker) = deferred(MemoryIndex::new());
//! let handle = worker.spawn();
//! let service = IndexTransactionService::new(Arc::new(committer));
//! // ... commit logs ...
//! drop(service);
//! let stats = handle.await??;
//! ```
//!
//! The worker runs until every committer holding its queue is dropped, then
//! drains what is left and returns.

use std::collections::VecDeque;
use std::ops::AddAssign;
use std::sync::{Arc, Mutex};

use strata_core::{Error, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

use crate::committer::{
    Backlog, DeferredCommitter, DirectCommitter, IndexCommitter, SharedStore, lock_backlog,
    lock_store,
};
use crate::config::IndexConfig;
use crate::intent::IndexBatch;
use crate::store::IndexStore;

/// Counters reported when the worker stops.
///
/// Batches an immediate commit applied ahead of the worker are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Batches applied successfully.
    pub batches: usize,
    /// Intents applied successfully.
    pub intents: usize,
    /// Batches the store rejected.
    pub failures: usize,
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.batches += other.batches;
        self.intents += other.intents;
        self.failures += other.failures;
    }
}

/// Create a deferred committer and the worker draining its queue.
pub fn deferred<S: IndexStore + 'static>(store: S) -> (DeferredCommitter<S>, IndexWorker<S>) {
    deferred_shared(Arc::new(Mutex::new(store)))
}

/// Like [`deferred`], for a store shared with other components.
pub fn deferred_shared<S: IndexStore + 'static>(
    store: SharedStore<S>,
) -> (DeferredCommitter<S>, IndexWorker<S>) {
    let (wake, receiver) = mpsc::unbounded_channel();
    let backlog = Backlog::default();
    let committer = DeferredCommitter::new(Arc::clone(&store), Arc::clone(&backlog), wake);
    let worker = IndexWorker {
        store,
        backlog,
        receiver,
    };
    (committer, worker)
}

/// Build the committer `config` asks for.
///
/// With `deferred_updates` the committer queues non-immediate intents and the
/// returned worker must be spawned to apply them; otherwise every intent is
/// applied at commit and no worker is returned.
pub fn create_committer<S: IndexStore + 'static>(
    config: &IndexConfig,
    store: SharedStore<S>,
) -> (Arc<dyn IndexCommitter>, Option<IndexWorker<S>>) {
    if config.deferred_updates {
        log::info!("Using deferred index updates");
        let (committer, worker) = deferred_shared(store);
        (Arc::new(committer), Some(worker))
    } else {
        log::info!("Using synchronous index updates");
        (Arc::new(DirectCommitter::from_shared(store)), None)
    }
}

/// Apply every queued batch in order.
///
/// The caller holds the store lock, so no other batch can be applied in
/// between. A rejected batch is logged, counted and dropped.
pub(crate) fn drain_backlog<S: IndexStore + ?Sized>(
    store: &mut S,
    backlog: &Mutex<VecDeque<IndexBatch>>,
) -> Result<WorkerStats> {
    let mut stats = WorkerStats::default();
    let mut queued = lock_backlog(backlog)?;

    while let Some(batch) = queued.pop_front() {
        let count = batch.len();
        match store.apply(&batch) {
            Ok(()) => {
                stats.batches += 1;
                stats.intents += count;
                log::debug!("applied {count} deferred intents");
            }
            Err(e) => {
                stats.failures += 1;
                log::error!("Failed to apply {count} deferred intents: {e}");
            }
        }
    }
    Ok(stats)
}

/// Applies queued deferred batches in commit order.
pub struct IndexWorker<S> {
    store: SharedStore<S>,
    backlog: Backlog,
    receiver: UnboundedReceiver<()>,
}

impl<S: IndexStore + 'static> IndexWorker<S> {
    /// Run on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<Result<WorkerStats>> {
        tokio::spawn(self.run())
    }

    /// Apply batches until the queue closes.
    ///
    /// A batch the store rejects is logged and counted; later batches are
    /// still applied. Store writes run on the blocking pool.
    pub async fn run(mut self) -> Result<WorkerStats> {
        let mut stats = WorkerStats::default();

        while self.receiver.recv().await.is_some() {
            let store = Arc::clone(&self.store);
            let backlog = Arc::clone(&self.backlog);
            stats += tokio::task::spawn_blocking(move || {
                let mut store = lock_store(&store)?;
                drain_backlog(&mut *store, &backlog)
            })
            .await
            .map_err(|e| Error::index(format!("Deferred index task failed: {e}")))??;
        }

        log::info!(
            "deferred index worker stopped after {} batches ({} failed)",
            stats.batches,
            stats.failures
        );
        Ok(stats)
    }
}

impl<S> std::fmt::Debug for IndexWorker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexWorker").finish_non_exhaustive()
    }
}
