// src/debounce.rs - Debounced search for interactive callers
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use log::{debug, trace};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};

use crate::{match_links, Link};

/// Results of one debounced query.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Issuance number of the query that produced these results
    pub generation: u64,
    /// The query as typed
    pub query: String,
    /// Matching links, in collection order
    pub links: Vec<Link>,
}

/// Trailing-edge debouncer in front of [`match_links`].
///
/// Every [`submit`](Self::submit) cancels the pending query (if it has not
/// started yet) and schedules the new one after the quiet interval. Results
/// are published on a watch channel only while their query is still the most
/// recently issued one, so late results never overwrite newer ones.
pub struct SearchDebouncer {
    /// Quiet interval before a query runs
    delay: Duration,

    /// Generation of the most recently issued query
    issued: Arc<AtomicU64>,

    /// Handle to the scheduled query task
    pending: Option<JoinHandle<()>>,

    /// Channel the latest results are published on
    results_tx: Arc<watch::Sender<SearchResults>>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        let (results_tx, _) = watch::channel(SearchResults::default());
        Self {
            delay,
            issued: Arc::new(AtomicU64::new(0)),
            pending: None,
            results_tx: Arc::new(results_tx),
        }
    }

    /// Receiver that sees every applied result set.
    pub fn subscribe(&self) -> watch::Receiver<SearchResults> {
        self.results_tx.subscribe()
    }

    pub fn latest_generation(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Schedules `query` against `links` and returns its generation.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, query: impl Into<String>, links: Arc<Vec<Link>>) -> u64 {
        let query = query.into();
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel();

        trace!("Scheduling query '{}' as generation {}", query, generation);
        let delay = self.delay;
        let issued = Arc::clone(&self.issued);
        let results_tx = Arc::clone(&self.results_tx);

        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            if issued.load(Ordering::SeqCst) != generation {
                return;
            }

            let matched: Vec<Link> = match_links(&query, &links).into_iter().cloned().collect();
            let applied = results_tx.send_if_modified(|current| {
                if generation <= current.generation || issued.load(Ordering::SeqCst) != generation
                {
                    return false;
                }
                *current = SearchResults {
                    generation,
                    query,
                    links: matched,
                };
                true
            });

            if applied {
                debug!("Applied search results for generation {}", generation);
            } else {
                debug!("Discarded stale search results for generation {}", generation);
            }
        });

        self.pending = Some(task);
        generation
    }

    /// Drops the pending query, if any.
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
