//! JunctionHandle - owner's side of a running dispatcher

use std::sync::Arc;

use contracts::TerminationCause;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use crate::error::JunctionError;
use crate::metrics::{JunctionMetrics, MetricsSnapshot};
use crate::model::Models;

/// Final report of a stopped dispatcher
#[derive(Debug)]
pub struct Termination {
    /// Why the dispatcher stopped
    pub cause: TerminationCause,
    /// The model store, handed back to the caller
    pub models: Models,
    /// Counters at the moment of termination
    pub metrics: MetricsSnapshot,
}

/// Handle to a running junction
///
/// Dropping the handle detaches the worker: it keeps running until one of
/// its input streams closes or the snapshot stream is dropped.
pub struct JunctionHandle {
    name: String,
    cancel: watch::Sender<bool>,
    metrics: Arc<JunctionMetrics>,
    worker: JoinHandle<Termination>,
}

impl JunctionHandle {
    pub(crate) fn new(
        name: String,
        cancel: watch::Sender<bool>,
        metrics: Arc<JunctionMetrics>,
        worker: JoinHandle<Termination>,
    ) -> Self {
        Self {
            name,
            cancel,
            metrics,
            worker,
        }
    }

    /// Junction name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Whether the worker has stopped
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Ask the worker to stop
    ///
    /// Honoured while waiting for input and while publishing a snapshot.
    pub fn shutdown(&self) {
        self.cancel.send_replace(true);
        debug!(junction = %self.name, "Shutdown requested");
    }

    /// Wait for the worker to stop on its own
    #[instrument(name = "junction_handle_join", skip(self), fields(junction = %self.name))]
    pub async fn join(self) -> Result<Termination, JunctionError> {
        self.worker
            .await
            .map_err(|e| JunctionError::worker(&self.name, e.to_string()))
    }

    /// Request shutdown and wait for the worker to stop
    pub async fn stop(self) -> Result<Termination, JunctionError> {
        self.shutdown();
        self.join().await
    }
}

impl std::fmt::Debug for JunctionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JunctionHandle")
            .field("name", &self.name)
            .field("finished", &self.worker.is_finished())
            .finish_non_exhaustive()
    }
}
