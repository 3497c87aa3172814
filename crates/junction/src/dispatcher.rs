//! Dispatcher - the single worker behind a junction
//!
//! Waits on every input stream at once, resolves and applies each value to
//! its model, and publishes a snapshot per applied update. The worker owns
//! the model store for its whole run, so no model is ever touched by two
//! workers.
//!
//! All inputs are merged into one `SelectAll`. Each input yields
//! `(binding, Some(value))` per update and a final `(binding, None)` when it
//! closes. `SelectAll` re-queues a stream behind the other ready streams
//! after each item, so a busy input cannot starve a quiet one.

use std::sync::Arc;

use contracts::{ClosurePolicy, JunctionConfig, TerminationCause, ValidationError};
use futures_util::future;
use futures_util::stream::{self, BoxStream, SelectAll, StreamExt};
use observability::metrics as telemetry;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, instrument, trace, warn};

use crate::binding::{Binding, Step, Target, Value};
use crate::handle::{JunctionHandle, Termination};
use crate::metrics::JunctionMetrics;
use crate::model::Models;
use crate::output::{self, Delivery, OutputSlot, SnapshotSender};
use crate::validator::{validate, validate_membership};

/// Entry point for building junctions
pub struct Junction;

impl Junction {
    /// Start configuring a junction
    pub fn builder() -> JunctionBuilder {
        JunctionBuilder::new(JunctionConfig::default())
    }

    /// Check `output` and `bindings` without starting anything
    pub fn validate(output: &OutputSlot, bindings: &[Binding]) -> Result<(), ValidationError> {
        validate(output, bindings)
    }

    /// Validate, install the snapshot stream into `output`, and start the worker
    ///
    /// Returns as soon as the worker is spawned. Must be called from within a
    /// Tokio runtime.
    pub fn new(
        output: &mut OutputSlot,
        models: Models,
        bindings: Vec<Binding>,
    ) -> Result<JunctionHandle, ValidationError> {
        Self::builder()
            .models(models)
            .bindings(bindings)
            .spawn(output)
    }
}

/// Builder for creating a junction
pub struct JunctionBuilder {
    config: JunctionConfig,
    models: Models,
    bindings: Vec<Binding>,
}

impl JunctionBuilder {
    /// Create a new JunctionBuilder
    pub fn new(config: JunctionConfig) -> Self {
        Self {
            config,
            models: Models::new(),
            bindings: Vec::new(),
        }
    }

    /// Replace the configuration
    pub fn config(mut self, config: JunctionConfig) -> Self {
        self.config = config;
        self
    }

    /// Model store the worker will own
    pub fn models(mut self, models: Models) -> Self {
        self.models = models;
        self
    }

    /// Add one binding
    pub fn bind(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Add several bindings, in order
    pub fn bindings(mut self, bindings: impl IntoIterator<Item = Binding>) -> Self {
        self.bindings.extend(bindings);
        self
    }

    /// Validate, install the snapshot stream into `output`, and start the worker
    ///
    /// Nothing is allocated or spawned if validation fails.
    #[instrument(
        name = "junction_builder_spawn",
        skip(self, output),
        fields(junction = %self.config.name, bindings = self.bindings.len())
    )]
    pub fn spawn(self, output: &mut OutputSlot) -> Result<JunctionHandle, ValidationError> {
        validate(output, &self.bindings)?;
        validate_membership(&self.models, &self.bindings)?;
        let snapshots = output::install(output)?;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let metrics = Arc::new(JunctionMetrics::new());
        let mut routes = Vec::with_capacity(self.bindings.len());
        let mut inputs = SelectAll::new();
        for (index, binding) in self.bindings.into_iter().enumerate() {
            let (name, inbox, target) = binding.into_parts();
            routes.push(Route::new(index, name, target));
            inputs.push(tagged(index, inbox));
        }

        let dispatcher = Dispatcher {
            name: self.config.name.clone(),
            policy: self.config.closure_policy,
            routes,
            inputs,
            models: self.models,
            snapshots,
            metrics: Arc::clone(&metrics),
        };
        let worker = tokio::spawn(dispatcher.run(cancel_rx));

        Ok(JunctionHandle::new(
            self.config.name,
            cancel_tx,
            metrics,
            worker,
        ))
    }
}

/// One merged input item: the binding index and a value, or `None` once closed
type Event = (usize, Option<Value>);

/// Tag an input's values with its binding index and mark its end
fn tagged(index: usize, inbox: BoxStream<'static, Value>) -> BoxStream<'static, Event> {
    inbox
        .map(move |value| (index, Some(value)))
        .chain(stream::once(future::ready((index, None))))
        .boxed()
}

struct Route {
    name: String,
    target: Target,
    open: bool,
}

impl Route {
    fn new(index: usize, name: Option<String>, target: Target) -> Self {
        Self {
            name: name.unwrap_or_else(|| format!("binding-{index}")),
            target,
            open: true,
        }
    }
}

struct Dispatcher {
    name: String,
    policy: ClosurePolicy,
    routes: Vec<Route>,
    inputs: SelectAll<BoxStream<'static, Event>>,
    models: Models,
    snapshots: SnapshotSender,
    metrics: Arc<JunctionMetrics>,
}

impl Dispatcher {
    #[instrument(name = "junction_run", skip_all, fields(junction = %self.name))]
    async fn run(mut self, mut cancel: watch::Receiver<bool>) -> Termination {
        info!(bindings = self.routes.len(), "Junction started");

        let cause = self.drive(&mut cancel).await;
        let metrics = self.metrics.snapshot();
        telemetry::record_termination(&self.name, &cause);

        info!(
            cause = %cause,
            received = metrics.received,
            published = metrics.published,
            unresolved = metrics.unresolved,
            "Junction terminated"
        );

        // Dropping the sender closes the snapshot stream.
        let Self { models, .. } = self;
        Termination {
            cause,
            models,
            metrics,
        }
    }

    async fn drive(&mut self, cancel: &mut watch::Receiver<bool>) -> TerminationCause {
        loop {
            let event = tokio::select! {
                biased;
                _ = cancelled(cancel) => return TerminationCause::Cancelled,
                event = self.inputs.next() => event,
            };

            // Only an empty merge set ends; with no inputs nothing can arrive.
            let Some((index, value)) = event else {
                cancelled(cancel).await;
                return TerminationCause::Cancelled;
            };

            let outcome = match value {
                Some(value) => self.handle(index, value, cancel).await,
                None => self.close(index),
            };
            if let Err(cause) = outcome {
                return cause;
            }
        }
    }

    async fn handle(
        &mut self,
        index: usize,
        value: Value,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<(), TerminationCause> {
        self.record_received(index);
        let step = self.routes[index].target.deliver(value, &mut self.models);
        match step {
            Step::Unresolved => {
                self.record_unresolved(index);
                trace!(binding = %self.routes[index].name, "No model found, update skipped");
                Ok(())
            }
            Step::Foreign => {
                self.record_unresolved(index);
                warn!(
                    binding = %self.routes[index].name,
                    "Located model is not owned by this junction, update skipped"
                );
                Ok(())
            }
            Step::Applied(snapshot) => {
                let outcome = publish(&self.snapshots, snapshot, cancel).await;
                // A cancelled publish leaves its snapshot queued for the consumer.
                if !matches!(outcome, Err(TerminationCause::ConsumerGone)) {
                    self.metrics.inc_published();
                    telemetry::record_snapshot_published(&self.name);
                }
                outcome?;
                trace!(binding = %self.routes[index].name, "Snapshot published");
                Ok(())
            }
        }
    }

    fn record_received(&self, index: usize) {
        self.metrics.inc_received();
        telemetry::record_update_received(&self.name, &self.routes[index].name);
    }

    fn record_unresolved(&self, index: usize) {
        self.metrics.inc_unresolved();
        telemetry::record_update_unresolved(&self.name, &self.routes[index].name);
    }

    fn close(&mut self, index: usize) -> Result<(), TerminationCause> {
        self.metrics.inc_closed_inputs();
        let route = &mut self.routes[index];
        route.open = false;

        match self.policy {
            ClosurePolicy::Terminate => Err(TerminationCause::SourceClosed {
                binding: index,
                name: route.name.clone(),
            }),
            ClosurePolicy::Detach => {
                warn!(binding = %route.name, "Input closed, binding detached");
                if self.routes.iter().any(|r| r.open) {
                    Ok(())
                } else {
                    Err(TerminationCause::AllSourcesClosed)
                }
            }
        }
    }
}

/// Hand one snapshot to a consumer, waiting until it has been received
///
/// Every earlier snapshot was acknowledged, so the capacity-one stream is
/// empty and the send itself never waits. Shutdown is observed while waiting
/// for the acknowledgement; the snapshot then stays queued and a consumer
/// still holding the stream receives it before the stream ends.
async fn publish(
    snapshots: &SnapshotSender,
    snapshot: Value,
    cancel: &mut watch::Receiver<bool>,
) -> Result<(), TerminationCause> {
    let (ack, received) = oneshot::channel();
    snapshots
        .send(Delivery { snapshot, ack })
        .await
        .map_err(|_| TerminationCause::ConsumerGone)?;

    tokio::select! {
        biased;
        _ = cancelled(cancel) => {
            debug!("Shutdown during publish, snapshot left for the consumer");
            Err(TerminationCause::Cancelled)
        }
        result = received => result.map_err(|_| TerminationCause::ConsumerGone),
    }
}

/// Resolves once shutdown is requested
///
/// A dropped handle never resolves it, so detached junctions keep running.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let handle_dropped = cancel.wait_for(|requested| *requested).await.is_err();
    if handle_dropped {
        std::future::pending::<()>().await;
    }
}
