//! # Junction
//!
//! Dynamic fan-in merge combinator.
//!
//! Responsibilities:
//! - Bind any number of typed update streams to shared model instances
//! - Validate bindings against the output slot before anything runs
//! - Run one worker that applies each update and publishes a model snapshot
//! - Report why the worker stopped and hand the models back
//!
//! ## Usage Example
//!
//! ```ignore
//! use junction::{Binding, Junction, Models, OutputSlot};
//!
//! let mut models = Models::new();
//! let jeff = models.insert(Person { name: "Jeff".into(), age: 56 });
//!
//! let (names_tx, names_rx) = tokio::sync::mpsc::channel(8);
//! let mut out = OutputSlot::snapshots::<Person>();
//! let handle = Junction::new(
//!     &mut out,
//!     models,
//!     vec![Binding::new(names_rx, |p: &mut Person, n: String| p.name = n).fixed(jeff)],
//! )?;
//!
//! let mut snapshots = out.take::<Person>().unwrap();
//! names_tx.send("Fishy Bob".into()).await?;
//! let person = snapshots.recv().await;
//! ```

pub mod binding;
pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod model;
pub mod output;
pub mod validator;

pub use binding::{Apply, Binding, Inlet, Locate, Resolver};
pub use contracts::{ClosurePolicy, JunctionConfig, TerminationCause, TypeDescriptor};
pub use dispatcher::{Junction, JunctionBuilder};
pub use error::{JunctionError, ValidationError};
pub use handle::{JunctionHandle, Termination};
pub use metrics::{JunctionMetrics, MetricsSnapshot};
pub use model::{Directory, ModelKey, ModelRef, Models, StoreId};
pub use output::{OutputSlot, SnapshotStream, TryRecvError};
pub use validator::validate;
