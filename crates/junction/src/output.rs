//! Output slot and snapshot stream
//!
//! A capacity-1 channel plus a per-snapshot acknowledgement gives rendezvous
//! semantics: the dispatcher's publish completes only after a consumer has
//! taken the snapshot out of the stream.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use contracts::{TypeDescriptor, ValidationError};
use tokio::sync::{mpsc, oneshot};
use tracing::error;

use crate::binding::Value;

pub use tokio::sync::mpsc::error::TryRecvError;

/// One snapshot in flight, with the acknowledgement the publisher waits on
pub(crate) struct Delivery {
    pub(crate) snapshot: Value,
    pub(crate) ack: oneshot::Sender<()>,
}

pub(crate) type SnapshotSender = mpsc::Sender<Delivery>;

type MakeEndpoint = fn(mpsc::Receiver<Delivery>) -> Box<dyn Any + Send>;

enum Content {
    Snapshots {
        stream: TypeDescriptor,
        element: TypeDescriptor,
        make: MakeEndpoint,
    },
    Other(TypeDescriptor),
}

enum SlotState {
    Empty,
    Filled(Box<dyn Any + Send>),
    Taken,
}

/// Write-once destination for a junction's snapshot stream
///
/// # Example
///
/// ```ignore
/// let mut out = OutputSlot::snapshots::<Person>();
/// let handle = Junction::new(&mut out, models, bindings)?;
/// let mut snapshots = out.take::<Person>().unwrap();
/// ```
pub struct OutputSlot {
    content: Content,
    state: SlotState,
}

impl OutputSlot {
    /// A slot expecting a stream of `M` snapshots
    pub fn snapshots<M: Send + 'static>() -> Self {
        Self {
            content: Content::Snapshots {
                stream: TypeDescriptor::of::<SnapshotStream<M>>(),
                element: TypeDescriptor::of::<M>(),
                make: |rx| Box::new(SnapshotStream::<M>::new(rx)) as Box<dyn Any + Send>,
            },
            state: SlotState::Empty,
        }
    }

    /// A slot expecting an arbitrary `C`; junctions reject it
    pub fn expecting<C: 'static>() -> Self {
        Self {
            content: Content::Other(TypeDescriptor::of::<C>()),
            state: SlotState::Empty,
        }
    }

    /// Type of the content this slot expects
    pub fn content_type(&self) -> TypeDescriptor {
        match &self.content {
            Content::Snapshots { stream, .. } => *stream,
            Content::Other(ty) => *ty,
        }
    }

    /// Snapshot element type, if this slot expects a snapshot stream
    pub fn element_type(&self) -> Option<TypeDescriptor> {
        match &self.content {
            Content::Snapshots { element, .. } => Some(*element),
            Content::Other(_) => None,
        }
    }

    /// Whether an endpoint has been installed (taken or not)
    pub fn is_written(&self) -> bool {
        !matches!(self.state, SlotState::Empty)
    }

    /// Take the installed snapshot stream
    ///
    /// Returns `None` if nothing is installed, it was already taken, or `M`
    /// is not the slot's element type.
    pub fn take<M: 'static>(&mut self) -> Option<SnapshotStream<M>> {
        match std::mem::replace(&mut self.state, SlotState::Taken) {
            SlotState::Filled(endpoint) => match endpoint.downcast::<SnapshotStream<M>>() {
                Ok(stream) => Some(*stream),
                Err(endpoint) => {
                    self.state = SlotState::Filled(endpoint);
                    None
                }
            },
            other => {
                self.state = other;
                None
            }
        }
    }
}

impl fmt::Debug for OutputSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            SlotState::Empty => "empty",
            SlotState::Filled(_) => "filled",
            SlotState::Taken => "taken",
        };
        f.debug_struct("OutputSlot")
            .field("content", &self.content_type())
            .field("state", &state)
            .finish()
    }
}

/// Allocate the snapshot channel and install its receive end into `slot`
///
/// Returns the send end for the dispatcher.
pub(crate) fn install(slot: &mut OutputSlot) -> Result<SnapshotSender, ValidationError> {
    if slot.is_written() {
        return Err(ValidationError::OutputNotWritableSlot {
            content: slot.content_type(),
        });
    }
    let Content::Snapshots { make, .. } = &slot.content else {
        return Err(ValidationError::OutputNotStreamType {
            actual: slot.content_type(),
        });
    };
    let (tx, rx) = mpsc::channel(1);
    slot.state = SlotState::Filled(make(rx));
    Ok(tx)
}

/// Receive end of a junction's snapshot stream
///
/// Every snapshot is acknowledged as soon as it is received, which releases
/// the dispatcher to pull the next update.
pub struct SnapshotStream<M> {
    rx: mpsc::Receiver<Delivery>,
    _marker: PhantomData<fn() -> M>,
}

impl<M: 'static> SnapshotStream<M> {
    fn new(rx: mpsc::Receiver<Delivery>) -> Self {
        Self {
            rx,
            _marker: PhantomData,
        }
    }

    /// Receive the next snapshot
    ///
    /// Returns `None` once the dispatcher has terminated.
    pub async fn recv(&mut self) -> Option<M> {
        loop {
            let delivery = self.rx.recv().await?;
            if let Some(snapshot) = Self::accept(delivery) {
                return Some(snapshot);
            }
        }
    }

    /// Receive a snapshot if one is waiting
    pub fn try_recv(&mut self) -> Result<M, TryRecvError> {
        loop {
            let delivery = self.rx.try_recv()?;
            if let Some(snapshot) = Self::accept(delivery) {
                return Ok(snapshot);
            }
        }
    }

    fn accept(delivery: Delivery) -> Option<M> {
        // The publisher may have been cancelled mid-handoff; nothing to release then.
        let _ = delivery.ack.send(());
        match delivery.snapshot.downcast::<M>() {
            Ok(snapshot) => Some(*snapshot),
            Err(_) => {
                error!(
                    expected = std::any::type_name::<M>(),
                    "snapshot of unexpected type discarded"
                );
                None
            }
        }
    }
}

impl<M> fmt::Debug for SnapshotStream<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStream")
            .field("element", &std::any::type_name::<M>())
            .finish_non_exhaustive()
    }
}
