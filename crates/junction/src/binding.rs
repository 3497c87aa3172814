//! Binding - descriptor tying one input stream to the models it updates
//!
//! A binding is built generically per element type and erased immediately,
//! so the dispatcher holds a homogeneous `Vec<Binding>`. Each binding records
//! the type descriptors of its parts; `validate` checks them against the
//! output slot before anything runs.

use std::any::Any;
use std::fmt;
use std::task::{Context, Poll};

use contracts::TypeDescriptor;
use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc;

use crate::model::{ModelKey, ModelRef, Models};

/// Boxed update value or snapshot moving through the dispatcher
pub(crate) type Value = Box<dyn Any + Send>;

/// Receive side of an update stream
pub trait Inlet<T>: Send + 'static {
    /// Poll for the next value; `Ready(None)` means the stream is exhausted
    fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<T>>;
}

impl<T: Send + 'static> Inlet<T> for mpsc::Receiver<T> {
    fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<T>> {
        mpsc::Receiver::poll_recv(self, cx)
    }
}

impl<T: Send + 'static> Inlet<T> for mpsc::UnboundedReceiver<T> {
    fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<T>> {
        mpsc::UnboundedReceiver::poll_recv(self, cx)
    }
}

/// Erase an inlet into a stream of boxed values
fn inbox<T, I>(mut inlet: I) -> BoxStream<'static, Value>
where
    T: Send + 'static,
    I: Inlet<T>,
{
    stream::poll_fn(move |cx| inlet.poll_recv(cx))
        .map(|value| Box::new(value) as Value)
        .boxed()
}

type ApplyFn = Box<dyn FnMut(&mut (dyn Any + Send), Value) -> Option<Value> + Send>;

/// Update rule: mutates a model of type `M` with a value of type `U`
///
/// Produces the by-value snapshot of the model after each application.
pub struct Apply {
    model: TypeDescriptor,
    value: TypeDescriptor,
    rule: ApplyFn,
}

impl Apply {
    /// Wrap an update rule
    pub fn new<M, U, F>(mut rule: F) -> Self
    where
        M: Clone + Send + 'static,
        U: Send + 'static,
        F: FnMut(&mut M, U) + Send + 'static,
    {
        let erased = move |model: &mut (dyn Any + Send), value: Value| {
            let model = model.downcast_mut::<M>()?;
            let value = value.downcast::<U>().ok()?;
            rule(model, *value);
            Some(Box::new(model.clone()) as Value)
        };
        Self {
            model: TypeDescriptor::of::<M>(),
            value: TypeDescriptor::of::<U>(),
            rule: Box::new(erased),
        }
    }

    /// Model type the rule mutates
    pub fn model_type(&self) -> TypeDescriptor {
        self.model
    }

    /// Value type the rule consumes
    pub fn value_type(&self) -> TypeDescriptor {
        self.value
    }

    fn call(&mut self, model: &mut (dyn Any + Send), value: Value) -> Option<Value> {
        (self.rule)(model, value)
    }
}

impl fmt::Debug for Apply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Apply")
            .field("model", &self.model)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

type ResolveFn = Box<dyn Fn(&(dyn Any + Send)) -> Option<ModelKey> + Send>;

/// Maps an update value to the model it targets, or "not found"
pub struct Resolver {
    param: TypeDescriptor,
    model: TypeDescriptor,
    resolve: ResolveFn,
}

impl Resolver {
    /// Wrap a lookup function
    pub fn new<Q, M, F>(lookup: F) -> Self
    where
        Q: Any,
        M: Any,
        F: Fn(&Q) -> Option<ModelRef<M>> + Send + 'static,
    {
        let erased = move |value: &(dyn Any + Send)| {
            value
                .downcast_ref::<Q>()
                .and_then(&lookup)
                .map(|model| model.key())
        };
        Self {
            param: TypeDescriptor::of::<Q>(),
            model: TypeDescriptor::of::<M>(),
            resolve: Box::new(erased),
        }
    }

    /// Type the resolver inspects
    pub fn param_type(&self) -> TypeDescriptor {
        self.param
    }

    /// Model type the resolver returns references to
    pub fn model_type(&self) -> TypeDescriptor {
        self.model
    }

    pub(crate) fn resolve(&self, value: &(dyn Any + Send)) -> Option<ModelKey> {
        (self.resolve)(value)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("param", &self.param)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// How a binding finds the model an update applies to
#[derive(Debug, Default)]
pub enum Locate {
    /// No locator configured; rejected by validation
    #[default]
    Unset,
    /// Every update targets the same model
    Fixed(ModelKey),
    /// Each update is resolved individually and may miss
    Resolved(Resolver),
}

impl Locate {
    /// Always target `model`
    pub fn fixed<M: Any>(model: ModelRef<M>) -> Self {
        Self::Fixed(model.key())
    }

    fn target(&self, value: &(dyn Any + Send)) -> Option<ModelKey> {
        match self {
            Self::Unset => None,
            Self::Fixed(key) => Some(*key),
            Self::Resolved(resolver) => resolver.resolve(value),
        }
    }
}

/// Outcome of delivering one value to its model
pub(crate) enum Step {
    /// The locator reported "not found"
    Unresolved,
    /// The located model is not in the store the dispatcher owns
    Foreign,
    /// The update was applied; carries the model snapshot
    Applied(Value),
}

/// Update rule and locator of a binding, once its input has been detached
pub(crate) struct Target {
    apply: Apply,
    locate: Locate,
}

impl Target {
    /// Resolve, apply and snapshot one received value
    pub(crate) fn deliver(&mut self, value: Value, models: &mut Models) -> Step {
        let Some(key) = self.locate.target(&*value) else {
            return Step::Unresolved;
        };
        let Some(model) = models.slot_mut(&key) else {
            return Step::Foreign;
        };
        match self.apply.call(model, value) {
            Some(snapshot) => Step::Applied(snapshot),
            None => Step::Foreign,
        }
    }
}

/// One input stream with its update rule and model locator
pub struct Binding {
    name: Option<String>,
    input: TypeDescriptor,
    inbox: BoxStream<'static, Value>,
    target: Target,
}

impl Binding {
    /// Bind an input stream to an update rule taking the stream's elements
    ///
    /// The rule's value type is the input's element type, so the pair cannot
    /// disagree. The locator starts unset; follow with `fixed`, `resolved` or
    /// `locate`.
    pub fn new<T, I, M, F>(input: I, rule: F) -> Self
    where
        T: Send + 'static,
        I: Inlet<T>,
        M: Clone + Send + 'static,
        F: FnMut(&mut M, T) + Send + 'static,
    {
        Self::with_apply::<T, I>(input, Apply::new(rule))
    }

    /// Bind an input stream to an already erased update rule
    ///
    /// `validate` rejects the binding if the rule's value type is not the
    /// input's element type.
    pub fn with_apply<T, I>(input: I, apply: Apply) -> Self
    where
        T: Send + 'static,
        I: Inlet<T>,
    {
        Self {
            name: None,
            input: TypeDescriptor::of::<T>(),
            inbox: inbox(input),
            target: Target {
                apply,
                locate: Locate::Unset,
            },
        }
    }

    /// Target one fixed model
    pub fn fixed<M: Any>(self, model: ModelRef<M>) -> Self {
        self.locate(Locate::fixed(model))
    }

    /// Resolve the target model per update
    pub fn resolved(self, resolver: Resolver) -> Self {
        self.locate(Locate::Resolved(resolver))
    }

    /// Set the locator
    pub fn locate(mut self, locate: Locate) -> Self {
        self.target.locate = locate;
        self
    }

    /// Name used in logs and termination causes
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Binding name, if set
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Element type of the input stream
    pub fn input_type(&self) -> TypeDescriptor {
        self.input
    }

    /// Update rule
    pub fn apply_rule(&self) -> &Apply {
        &self.target.apply
    }

    /// Model locator
    pub fn locator(&self) -> &Locate {
        &self.target.locate
    }

    /// Split into the input stream and the rule that consumes it
    pub(crate) fn into_parts(self) -> (Option<String>, BoxStream<'static, Value>, Target) {
        (self.name, self.inbox, self.target)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("input", &self.input)
            .field("apply", &self.target.apply)
            .field("locate", &self.target.locate)
            .finish_non_exhaustive()
    }
}
