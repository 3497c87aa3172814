//! Models - the store of model instances a junction mutates
//!
//! The caller fills a `Models` store, hands it to the junction, and gets it
//! back when the dispatcher terminates. While the dispatcher runs it is the
//! only owner, so models are mutated without locks.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::TypeDescriptor;
use parking_lot::RwLock;

use crate::binding::Resolver;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one `Models` store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreId(u64);

/// Type-erased model reference, as carried by `Locate::Fixed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelKey {
    store: StoreId,
    index: usize,
    model: TypeDescriptor,
}

impl ModelKey {
    /// Type of the referenced model
    pub fn model_type(&self) -> TypeDescriptor {
        self.model
    }

    /// Store the reference was issued by
    pub fn store(&self) -> StoreId {
        self.store
    }
}

/// Typed handle to a model inside a `Models` store
///
/// Cheap to copy; holding one grants no access by itself.
pub struct ModelRef<M> {
    store: StoreId,
    index: usize,
    _marker: PhantomData<fn() -> M>,
}

impl<M: Any> ModelRef<M> {
    /// Erase the model type
    pub fn key(&self) -> ModelKey {
        ModelKey {
            store: self.store,
            index: self.index,
            model: TypeDescriptor::of::<M>(),
        }
    }
}

impl<M> Clone for ModelRef<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for ModelRef<M> {}

impl<M> PartialEq for ModelRef<M> {
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store && self.index == other.index
    }
}

impl<M> Eq for ModelRef<M> {}

impl<M> Hash for ModelRef<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.store.hash(state);
        self.index.hash(state);
    }
}

impl<M> fmt::Debug for ModelRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRef")
            .field("store", &self.store)
            .field("index", &self.index)
            .finish()
    }
}

struct Entry {
    model: TypeDescriptor,
    value: Box<dyn Any + Send>,
}

/// Heterogeneous store of model instances
pub struct Models {
    id: StoreId,
    entries: Vec<Entry>,
}

impl Models {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            id: StoreId(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed)),
            entries: Vec::new(),
        }
    }

    /// Identity of this store
    pub fn id(&self) -> StoreId {
        self.id
    }

    /// Add a model, returning its reference
    pub fn insert<M: Any + Send>(&mut self, model: M) -> ModelRef<M> {
        let index = self.entries.len();
        self.entries.push(Entry {
            model: TypeDescriptor::of::<M>(),
            value: Box::new(model),
        });
        ModelRef {
            store: self.id,
            index,
            _marker: PhantomData,
        }
    }

    /// Borrow a model
    ///
    /// Returns `None` for a reference issued by another store.
    pub fn get<M: Any>(&self, model: ModelRef<M>) -> Option<&M> {
        if model.store != self.id {
            return None;
        }
        self.entries.get(model.index)?.value.downcast_ref::<M>()
    }

    /// Mutably borrow a model
    pub fn get_mut<M: Any>(&mut self, model: ModelRef<M>) -> Option<&mut M> {
        if model.store != self.id {
            return None;
        }
        self.entries.get_mut(model.index)?.value.downcast_mut::<M>()
    }

    /// Whether `key` names a model of the recorded type in this store
    pub fn contains(&self, key: &ModelKey) -> bool {
        key.store == self.id
            && self
                .entries
                .get(key.index)
                .is_some_and(|entry| entry.model == key.model)
    }

    /// Number of models
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn slot_mut(&mut self, key: &ModelKey) -> Option<&mut (dyn Any + Send)> {
        if !self.contains(key) {
            return None;
        }
        Some(self.entries[key.index].value.as_mut())
    }
}

impl Default for Models {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Models {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Models")
            .field("id", &self.id)
            .field(
                "types",
                &self.entries.iter().map(|e| e.model).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Keyed index of model references
///
/// Clones and the resolvers built from a directory share one table, so an
/// entry registered after a junction starts is visible to its bindings.
pub struct Directory<K, M> {
    entries: Arc<RwLock<HashMap<K, ModelRef<M>>>>,
}

impl<K, M> Directory<K, M>
where
    K: Eq + Hash + Send + Sync + 'static,
    M: Any,
{
    /// Create an empty directory
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a model under `key`, replacing any previous entry
    pub fn insert(&self, key: K, model: ModelRef<M>) -> Option<ModelRef<M>> {
        self.entries.write().insert(key, model)
    }

    /// Unregister `key`; later updates for it resolve to "not found"
    pub fn remove(&self, key: &K) -> Option<ModelRef<M>> {
        self.entries.write().remove(key)
    }

    /// Look up a model reference
    pub fn get(&self, key: &K) -> Option<ModelRef<M>> {
        self.entries.read().get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Build a resolver that keys updates of type `T` into this directory
    ///
    /// Updates whose key is not registered when they arrive resolve to
    /// "not found".
    pub fn resolver<T, F>(&self, key_of: F) -> Resolver
    where
        T: Any,
        F: Fn(&T) -> K + Send + 'static,
    {
        let entries = Arc::clone(&self.entries);
        Resolver::new(move |update: &T| entries.read().get(&key_of(update)).copied())
    }
}

impl<K, M> Clone for Directory<K, M> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, M> Default for Directory<K, M>
where
    K: Eq + Hash + Send + Sync + 'static,
    M: Any,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, M> fmt::Debug for Directory<K, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.read().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter(u32);

    #[test]
    fn test_insert_and_get() {
        let mut models = Models::new();
        let a = models.insert(Counter(1));
        let b = models.insert("label".to_string());

        assert_eq!(models.len(), 2);
        assert_eq!(models.get(a), Some(&Counter(1)));
        assert_eq!(models.get(b).map(String::as_str), Some("label"));

        models.get_mut(a).unwrap().0 += 1;
        assert_eq!(models.get(a), Some(&Counter(2)));
    }

    #[test]
    fn test_foreign_reference_rejected() {
        let mut first = Models::new();
        let mut second = Models::new();
        let foreign = first.insert(Counter(7));
        second.insert(Counter(0));

        assert_ne!(first.id(), second.id());
        assert!(second.get(foreign).is_none());
        assert!(!second.contains(&foreign.key()));
        assert!(second.slot_mut(&foreign.key()).is_none());
        assert!(first.contains(&foreign.key()));
    }

    #[test]
    fn test_key_carries_model_type() {
        let mut models = Models::new();
        let r = models.insert(Counter(0));
        assert!(r.key().model_type().is::<Counter>());
        assert_eq!(r.key().store(), models.id());
    }

    #[test]
    fn test_directory_shared_between_clones() {
        let mut models = Models::new();
        let directory = Directory::new();
        let ann = models.insert(Counter(23));
        directory.insert(123u32, ann);

        let shared = directory.clone();
        assert_eq!(shared.get(&123), Some(ann));
        assert_eq!(shared.get(&456), None);
        assert_eq!(shared.len(), 1);
    }

    #[test]
    fn test_directory_entries_added_later_reach_clones_and_resolvers() {
        let mut models = Models::new();
        let directory = Directory::new();
        let resolver = directory.resolver(|id: &u32| *id);
        let shared = directory.clone();

        let ann = models.insert(Counter(23));
        directory.insert(123u32, ann);
        assert_eq!(shared.get(&123), Some(ann));
        assert_eq!(resolver.resolve(&123u32), Some(ann.key()));

        shared.remove(&123);
        assert!(directory.is_empty());
        assert_eq!(resolver.resolve(&123u32), None);
    }
}
