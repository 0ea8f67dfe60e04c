//! Binding tables for the DI container
//!
//! Uses DashMap for lock-free concurrent access. Every read clones its
//! value out before returning, so no shard guard ever outlives the call
//! that took it. Resolution re-enters these tables recursively and may
//! insert into them, so a guard held across that recursion could deadlock
//! on its own shard.

use crate::catalog::Catalog;
use crate::factory::SingletonFactory;
use crate::key::Instance;
use crate::provider::Injectable;
use crate::TypeKey;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;

/// Shard count for a given expected size.
///
/// Default DashMap uses num_cpus * 4 shards which is overkill for
/// typical containers with a few dozen bindings.
fn shard_amount(capacity: usize) -> usize {
    if capacity <= 16 {
        8
    } else if capacity <= 64 {
        16
    } else {
        32
    }
}

fn table<K, V>(capacity: usize) -> DashMap<K, V, RandomState>
where
    K: Eq + std::hash::Hash,
{
    DashMap::with_capacity_and_hasher_and_shard_amount(
        capacity,
        RandomState::new(),
        shard_amount(capacity),
    )
}

/// A named or qualified binding.
#[derive(Clone, Debug)]
pub enum Binding {
    /// A ready value, used as is
    Value(Instance),
    /// A type to resolve at injection time
    Type(TypeKey),
}

impl Binding {
    /// Bind an owned value.
    #[inline]
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Binding::Value(Instance::from_value(value))
    }

    /// Bind a shared value; every injection gets this same `Arc`.
    #[inline]
    pub fn shared<T: ?Sized + Injectable>(value: Arc<T>) -> Self {
        Binding::Value(Instance::new(value))
    }

    /// Bind a type, resolved whenever the binding is injected.
    #[inline]
    pub fn of<T: ?Sized + Injectable>() -> Self {
        Binding::Type(TypeKey::of::<T>())
    }
}

/// The four binding tables plus the type catalog.
pub(crate) struct Registry {
    /// Key -> cached instance; wins over every other table
    singletons: DashMap<TypeKey, SingletonFactory, RandomState>,
    /// Requested type -> implementation type
    contracts: DashMap<TypeKey, TypeKey, RandomState>,
    named: DashMap<String, Binding, RandomState>,
    /// Qualifier marker -> binding
    qualified: DashMap<TypeKey, Binding, RandomState>,
    catalog: Catalog,
}

impl Registry {
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with pre-allocated capacity in every table.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            singletons: table(capacity),
            contracts: table(capacity),
            named: table(capacity),
            qualified: table(capacity),
            catalog: Catalog::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[inline]
    pub fn insert_singleton(&self, key: TypeKey, factory: SingletonFactory) {
        self.singletons.insert(key, factory);
    }

    #[inline]
    pub fn singleton(&self, key: &TypeKey) -> Option<SingletonFactory> {
        self.singletons.get(key).map(|f| f.value().clone())
    }

    #[inline]
    pub fn insert_contract(&self, contract: TypeKey, implementation: TypeKey) {
        self.contracts.insert(contract, implementation);
    }

    #[inline]
    pub fn contract(&self, key: &TypeKey) -> Option<TypeKey> {
        self.contracts.get(key).map(|k| *k.value())
    }

    #[inline]
    pub fn insert_named(&self, name: String, binding: Binding) {
        self.named.insert(name, binding);
    }

    #[inline]
    pub fn named(&self, name: &str) -> Option<Binding> {
        self.named.get(name).map(|b| b.value().clone())
    }

    #[inline]
    pub fn insert_qualified(&self, qualifier: TypeKey, binding: Binding) {
        self.qualified.insert(qualifier, binding);
    }

    #[inline]
    pub fn qualified(&self, qualifier: &TypeKey) -> Option<Binding> {
        self.qualified.get(qualifier).map(|b| b.value().clone())
    }

    /// Total number of bindings across the four tables.
    pub fn len(&self) -> usize {
        self.singletons.len() + self.contracts.len() + self.named.len() + self.qualified.len()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("singletons", &self.singletons.len())
            .field("contracts", &self.contracts.len())
            .field("named", &self.named.len())
            .field("qualified", &self.qualified.len())
            .field("declared", &self.catalog.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestService {
        value: i32,
    }

    #[test]
    fn test_singleton_insert_and_get() {
        let registry = Registry::new();
        let key = TypeKey::of::<TestService>();

        registry.insert_singleton(
            key,
            SingletonFactory::instance(Instance::from_value(TestService { value: 42 })),
        );

        let service = registry
            .singleton(&key)
            .and_then(|f| f.resolve())
            .and_then(|i| i.downcast::<TestService>())
            .unwrap();
        assert_eq!(service.value, 42);
    }

    #[test]
    fn test_last_write_wins() {
        let registry = Registry::new();
        registry.insert_named("port".into(), Binding::value(1u16));
        registry.insert_named("port".into(), Binding::value(2u16));

        let Some(Binding::Value(port)) = registry.named("port") else {
            panic!("expected a value binding");
        };
        assert_eq!(*port.downcast::<u16>().unwrap(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_tables_are_independent() {
        let registry = Registry::with_capacity(32);
        let key = TypeKey::of::<TestService>();

        registry.insert_contract(key, key);
        registry.insert_qualified(key, Binding::of::<TestService>());

        assert_eq!(registry.contract(&key), Some(key));
        assert!(registry.singleton(&key).is_none());
        assert!(registry.named("TestService").is_none());
        assert!(matches!(registry.qualified(&key), Some(Binding::Type(k)) if k == key));
    }
}
