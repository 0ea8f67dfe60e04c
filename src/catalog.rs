//! Type catalog
//!
//! The container's introspection facility: declared constructors, scope
//! markers and upcasts, keyed by type. Declaring a type does not bind it;
//! it only makes the type buildable.

use crate::component::{CastFn, TypeInfo};
use crate::key::Instance;
use crate::TypeKey;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;

pub(crate) struct Catalog {
    types: DashMap<TypeKey, Arc<TypeInfo>, RandomState>,
    /// (concrete, contract) -> upcast
    casts: DashMap<(TypeKey, TypeKey), CastFn, RandomState>,
}

impl Catalog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            types: DashMap::with_capacity_and_hasher_and_shard_amount(
                capacity,
                RandomState::new(),
                8,
            ),
            casts: DashMap::with_capacity_and_hasher_and_shard_amount(
                capacity,
                RandomState::new(),
                8,
            ),
        }
    }

    /// Add or replace a declaration, along with the upcasts it lists.
    pub fn declare(&self, info: TypeInfo) {
        let key = info.key();
        for (contract, cast) in info.casts() {
            self.casts.insert((key, *contract), *cast);
        }
        self.types.insert(key, Arc::new(info));
    }

    /// Record a single upcast.
    pub fn declare_cast(&self, concrete: TypeKey, contract: TypeKey, cast: CastFn) {
        self.casts.insert((concrete, contract), cast);
    }

    #[inline]
    pub fn info(&self, key: &TypeKey) -> Option<Arc<TypeInfo>> {
        self.types.get(key).map(|info| Arc::clone(info.value()))
    }

    /// Whether `key` carries the singleton marker.
    #[inline]
    pub fn is_singleton(&self, key: &TypeKey) -> bool {
        self.types
            .get(key)
            .map(|info| info.is_singleton())
            .unwrap_or(false)
    }

    /// View `instance` as `to`.
    ///
    /// Identity when the instance is already stored as `to`; otherwise the
    /// recorded upcast, if any. Hands the instance back on failure so the
    /// caller can report what it actually was.
    pub fn coerce(&self, instance: Instance, to: TypeKey) -> Result<Instance, Instance> {
        if instance.key() == to {
            return Ok(instance);
        }
        let cast = self.casts.get(&(instance.key(), to)).map(|c| *c.value());
        match cast.and_then(|cast| cast(&instance)) {
            Some(cast) => Ok(cast),
            None => Err(instance),
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Component, Constructor, Describe};

    trait Animal: Send + Sync {
        fn sound(&self) -> &'static str;
    }

    trait Vehicle: Send + Sync {}

    struct Dog;

    impl Animal for Dog {
        fn sound(&self) -> &'static str {
            "woof"
        }
    }

    crate::implements!(Dog: dyn Animal);

    impl Component for Dog {
        fn describe(info: Describe<Self>) -> Describe<Self> {
            info.singleton()
                .implements::<dyn Animal>()
                .constructor(Constructor::new(|_| Ok(Dog)))
        }
    }

    #[test]
    fn test_declare_and_lookup() {
        let catalog = Catalog::with_capacity(0);
        let key = TypeKey::of::<Dog>();
        assert!(catalog.info(&key).is_none());

        catalog.declare(TypeInfo::of::<Dog>());

        assert!(catalog.is_singleton(&key));
        assert_eq!(catalog.info(&key).unwrap().constructors().len(), 1);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_coerce() {
        let catalog = Catalog::with_capacity(0);
        catalog.declare(TypeInfo::of::<Dog>());

        let dog = Instance::from_value(Dog);
        let same = catalog.coerce(dog.clone(), TypeKey::of::<Dog>()).unwrap();
        assert_eq!(same.key(), TypeKey::of::<Dog>());

        let animal = catalog.coerce(dog.clone(), TypeKey::of::<dyn Animal>()).unwrap();
        assert_eq!(animal.downcast::<dyn Animal>().unwrap().sound(), "woof");

        let rejected = catalog
            .coerce(dog, TypeKey::of::<dyn Vehicle>())
            .unwrap_err();
        assert_eq!(rejected.key(), TypeKey::of::<Dog>());
    }
}
