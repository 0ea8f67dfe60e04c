//! Singleton factories
//!
//! The singleton table maps a key to a zero-argument producer of the cached
//! instance. Most entries hold the instance itself; the container's own
//! entry hands out a weak container handle instead, so neither the registry
//! nor anything it caches holds a strong reference back to it.

use crate::container::Container;
use crate::key::Instance;
use crate::storage::Registry;
use std::sync::{Arc, Weak};

#[cfg(feature = "logging")]
use tracing::trace;

/// Type-erased singleton producer for storage
#[derive(Clone)]
pub(crate) enum SingletonFactory {
    /// Pre-built instance, shared on every resolve
    Instance(Instance),
    /// The owning container
    Container(Weak<Registry>),
}

impl SingletonFactory {
    /// Wrap an instance
    #[inline]
    pub fn instance(instance: Instance) -> Self {
        SingletonFactory::Instance(instance)
    }

    /// Produce the singleton.
    ///
    /// Returns `None` only for a container entry whose registry is gone,
    /// which cannot happen while a resolution on that registry is running.
    #[inline]
    pub fn resolve(&self) -> Option<Instance> {
        match self {
            SingletonFactory::Instance(instance) => Some(instance.clone()),
            SingletonFactory::Container(registry) => {
                if registry.strong_count() == 0 {
                    return None;
                }

                #[cfg(feature = "logging")]
                trace!(
                    target: "autowire",
                    "Handing out the owning container"
                );

                Some(Instance::new(Arc::new(Container::injected(registry.clone()))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeKey;

    #[derive(Debug)]
    struct TestService {
        id: u32,
    }

    #[test]
    fn test_instance_factory_shares() {
        let factory = SingletonFactory::instance(Instance::from_value(TestService { id: 42 }));

        let a = factory.resolve().unwrap().downcast::<TestService>().unwrap();
        let b = factory.resolve().unwrap().downcast::<TestService>().unwrap();

        assert_eq!(a.id, 42);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_container_factory() {
        let container = Container::new();
        let factory = SingletonFactory::Container(container.downgrade());

        assert_eq!(factory.resolve().unwrap().key(), TypeKey::of::<Container>());

        let resolved = factory.resolve().unwrap().downcast::<Container>().unwrap();
        assert!(resolved.same_as(&container));
        assert!(resolved.is_alive());

        drop(container);
        assert!(factory.resolve().is_none());
        assert!(!resolved.is_alive());
    }

    #[test]
    fn test_container_factory_handle_is_weak() {
        let container = Container::new();
        let factory = SingletonFactory::Container(container.downgrade());

        // an outstanding injected handle must not keep the registry alive
        let injected = factory.resolve().unwrap().downcast::<Container>().unwrap();
        drop(container);

        assert!(factory.resolve().is_none());
        assert!(matches!(
            injected.resolve::<Container>(),
            Err(crate::DiError::ContainerDropped)
        ));
    }
}
