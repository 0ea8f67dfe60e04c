//! Marker traits and deferred provider handles
//!
//! These traits define what can be injected, what a qualifier is, and how a
//! concrete type is viewed through a contract.

use crate::resolver::Resolver;
use crate::storage::Registry;
use crate::{DiError, Result, TypeKey};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

/// Marker trait for types that can be stored in the container.
///
/// This is automatically implemented for all types that are `Send + Sync + 'static`,
/// including trait objects whose trait has `Send + Sync` supertraits.
pub trait Injectable: Send + Sync + 'static {}

// Blanket implementation - everything that's Send + Sync + 'static is Injectable
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Marker trait for qualifier tags.
///
/// A qualifier is a zero-sized type used only as a key into the qualifier
/// table, distinguishing bindings that would otherwise share a type.
///
/// ```rust
/// use autowire::Qualifier;
///
/// struct Primary;
/// impl Qualifier for Primary {}
/// ```
pub trait Qualifier: 'static {}

/// Whether the container caches a type after its first resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// New instance on every resolve
    #[default]
    Prototype,

    /// Constructed once, then reused for the container's lifetime
    Singleton,
}

/// Views `Arc<Self>` as `Arc<C>`.
///
/// This is the compile-time half of the assignability check: a contract
/// can only be bound to an implementation that implements this trait for
/// it. Every type implements it for itself; use [`implements!`] for trait
/// objects.
///
/// [`implements!`]: crate::implements
pub trait Implements<C: ?Sized + Injectable>: Injectable {
    fn upcast(self: Arc<Self>) -> Arc<C>;
}

impl<T: ?Sized + Injectable> Implements<T> for T {
    #[inline]
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Declare that a type can be viewed through one or more contracts.
///
/// ```rust
/// use autowire::implements;
///
/// trait Greeter: Send + Sync {}
/// struct English;
/// impl Greeter for English {}
///
/// implements!(English: dyn Greeter);
/// ```
#[macro_export]
macro_rules! implements {
    ($ty:ty: $($contract:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$contract> for $ty {
                #[inline]
                fn upcast(self: $crate::Arc<Self>) -> $crate::Arc<$contract> {
                    self
                }
            }
        )+
    };
}

/// Untyped provider state: what to resolve and where.
#[derive(Clone)]
pub(crate) struct ProviderHandle {
    registry: Weak<Registry>,
    key: TypeKey,
}

impl ProviderHandle {
    #[inline]
    pub(crate) fn new(registry: Weak<Registry>, key: TypeKey) -> Self {
        Self { registry, key }
    }

    #[inline]
    pub(crate) fn key(&self) -> TypeKey {
        self.key
    }
}

/// Deferred resolution of `T`.
///
/// Injected in place of an instance when a constructor parameter is
/// declared with [`Parameter::provider`](crate::Parameter::provider).
/// Nothing is resolved until [`get`](Provider::get) is called, and nothing
/// is cached: every call is a fresh top-level resolution that sees the
/// bindings as they are at that moment. This is also what breaks
/// constructor cycles.
///
/// The provider holds the container weakly; calling `get` after the last
/// container handle is dropped yields [`DiError::ContainerDropped`].
pub struct Provider<T: ?Sized> {
    handle: ProviderHandle,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Injectable> Provider<T> {
    pub(crate) fn from_handle(handle: ProviderHandle) -> Result<Self> {
        if handle.key != TypeKey::of::<T>() {
            return Err(DiError::Internal(format!(
                "provider for {} requested as Provider<{}>",
                handle.key,
                std::any::type_name::<T>()
            )));
        }
        Ok(Self {
            handle,
            _marker: PhantomData,
        })
    }

    /// Resolve `T` now.
    pub fn get(&self) -> Result<Arc<T>> {
        let registry = self
            .handle
            .registry
            .upgrade()
            .ok_or(DiError::ContainerDropped)?;
        Resolver::new(&registry).resolve::<T>()
    }

    /// The type this provider resolves.
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.handle.key
    }
}

impl<T: ?Sized> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("key", &self.handle.key)
            .field("live", &(self.handle.registry.strong_count() > 0))
            .finish()
    }
}
