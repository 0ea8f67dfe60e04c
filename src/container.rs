//! Dependency injection container
//!
//! The `Container` owns the binding tables and the type catalog, and hands
//! resolution off to the resolver. Clones share one registry.

use crate::component::{upcast_instance, CastFn, Component, TypeInfo};
use crate::factory::SingletonFactory;
use crate::key::Instance;
use crate::provider::{Implements, Injectable, Qualifier};
use crate::resolver::Resolver;
use crate::storage::{Binding, Registry};
use crate::{DiError, Result, TypeKey};
use std::sync::{Arc, Weak};

#[cfg(feature = "logging")]
use tracing::debug;

/// Dependency injection container.
///
/// Registration methods take `&self` and may run concurrently with each
/// other and with resolution. Every registration overwrites whatever was
/// bound under the same key before.
///
/// The container registers itself as a singleton, so components can take
/// an `Arc<Container>` parameter. That handle does not keep the registry
/// alive: once every handle returned by [`Container::new`] (and its clones)
/// is dropped, an injected handle resolves to [`DiError::ContainerDropped`]
/// and ignores registrations. A singleton holding it therefore does not
/// keep its own registry alive.
///
/// [`DiError::ContainerDropped`]: crate::DiError::ContainerDropped
///
/// # Examples
///
/// ```rust
/// use autowire::{Component, Constructor, Container, Describe};
///
/// struct Clock;
///
/// impl Component for Clock {
///     fn describe(info: Describe<Self>) -> Describe<Self> {
///         info.singleton().constructor(Constructor::new(|_| Ok(Clock)))
///     }
/// }
///
/// let container = Container::new();
/// container.register_contract::<Clock>();
///
/// let a = container.resolve::<Clock>().unwrap();
/// let b = container.resolve::<Clock>().unwrap();
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// ```
#[derive(Clone)]
pub struct Container {
    handle: Handle,
}

/// How a container handle reaches its registry.
#[derive(Clone)]
enum Handle {
    /// Created by the application; keeps the registry alive
    Owned(Arc<Registry>),
    /// Handed out by the registry itself
    Injected(Weak<Registry>),
}

impl Container {
    /// Create an empty container.
    #[inline]
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// Create a container with pre-allocated capacity.
    ///
    /// Use this when you know approximately how many bindings will be
    /// registered.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_registry(Registry::with_capacity(capacity))
    }

    fn with_registry(registry: Registry) -> Self {
        let registry = Arc::new(registry);
        registry.insert_singleton(
            TypeKey::of::<Container>(),
            SingletonFactory::Container(Arc::downgrade(&registry)),
        );

        #[cfg(feature = "logging")]
        debug!(target: "autowire", "Creating new DI container");

        Self {
            handle: Handle::Owned(registry),
        }
    }

    /// A handle that does not keep `registry` alive.
    #[inline]
    pub(crate) fn injected(registry: Weak<Registry>) -> Self {
        Self {
            handle: Handle::Injected(registry),
        }
    }

    #[inline]
    pub(crate) fn downgrade(&self) -> Weak<Registry> {
        match &self.handle {
            Handle::Owned(registry) => Arc::downgrade(registry),
            Handle::Injected(registry) => registry.clone(),
        }
    }

    /// The registry, unless every owning handle is gone.
    fn registry(&self) -> Option<Arc<Registry>> {
        let registry = match &self.handle {
            Handle::Owned(registry) => Some(registry.clone()),
            Handle::Injected(registry) => registry.upgrade(),
        };

        #[cfg(feature = "logging")]
        if registry.is_none() {
            debug!(target: "autowire", "Container used after its registry was dropped");
        }

        registry
    }

    fn as_ptr(&self) -> *const Registry {
        match &self.handle {
            Handle::Owned(registry) => Arc::as_ptr(registry),
            Handle::Injected(registry) => registry.as_ptr(),
        }
    }

    /// Whether both handles share one registry.
    #[inline]
    pub fn same_as(&self, other: &Container) -> bool {
        std::ptr::eq(self.as_ptr(), other.as_ptr())
    }

    /// Whether the registry behind this handle is still alive.
    #[inline]
    pub fn is_alive(&self) -> bool {
        match &self.handle {
            Handle::Owned(_) => true,
            Handle::Injected(registry) => registry.strong_count() > 0,
        }
    }

    // =========================================================================
    // Registration Methods
    // =========================================================================

    /// Make `T` known to the container without binding it.
    ///
    /// A declared type with a zero-parameter constructor can be resolved
    /// directly; its declaration also supplies the upcasts that named and
    /// qualified bindings are checked against.
    pub fn declare<T: Component>(&self) {
        let info = TypeInfo::of::<T>();

        #[cfg(feature = "logging")]
        debug!(
            target: "autowire",
            service = info.key().name(),
            constructors = info.constructors().len(),
            scope = ?info.scope(),
            "Declaring component"
        );

        if let Some(registry) = self.registry() {
            registry.catalog().declare(info);
        }
    }

    /// Register a pre-built singleton under its own type.
    ///
    /// ```rust
    /// use autowire::Container;
    ///
    /// struct Database { url: String }
    ///
    /// let container = Container::new();
    /// container.register_singleton(Database { url: "postgres://localhost".into() });
    ///
    /// let db = container.resolve::<Database>().unwrap();
    /// assert_eq!(db.url, "postgres://localhost");
    /// ```
    #[inline]
    pub fn register_singleton<T: Send + Sync + 'static>(&self, instance: T) {
        self.register_singleton_as::<T>(Arc::new(instance));
    }

    /// Register a pre-built singleton under `C`, which may be a trait object.
    pub fn register_singleton_as<C: ?Sized + Injectable>(&self, instance: Arc<C>) {
        let key = TypeKey::of::<C>();

        #[cfg(feature = "logging")]
        debug!(
            target: "autowire",
            service = key.name(),
            lifetime = "singleton",
            "Registering singleton instance"
        );

        if let Some(registry) = self.registry() {
            registry.insert_singleton(key, SingletonFactory::instance(Instance::new(instance)));
        }
    }

    /// Make `T` resolvable as itself.
    pub fn register_contract<T: Component>(&self) {
        self.declare::<T>();
        let key = TypeKey::of::<T>();

        #[cfg(feature = "logging")]
        debug!(
            target: "autowire",
            service = key.name(),
            "Registering contract"
        );

        if let Some(registry) = self.registry() {
            registry.insert_contract(key, key);
        }
    }

    /// Bind the contract `C` to the implementation `I`.
    ///
    /// ```rust
    /// use autowire::{implements, Component, Constructor, Container, Describe};
    ///
    /// trait Greeter: Send + Sync {
    ///     fn greet(&self) -> String;
    /// }
    ///
    /// struct English;
    ///
    /// impl Greeter for English {
    ///     fn greet(&self) -> String { "hello".into() }
    /// }
    ///
    /// implements!(English: dyn Greeter);
    ///
    /// impl Component for English {
    ///     fn describe(info: Describe<Self>) -> Describe<Self> {
    ///         info.constructor(Constructor::new(|_| Ok(English)))
    ///     }
    /// }
    ///
    /// let container = Container::new();
    /// container.register_contract_as::<dyn Greeter, English>();
    /// assert_eq!(container.resolve::<dyn Greeter>().unwrap().greet(), "hello");
    /// ```
    pub fn register_contract_as<C, I>(&self)
    where
        C: ?Sized + Injectable,
        I: Component + Implements<C>,
    {
        self.declare::<I>();
        let contract = TypeKey::of::<C>();
        let implementation = TypeKey::of::<I>();

        #[cfg(feature = "logging")]
        debug!(
            target: "autowire",
            contract = contract.name(),
            implementation = implementation.name(),
            "Registering contract"
        );

        if let Some(registry) = self.registry() {
            registry.catalog().declare_cast(
                implementation,
                contract,
                upcast_instance::<I, C> as CastFn,
            );
            registry.insert_contract(contract, implementation);
        }
    }

    /// Bind a value or a type to a name.
    ///
    /// The bound value must be assignable to the parameter that asks for
    /// it. For a trait-object parameter, either bind the value already
    /// upcast with [`Binding::shared`], or [`declare`](Self::declare) its
    /// concrete type so the upcast is known; otherwise resolution fails with
    /// [`DiError::IncompatibleBinding`].
    ///
    /// ```rust
    /// use autowire::{Binding, Container};
    ///
    /// let container = Container::new();
    /// container.register_named("database_url", Binding::value(String::from("sqlite::memory:")));
    /// ```
    pub fn register_named(&self, name: impl Into<String>, binding: Binding) {
        let name = name.into();

        #[cfg(feature = "logging")]
        debug!(
            target: "autowire",
            name = %name,
            binding = ?binding,
            "Registering named binding"
        );

        if let Some(registry) = self.registry() {
            registry.insert_named(name, binding);
        }
    }

    /// Bind a value or a type to the qualifier `Q`.
    ///
    /// Assignability works as for [`register_named`](Self::register_named):
    /// a concrete value for a trait-object parameter needs its type declared,
    /// or can be bound pre-upcast.
    ///
    /// ```rust
    /// use autowire::{implements, Binding, Component, Constructor, Container, Describe, Qualifier};
    /// use std::sync::Arc;
    ///
    /// trait Cache: Send + Sync {}
    ///
    /// struct Memory;
    /// impl Cache for Memory {}
    /// implements!(Memory: dyn Cache);
    ///
    /// impl Component for Memory {
    ///     fn describe(info: Describe<Self>) -> Describe<Self> {
    ///         info.implements::<dyn Cache>().constructor(Constructor::new(|_| Ok(Memory)))
    ///     }
    /// }
    ///
    /// struct Primary;
    /// impl Qualifier for Primary {}
    ///
    /// let container = Container::new();
    /// container.declare::<Memory>();
    /// container.register_qualified::<Primary>(Binding::value(Memory));
    ///
    /// // or, without declaring
    /// let cache: Arc<dyn Cache> = Arc::new(Memory);
    /// container.register_qualified::<Primary>(Binding::shared(cache));
    /// ```
    pub fn register_qualified<Q: Qualifier>(&self, binding: Binding) {
        let qualifier = TypeKey::of::<Q>();

        #[cfg(feature = "logging")]
        debug!(
            target: "autowire",
            qualifier = qualifier.name(),
            binding = ?binding,
            "Registering qualified binding"
        );

        if let Some(registry) = self.registry() {
            registry.insert_qualified(qualifier, binding);
        }
    }

    // =========================================================================
    // Resolution Methods
    // =========================================================================

    /// Build or fetch an instance of `T`, wiring its dependencies.
    #[inline]
    pub fn resolve<T: ?Sized + Injectable>(&self) -> Result<Arc<T>> {
        let result = match self.registry() {
            Some(registry) => Resolver::new(&registry).resolve::<T>(),
            None => Err(DiError::ContainerDropped),
        };

        #[cfg(feature = "logging")]
        if let Err(err) = &result {
            debug!(
                target: "autowire",
                service = std::any::type_name::<T>(),
                error = %err,
                "Resolution failed"
            );
        }

        result
    }

    /// Resolve, discarding the error.
    #[inline]
    pub fn try_resolve<T: ?Sized + Injectable>(&self) -> Option<Arc<T>> {
        self.resolve::<T>().ok()
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    /// Whether `T` has a singleton or contract binding.
    #[inline]
    pub fn contains<T: ?Sized + Injectable>(&self) -> bool {
        let key = TypeKey::of::<T>();
        self.registry().is_some_and(|registry| {
            registry.singleton(&key).is_some() || registry.contract(&key).is_some()
        })
    }

    /// The catalog entry for `T`, if it was declared.
    #[inline]
    pub fn type_info<T: ?Sized + Injectable>(&self) -> Option<Arc<TypeInfo>> {
        self.registry()?.catalog().info(&TypeKey::of::<T>())
    }

    /// Number of bindings across all tables, the self-registration included.
    ///
    /// Zero once the registry is gone.
    #[inline]
    pub fn len(&self) -> usize {
        self.registry().map_or(0, |registry| registry.len())
    }

    /// False while the registry is alive: the container is bound to itself.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let owned = matches!(self.handle, Handle::Owned(_));
        f.debug_struct("Container")
            .field("owned", &owned)
            .field("registry", &self.registry())
            .finish()
    }
}
