//! Component declarations
//!
//! A type becomes buildable by the container by implementing [`Component`]:
//! it lists its constructors, each with an ordered parameter list and a
//! build closure, plus its scope and the contracts it can be viewed as.
//! The container keeps these declarations in its catalog and consults them
//! whenever it has to build something.
//!
//! # Example
//!
//! ```rust
//! use autowire::{Args, Component, Constructor, Describe, Parameter};
//! use std::sync::Arc;
//!
//! struct Config;
//!
//! impl Component for Config {
//!     fn describe(info: Describe<Self>) -> Describe<Self> {
//!         info.constructor(Constructor::new(|_| Ok(Config)))
//!     }
//! }
//!
//! struct Repository {
//!     config: Arc<Config>,
//!     url: Arc<String>,
//! }
//!
//! impl Component for Repository {
//!     fn describe(info: Describe<Self>) -> Describe<Self> {
//!         info.singleton().constructor(
//!             Constructor::new(|args: &mut Args| {
//!                 Ok(Repository {
//!                     config: args.next()?,
//!                     url: args.next()?,
//!                 })
//!             })
//!             .inject()
//!             .param(Parameter::of::<Config>())
//!             .param(Parameter::of::<String>().named("database_url")),
//!         )
//!     }
//! }
//! ```

use crate::key::Instance;
use crate::provider::{Implements, Injectable, Provider, ProviderHandle, Qualifier, Scope};
use crate::{DiError, Result, TypeKey};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

// =============================================================================
// Component Trait
// =============================================================================

/// A type that can describe how to build itself.
///
/// This is the container's only source of type information: constructors,
/// parameter tags, scope and contracts all come from `describe`.
pub trait Component: Injectable + Sized {
    /// Fill in the declaration for `Self`.
    fn describe(info: Describe<Self>) -> Describe<Self>;
}

pub(crate) type CastFn = fn(&Instance) -> Option<Instance>;

pub(crate) fn upcast_instance<T, C>(instance: &Instance) -> Option<Instance>
where
    T: Implements<C>,
    C: ?Sized + Injectable,
{
    instance
        .downcast::<T>()
        .map(|concrete| Instance::new::<C>(<T as Implements<C>>::upcast(concrete)))
}

/// Builder handed to [`Component::describe`].
pub struct Describe<T> {
    constructors: Vec<ConstructorInfo>,
    scope: Scope,
    casts: Vec<(TypeKey, CastFn)>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> Describe<T> {
    fn new() -> Self {
        Self {
            constructors: Vec::new(),
            scope: Scope::Prototype,
            casts: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Add a constructor. Declaration order is scan order.
    pub fn constructor(mut self, constructor: Constructor<T>) -> Self {
        self.constructors.push(constructor.erase());
        self
    }

    /// Add a zero-parameter constructor backed by `Default`.
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(Constructor::new(|_| Ok(T::default())))
    }

    /// Mark the type singleton-scoped.
    pub fn singleton(self) -> Self {
        self.scope(Scope::Singleton)
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Record that instances of `T` may be handed out as `C`.
    pub fn implements<C>(mut self) -> Self
    where
        C: ?Sized + Injectable,
        T: Implements<C>,
    {
        self.casts
            .push((TypeKey::of::<C>(), upcast_instance::<T, C> as CastFn));
        self
    }

    fn finish(self) -> TypeInfo {
        TypeInfo {
            key: TypeKey::of::<T>(),
            constructors: self.constructors,
            scope: self.scope,
            casts: self.casts,
        }
    }
}

// =============================================================================
// Type Info
// =============================================================================

/// Everything the container knows about one declared type.
pub struct TypeInfo {
    key: TypeKey,
    constructors: Vec<ConstructorInfo>,
    scope: Scope,
    casts: Vec<(TypeKey, CastFn)>,
}

impl TypeInfo {
    /// Run `T`'s declaration.
    pub fn of<T: Component>() -> Self {
        T::describe(Describe::new()).finish()
    }

    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Constructors in declaration order.
    #[inline]
    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    #[inline]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.scope == Scope::Singleton
    }

    /// The first constructor taking no parameters.
    pub fn zero_arg_constructor(&self) -> Option<&ConstructorInfo> {
        self.constructors.iter().find(|c| c.params.is_empty())
    }

    /// Contracts this type can be upcast to.
    pub fn contracts(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.casts.iter().map(|(key, _)| *key)
    }

    pub(crate) fn casts(&self) -> &[(TypeKey, CastFn)] {
        &self.casts
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("key", &self.key)
            .field("constructors", &self.constructors)
            .field("scope", &self.scope)
            .field("contracts", &self.contracts().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// Constructors
// =============================================================================

type BuildFn<T> = Box<dyn Fn(&mut Args) -> Result<T> + Send + Sync>;
type ErasedBuildFn = Arc<dyn Fn(&mut Args) -> Result<Instance> + Send + Sync>;

/// A typed constructor under construction.
pub struct Constructor<T> {
    params: Vec<Parameter>,
    inject: bool,
    build: BuildFn<T>,
}

impl<T: Injectable> Constructor<T> {
    /// A constructor with no parameters yet. `build` receives the resolved
    /// arguments in parameter order.
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&mut Args) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            params: Vec::new(),
            inject: false,
            build: Box::new(build),
        }
    }

    /// Mark this constructor as the injection point.
    pub fn inject(mut self) -> Self {
        self.inject = true;
        self
    }

    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = Parameter>) -> Self {
        self.params.extend(params);
        self
    }

    fn erase(self) -> ConstructorInfo {
        let build = self.build;
        ConstructorInfo {
            owner: TypeKey::of::<T>(),
            params: self.params.into(),
            inject: self.inject,
            build: Arc::new(move |args: &mut Args| build(args).map(Instance::from_value)),
        }
    }
}

/// A declared constructor.
#[derive(Clone)]
pub struct ConstructorInfo {
    owner: TypeKey,
    params: Arc<[Parameter]>,
    inject: bool,
    build: ErasedBuildFn,
}

impl ConstructorInfo {
    #[inline]
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    #[inline]
    pub fn is_inject(&self) -> bool {
        self.inject
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn instantiate(&self, args: Vec<Arg>) -> Result<Instance> {
        let mut args = Args {
            owner: self.owner,
            values: args.into_iter(),
            position: 0,
        };
        (self.build)(&mut args)
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("owner", &self.owner)
            .field("params", &self.params)
            .field("inject", &self.inject)
            .finish()
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// One constructor parameter: its declared type and tags.
#[derive(Clone, Debug)]
pub struct Parameter {
    declared: TypeKey,
    name: Option<Arc<str>>,
    qualifier: Option<TypeKey>,
    deferred: bool,
    inner: Option<TypeKey>,
}

impl Parameter {
    /// A parameter declared by key only.
    pub fn new(declared: TypeKey) -> Self {
        Self {
            declared,
            name: None,
            qualifier: None,
            deferred: false,
            inner: None,
        }
    }

    /// A parameter of type `Arc<T>`.
    pub fn of<T: ?Sized + Injectable>() -> Self {
        Self::new(TypeKey::of::<T>())
    }

    /// A parameter of type `Provider<T>`, resolved lazily.
    pub fn provider<T: ?Sized + Injectable>() -> Self {
        Self::new(TypeKey::of::<Provider<T>>()).deferred(Some(TypeKey::of::<T>()))
    }

    /// Take the value from the named table.
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Take the value from the qualifier table.
    pub fn qualified<Q: Qualifier>(mut self) -> Self {
        self.qualifier = Some(TypeKey::of::<Q>());
        self
    }

    /// Mark the parameter deferred. Without an inner type the declared
    /// type is resolved as an ordinary dependency.
    pub fn deferred(mut self, inner: Option<TypeKey>) -> Self {
        self.deferred = true;
        self.inner = inner;
        self
    }

    #[inline]
    pub fn declared(&self) -> TypeKey {
        self.declared
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn qualifier(&self) -> Option<TypeKey> {
        self.qualifier
    }

    #[inline]
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    #[inline]
    pub fn deferred_inner(&self) -> Option<TypeKey> {
        self.inner
    }
}

// =============================================================================
// Arguments
// =============================================================================

/// A resolved argument
pub(crate) enum Arg {
    Instance(Instance),
    Provider(ProviderHandle),
}

/// Resolved arguments, read in parameter order by a build closure.
pub struct Args {
    owner: TypeKey,
    values: std::vec::IntoIter<Arg>,
    position: usize,
}

impl Args {
    /// Take the next argument as `Arc<T>`.
    pub fn next<T: ?Sized + Injectable>(&mut self) -> Result<Arc<T>> {
        match self.take()? {
            Arg::Instance(instance) => instance
                .downcast::<T>()
                .ok_or_else(|| self.mismatch::<Arc<T>>(instance.key().name())),
            Arg::Provider(handle) => Err(self.mismatch::<Arc<T>>(handle.key().name())),
        }
    }

    /// Take the next argument as `Provider<T>`.
    pub fn provider<T: ?Sized + Injectable>(&mut self) -> Result<Provider<T>> {
        match self.take()? {
            Arg::Provider(handle) if handle.key() == TypeKey::of::<T>() => {
                Provider::from_handle(handle)
            }
            Arg::Provider(handle) => Err(self.mismatch::<Provider<T>>(handle.key().name())),
            Arg::Instance(instance) => Err(self.mismatch::<Provider<T>>(instance.key().name())),
        }
    }

    /// Arguments not read yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    fn take(&mut self) -> Result<Arg> {
        let arg = self.values.next().ok_or_else(|| DiError::CreationFailed {
            type_name: self.owner.name(),
            reason: format!("constructor read past its {} declared arguments", self.position),
        })?;
        self.position += 1;
        Ok(arg)
    }

    fn mismatch<E: ?Sized>(&self, actual: &str) -> DiError {
        DiError::CreationFailed {
            type_name: self.owner.name(),
            reason: format!(
                "argument {} is {}, read as {}",
                self.position - 1,
                actual,
                std::any::type_name::<E>()
            ),
        }
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("owner", &self.owner)
            .field("position", &self.position)
            .field("remaining", &self.remaining())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;
    impl Qualifier for Marker {}

    #[derive(Default)]
    struct Leaf;

    impl Component for Leaf {
        fn describe(info: Describe<Self>) -> Describe<Self> {
            info.default_constructor()
        }
    }

    struct Pair {
        leaf: Arc<Leaf>,
        label: Arc<String>,
    }

    impl Component for Pair {
        fn describe(info: Describe<Self>) -> Describe<Self> {
            info.singleton()
                .constructor(Constructor::new(|_| {
                    Ok(Pair {
                        leaf: Arc::new(Leaf),
                        label: Arc::new("default".into()),
                    })
                }))
                .constructor(
                    Constructor::new(|args: &mut Args| {
                        Ok(Pair {
                            leaf: args.next()?,
                            label: args.next()?,
                        })
                    })
                    .inject()
                    .param(Parameter::of::<Leaf>())
                    .param(Parameter::of::<String>().named("label")),
                )
        }
    }

    #[test]
    fn test_describe_collects_metadata() {
        let info = TypeInfo::of::<Pair>();

        assert_eq!(info.key(), TypeKey::of::<Pair>());
        assert!(info.is_singleton());
        assert_eq!(info.constructors().len(), 2);
        assert!(!info.constructors()[0].is_inject());
        assert!(info.constructors()[1].is_inject());
        assert_eq!(info.constructors()[1].arity(), 2);
        assert_eq!(info.constructors()[1].params()[1].name(), Some("label"));
        assert_eq!(info.zero_arg_constructor().map(|c| c.arity()), Some(0));
    }

    #[test]
    fn test_parameter_tags() {
        let param = Parameter::of::<String>().qualified::<Marker>();
        assert_eq!(param.qualifier(), Some(TypeKey::of::<Marker>()));
        assert!(!param.is_deferred());

        let param = Parameter::provider::<Leaf>();
        assert!(param.is_deferred());
        assert_eq!(param.declared(), TypeKey::of::<Provider<Leaf>>());
        assert_eq!(param.deferred_inner(), Some(TypeKey::of::<Leaf>()));
    }

    #[test]
    fn test_instantiate_reads_args_in_order() {
        let info = TypeInfo::of::<Pair>();
        let ctor = &info.constructors()[1];

        let leaf = Arc::new(Leaf);
        let args = vec![
            Arg::Instance(Instance::new(Arc::clone(&leaf))),
            Arg::Instance(Instance::from_value(String::from("x"))),
        ];
        let pair = ctor.instantiate(args).unwrap().downcast::<Pair>().unwrap();

        assert!(Arc::ptr_eq(&pair.leaf, &leaf));
        assert_eq!(pair.label.as_str(), "x");
    }

    #[test]
    fn test_instantiate_reports_bad_arguments() {
        let info = TypeInfo::of::<Pair>();
        let ctor = &info.constructors()[1];

        let swapped = vec![
            Arg::Instance(Instance::from_value(String::from("x"))),
            Arg::Instance(Instance::from_value(Leaf)),
        ];
        assert!(matches!(
            ctor.instantiate(swapped),
            Err(DiError::CreationFailed { .. })
        ));

        let short = vec![Arg::Instance(Instance::from_value(Leaf))];
        assert!(matches!(
            ctor.instantiate(short),
            Err(DiError::CreationFailed { .. })
        ));
    }
}
