//! Resolution engine
//!
//! Turns a requested type into an instance: singleton short-circuit, cycle
//! check, contract lookup, injection point selection, per-parameter binding
//! strategy, instantiation and singleton caching.

use crate::component::{Arg, ConstructorInfo, Parameter, TypeInfo};
use crate::factory::SingletonFactory;
use crate::key::Instance;
use crate::provider::{Injectable, ProviderHandle};
use crate::storage::{Binding, Registry};
use crate::{DiError, Result, TypeKey};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Types being built on the current call path, outermost first.
///
/// Entries are pushed on entry and popped on return, so a type may appear
/// many times in one graph (diamonds) but never twice on one path.
#[derive(Debug, Default)]
struct Frame {
    path: Vec<TypeKey>,
}

impl Frame {
    fn enter(&mut self, key: TypeKey) -> Result<()> {
        if self.path.contains(&key) {
            let path = self
                .path
                .iter()
                .skip_while(|open| **open != key)
                .chain(std::iter::once(&key))
                .map(|k| k.name())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(DiError::CyclicDependency {
                type_name: key.name(),
                path,
            });
        }
        self.path.push(key);
        Ok(())
    }

    fn leave(&mut self, key: TypeKey) {
        debug_assert_eq!(self.path.last(), Some(&key));
        self.path.pop();
    }
}

/// Pick the constructor to build `info` with.
///
/// The first injectable constructor wins outright; otherwise the first
/// zero-parameter constructor.
pub(crate) fn select_injection_point(info: &TypeInfo) -> Result<&ConstructorInfo> {
    let mut zero_arg = None;
    for constructor in info.constructors() {
        if constructor.is_inject() {
            return Ok(constructor);
        }
        if zero_arg.is_none() && constructor.arity() == 0 {
            zero_arg = Some(constructor);
        }
    }
    zero_arg.ok_or(DiError::NoSuitableConstructor {
        type_name: info.key().name(),
    })
}

pub(crate) struct Resolver<'a> {
    registry: &'a Arc<Registry>,
}

impl<'a> Resolver<'a> {
    #[inline]
    pub fn new(registry: &'a Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Resolve `T` with a fresh frame.
    pub fn resolve<T: ?Sized + Injectable>(&self) -> Result<Arc<T>> {
        let instance = self.resolve_key(TypeKey::of::<T>())?;
        instance.downcast::<T>().ok_or_else(|| {
            DiError::Internal(format!(
                "{} resolved to an instance stored as {}",
                std::any::type_name::<T>(),
                instance.key()
            ))
        })
    }

    pub fn resolve_key(&self, key: TypeKey) -> Result<Instance> {
        let mut frame = Frame::default();
        self.resolve_with_frame(key, &mut frame)
    }

    fn resolve_with_frame(&self, key: TypeKey, frame: &mut Frame) -> Result<Instance> {
        if let Some(factory) = self.registry.singleton(&key) {
            #[cfg(feature = "logging")]
            trace!(
                target: "autowire",
                service = key.name(),
                location = "singleton",
                "Resolved from singleton table"
            );
            return factory.resolve().ok_or(DiError::ContainerDropped);
        }

        if let Err(err) = frame.enter(key) {
            #[cfg(feature = "logging")]
            debug!(
                target: "autowire",
                service = key.name(),
                error = %err,
                "Cycle detected"
            );
            return Err(err);
        }
        let result = self.build(key, frame);
        frame.leave(key);
        result
    }

    fn build(&self, key: TypeKey, frame: &mut Frame) -> Result<Instance> {
        let catalog = self.registry.catalog();

        let Some(implementation) = self.registry.contract(&key) else {
            return self.build_unregistered(key);
        };

        let info = catalog.info(&implementation).ok_or(DiError::UnknownType {
            type_name: implementation.name(),
        })?;
        let constructor = select_injection_point(&info)?;

        #[cfg(feature = "logging")]
        trace!(
            target: "autowire",
            service = key.name(),
            implementation = implementation.name(),
            arity = constructor.arity(),
            depth = frame.path.len(),
            "Building from contract"
        );

        let mut args = Vec::with_capacity(constructor.arity());
        for param in constructor.params() {
            args.push(self.resolve_parameter(param, frame)?);
        }

        let instance = constructor.instantiate(args)?;
        let instance = catalog
            .coerce(instance, key)
            .map_err(|actual| DiError::IncompatibleBinding {
                requested: key.name(),
                binding: format!("bound to: {implementation}"),
                provided: actual.key().name(),
            })?;

        if catalog.is_singleton(&key) {
            #[cfg(feature = "logging")]
            debug!(
                target: "autowire",
                service = key.name(),
                "Caching singleton after first resolution"
            );
            self.registry
                .insert_singleton(key, SingletonFactory::instance(instance.clone()));
        }

        Ok(instance)
    }

    /// No contract entry: only a zero-parameter constructor will do.
    fn build_unregistered(&self, key: TypeKey) -> Result<Instance> {
        let Some(info) = self.registry.catalog().info(&key) else {
            #[cfg(feature = "logging")]
            debug!(target: "autowire", service = key.name(), "Unknown type");
            return Err(DiError::UnknownType {
                type_name: key.name(),
            });
        };

        match info.zero_arg_constructor() {
            Some(constructor) => {
                #[cfg(feature = "logging")]
                trace!(
                    target: "autowire",
                    service = key.name(),
                    "Building unregistered type from zero-parameter constructor"
                );
                constructor.instantiate(Vec::new())
            }
            None if info.constructors().iter().any(|c| c.is_inject()) => {
                Err(DiError::UnknownType {
                    type_name: key.name(),
                })
            }
            None => Err(DiError::NoSuitableConstructor {
                type_name: key.name(),
            }),
        }
    }

    fn resolve_parameter(&self, param: &Parameter, frame: &mut Frame) -> Result<Arg> {
        if let Some(name) = param.name() {
            let binding = self
                .registry
                .named(name)
                .ok_or_else(|| DiError::MissingNamedBinding {
                    name: name.to_owned(),
                })?;
            let value = self.resolve_binding(binding, frame)?;
            return self
                .assignable(value, param.declared(), || format!("named: {name}"))
                .map(Arg::Instance);
        }

        if let Some(qualifier) = param.qualifier() {
            let binding = self.registry.qualified(&qualifier).ok_or(
                DiError::MissingQualifierBinding {
                    qualifier: qualifier.name(),
                },
            )?;
            let value = self.resolve_binding(binding, frame)?;
            return self
                .assignable(value, param.declared(), || format!("qualified by: {qualifier}"))
                .map(Arg::Instance);
        }

        if param.is_deferred() {
            if let Some(inner) = param.deferred_inner() {
                return Ok(Arg::Provider(ProviderHandle::new(
                    Arc::downgrade(self.registry),
                    inner,
                )));
            }
        }

        self.resolve_with_frame(param.declared(), frame)
            .map(Arg::Instance)
    }

    fn resolve_binding(&self, binding: Binding, frame: &mut Frame) -> Result<Instance> {
        match binding {
            Binding::Value(instance) => Ok(instance),
            Binding::Type(key) => self.resolve_with_frame(key, frame),
        }
    }

    fn assignable<F>(&self, value: Instance, declared: TypeKey, binding: F) -> Result<Instance>
    where
        F: FnOnce() -> String,
    {
        self.registry
            .catalog()
            .coerce(value, declared)
            .map_err(|actual| DiError::IncompatibleBinding {
                requested: declared.name(),
                binding: binding(),
                provided: actual.key().name(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Component, Constructor, Describe};

    struct Both;

    impl Component for Both {
        fn describe(info: Describe<Self>) -> Describe<Self> {
            info.constructor(Constructor::new(|_| Ok(Both)))
                .constructor(
                    Constructor::new(|args| {
                        args.next::<String>()?;
                        Ok(Both)
                    })
                    .inject()
                    .param(Parameter::of::<String>()),
                )
        }
    }

    struct Plain;

    impl Component for Plain {
        fn describe(info: Describe<Self>) -> Describe<Self> {
            info.constructor(
                Constructor::new(|args| {
                    args.next::<String>()?;
                    Ok(Plain)
                })
                .param(Parameter::of::<String>()),
            )
            .constructor(Constructor::new(|_| Ok(Plain)))
        }
    }

    struct Nothing;

    impl Component for Nothing {
        fn describe(info: Describe<Self>) -> Describe<Self> {
            info.constructor(
                Constructor::new(|args| {
                    args.next::<u8>()?;
                    Ok(Nothing)
                })
                .param(Parameter::of::<u8>()),
            )
        }
    }

    #[test]
    fn test_injectable_beats_zero_arg() {
        let info = TypeInfo::of::<Both>();
        let chosen = select_injection_point(&info).unwrap();
        assert!(chosen.is_inject());
        assert_eq!(chosen.arity(), 1);
    }

    #[test]
    fn test_zero_arg_fallback() {
        let info = TypeInfo::of::<Plain>();
        let chosen = select_injection_point(&info).unwrap();
        assert_eq!(chosen.arity(), 0);
    }

    #[test]
    fn test_no_suitable_constructor() {
        let info = TypeInfo::of::<Nothing>();
        assert!(matches!(
            select_injection_point(&info),
            Err(DiError::NoSuitableConstructor { .. })
        ));
    }

    #[test]
    fn test_frame_rejects_reentry_and_allows_reuse() {
        let a = TypeKey::of::<Both>();
        let b = TypeKey::of::<Plain>();
        let mut frame = Frame::default();

        frame.enter(a).unwrap();
        frame.enter(b).unwrap();
        frame.leave(b);
        // b again as a sibling: fine
        frame.enter(b).unwrap();

        let err = frame.enter(a).unwrap_err();
        let DiError::CyclicDependency { path, .. } = err else {
            panic!("expected a cycle");
        };
        assert_eq!(
            path,
            format!("{} -> {} -> {}", a.name(), b.name(), a.name())
        );
    }
}
