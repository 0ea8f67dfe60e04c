//! # autowire - Constructor Injection for Rust
//!
//! A dependency injection container that builds whole object graphs on
//! demand: pick a constructor, resolve its parameters recursively, detect
//! cycles, cache singletons.
//!
//! ## Features
//!
//! - **Contracts** - Bind a trait object to an implementation
//! - **Named and qualified bindings** - Disambiguate parameters of the same type
//! - **Lazy providers** - `Provider<T>` defers resolution and breaks cycles
//! - **Cycle detection** - Reports the full path, allows diamonds
//! - **Concurrent** - `DashMap` tables, registration and resolution from any thread
//! - **Observable** - Optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use autowire::{Args, Binding, Component, Constructor, Container, Describe, Parameter};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: Arc<String>,
//! }
//!
//! impl Component for Database {
//!     fn describe(info: Describe<Self>) -> Describe<Self> {
//!         info.singleton().constructor(
//!             Constructor::new(|args: &mut Args| Ok(Database { url: args.next()? }))
//!                 .inject()
//!                 .param(Parameter::of::<String>().named("database_url")),
//!         )
//!     }
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! impl Component for UserService {
//!     fn describe(info: Describe<Self>) -> Describe<Self> {
//!         info.constructor(
//!             Constructor::new(|args: &mut Args| Ok(UserService { db: args.next()? }))
//!                 .inject()
//!                 .param(Parameter::of::<Database>()),
//!         )
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_named("database_url", Binding::value(String::from("postgres://localhost")));
//! container.register_contract::<Database>();
//! container.register_contract::<UserService>();
//!
//! let users = container.resolve::<UserService>().unwrap();
//! assert_eq!(users.db.url.as_str(), "postgres://localhost");
//! ```
//!
//! ## Lazy Providers
//!
//! A `Provider<T>` parameter is not resolved while its owner is built;
//! each `get()` runs a fresh resolution. Two types that need each other
//! can be wired as long as one side takes a provider.
//!
//! ```rust
//! use autowire::{Args, Component, Constructor, Container, Describe, Parameter, Provider};
//! use std::sync::Arc;
//!
//! struct Parent {
//!     child: Provider<Child>,
//! }
//!
//! struct Child {
//!     parent: Arc<Parent>,
//! }
//!
//! impl Component for Parent {
//!     fn describe(info: Describe<Self>) -> Describe<Self> {
//!         info.constructor(
//!             Constructor::new(|args: &mut Args| Ok(Parent { child: args.provider()? }))
//!                 .inject()
//!                 .param(Parameter::provider::<Child>()),
//!         )
//!     }
//! }
//!
//! impl Component for Child {
//!     fn describe(info: Describe<Self>) -> Describe<Self> {
//!         info.constructor(
//!             Constructor::new(|args: &mut Args| Ok(Child { parent: args.next()? }))
//!                 .inject()
//!                 .param(Parameter::of::<Parent>()),
//!         )
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_contract::<Parent>();
//! container.register_contract::<Child>();
//!
//! let parent = container.resolve::<Parent>().unwrap();
//! let child = parent.child.get().unwrap();
//! assert!(!Arc::ptr_eq(&child.parent, &parent));
//! ```
//!
//! ## Derive
//!
//! With the `derive` feature, `#[derive(Component)]` writes the
//! declaration from the struct's fields. See [`Component`].

mod catalog;
mod component;
mod container;
mod error;
mod factory;
mod key;
#[cfg(feature = "logging")]
pub mod logging;
mod provider;
mod resolver;
mod storage;

pub use component::{Args, Component, Constructor, ConstructorInfo, Describe, Parameter, TypeInfo};
pub use container::Container;
pub use error::{DiError, Result};
pub use key::{Instance, TypeKey};
pub use provider::{Implements, Injectable, Provider, Qualifier, Scope};
pub use storage::Binding;

#[cfg(feature = "derive")]
pub use autowire_derive::Component;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Used by `implements!` and derived code
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        implements, Args, Binding, Component, Constructor, Container, Describe, DiError,
        Implements, Injectable, Parameter, Provider, Qualifier, Result, Scope,
    };
    pub use std::sync::Arc;
}
