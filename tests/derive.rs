//! Tests for #[derive(Component)]

use autowire::{Binding, Component, Container, DiError, Provider, Qualifier, TypeInfo};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

trait Named: Send + Sync {
    fn name(&self) -> &'static str;
}

#[derive(Component)]
#[component(implements(dyn Greeter, dyn Named))]
struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".into()
    }
}

impl Named for English {
    fn name(&self) -> &'static str {
        "english"
    }
}

#[derive(Component)]
#[component(singleton)]
struct Config {
    #[inject(skip)]
    hits: AtomicU32,
}

#[derive(Component)]
struct Service {
    config: Arc<Config>,
    #[inject(named = "prefix")]
    prefix: Arc<String>,
    greeter: Arc<dyn Greeter>,
}

struct Formal;
impl Qualifier for Formal {}

#[derive(Component)]
struct Ceremony {
    #[inject(qualifier = Formal)]
    greeter: Arc<dyn Greeter>,
}

#[derive(Component)]
struct Parent {
    child: Provider<Child>,
}

#[derive(Component)]
struct Child {
    parent: Arc<Parent>,
}

#[test]
fn test_unit_struct_gets_zero_arg_constructor() {
    let info = TypeInfo::of::<English>();
    assert_eq!(info.constructors().len(), 1);
    assert_eq!(info.constructors()[0].arity(), 0);
    assert!(!info.constructors()[0].is_inject());
    assert_eq!(info.contracts().count(), 2);

    let container = Container::new();
    container.declare::<English>();
    assert!(container.resolve::<English>().is_ok());
}

#[test]
fn test_skipped_fields_only_is_zero_arg() {
    let info = TypeInfo::of::<Config>();
    assert!(info.is_singleton());
    assert_eq!(info.constructors()[0].arity(), 0);
    assert!(!info.constructors()[0].is_inject());
}

#[test]
fn test_fields_become_parameters() {
    let info = TypeInfo::of::<Service>();
    let ctor = &info.constructors()[0];
    assert!(ctor.is_inject());
    assert_eq!(ctor.arity(), 3);
    assert_eq!(ctor.params()[1].name(), Some("prefix"));
    assert!(!info.is_singleton());
}

#[test]
fn test_resolve_derived_graph() {
    let container = Container::new();
    container.register_contract::<Config>();
    container.register_contract::<Service>();
    container.register_contract_as::<dyn Greeter, English>();
    container.register_named("prefix", Binding::value(String::from(">>")));

    let a = container.resolve::<Service>().unwrap();
    let b = container.resolve::<Service>().unwrap();

    assert_eq!(a.prefix.as_str(), ">>");
    assert_eq!(a.greeter.greet(), "hello");
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a.config, &b.config));

    a.config.hits.fetch_add(1, Ordering::SeqCst);
    assert_eq!(b.config.hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_qualifier_field() {
    let container = Container::new();
    container.register_contract::<Ceremony>();
    assert!(matches!(
        container.resolve::<Ceremony>(),
        Err(DiError::MissingQualifierBinding { .. })
    ));

    container.declare::<English>();
    container.register_qualified::<Formal>(Binding::of::<English>());
    let ceremony = container.resolve::<Ceremony>().unwrap();
    assert_eq!(ceremony.greeter.greet(), "hello");
}

#[test]
fn test_declared_upcasts_check_named_bindings() {
    #[derive(Component)]
    struct Host {
        #[inject(named = "who")]
        who: Arc<dyn Named>,
    }

    let container = Container::new();
    container.declare::<English>();
    container.register_named("who", Binding::of::<English>());
    container.register_contract::<Host>();

    assert_eq!(container.resolve::<Host>().unwrap().who.name(), "english");
}

#[test]
fn test_provider_field_breaks_cycle() {
    let container = Container::new();
    container.register_contract::<Parent>();
    container.register_contract::<Child>();

    let parent = container.resolve::<Parent>().unwrap();
    let child = parent.child.get().unwrap();
    assert!(!Arc::ptr_eq(&child.parent, &parent));
}
