//! Benchmarks for the DI container

use autowire::{Args, Binding, Component, Constructor, Container, Describe, Parameter, Provider};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

#[allow(dead_code)]
struct Config {
    value: i32,
}

impl Component for Config {
    fn describe(info: Describe<Self>) -> Describe<Self> {
        info.singleton()
            .constructor(Constructor::new(|_| Ok(Config { value: 42 })))
    }
}

#[allow(dead_code)]
struct Leaf;

impl Component for Leaf {
    fn describe(info: Describe<Self>) -> Describe<Self> {
        info.constructor(Constructor::new(|_| Ok(Leaf)))
    }
}

#[allow(dead_code)]
struct Repository {
    config: Arc<Config>,
    leaf: Arc<Leaf>,
    url: Arc<String>,
}

impl Component for Repository {
    fn describe(info: Describe<Self>) -> Describe<Self> {
        info.constructor(
            Constructor::new(|args: &mut Args| {
                Ok(Repository {
                    config: args.next()?,
                    leaf: args.next()?,
                    url: args.next()?,
                })
            })
            .inject()
            .param(Parameter::of::<Config>())
            .param(Parameter::of::<Leaf>())
            .param(Parameter::of::<String>().named("url")),
        )
    }
}

#[allow(dead_code)]
struct Handler {
    repository: Arc<Repository>,
    lazy: Provider<Leaf>,
}

impl Component for Handler {
    fn describe(info: Describe<Self>) -> Describe<Self> {
        info.constructor(
            Constructor::new(|args: &mut Args| {
                Ok(Handler {
                    repository: args.next()?,
                    lazy: args.provider()?,
                })
            })
            .inject()
            .param(Parameter::of::<Repository>())
            .param(Parameter::provider::<Leaf>()),
        )
    }
}

fn wired() -> Container {
    let container = Container::new();
    container.register_contract::<Config>();
    container.register_contract::<Leaf>();
    container.register_contract::<Repository>();
    container.register_contract::<Handler>();
    container.register_named("url", Binding::value(String::from("postgres://localhost")));
    container
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    group.bench_function("singleton_value", |b| {
        b.iter(|| {
            let container = Container::new();
            container.register_singleton(Config { value: 1 });
            black_box(container)
        })
    });

    group.bench_function("contract", |b| {
        b.iter(|| {
            let container = Container::new();
            container.register_contract::<Repository>();
            black_box(container)
        })
    });

    group.bench_function("graph_4", |b| b.iter(|| black_box(wired())));

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    let container = wired();

    group.bench_function("singleton_hit", |b| {
        // first call caches
        let _ = container.resolve::<Config>().unwrap();
        b.iter(|| black_box(container.resolve::<Config>().unwrap()))
    });

    group.bench_function("prototype_leaf", |b| {
        b.iter(|| black_box(container.resolve::<Leaf>().unwrap()))
    });

    group.bench_function("three_params", |b| {
        b.iter(|| black_box(container.resolve::<Repository>().unwrap()))
    });

    group.bench_function("nested_with_provider", |b| {
        b.iter(|| black_box(container.resolve::<Handler>().unwrap()))
    });

    group.bench_function("provider_get", |b| {
        let handler = container.resolve::<Handler>().unwrap();
        b.iter(|| black_box(handler.lazy.get().unwrap()))
    });

    group.bench_function("unknown_type_error", |b| {
        b.iter(|| black_box(container.resolve::<u64>().is_err()))
    });

    group.finish();
}

fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");

    group.bench_function("concurrent_resolve_4", |b| {
        let container = wired();

        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let c = container.clone();
                    thread::spawn(move || {
                        for _ in 0..100 {
                            let _ = c.resolve::<Repository>().unwrap();
                        }
                    })
                })
                .collect();

            for h in handles {
                h.join().unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_registration, bench_resolution, bench_concurrent);
criterion_main!(benches);
