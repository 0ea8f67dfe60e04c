//! Example demonstrating logging
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use autowire::{Args, Component, Constructor, Container, Describe, Parameter};
use std::sync::Arc;

#[allow(dead_code)]
struct Database {
    url: String,
}

impl Component for Database {
    fn describe(info: Describe<Self>) -> Describe<Self> {
        info.singleton().constructor(Constructor::new(|_| {
            Ok(Database {
                url: "postgres://localhost/mydb".into(),
            })
        }))
    }
}

#[allow(dead_code)]
struct UserService {
    db: Arc<Database>,
}

impl Component for UserService {
    fn describe(info: Describe<Self>) -> Describe<Self> {
        info.constructor(
            Constructor::new(|args: &mut Args| Ok(UserService { db: args.next()? }))
                .inject()
                .param(Parameter::of::<Database>()),
        )
    }
}

struct Ping;

impl Component for Ping {
    fn describe(info: Describe<Self>) -> Describe<Self> {
        info.constructor(
            Constructor::new(|args: &mut Args| {
                args.next::<Pong>()?;
                Ok(Ping)
            })
            .inject()
            .param(Parameter::of::<Pong>()),
        )
    }
}

struct Pong;

impl Component for Pong {
    fn describe(info: Describe<Self>) -> Describe<Self> {
        info.constructor(
            Constructor::new(|args: &mut Args| {
                args.next::<Ping>()?;
                Ok(Pong)
            })
            .inject()
            .param(Parameter::of::<Ping>()),
        )
    }
}

fn main() {
    // JSON if logging-json is enabled, pretty if logging-pretty
    autowire::logging::builder().trace().autowire_only().init();

    println!("=== autowire Logging Demo ===\n");

    // logs: "Creating new DI container"
    let container = Container::new();

    // logs: "Declaring component", "Registering contract"
    container.register_contract::<Database>();
    container.register_contract::<UserService>();

    // logs: "Building from contract", "Caching singleton after first resolution"
    let _users = container.resolve::<UserService>().unwrap();

    // logs: "Resolved from singleton table"
    let _users = container.resolve::<UserService>().unwrap();

    // logs: "Unknown type", "Resolution failed"
    assert!(container.try_resolve::<i32>().is_none());

    // logs: "Cycle detected", "Resolution failed"
    container.register_contract::<Ping>();
    container.register_contract::<Pong>();
    if let Err(e) = container.resolve::<Ping>() {
        println!("{e}");
    }

    println!("\n=== Demo Complete ===");
}
