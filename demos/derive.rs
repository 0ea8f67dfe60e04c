//! Example demonstrating #[derive(Component)]
//!
//! Run with:
//!   cargo run --example derive --features derive

use autowire::{Binding, Component, Container, Provider, Qualifier};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

trait Cache: Send + Sync {
    fn size(&self) -> usize;
}

#[derive(Component)]
#[component(singleton)]
struct Database;

#[derive(Component)]
#[component(implements(dyn Cache))]
struct MemoryCache;

impl Cache for MemoryCache {
    fn size(&self) -> usize {
        1024
    }
}

struct Hot;
impl Qualifier for Hot {}

#[derive(Component)]
struct AuditLog {
    db: Arc<Database>,
}

#[derive(Component)]
struct UserService {
    db: Arc<Database>,
    #[inject(named = "greeting")]
    greeting: Arc<String>,
    #[inject(qualifier = Hot)]
    cache: Arc<dyn Cache>,
    audit: Provider<AuditLog>,
    #[inject(skip)]
    request_count: AtomicU64,
}

impl UserService {
    fn handle(&self, user: &str) -> String {
        let n = self.request_count.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{} {user} (request {n}, cache {})", self.greeting, self.cache.size())
    }
}

fn main() {
    println!("=== autowire Derive Demo ===\n");

    let container = Container::new();
    container.register_contract::<Database>();
    container.register_contract::<AuditLog>();
    container.register_contract::<UserService>();
    container.declare::<MemoryCache>();
    container.register_named("greeting", Binding::value(String::from("Hello,")));
    container.register_qualified::<Hot>(Binding::of::<MemoryCache>());

    let users = container.resolve::<UserService>().expect("Failed to resolve UserService");
    println!("{}", users.handle("ada"));
    println!("{}", users.handle("grace"));

    let audit = users.audit.get().expect("Failed to resolve AuditLog");
    println!(
        "AuditLog shares the singleton Database: {}",
        Arc::ptr_eq(&audit.db, &users.db)
    );

    println!("\n=== Demo Complete ===");
}
