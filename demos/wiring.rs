//! Wiring an object graph by hand
//!
//! Run with:
//!   cargo run --example wiring

use autowire::{
    implements, Args, Binding, Component, Constructor, Container, Describe, Parameter, Provider,
    Qualifier,
};
use std::sync::Arc;

trait Mailer: Send + Sync {
    fn send(&self, to: &str, body: &str) -> String;
}

struct SmtpMailer {
    host: Arc<String>,
}

impl Mailer for SmtpMailer {
    fn send(&self, to: &str, body: &str) -> String {
        format!("smtp://{} -> {}: {}", self.host, to, body)
    }
}

implements!(SmtpMailer: dyn Mailer);

impl Component for SmtpMailer {
    fn describe(info: Describe<Self>) -> Describe<Self> {
        info.singleton().constructor(
            Constructor::new(|args: &mut Args| Ok(SmtpMailer { host: args.next()? }))
                .inject()
                .param(Parameter::of::<String>().named("smtp_host")),
        )
    }
}

struct NullMailer;

impl Mailer for NullMailer {
    fn send(&self, to: &str, _body: &str) -> String {
        format!("dropped mail for {to}")
    }
}

implements!(NullMailer: dyn Mailer);

impl Component for NullMailer {
    fn describe(info: Describe<Self>) -> Describe<Self> {
        info.implements::<dyn Mailer>()
            .constructor(Constructor::new(|_| Ok(NullMailer)))
    }
}

/// Selects the mailer used for audit copies
struct Audit;
impl Qualifier for Audit {}

struct Signup {
    mailer: Arc<dyn Mailer>,
    audit: Arc<dyn Mailer>,
    report: Provider<Report>,
}

impl Component for Signup {
    fn describe(info: Describe<Self>) -> Describe<Self> {
        info.constructor(
            Constructor::new(|args: &mut Args| {
                Ok(Signup {
                    mailer: args.next()?,
                    audit: args.next()?,
                    report: args.provider()?,
                })
            })
            .inject()
            .param(Parameter::of::<dyn Mailer>())
            .param(Parameter::of::<dyn Mailer>().qualified::<Audit>())
            .param(Parameter::provider::<Report>()),
        )
    }
}

// Report depends back on Signup; the provider above keeps this legal.
struct Report {
    signup: Arc<Signup>,
}

impl Component for Report {
    fn describe(info: Describe<Self>) -> Describe<Self> {
        info.constructor(
            Constructor::new(|args: &mut Args| Ok(Report { signup: args.next()? }))
                .inject()
                .param(Parameter::of::<Signup>()),
        )
    }
}

fn main() {
    println!("=== autowire Wiring Demo ===\n");

    let container = Container::new();
    container.register_named("smtp_host", Binding::value(String::from("mail.example.com")));
    container.register_contract_as::<dyn Mailer, SmtpMailer>();
    container.declare::<NullMailer>();
    container.register_qualified::<Audit>(Binding::of::<NullMailer>());
    container.register_contract::<Signup>();
    container.register_contract::<Report>();

    let signup = container.resolve::<Signup>().expect("Failed to resolve Signup");
    println!("{}", signup.mailer.send("ada@example.com", "welcome"));
    println!("{}", signup.audit.send("audit@example.com", "new signup"));

    let report = signup.report.get().expect("Failed to resolve Report");
    println!(
        "Report built with its own Signup: {}",
        !Arc::ptr_eq(&report.signup, &signup)
    );

    container.register_contract::<SmtpMailer>();
    let a = container.resolve::<SmtpMailer>().expect("Failed to resolve SmtpMailer");
    let b = container.resolve::<SmtpMailer>().expect("Failed to resolve SmtpMailer");
    println!("SmtpMailer is a singleton: {}", Arc::ptr_eq(&a, &b));

    match container.resolve::<u64>() {
        Ok(_) => unreachable!(),
        Err(e) => println!("\nUnbound type: {e}"),
    }

    println!("\n=== Demo Complete ===");
}
