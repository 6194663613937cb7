//! Shared fixtures for integration tests.
#![allow(dead_code)]

use ferrous_wire::{
    Constructor, Implements, Injectable, OpenGeneric, Service, ServiceType, TypeKey, Unbound,
};
use std::sync::Arc;

// ===== Repositories =====

pub trait Repository: Send + Sync {
    fn kind(&self) -> &'static str;
}

impl Service for dyn Repository {}

macro_rules! repository {
    ($name:ident) => {
        pub struct $name;

        impl Service for $name {}

        impl Repository for $name {
            fn kind(&self) -> &'static str {
                stringify!($name)
            }
        }

        impl Implements<dyn Repository> for $name {
            fn upcast(self: Arc<Self>) -> Arc<dyn Repository> {
                self
            }
        }

        impl Injectable for $name {
            fn constructors() -> Vec<Constructor<Self>> {
                vec![Constructor::new().build(|_| Ok($name))]
            }
        }
    };
}

repository!(MyRepository);
repository!(SomeRepository);
repository!(MyAnotherRepository);

/// Second argument type for closing generics
pub struct Endpoint;

impl Service for Endpoint {}

impl Injectable for Endpoint {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new().build(|_| Ok(Endpoint))]
    }
}

// ===== Generic handlers =====

pub trait Handler<R: ?Sized>: Send + Sync {
    fn kind(&self) -> &'static str;
    fn target(&self) -> &Arc<R>;
}

impl<R: ?Sized + Service> Service for dyn Handler<R> {
    fn service_type() -> ServiceType {
        ServiceType::closed::<Self, dyn Handler<Unbound>>([TypeKey::of::<R>()])
    }
}

pub struct DefaultHandler<R: ?Sized> {
    pub target: Arc<R>,
}

impl<R: ?Sized + Send + Sync> Handler<R> for DefaultHandler<R> {
    fn kind(&self) -> &'static str {
        "DefaultHandler"
    }

    fn target(&self) -> &Arc<R> {
        &self.target
    }
}

impl<R: ?Sized + Service> Injectable for DefaultHandler<R> {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new()
            .param::<R>()
            .build(|args| Ok(DefaultHandler { target: args.next()? }))]
    }
}

impl<R: ?Sized + Service> Implements<dyn Handler<R>> for DefaultHandler<R> {
    fn upcast(self: Arc<Self>) -> Arc<dyn Handler<R>> {
        self
    }
}

pub struct AuditHandler<R: ?Sized> {
    pub target: Arc<R>,
}

impl<R: ?Sized + Send + Sync> Handler<R> for AuditHandler<R> {
    fn kind(&self) -> &'static str {
        "AuditHandler"
    }

    fn target(&self) -> &Arc<R> {
        &self.target
    }
}

impl<R: ?Sized + Service> Injectable for AuditHandler<R> {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new()
            .param::<R>()
            .build(|args| Ok(AuditHandler { target: args.next()? }))]
    }
}

impl<R: ?Sized + Service> Implements<dyn Handler<R>> for AuditHandler<R> {
    fn upcast(self: Arc<Self>) -> Arc<dyn Handler<R>> {
        self
    }
}

/// `DefaultHandler<_>` closed over `dyn Repository` and `Endpoint`.
pub fn default_handler() -> OpenGeneric {
    OpenGeneric::new::<DefaultHandler<Unbound>>()
        .close::<dyn Handler<dyn Repository>, DefaultHandler<dyn Repository>>()
        .close::<dyn Handler<Endpoint>, DefaultHandler<Endpoint>>()
}

/// `AuditHandler<_>` closed over `dyn Repository` only.
pub fn audit_handler() -> OpenGeneric {
    OpenGeneric::new::<AuditHandler<Unbound>>()
        .close::<dyn Handler<dyn Repository>, AuditHandler<dyn Repository>>()
}

// ===== Cycles =====

/// Requires itself through its only constructor.
pub struct SelfDependent {
    pub inner: Arc<SelfDependent>,
}

impl Service for SelfDependent {}

impl Injectable for SelfDependent {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new()
            .param::<SelfDependent>()
            .build(|args| Ok(SelfDependent { inner: args.next()? }))]
    }
}

pub struct Class1 {
    pub other: Arc<Class2>,
}

pub struct Class2 {
    pub other: Arc<Class1>,
}

impl Service for Class1 {}
impl Service for Class2 {}

impl Injectable for Class1 {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new()
            .param::<Class2>()
            .build(|args| Ok(Class1 { other: args.next()? }))]
    }
}

impl Injectable for Class2 {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new()
            .param::<Class1>()
            .build(|args| Ok(Class2 { other: args.next()? }))]
    }
}

// ===== Layered services =====

pub struct Config {
    pub url: String,
}

impl Service for Config {}

pub struct Database {
    pub config: Arc<Config>,
}

impl Service for Database {}

impl Injectable for Database {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new()
            .param::<Config>()
            .build(|args| Ok(Database { config: args.next()? }))]
    }
}

pub struct UserService {
    pub database: Arc<Database>,
    pub repository: Arc<dyn Repository>,
}

impl Service for UserService {}

impl Injectable for UserService {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new()
            .param::<Database>()
            .param::<dyn Repository>()
            .build(|args| {
                Ok(UserService {
                    database: args.next()?,
                    repository: args.next()?,
                })
            })]
    }
}

pub fn config(url: &str) -> Arc<Config> {
    Arc::new(Config { url: url.to_string() })
}
