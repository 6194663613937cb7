//! # ferrous-wire
//!
//! Constructor-injection dependency resolution for Rust.
//!
//! ## Features
//!
//! - **Constructor injection**: implementations declare constructors and the
//!   services each one needs; the longest constructor is used
//! - **Lifecycles**: per-dependency instances or one singleton per record
//! - **Multi-binding**: several implementations per abstract type, resolved
//!   one by default or all at once through [`All<T>`]
//! - **Keyed registrations**: distinguish implementations by any equatable key
//! - **Open generics**: one registration serves every closed form it covers
//! - **Cycle detection**: call-scoped, reporting the full dependency path
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_wire::{Constructor, DependencyConfiguration, Implements, Injectable, Resolver, Service};
//! use std::sync::Arc;
//!
//! trait Database: Send + Sync {
//!     fn url(&self) -> &str;
//! }
//! impl Service for dyn Database {}
//!
//! struct Postgres;
//! impl Database for Postgres {
//!     fn url(&self) -> &str { "postgres://localhost" }
//! }
//! impl Implements<dyn Database> for Postgres {
//!     fn upcast(self: Arc<Self>) -> Arc<dyn Database> { self }
//! }
//! impl Injectable for Postgres {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new().build(|_| Ok(Postgres))]
//!     }
//! }
//!
//! struct UserService {
//!     db: Arc<dyn Database>,
//! }
//! impl Service for UserService {}
//! impl Injectable for UserService {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new()
//!             .param::<dyn Database>()
//!             .build(|args| Ok(UserService { db: args.next()? }))]
//!     }
//! }
//!
//! let mut config = DependencyConfiguration::new();
//! config
//!     .register_singleton::<dyn Database, Postgres>()
//!     .register::<UserService, UserService>();
//!
//! let provider = config.build();
//! let users = provider.resolve::<UserService>().unwrap();
//! assert_eq!(users.db.url(), "postgres://localhost");
//! ```
//!
//! ## Lifecycles
//!
//! - **InstancePerDependency**: a fresh instance for every resolution
//! - **Singleton**: constructed once per record, then shared
//!
//! ## Keyed Resolution
//!
//! ```rust
//! use ferrous_wire::{DependencyConfiguration, Resolver, Service};
//! use std::sync::Arc;
//!
//! struct Endpoint(&'static str);
//! impl Service for Endpoint {}
//!
//! let mut config = DependencyConfiguration::new();
//! config
//!     .register_instance(Arc::new(Endpoint("primary")))
//!     .register_instance_named("replica", Arc::new(Endpoint("replica")));
//!
//! let provider = config.build();
//! assert_eq!(provider.resolve::<Endpoint>().unwrap().0, "primary");
//! assert_eq!(provider.resolve_named::<Endpoint>("replica").unwrap().0, "replica");
//! assert!(provider.resolve_named::<Endpoint>("missing").is_err());
//! ```
//!
//! ## Logging
//!
//! Resolution emits `tracing` events (`trace` per resolution, `debug` for
//! singleton construction and provider builds). Install any subscriber to see
//! them.

pub mod activator;
pub mod collection;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod provider;
pub mod service;
pub mod traits;
pub mod validation;

mod internal;
mod registration;

// Re-export core types
pub use activator::{
    Arguments, Constructor, ConstructorBuilder, GenericImplementation, Implementation, Injectable,
    OpenGeneric, Parameter,
};
pub use collection::DependencyConfiguration;
pub use config::{ProviderOptions, DEFAULT_MAX_DEPTH};
pub use descriptors::DependencyDescriptor;
pub use error::{DiError, DiResult};
pub use key::{ServiceKey, TypeKey};
pub use lifetime::Lifecycle;
pub use provider::{DependencyProvider, ResolverContext};
pub use service::{All, Implements, Service, ServiceType, TypeArguments, Unbound};
pub use traits::{Resolver, ResolverCore};
pub use validation::{ValidationError, ValidationResult, ValidationWarning};
