//! Core traits for the dependency resolution engine.

mod resolver;

pub use resolver::{Resolver, ResolverCore};
