//! Error types for the dependency resolution engine.

use thiserror::Error;

use crate::key::ServiceKey;

/// Dependency resolution errors
///
/// Every error is terminal for the resolution call that produced it: no partial
/// object graph is returned and nothing is retried. Recovery (for example
/// supplying a default when a type is not registered) is up to the caller.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{DependencyConfiguration, DiError, Resolver, Service};
///
/// struct Clock;
/// impl Service for Clock {}
///
/// let provider = DependencyConfiguration::new().build();
/// match provider.resolve::<Clock>() {
///     Err(DiError::NotRegistered(name)) => assert!(name.ends_with("Clock")),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_wire::DiError;
///
/// let circular = DiError::Circular(vec!["ServiceA", "ServiceB", "ServiceA"]);
/// assert_eq!(circular.to_string(), "Circular dependency: ServiceA -> ServiceB -> ServiceA");
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// No dependency record matches the requested type
    #[error("Dependency for type {0} is not registered")]
    NotRegistered(&'static str),
    /// No dependency record matches the requested type and key
    #[error("Dependency with [{key}] key for type {service} is not registered")]
    NamedNotRegistered {
        service: &'static str,
        key: ServiceKey,
    },
    /// A concrete type is already under construction in the same call chain
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Type-erased instance could not be downcast to the requested type
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Implementation descriptor declares no constructor
    #[error("No constructor declared for: {0}")]
    NoConstructor(&'static str),
    /// A sequence request (`All<T>`) carried a key; sequences gather every record
    #[error("Sequence request for {0} cannot be keyed")]
    KeyedSequence(&'static str),
    /// A constructor body read more arguments than it declared
    #[error("Constructor of {owner} has no argument at position {position}")]
    MissingArgument {
        owner: &'static str,
        position: usize,
    },
}

impl DiError {
    /// True for both unnamed and named "not registered" failures.
    pub fn is_not_registered(&self) -> bool {
        matches!(self, DiError::NotRegistered(_) | DiError::NamedNotRegistered { .. })
    }

    /// True when resolution was rejected because of a dependency cycle.
    pub fn is_circular(&self) -> bool {
        matches!(self, DiError::Circular(_))
    }
}

/// Result type for DI operations
pub type DiResult<T> = Result<T, DiError>;
