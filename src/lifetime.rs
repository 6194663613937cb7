//! Instance lifecycle definitions.

/// Policy governing instance reuse for a dependency record
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Constructor, DependencyConfiguration, Injectable, Lifecycle, Resolver, Service};
/// use std::sync::Arc;
///
/// struct Clock;
/// impl Service for Clock {}
/// impl Injectable for Clock {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new().build(|_| Ok(Clock))]
///     }
/// }
///
/// let mut config = DependencyConfiguration::new();
/// config.register_with::<Clock, Clock>(Lifecycle::Singleton, None);
///
/// let provider = config.build();
/// let a = provider.resolve::<Clock>().unwrap();
/// let b = provider.resolve::<Clock>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Lifecycle {
    /// A fresh instance for every resolution
    #[default]
    InstancePerDependency,
    /// Constructed once per record and shared afterwards
    Singleton,
}

impl Lifecycle {
    /// True when instances are cached on the record.
    pub fn is_cached(self) -> bool {
        matches!(self, Lifecycle::Singleton)
    }
}
