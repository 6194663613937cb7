//! Dependency descriptors for introspection and diagnostics.

use std::fmt;

use crate::key::ServiceKey;
use crate::lifetime::Lifecycle;
use crate::registration::Dependency;

/// Read-only view of one dependency record.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Constructor, DependencyConfiguration, Injectable, Lifecycle, Service};
/// use std::sync::Arc;
///
/// struct Port(u16);
/// impl Service for Port {}
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
/// config
///     .register_singleton::<Clock, Clock>()
///     .register_instance(Arc::new(Port(5432)));
///
/// let descriptors = config.descriptors();
/// assert_eq!(descriptors.len(), 2);
/// assert_eq!(descriptors[0].lifecycle, Lifecycle::Singleton);
/// assert!(descriptors[0].service_name.ends_with("Clock"));
/// assert!(!descriptors[1].is_named());
/// ```
#[derive(Debug, Clone)]
pub struct DependencyDescriptor {
    /// Abstract type name
    pub service_name: &'static str,
    /// Concrete type, factory or open definition name
    pub implementation_name: &'static str,
    pub lifecycle: Lifecycle,
    pub key: Option<ServiceKey>,
    /// True for open generic definitions
    pub open_generic: bool,
}

impl DependencyDescriptor {
    pub(crate) fn from_record(record: &Dependency) -> Self {
        Self {
            service_name: record.service.name(),
            implementation_name: record.implementation_name(),
            lifecycle: record.lifecycle,
            key: record.key.clone(),
            open_generic: record.is_open(),
        }
    }

    pub fn is_named(&self) -> bool {
        self.key.is_some()
    }

    pub fn is_singleton(&self) -> bool {
        self.lifecycle.is_cached()
    }
}

impl fmt::Display for DependencyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.service_name)?;
        if let Some(key) = &self.key {
            write!(f, " [{}]", key)?;
        }
        write!(f, " => {} ({:?}", self.implementation_name, self.lifecycle)?;
        if self.open_generic {
            f.write_str(", open generic")?;
        }
        f.write_str(")")
    }
}
