//! Resolver traits for service resolution.

use std::any::Any;
use std::sync::Arc;

use crate::error::DiResult;
use crate::key::ServiceKey;
use crate::service::{downcast_instance, Service, ServiceType};

/// Object-safe core of service resolution.
///
/// Works over [`ServiceType`] descriptors and type-erased instances. Most
/// callers use the typed methods of [`Resolver`], which every `ResolverCore`
/// gets for free.
pub trait ResolverCore {
    /// Resolves one instance of `service`, by `key` when given.
    ///
    /// # Returns
    ///
    /// * `Ok(AnyArc)` - The instance, stored as `Arc<Arc<T>>` behind `dyn Any`
    /// * `Err(DiError)` - Not registered, circular, depth exceeded or a
    ///   constructor failure
    fn resolve_any(
        &self,
        service: &ServiceType,
        key: Option<&ServiceKey>,
    ) -> DiResult<Arc<dyn Any + Send + Sync>>;

    /// Resolves one instance per record of `service`, in registration order.
    ///
    /// An unregistered type yields an empty vector.
    fn resolve_many(&self, service: &ServiceType) -> DiResult<Vec<Arc<dyn Any + Send + Sync>>>;
}

/// Typed resolution API.
///
/// Implemented for every [`ResolverCore`], so the provider and the
/// [`ResolverContext`](crate::ResolverContext) handed to factories share it.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{All, Constructor, DependencyConfiguration, Implements, Injectable, Lifecycle, Resolver, Service};
/// use std::sync::Arc;
///
/// trait Plugin: Send + Sync { fn name(&self) -> &'static str; }
/// impl Service for dyn Plugin {}
///
/// struct Audit;
/// impl Plugin for Audit { fn name(&self) -> &'static str { "audit" } }
/// impl Implements<dyn Plugin> for Audit {
///     fn upcast(self: Arc<Self>) -> Arc<dyn Plugin> { self }
/// }
/// impl Injectable for Audit {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new().build(|_| Ok(Audit))]
///     }
/// }
///
/// struct Metrics;
/// impl Plugin for Metrics { fn name(&self) -> &'static str { "metrics" } }
/// impl Implements<dyn Plugin> for Metrics {
///     fn upcast(self: Arc<Self>) -> Arc<dyn Plugin> { self }
/// }
/// impl Injectable for Metrics {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new().build(|_| Ok(Metrics))]
///     }
/// }
///
/// let mut config = DependencyConfiguration::new();
/// config
///     .register::<dyn Plugin, Audit>()
///     .register_named::<dyn Plugin, Metrics>(Lifecycle::Singleton, "metrics");
///
/// let provider = config.build();
/// assert_eq!(provider.resolve::<dyn Plugin>().unwrap().name(), "audit");
/// assert_eq!(provider.resolve_named::<dyn Plugin>("metrics").unwrap().name(), "metrics");
///
/// let names: Vec<_> = provider.resolve_all::<dyn Plugin>().unwrap().iter().map(|p| p.name()).collect();
/// assert_eq!(names, ["audit", "metrics"]);
///
/// let all = provider.resolve::<All<dyn Plugin>>().unwrap();
/// assert_eq!(all.len(), 2);
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves the default registration of `T`.
    fn resolve<T: ?Sized + Service>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&T::service_type(), None)?;
        downcast_instance::<T>(any)
    }

    /// Resolves the registration of `T` filed under `key`.
    fn resolve_named<T: ?Sized + Service>(&self, key: impl Into<ServiceKey>) -> DiResult<Arc<T>> {
        let key = key.into();
        let any = self.resolve_any(&T::service_type(), Some(&key))?;
        downcast_instance::<T>(any)
    }

    /// Resolves every registration of `T`, in registration order.
    fn resolve_all<T: ?Sized + Service>(&self) -> DiResult<Vec<Arc<T>>> {
        self.resolve_many(&T::service_type())?
            .into_iter()
            .map(downcast_instance::<T>)
            .collect()
    }

    /// Resolves `T`, panicking on failure.
    ///
    /// Meant for bootstrapping code where a missing registration is a
    /// programming error.
    fn resolve_required<T: ?Sized + Service>(&self) -> Arc<T> {
        self.resolve::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
