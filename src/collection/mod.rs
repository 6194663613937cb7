//! Dependency configuration: the registration side of the container.
//!
//! A [`DependencyConfiguration`] collects dependency records and is turned into
//! an immutable [`DependencyProvider`] by [`build`](DependencyConfiguration::build).

use std::sync::Arc;

use crate::activator::{GenericImplementation, Implementation, Injectable};
use crate::config::ProviderOptions;
use crate::descriptors::DependencyDescriptor;
use crate::error::DiResult;
use crate::key::ServiceKey;
use crate::lifetime::Lifecycle;
use crate::provider::{DependencyProvider, ResolverContext};
use crate::registration::{Dependency, Registry};
use crate::service::{Implements, Service, ServiceType};
use crate::validation::{self, ValidationResult};

/// Mutable set of dependency records.
///
/// Several records may be filed under the same abstract type. Unkeyed
/// resolution picks the first unkeyed record, keyed resolution the first
/// record with an equal key, and [`resolve_all`](crate::Resolver::resolve_all)
/// returns them all in registration order.
pub struct DependencyConfiguration {
    registry: Registry,
}

impl DependencyConfiguration {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    // ----- Constructor registrations -----

    /// Registers `C` as a per-dependency implementation of `I`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_wire::{Constructor, DependencyConfiguration, Injectable, Resolver, Service};
    /// use std::sync::Arc;
    ///
    /// struct Counter;
    /// impl Service for Counter {}
    /// impl Injectable for Counter {
    ///     fn constructors() -> Vec<Constructor<Self>> {
    ///         vec![Constructor::new().build(|_| Ok(Counter))]
    ///     }
    /// }
    ///
    /// let mut config = DependencyConfiguration::new();
    /// config.register::<Counter, Counter>();
    ///
    /// let provider = config.build();
    /// let a = provider.resolve::<Counter>().unwrap();
    /// let b = provider.resolve::<Counter>().unwrap();
    /// assert!(!Arc::ptr_eq(&a, &b));
    /// ```
    pub fn register<I, C>(&mut self) -> &mut Self
    where
        I: ?Sized + Service,
        C: Injectable + Implements<I>,
    {
        self.register_with::<I, C>(Lifecycle::InstancePerDependency, None)
    }

    /// Registers `C` as the singleton implementation of `I`.
    pub fn register_singleton<I, C>(&mut self) -> &mut Self
    where
        I: ?Sized + Service,
        C: Injectable + Implements<I>,
    {
        self.register_with::<I, C>(Lifecycle::Singleton, None)
    }

    /// Registers `C` as an implementation of `I` filed under `key`.
    pub fn register_named<I, C>(&mut self, lifecycle: Lifecycle, key: impl Into<ServiceKey>) -> &mut Self
    where
        I: ?Sized + Service,
        C: Injectable + Implements<I>,
    {
        self.register_with::<I, C>(lifecycle, Some(key.into()))
    }

    /// Registers `C` for `I` with an explicit lifecycle and optional key.
    pub fn register_with<I, C>(&mut self, lifecycle: Lifecycle, key: Option<ServiceKey>) -> &mut Self
    where
        I: ?Sized + Service,
        C: Injectable + Implements<I>,
    {
        self.insert(I::service_type(), Implementation::of::<I, C>(), lifecycle, key)
    }

    // ----- Instances and factories -----

    /// Registers a pre-built instance of `I`.
    pub fn register_instance<I: ?Sized + Service>(&mut self, instance: Arc<I>) -> &mut Self {
        self.insert(
            I::service_type(),
            Implementation::from_instance(instance),
            Lifecycle::Singleton,
            None,
        )
    }

    /// Registers a pre-built instance of `I` filed under `key`.
    pub fn register_instance_named<I: ?Sized + Service>(
        &mut self,
        key: impl Into<ServiceKey>,
        instance: Arc<I>,
    ) -> &mut Self {
        self.insert(
            I::service_type(),
            Implementation::from_instance(instance),
            Lifecycle::Singleton,
            Some(key.into()),
        )
    }

    /// Registers a closure producing `I`.
    ///
    /// The factory receives a [`ResolverContext`] bound to the resolution in
    /// progress, so anything it resolves takes part in cycle detection.
    pub fn register_factory<I, F>(&mut self, lifecycle: Lifecycle, factory: F) -> &mut Self
    where
        I: ?Sized + Service,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<I>> + Send + Sync + 'static,
    {
        self.insert(I::service_type(), Implementation::from_factory(factory), lifecycle, None)
    }

    /// Registers a closure producing `I`, filed under `key`.
    pub fn register_factory_named<I, F>(
        &mut self,
        lifecycle: Lifecycle,
        key: impl Into<ServiceKey>,
        factory: F,
    ) -> &mut Self
    where
        I: ?Sized + Service,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<I>> + Send + Sync + 'static,
    {
        self.insert(
            I::service_type(),
            Implementation::from_factory(factory),
            lifecycle,
            Some(key.into()),
        )
    }

    // ----- Open generics -----

    /// Registers an open generic implementation of the definition `D`.
    ///
    /// `D` is the open abstract type spelled with [`Unbound`](crate::Unbound)
    /// arguments, e.g. `dyn Handler<Unbound>`. Requests for a closed form with
    /// no direct registration fall back to this record.
    pub fn register_generic<D: ?Sized + 'static>(
        &mut self,
        definition: impl GenericImplementation,
        lifecycle: Lifecycle,
    ) -> &mut Self {
        self.insert_open::<D>(Arc::new(definition), lifecycle, None)
    }

    /// Registers an open generic implementation of `D` filed under `key`.
    pub fn register_generic_named<D: ?Sized + 'static>(
        &mut self,
        definition: impl GenericImplementation,
        lifecycle: Lifecycle,
        key: impl Into<ServiceKey>,
    ) -> &mut Self {
        self.insert_open::<D>(Arc::new(definition), lifecycle, Some(key.into()))
    }

    fn insert(
        &mut self,
        service: ServiceType,
        implementation: Implementation,
        lifecycle: Lifecycle,
        key: Option<ServiceKey>,
    ) -> &mut Self {
        tracing::trace!(
            service = service.name(),
            implementation = implementation.concrete().name(),
            ?lifecycle,
            "registered dependency"
        );
        self.registry
            .insert(Dependency::concrete(service, implementation, lifecycle, key));
        self
    }

    fn insert_open<D: ?Sized + 'static>(
        &mut self,
        definition: Arc<dyn GenericImplementation>,
        lifecycle: Lifecycle,
        key: Option<ServiceKey>,
    ) -> &mut Self {
        let service = ServiceType::of::<D>();
        tracing::trace!(
            service = service.name(),
            implementation = definition.name(),
            ?lifecycle,
            "registered open generic"
        );
        self.registry
            .insert(Dependency::open(service, definition, lifecycle, key));
        self
    }

    // ----- Introspection -----

    /// Number of dependency records.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// True when resolving `T` would find a record, open generics included.
    pub fn contains<T: ?Sized + Service>(&self) -> bool {
        self.registry.can_resolve(&T::service_type(), None)
    }

    /// Descriptors of every record, grouped by abstract type.
    pub fn descriptors(&self) -> Vec<DependencyDescriptor> {
        self.registry.iter().map(DependencyDescriptor::from_record).collect()
    }

    /// Checks the constructor graph for missing dependencies and cycles.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_wire::{Constructor, DependencyConfiguration, Injectable, Service};
    ///
    /// struct Database;
    /// impl Service for Database {}
    ///
    /// struct UserService;
    /// impl Service for UserService {}
    /// impl Injectable for UserService {
    ///     fn constructors() -> Vec<Constructor<Self>> {
    ///         vec![Constructor::new().param::<Database>().build(|_| Ok(UserService))]
    ///     }
    /// }
    ///
    /// let mut config = DependencyConfiguration::new();
    /// config.register::<UserService, UserService>();
    ///
    /// let result = config.validate();
    /// assert!(!result.is_valid());
    /// eprintln!("{}", result.format_issues());
    /// ```
    pub fn validate(&self) -> ValidationResult {
        validation::validate(&self.registry)
    }

    // ----- Build -----

    /// Finishes the configuration with default [`ProviderOptions`].
    pub fn build(self) -> DependencyProvider {
        self.build_with_options(ProviderOptions::default())
    }

    pub fn build_with_options(self, options: ProviderOptions) -> DependencyProvider {
        tracing::debug!(
            records = self.registry.len(),
            max_depth = options.max_depth(),
            "building dependency provider"
        );
        DependencyProvider::new(self.registry, options)
    }
}

impl Default for DependencyConfiguration {
    fn default() -> Self {
        Self::new()
    }
}
