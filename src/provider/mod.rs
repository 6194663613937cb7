//! Dependency provider: the resolution engine.
//!
//! A [`DependencyProvider`] is built from a
//! [`DependencyConfiguration`](crate::DependencyConfiguration) and resolves
//! requested types by selecting a dependency record, applying its lifecycle and
//! constructing it through the selected constructor. Each top-level call owns
//! its own resolution chain for cycle detection.

use std::sync::Arc;

use crate::config::ProviderOptions;
use crate::descriptors::DependencyDescriptor;
use crate::error::{DiError, DiResult};
use crate::internal::ResolutionChain;
use crate::key::ServiceKey;
use crate::lifetime::Lifecycle;
use crate::registration::{Activation, AnyArc, Registry};
use crate::service::ServiceType;
use crate::traits::ResolverCore;

pub mod context;
pub use context::ResolverContext;

/// Resolves services from a finished configuration.
///
/// The provider is cheap to clone and safe to share across threads. Singleton
/// records construct at most one instance each, even under concurrent first
/// access.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{Constructor, DependencyConfiguration, Implements, Injectable, Resolver, Service};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// impl Service for dyn Greeter {}
///
/// struct English;
/// impl Greeter for English { fn greet(&self) -> String { "hello".into() } }
/// impl Implements<dyn Greeter> for English {
///     fn upcast(self: Arc<Self>) -> Arc<dyn Greeter> { self }
/// }
/// impl Injectable for English {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new().build(|_| Ok(English))]
///     }
/// }
///
/// let mut config = DependencyConfiguration::new();
/// config.register::<dyn Greeter, English>();
///
/// let provider = config.build();
/// assert_eq!(provider.resolve::<dyn Greeter>().unwrap().greet(), "hello");
/// ```
#[derive(Clone)]
pub struct DependencyProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    registry: Registry,
    options: ProviderOptions,
}

impl DependencyProvider {
    pub(crate) fn new(registry: Registry, options: ProviderOptions) -> Self {
        Self {
            inner: Arc::new(ProviderInner { registry, options }),
        }
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.inner.options
    }

    /// Number of dependency records.
    pub fn len(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when a resolution of `service` (optionally keyed) would find a record.
    pub fn can_resolve(&self, service: &ServiceType, key: Option<&ServiceKey>) -> bool {
        self.inner.registry.can_resolve(service, key)
    }

    /// Descriptors of every record, grouped by abstract type.
    pub fn descriptors(&self) -> Vec<DependencyDescriptor> {
        self.inner.registry.iter().map(DependencyDescriptor::from_record).collect()
    }

    /// Constructs every concrete singleton record up front.
    ///
    /// Records are visited in registration order. Returns how many singletons
    /// were constructed or already present. Open generic records are skipped
    /// because their closed forms are only known on request.
    pub fn prewarm(&self) -> DiResult<usize> {
        let mut warmed = 0;
        for record in self.inner.registry.iter() {
            if !record.lifecycle.is_cached() || record.is_open() {
                continue;
            }
            if let Some(activation) = record.activate(&record.service)? {
                let mut chain = self.new_chain();
                self.materialize(&record.service, record.lifecycle, &activation, &mut chain)?;
                warmed += 1;
            }
        }
        tracing::debug!(warmed, "prewarmed singletons");
        Ok(warmed)
    }

    fn new_chain(&self) -> ResolutionChain {
        ResolutionChain::new(self.inner.options.max_depth())
    }

    /// Resolves one instance of `service` on an existing chain.
    pub(crate) fn resolve_in(
        &self,
        service: &ServiceType,
        key: Option<&ServiceKey>,
        chain: &mut ResolutionChain,
    ) -> DiResult<AnyArc> {
        if let Some(element) = service.element() {
            if key.is_some() {
                return Err(DiError::KeyedSequence(service.name()));
            }
            let items = self.resolve_all_in(element, chain)?;
            return service.collect(items);
        }

        let (record, activation) = self.inner.registry.select(service, key)?;
        self.materialize(service, record.lifecycle, &activation, chain)
    }

    /// Resolves one instance per record of `service` on an existing chain.
    pub(crate) fn resolve_all_in(
        &self,
        service: &ServiceType,
        chain: &mut ResolutionChain,
    ) -> DiResult<Vec<AnyArc>> {
        let selected = self.inner.registry.select_all(service)?;
        let mut instances = Vec::with_capacity(selected.len());
        for (record, activation) in selected {
            instances.push(self.materialize(service, record.lifecycle, &activation, chain)?);
        }
        Ok(instances)
    }

    fn materialize(
        &self,
        service: &ServiceType,
        lifecycle: Lifecycle,
        activation: &Activation,
        chain: &mut ResolutionChain,
    ) -> DiResult<AnyArc> {
        let implementation = &activation.implementation;
        let concrete = implementation.concrete();
        let frame = implementation.frame();
        tracing::trace!(
            service = service.name(),
            concrete = concrete.name(),
            ?lifecycle,
            depth = chain.depth(),
            "resolving"
        );

        chain.guarded(frame, |chain| match lifecycle {
            Lifecycle::InstancePerDependency => implementation.create_instance(self, chain),
            Lifecycle::Singleton => activation.instance.get_or_create(|| {
                tracing::debug!(concrete = concrete.name(), "constructing singleton");
                implementation.create_instance(self, chain)
            }),
        })
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Dependency Provider Debug ===\n");
        for descriptor in self.descriptors() {
            s.push_str(&format!("  {}\n", descriptor));
        }
        s
    }
}

impl ResolverCore for DependencyProvider {
    fn resolve_any(&self, service: &ServiceType, key: Option<&ServiceKey>) -> DiResult<AnyArc> {
        let mut chain = self.new_chain();
        self.resolve_in(service, key, &mut chain)
    }

    fn resolve_many(&self, service: &ServiceType) -> DiResult<Vec<AnyArc>> {
        let mut chain = self.new_chain();
        self.resolve_all_in(service, &mut chain)
    }
}

impl std::fmt::Debug for DependencyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyProvider")
            .field("records", &self.len())
            .field("options", &self.inner.options)
            .finish()
    }
}
