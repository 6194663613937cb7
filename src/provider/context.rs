//! Resolver context handed to constructors and factories.

use std::cell::RefCell;

use crate::error::DiResult;
use crate::internal::ResolutionChain;
use crate::key::ServiceKey;
use crate::registration::AnyArc;
use crate::service::ServiceType;
use crate::traits::ResolverCore;

use super::DependencyProvider;

/// Resolver bound to the call chain of the resolution in progress.
///
/// Factories receive a `ResolverContext` so the services they pull in are
/// resolved on the same chain, which keeps cycle detection intact across
/// factory boundaries. A context exposes no handle to the provider, so every
/// resolution made through it stays on the chain.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{DependencyConfiguration, Lifecycle, Resolver, Service};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// impl Service for Database {}
///
/// struct UserService { db: Arc<Database> }
/// impl Service for UserService {}
///
/// let mut config = DependencyConfiguration::new();
/// config.register_instance(Arc::new(Database { url: "postgres://localhost".to_string() }));
/// config.register_factory::<UserService, _>(Lifecycle::InstancePerDependency, |resolver| {
///     Ok(Arc::new(UserService { db: resolver.resolve::<Database>()? }))
/// });
///
/// let provider = config.build();
/// let users = provider.resolve::<UserService>().unwrap();
/// assert_eq!(users.db.url, "postgres://localhost");
/// ```
pub struct ResolverContext<'a> {
    provider: &'a DependencyProvider,
    chain: RefCell<&'a mut ResolutionChain>,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(provider: &'a DependencyProvider, chain: &'a mut ResolutionChain) -> Self {
        Self {
            provider,
            chain: RefCell::new(chain),
        }
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(&self, service: &ServiceType, key: Option<&ServiceKey>) -> DiResult<AnyArc> {
        let mut chain = self.chain.borrow_mut();
        self.provider.resolve_in(service, key, &mut chain)
    }

    fn resolve_many(&self, service: &ServiceType) -> DiResult<Vec<AnyArc>> {
        let mut chain = self.chain.borrow_mut();
        self.provider.resolve_all_in(service, &mut chain)
    }
}
