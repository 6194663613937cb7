//! Dependency records and the registry that stores them.

use std::any::{Any, TypeId};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::activator::{GenericImplementation, Implementation};
use crate::error::{DiError, DiResult};
use crate::key::{ServiceKey, TypeKey};
use crate::lifetime::Lifecycle;
use crate::service::ServiceType;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Identity of a closed generic's argument list
type ArgumentIds = SmallVec<[TypeId; 2]>;

/// Singleton cache owned by exactly one activation.
///
/// The mutex serializes first-time construction, so at most one instance is
/// ever stored. Once set the value is never replaced.
#[derive(Default)]
pub(crate) struct InstanceSlot {
    value: Mutex<Option<AnyArc>>,
}

impl InstanceSlot {
    pub(crate) fn get_or_create<F>(&self, create: F) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        let mut guard = self.value.lock();
        if let Some(value) = guard.as_ref() {
            return Ok(value.clone());
        }

        let value = create()?;
        *guard = Some(value.clone());
        Ok(value)
    }

    #[cfg(test)]
    pub(crate) fn is_initialized(&self) -> bool {
        self.value.lock().is_some()
    }
}

/// Constructible implementation paired with its singleton slot.
#[derive(Clone)]
pub(crate) struct Activation {
    pub(crate) implementation: Arc<Implementation>,
    pub(crate) instance: Arc<InstanceSlot>,
}

impl Activation {
    pub(crate) fn new(implementation: Implementation) -> Self {
        Self {
            implementation: Arc::new(implementation),
            instance: Arc::new(InstanceSlot::default()),
        }
    }
}

pub(crate) enum Binding {
    Concrete(Activation),
    /// Open generic definition; closures are cached per argument list so every
    /// closed form keeps its own singleton slot.
    Open {
        definition: Arc<dyn GenericImplementation>,
        closures: Mutex<AHashMap<ArgumentIds, Activation>>,
    },
}

/// A single registration: abstract type, implementation, lifecycle and key.
pub(crate) struct Dependency {
    pub(crate) service: ServiceType,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) key: Option<ServiceKey>,
    pub(crate) binding: Binding,
}

impl Dependency {
    pub(crate) fn concrete(
        service: ServiceType,
        implementation: Implementation,
        lifecycle: Lifecycle,
        key: Option<ServiceKey>,
    ) -> Self {
        Self {
            service,
            lifecycle,
            key,
            binding: Binding::Concrete(Activation::new(implementation)),
        }
    }

    pub(crate) fn open(
        service: ServiceType,
        definition: Arc<dyn GenericImplementation>,
        lifecycle: Lifecycle,
        key: Option<ServiceKey>,
    ) -> Self {
        Self {
            service,
            lifecycle,
            key,
            binding: Binding::Open {
                definition,
                closures: Mutex::new(AHashMap::new()),
            },
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        matches!(self.binding, Binding::Open { .. })
    }

    /// Display name of the implementation, open definitions included.
    pub(crate) fn implementation_name(&self) -> &'static str {
        match &self.binding {
            Binding::Concrete(activation) => activation.implementation.concrete().name(),
            Binding::Open { definition, .. } => definition.name(),
        }
    }

    pub(crate) fn matches_key(&self, key: &ServiceKey) -> bool {
        self.key.as_ref() == Some(key)
    }

    /// Activation serving `requested`, closing open generics over its arguments.
    ///
    /// Returns `Ok(None)` when an open definition cannot close over the arguments.
    pub(crate) fn activate(&self, requested: &ServiceType) -> DiResult<Option<Activation>> {
        match &self.binding {
            Binding::Concrete(activation) => Ok(Some(activation.clone())),
            Binding::Open { definition, closures } => {
                let ids: ArgumentIds = requested.arguments().iter().map(TypeKey::id).collect();
                let mut closures = closures.lock();
                if let Some(activation) = closures.get(&ids) {
                    return Ok(Some(activation.clone()));
                }

                let Some(implementation) = definition.close(requested.arguments()) else {
                    return Ok(None);
                };
                if implementation.service() != requested.key() {
                    return Err(DiError::TypeMismatch(requested.name()));
                }

                tracing::trace!(
                    definition = definition.name(),
                    closed = requested.name(),
                    "closed open generic"
                );
                let activation = Activation::new(implementation);
                closures.insert(ids, activation.clone());
                Ok(Some(activation))
            }
        }
    }
}

/// Dependency records indexed by abstract type, insertion order preserved.
pub(crate) struct Registry {
    records: AHashMap<TypeId, Vec<Dependency>>,
    /// First-registration order of abstract types, for deterministic iteration
    order: Vec<TypeId>,
    count: usize,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            records: AHashMap::new(),
            order: Vec::new(),
            count: 0,
        }
    }

    pub(crate) fn insert(&mut self, record: Dependency) {
        let id = record.service.id();
        let bucket = self.records.entry(id).or_insert_with(|| {
            self.order.push(id);
            Vec::new()
        });
        bucket.push(record);
        self.count += 1;
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    /// All records, grouped by abstract type in first-registration order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .flat_map(|bucket| bucket.iter())
    }

    pub(crate) fn lookup_all(&self, id: TypeId) -> &[Dependency] {
        self.records.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Default record: the first unkeyed one, else the first registered.
    pub(crate) fn lookup(&self, id: TypeId) -> Option<&Dependency> {
        let bucket = self.lookup_all(id);
        bucket
            .iter()
            .find(|record| record.key.is_none())
            .or_else(|| bucket.first())
    }

    pub(crate) fn lookup_named(&self, service: &ServiceType, key: &ServiceKey) -> DiResult<&Dependency> {
        self.lookup_all(service.id())
            .iter()
            .find(|record| record.matches_key(key))
            .ok_or_else(|| not_registered(service, Some(key)))
    }

    /// Selects the record serving `service` (optionally by `key`) and activates it.
    pub(crate) fn select(
        &self,
        service: &ServiceType,
        key: Option<&ServiceKey>,
    ) -> DiResult<(&Dependency, Activation)> {
        if self.lookup_all(service.id()).is_empty() {
            if let Some(definition) = service.definition() {
                let candidates = self.lookup_all(definition.id());
                if !candidates.is_empty() {
                    let record = match key {
                        Some(key) => candidates
                            .iter()
                            .find(|record| record.matches_key(key))
                            .ok_or_else(|| not_registered(service, Some(key)))?,
                        None => self
                            .lookup(definition.id())
                            .ok_or_else(|| not_registered(service, None))?,
                    };
                    let activation = record
                        .activate(service)?
                        .ok_or_else(|| not_registered(service, key))?;
                    return Ok((record, activation));
                }
            }
        }

        let record = match key {
            Some(key) => self.lookup_named(service, key)?,
            None => self
                .lookup(service.id())
                .ok_or_else(|| not_registered(service, None))?,
        };
        let activation = record
            .activate(service)?
            .ok_or_else(|| not_registered(service, key))?;
        Ok((record, activation))
    }

    /// Every record serving `service`, in registration order.
    ///
    /// Closed generics without direct records gather the open records of their
    /// definition that can close over the requested arguments.
    pub(crate) fn select_all(&self, service: &ServiceType) -> DiResult<Vec<(&Dependency, Activation)>> {
        let mut records = self.lookup_all(service.id());
        if records.is_empty() {
            if let Some(definition) = service.definition() {
                records = self.lookup_all(definition.id());
            }
        }

        let mut selected = Vec::with_capacity(records.len());
        for record in records {
            if let Some(activation) = record.activate(service)? {
                selected.push((record, activation));
            }
        }
        Ok(selected)
    }

    /// True when `service` (optionally keyed) would find a record.
    pub(crate) fn can_resolve(&self, service: &ServiceType, key: Option<&ServiceKey>) -> bool {
        if service.element().is_some() {
            return key.is_none();
        }
        self.select(service, key).is_ok()
    }
}

fn not_registered(service: &ServiceType, key: Option<&ServiceKey>) -> DiError {
    match key {
        Some(key) => DiError::NamedNotRegistered {
            service: service.name(),
            key: key.clone(),
        },
        None => DiError::NotRegistered(service.name()),
    }
}
