//! Service type descriptors.
//!
//! Rust has no runtime type objects, so the engine works over values describing
//! the requested type: a [`ServiceType`] carries a [`TypeKey`] plus its shape
//! (plain, closed generic, or a sequence of implementations). Types opt in by
//! implementing [`Service`].

use std::any::TypeId;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::registration::AnyArc;

/// Type-argument list of a closed generic.
pub type TypeArguments = SmallVec<[TypeKey; 2]>;

pub(crate) type CollectFn = fn(Vec<AnyArc>) -> DiResult<AnyArc>;

#[derive(Clone)]
enum Shape {
    Plain,
    Closed {
        definition: TypeKey,
        arguments: TypeArguments,
    },
    Sequence {
        element: Arc<ServiceType>,
        collect: CollectFn,
    },
}

/// Description of a requestable type.
///
/// Obtained through [`Service::service_type`]. Plain types only carry their
/// identity. Closed generics additionally name their open definition and type
/// arguments, which lets the registry fall back to an open-generic registration
/// when the closed form was never registered. Sequences describe [`All<T>`].
#[derive(Clone)]
pub struct ServiceType {
    key: TypeKey,
    shape: Shape,
}

impl ServiceType {
    /// A plain, non-generic service type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            shape: Shape::Plain,
        }
    }

    /// A closed generic `T` whose open definition is `D`.
    ///
    /// By convention the definition is spelled with [`Unbound`] in place of each
    /// argument, e.g. `dyn Handler<Unbound>` for `dyn Handler<dyn Repository>`.
    pub fn closed<T, D>(arguments: impl IntoIterator<Item = TypeKey>) -> Self
    where
        T: ?Sized + 'static,
        D: ?Sized + 'static,
    {
        Self {
            key: TypeKey::of::<T>(),
            shape: Shape::Closed {
                definition: TypeKey::of::<D>(),
                arguments: arguments.into_iter().collect(),
            },
        }
    }

    /// The sequence type [`All<T>`].
    pub fn sequence<T: ?Sized + Service>() -> Self {
        Self {
            key: TypeKey::of::<All<T>>(),
            shape: Shape::Sequence {
                element: Arc::new(T::service_type()),
                collect: collect_all::<T>,
            },
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn id(&self) -> TypeId {
        self.key.id()
    }

    pub fn name(&self) -> &'static str {
        self.key.name()
    }

    /// Open definition of a closed generic.
    pub fn definition(&self) -> Option<TypeKey> {
        match &self.shape {
            Shape::Closed { definition, .. } => Some(*definition),
            _ => None,
        }
    }

    /// Type arguments of a closed generic; empty otherwise.
    pub fn arguments(&self) -> &[TypeKey] {
        match &self.shape {
            Shape::Closed { arguments, .. } => arguments.as_slice(),
            _ => &[],
        }
    }

    /// Element type when this is a sequence.
    pub fn element(&self) -> Option<&ServiceType> {
        match &self.shape {
            Shape::Sequence { element, .. } => Some(element),
            _ => None,
        }
    }

    pub(crate) fn collect(&self, items: Vec<AnyArc>) -> DiResult<AnyArc> {
        match &self.shape {
            Shape::Sequence { collect, .. } => collect(items),
            _ => Err(DiError::TypeMismatch(self.name())),
        }
    }
}

impl PartialEq for ServiceType {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ServiceType {}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A type that can be requested from the container.
///
/// Abstract types are usually trait objects. A one-line impl is enough for
/// plain types:
///
/// ```rust
/// use ferrous_wire::Service;
///
/// trait Repository: Send + Sync {}
/// impl Service for dyn Repository {}
/// ```
///
/// Closed generic abstract types override [`service_type`](Service::service_type)
/// so the registry can fall back to the open definition:
///
/// ```rust
/// use ferrous_wire::{Service, ServiceType, TypeKey, Unbound};
///
/// trait Handler<R: ?Sized>: Send + Sync {}
///
/// impl<R: ?Sized + Service> Service for dyn Handler<R> {
///     fn service_type() -> ServiceType {
///         ServiceType::closed::<Self, dyn Handler<Unbound>>([TypeKey::of::<R>()])
///     }
/// }
/// ```
pub trait Service: Send + Sync + 'static {
    fn service_type() -> ServiceType {
        ServiceType::of::<Self>()
    }
}

/// Upcast from a concrete implementation to an abstract type it serves.
///
/// Every type implements `Implements<Self>`, which covers registering a type as
/// its own implementation. Trait objects need an explicit impl:
///
/// ```rust
/// use ferrous_wire::Implements;
/// use std::sync::Arc;
///
/// trait Repository: Send + Sync {}
/// struct SqlRepository;
/// impl Repository for SqlRepository {}
///
/// impl Implements<dyn Repository> for SqlRepository {
///     fn upcast(self: Arc<Self>) -> Arc<dyn Repository> {
///         self
///     }
/// }
/// ```
pub trait Implements<I: ?Sized>: Send + Sync + 'static {
    fn upcast(self: Arc<Self>) -> Arc<I>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Placeholder type argument naming an open generic definition.
///
/// `dyn Handler<Unbound>` plays the role of `Handler<>`. It is uninhabited and
/// only ever used for its `TypeId`.
pub enum Unbound {}

/// Every registered implementation of `T`, in registration order.
///
/// Requesting `All<T>` (directly or as a constructor parameter) resolves one
/// instance per record filed under `T`.
pub struct All<T: ?Sized>(Vec<Arc<T>>);

impl<T: ?Sized> All<T> {
    pub fn into_vec(self) -> Vec<Arc<T>> {
        self.0
    }
}

impl<T: ?Sized> Deref for All<T> {
    type Target = [Arc<T>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: ?Sized> Clone for All<T> {
    fn clone(&self) -> Self {
        All(self.0.clone())
    }
}

impl<T: ?Sized + Service> Service for All<T> {
    fn service_type() -> ServiceType {
        ServiceType::sequence::<T>()
    }
}

/// Unwraps a stored `Arc<Arc<T>>` back into `Arc<T>`.
pub(crate) fn downcast_instance<T>(any: AnyArc) -> DiResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    any.downcast::<Arc<T>>()
        .map(|boxed| (*boxed).clone())
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}

fn collect_all<T: ?Sized + Service>(items: Vec<AnyArc>) -> DiResult<AnyArc> {
    let typed = items
        .into_iter()
        .map(downcast_instance::<T>)
        .collect::<DiResult<Vec<_>>>()?;
    Ok(Arc::new(Arc::new(All(typed))))
}
