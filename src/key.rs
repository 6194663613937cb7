//! Type identities and registration keys.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Runtime identity of a Rust type.
///
/// Pairs the `TypeId` used for lookup with the `std::any::type_name` used in
/// diagnostics. Equality and hashing only consider the `TypeId`.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::TypeKey;
///
/// let key = TypeKey::of::<String>();
/// assert_eq!(key.name(), "alloc::string::String");
/// assert_eq!(key, TypeKey::of::<String>());
/// assert_ne!(key, TypeKey::of::<u32>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Identity of `T`, which may be unsized (`dyn Trait`, `str`, slices).
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Identity of `T` reported under a different display name.
    pub(crate) fn renamed<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self { id: TypeId::of::<T>(), name }
    }

    /// The underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The `std::any::type_name` of the type.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

trait KeyValue: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn key_eq(&self, other: &dyn KeyValue) -> bool;
    fn fmt_key(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T> KeyValue for T
where
    T: Eq + fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn key_eq(&self, other: &dyn KeyValue) -> bool {
        other.as_any().downcast_ref::<T>().map_or(false, |other| self == other)
    }

    fn fmt_key(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Name discriminator distinguishing registrations under the same abstract type.
///
/// Any `Eq + Debug + Send + Sync + 'static` value can serve as a key. Two keys
/// are equal only when they hold the same type and compare equal, so `1u32`
/// and `1i32` are different keys. String slices are stored as `String`, which
/// makes `"primary"` and `String::from("primary")` the same key.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::ServiceKey;
///
/// let a = ServiceKey::from("primary");
/// let b = ServiceKey::from(String::from("primary"));
/// assert_eq!(a, b);
/// assert_ne!(a, ServiceKey::from("replica"));
/// assert_ne!(ServiceKey::from(1u32), ServiceKey::from(1i32));
///
/// #[derive(Debug, PartialEq, Eq)]
/// enum Region { East, West }
/// let east = ServiceKey::new(Region::East);
/// assert_eq!(east.downcast_ref::<Region>(), Some(&Region::East));
/// assert_ne!(east, ServiceKey::new(Region::West));
/// ```
#[derive(Clone)]
pub struct ServiceKey(Arc<dyn KeyValue>);

impl ServiceKey {
    /// Wraps an arbitrary equatable value.
    pub fn new<T>(value: T) -> Self
    where
        T: Eq + fmt::Debug + Send + Sync + 'static,
    {
        ServiceKey(Arc::new(value))
    }

    /// Returns the wrapped value if it is a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.key_eq(other.0.as_ref())
    }
}

impl Eq for ServiceKey {}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_key(f)
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.downcast_ref::<String>() {
            return f.write_str(text);
        }
        self.0.fmt_key(f)
    }
}

impl From<&str> for ServiceKey {
    fn from(value: &str) -> Self {
        ServiceKey::new(value.to_owned())
    }
}

impl From<String> for ServiceKey {
    fn from(value: String) -> Self {
        ServiceKey::new(value)
    }
}

macro_rules! service_key_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ServiceKey {
                fn from(value: $ty) -> Self {
                    ServiceKey::new(value)
                }
            }
        )*
    };
}

service_key_from!(bool, char, i32, i64, u32, u64, usize);
