//! Constructor instantiation.
//!
//! A concrete type describes how it is built through [`Injectable`]: a list of
//! [`Constructor`]s, each declaring the services it needs and a body that
//! assembles the instance from the resolved [`Arguments`]. Registrations erase
//! that description into an [`Implementation`], which is what the engine
//! instantiates. Open generics are described by a [`GenericImplementation`]
//! that produces an `Implementation` per closed form.

use std::marker::PhantomData;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{DiError, DiResult};
use crate::internal::{Frame, ResolutionChain};
use crate::key::{ServiceKey, TypeKey};
use crate::provider::{DependencyProvider, ResolverContext};
use crate::registration::AnyArc;
use crate::service::{downcast_instance, Implements, Service, ServiceType};

type BuildFn<T> = Arc<dyn Fn(&mut Arguments<'_>) -> DiResult<T> + Send + Sync>;

/// A concrete type the container can construct.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Constructor, Injectable, Service};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// impl Service for Config {}
///
/// struct Database { config: Arc<Config> }
///
/// impl Injectable for Database {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new()
///             .param::<Config>()
///             .build(|args| Ok(Database { config: args.next()? }))]
///     }
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Available constructors. The one with the most parameters is used; ties
    /// go to the constructor listed first.
    fn constructors() -> Vec<Constructor<Self>>;
}

/// A constructor parameter: the service it requests and an optional key.
#[derive(Clone, Debug)]
pub struct Parameter {
    service: ServiceType,
    key: Option<ServiceKey>,
}

impl Parameter {
    pub fn service(&self) -> &ServiceType {
        &self.service
    }

    pub fn key(&self) -> Option<&ServiceKey> {
        self.key.as_ref()
    }
}

/// One way of building a `T` from resolved dependencies.
pub struct Constructor<T> {
    parameters: Vec<Parameter>,
    build: BuildFn<T>,
}

impl<T> Constructor<T> {
    /// Starts declaring a constructor's parameters.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> ConstructorBuilder<T> {
        ConstructorBuilder {
            parameters: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl<T> Clone for Constructor<T> {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
            build: self.build.clone(),
        }
    }
}

/// Builder declaring constructor parameters in order.
pub struct ConstructorBuilder<T> {
    parameters: Vec<Parameter>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ConstructorBuilder<T> {
    /// Requests the default registration of `P`.
    pub fn param<P: ?Sized + Service>(mut self) -> Self {
        self.parameters.push(Parameter {
            service: P::service_type(),
            key: None,
        });
        self
    }

    /// Requests the registration of `P` filed under `key`.
    pub fn keyed<P: ?Sized + Service>(mut self, key: impl Into<ServiceKey>) -> Self {
        self.parameters.push(Parameter {
            service: P::service_type(),
            key: Some(key.into()),
        });
        self
    }

    /// Finishes the constructor with the body assembling the instance.
    pub fn build<F>(self, body: F) -> Constructor<T>
    where
        F: Fn(&mut Arguments<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        Constructor {
            parameters: self.parameters,
            build: Arc::new(body),
        }
    }
}

/// Resolved constructor arguments, consumed in declaration order.
pub struct Arguments<'a> {
    owner: &'static str,
    values: std::vec::IntoIter<AnyArc>,
    position: usize,
    context: ResolverContext<'a>,
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(owner: &'static str, values: Vec<AnyArc>, context: ResolverContext<'a>) -> Self {
        Self {
            owner,
            values: values.into_iter(),
            position: 0,
            context,
        }
    }

    /// Takes the next argument as `Arc<P>`.
    #[allow(clippy::should_implement_trait)]
    pub fn next<P>(&mut self) -> DiResult<Arc<P>>
    where
        P: ?Sized + Send + Sync + 'static,
    {
        let position = self.position;
        let value = self.values.next().ok_or(DiError::MissingArgument {
            owner: self.owner,
            position,
        })?;
        self.position += 1;
        downcast_instance::<P>(value)
    }

    /// Number of declared arguments not taken yet.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Resolver bound to the current call chain, for factories.
    pub fn resolver(&self) -> &ResolverContext<'a> {
        &self.context
    }
}

struct ErasedConstructor {
    parameters: Vec<Parameter>,
    build: BuildFn<AnyArc>,
}

/// Type-erased, constructible description of a concrete implementation.
///
/// Produces instances of the abstract type [`service`](Self::service) by
/// running one of the concrete type's constructors.
pub struct Implementation {
    service: TypeKey,
    concrete: TypeKey,
    frame: Frame,
    constructors: Vec<ErasedConstructor>,
}

impl Implementation {
    /// `C` serving the abstract type `I`.
    pub fn of<I, C>() -> Self
    where
        I: ?Sized + Service,
        C: Injectable + Implements<I>,
    {
        let constructors = C::constructors()
            .into_iter()
            .map(|ctor| {
                let build = ctor.build;
                ErasedConstructor {
                    parameters: ctor.parameters,
                    build: Arc::new(move |args: &mut Arguments<'_>| -> DiResult<AnyArc> {
                        let instance: Arc<I> = <C as Implements<I>>::upcast(Arc::new(build(args)?));
                        Ok(Arc::new(instance))
                    }),
                }
            })
            .collect();

        Self {
            service: TypeKey::of::<I>(),
            concrete: TypeKey::of::<C>(),
            frame: Frame::of_type(TypeKey::of::<C>()),
            constructors,
        }
    }

    /// Closure factory producing `I`.
    ///
    /// Each factory implementation is its own node for cycle detection, so
    /// records sharing a closure type never collide. Cycles are reported under
    /// the name of `I`.
    pub fn from_factory<I, F>(factory: F) -> Self
    where
        I: ?Sized + Service,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<I>> + Send + Sync + 'static,
    {
        let build = move |args: &mut Arguments<'_>| -> DiResult<AnyArc> {
            let instance = factory(args.resolver())?;
            Ok(Arc::new(instance))
        };
        Self {
            service: TypeKey::of::<I>(),
            concrete: TypeKey::renamed::<F>(std::any::type_name::<I>()),
            frame: Frame::factory(std::any::type_name::<I>()),
            constructors: vec![ErasedConstructor {
                parameters: Vec::new(),
                build: Arc::new(build),
            }],
        }
    }

    /// A pre-built instance of `I`.
    pub fn from_instance<I: ?Sized + Service>(instance: Arc<I>) -> Self {
        let stored: AnyArc = Arc::new(instance);
        Self {
            service: TypeKey::of::<I>(),
            concrete: TypeKey::of::<I>(),
            frame: Frame::of_type(TypeKey::of::<I>()),
            constructors: vec![ErasedConstructor {
                parameters: Vec::new(),
                build: Arc::new(move |_: &mut Arguments<'_>| -> DiResult<AnyArc> { Ok(stored.clone()) }),
            }],
        }
    }

    /// Abstract type produced.
    pub fn service(&self) -> TypeKey {
        self.service
    }

    /// Concrete type constructed.
    pub fn concrete(&self) -> TypeKey {
        self.concrete
    }

    /// What the resolution chain tracks while this implementation is built.
    pub(crate) fn frame(&self) -> Frame {
        self.frame
    }

    /// Parameters of the constructor that would be selected.
    ///
    /// Empty when no constructor is declared; [`check`](Self::check) reports that case.
    pub fn parameters(&self) -> &[Parameter] {
        self.select()
            .map(|ctor| ctor.parameters.as_slice())
            .unwrap_or(&[])
    }

    /// Fails with [`DiError::NoConstructor`] when nothing can be constructed.
    pub fn check(&self) -> DiResult<()> {
        self.select().map(|_| ())
    }

    fn select(&self) -> DiResult<&ErasedConstructor> {
        let mut selected: Option<&ErasedConstructor> = None;
        for ctor in &self.constructors {
            match selected {
                Some(best) if best.parameters.len() >= ctor.parameters.len() => {}
                _ => selected = Some(ctor),
            }
        }
        selected.ok_or(DiError::NoConstructor(self.concrete.name()))
    }

    /// Resolves every parameter on `chain` and runs the selected constructor.
    pub(crate) fn create_instance(
        &self,
        provider: &DependencyProvider,
        chain: &mut ResolutionChain,
    ) -> DiResult<AnyArc> {
        let ctor = self.select()?;
        let mut values = Vec::with_capacity(ctor.parameters.len());
        for parameter in &ctor.parameters {
            values.push(provider.resolve_in(&parameter.service, parameter.key.as_ref(), chain)?);
        }

        let context = ResolverContext::new(provider, chain);
        let mut arguments = Arguments::new(self.concrete.name(), values, context);
        (ctor.build)(&mut arguments)
    }
}

/// An open generic implementation, closed on demand.
///
/// `close` receives the type arguments of the requested closed type and returns
/// the implementation of that closed form, or `None` when the definition does
/// not cover those arguments.
pub trait GenericImplementation: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn close(&self, arguments: &[TypeKey]) -> Option<Implementation>;
}

/// Table-driven [`GenericImplementation`].
///
/// Generic code is monomorphized at compile time, so each closed form the
/// application needs is listed with [`close`](Self::close). The abstract type
/// of each entry supplies the argument list it answers to.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Constructor, Implements, Injectable, OpenGeneric, Service, ServiceType, TypeKey, Unbound};
/// use std::sync::Arc;
///
/// trait Repository: Send + Sync {}
/// impl Service for dyn Repository {}
///
/// trait Handler<R: ?Sized>: Send + Sync {}
/// impl<R: ?Sized + Service> Service for dyn Handler<R> {
///     fn service_type() -> ServiceType {
///         ServiceType::closed::<Self, dyn Handler<Unbound>>([TypeKey::of::<R>()])
///     }
/// }
///
/// struct DefaultHandler<R: ?Sized> { repository: Arc<R> }
/// impl<R: ?Sized + Send + Sync> Handler<R> for DefaultHandler<R> {}
///
/// impl<R: ?Sized + Service> Injectable for DefaultHandler<R> {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new()
///             .param::<R>()
///             .build(|args| Ok(DefaultHandler { repository: args.next()? }))]
///     }
/// }
///
/// impl<R: ?Sized + Service> Implements<dyn Handler<R>> for DefaultHandler<R> {
///     fn upcast(self: Arc<Self>) -> Arc<dyn Handler<R>> {
///         self
///     }
/// }
///
/// let open = OpenGeneric::new::<DefaultHandler<Unbound>>()
///     .close::<dyn Handler<dyn Repository>, DefaultHandler<dyn Repository>>();
/// assert!(open.name().contains("DefaultHandler"));
/// ```
#[derive(Clone)]
pub struct OpenGeneric {
    name: &'static str,
    closures: Vec<(SmallVec<[TypeKey; 2]>, fn() -> Implementation)>,
}

impl OpenGeneric {
    /// Starts a definition named after `D` (e.g. `DefaultHandler<Unbound>`).
    pub fn new<D: ?Sized + 'static>() -> Self {
        Self {
            name: std::any::type_name::<D>(),
            closures: Vec::new(),
        }
    }

    /// Adds the closed form `C` serving `I`.
    pub fn close<I, C>(mut self) -> Self
    where
        I: ?Sized + Service,
        C: Injectable + Implements<I>,
    {
        let arguments: SmallVec<[TypeKey; 2]> = I::service_type().arguments().iter().copied().collect();
        let make: fn() -> Implementation = Implementation::of::<I, C>;
        self.closures.push((arguments, make));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl GenericImplementation for OpenGeneric {
    fn name(&self) -> &'static str {
        self.name
    }

    fn close(&self, arguments: &[TypeKey]) -> Option<Implementation> {
        self.closures
            .iter()
            .find(|(closed, _)| closed.as_slice() == arguments)
            .map(|(_, make)| make())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf;
    impl Service for Leaf {}

    #[allow(dead_code)]
    struct Widget {
        arity: usize,
    }
    impl Service for Widget {}

    impl Injectable for Widget {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![
                Constructor::new().build(|_| Ok(Widget { arity: 0 })),
                Constructor::new()
                    .param::<Leaf>()
                    .build(|_| Ok(Widget { arity: 1 })),
                Constructor::new()
                    .param::<Leaf>()
                    .keyed::<Leaf>("other")
                    .build(|_| Ok(Widget { arity: 2 })),
                Constructor::new()
                    .keyed::<Leaf>("first")
                    .keyed::<Leaf>("second")
                    .build(|_| Ok(Widget { arity: 22 })),
            ]
        }
    }

    struct Nothing;
    impl Service for Nothing {}
    impl Injectable for Nothing {
        fn constructors() -> Vec<Constructor<Self>> {
            Vec::new()
        }
    }

    #[test]
    fn selects_longest_constructor_first_declared_on_tie() {
        let implementation = Implementation::of::<Widget, Widget>();
        let parameters = implementation.parameters();
        assert_eq!(parameters.len(), 2);
        assert!(parameters[0].key().is_none());
        assert_eq!(parameters[1].key(), Some(&ServiceKey::from("other")));
        assert_eq!(Widget::constructors().len(), 4);
    }

    #[test]
    fn no_constructor_is_reported() {
        let implementation = Implementation::of::<Nothing, Nothing>();
        assert!(implementation.parameters().is_empty());
        assert!(matches!(implementation.select(), Err(DiError::NoConstructor(name)) if name.ends_with("Nothing")));
    }

    #[test]
    fn open_generic_without_matching_closure_returns_none() {
        let open = OpenGeneric::new::<Widget>().close::<Widget, Widget>();
        assert!(GenericImplementation::close(&open, &[]).is_some());
        assert!(GenericImplementation::close(&open, &[TypeKey::of::<Leaf>()]).is_none());
    }
}
