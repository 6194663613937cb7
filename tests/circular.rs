mod common;

use common::*;
use ferrous_wire::{
    Constructor, DependencyConfiguration, DiError, Injectable, Lifecycle, ProviderOptions, Resolver,
    Service,
};
use std::sync::Arc;

fn assert_circular<T: ?Sized>(result: Result<Arc<T>, DiError>, expected: &[&str]) {
    match result {
        Err(DiError::Circular(path)) => {
            assert_eq!(path.len(), expected.len(), "wrong circular path: {:?}", path);
            for (name, suffix) in path.iter().zip(expected) {
                assert!(name.ends_with(suffix), "expected {} in path {:?}", suffix, path);
            }
        }
        Err(other) => panic!("expected Circular error, got {}", other),
        Ok(_) => panic!("expected Circular error, resolution succeeded"),
    }
}

#[test]
fn test_self_dependency_is_circular() {
    let mut config = DependencyConfiguration::new();
    config.register::<SelfDependent, SelfDependent>();

    let provider = config.build();
    assert_circular(provider.resolve::<SelfDependent>(), &["SelfDependent", "SelfDependent"]);
}

#[test]
fn test_mutual_dependency_is_circular_from_either_side() {
    let mut config = DependencyConfiguration::new();
    config
        .register::<Class1, Class1>()
        .register::<Class2, Class2>();

    let provider = config.build();
    assert_circular(provider.resolve::<Class1>(), &["Class1", "Class2", "Class1"]);
    assert_circular(provider.resolve::<Class2>(), &["Class2", "Class1", "Class2"]);
}

#[test]
fn test_mutual_singletons_fail_without_deadlock() {
    let mut config = DependencyConfiguration::new();
    config
        .register_singleton::<Class1, Class1>()
        .register_singleton::<Class2, Class2>();

    let provider = config.build();
    assert_circular(provider.resolve::<Class1>(), &["Class1", "Class2", "Class1"]);
    // Nothing was cached by the failed attempt
    assert_circular(provider.resolve::<Class1>(), &["Class1", "Class2", "Class1"]);
}

#[test]
fn test_cycle_through_factory_context() {
    let mut config = DependencyConfiguration::new();
    config
        .register::<Class1, Class1>()
        .register_factory::<Class2, _>(Lifecycle::InstancePerDependency, |resolver| {
            Ok(Arc::new(Class2 {
                other: resolver.resolve::<Class1>()?,
            }))
        });

    let provider = config.build();
    assert_circular(provider.resolve::<Class1>(), &["Class1", "Class2", "Class1"]);
}

#[test]
fn test_cycle_is_reported_from_first_repeated_type() {
    struct Outer;
    impl Service for Outer {}
    impl Injectable for Outer {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new().param::<Class1>().build(|_| Ok(Outer))]
        }
    }

    let mut config = DependencyConfiguration::new();
    config
        .register::<Outer, Outer>()
        .register::<Class1, Class1>()
        .register::<Class2, Class2>();

    let provider = config.build();
    assert_circular(provider.resolve::<Outer>(), &["Class1", "Class2", "Class1"]);
}

#[test]
fn test_diamond_is_not_circular() {
    let mut config = DependencyConfiguration::new();
    config
        .register_instance(common::config("shared"))
        .register::<Database, Database>()
        .register::<dyn Repository, MyRepository>()
        .register::<UserService, UserService>();

    let provider = config.build();
    let users = provider.resolve::<UserService>().unwrap();
    assert_eq!(users.database.config.url, "shared");
}

#[test]
fn test_sibling_resolutions_of_same_type_are_not_circular() {
    struct Pair {
        left: Arc<dyn Repository>,
        right: Arc<dyn Repository>,
    }
    impl Service for Pair {}
    impl Injectable for Pair {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![Constructor::new()
                .param::<dyn Repository>()
                .param::<dyn Repository>()
                .build(|args| {
                    Ok(Pair {
                        left: args.next()?,
                        right: args.next()?,
                    })
                })]
        }
    }

    let mut config = DependencyConfiguration::new();
    config
        .register::<Pair, Pair>()
        .register::<dyn Repository, MyRepository>();

    let provider = config.build();
    let pair = provider.resolve::<Pair>().unwrap();
    assert!(!Arc::ptr_eq(&pair.left, &pair.right));
}

#[test]
fn test_depth_limit() {
    let mut config = DependencyConfiguration::new();
    config
        .register_instance(common::config("deep"))
        .register::<Database, Database>()
        .register::<dyn Repository, MyRepository>()
        .register::<UserService, UserService>();

    let shallow = config.build_with_options(ProviderOptions::new().with_max_depth(2));
    assert!(matches!(
        shallow.resolve::<UserService>(),
        Err(DiError::DepthExceeded(2))
    ));
    assert!(shallow.resolve::<Database>().is_ok());
}

fn aliased(
    url: &'static str,
    base: Option<&'static str>,
) -> impl Fn(&ferrous_wire::ResolverContext<'_>) -> Result<Arc<Config>, DiError> + Send + Sync + 'static {
    move |resolver| match base {
        Some(base) => {
            let inner = resolver.resolve_named::<Config>(base)?;
            Ok(common::config(&format!("{}+{}", inner.url, url)))
        }
        None => Ok(common::config(url)),
    }
}

#[test]
fn test_factories_sharing_a_closure_type_are_not_circular() {
    let mut config = DependencyConfiguration::new();
    config
        .register_factory_named::<Config, _>(Lifecycle::InstancePerDependency, "base", aliased("base", None))
        .register_factory_named::<Config, _>(Lifecycle::Singleton, "alias", aliased("alias", Some("base")));

    let provider = config.build();
    assert_eq!(provider.resolve_named::<Config>("alias").unwrap().url, "base+alias");
}

#[test]
fn test_factory_resolving_its_own_key_is_circular() {
    let mut config = DependencyConfiguration::new();
    config.register_factory_named::<Config, _>(
        Lifecycle::InstancePerDependency,
        "loop",
        aliased("loop", Some("loop")),
    );

    let provider = config.build();
    assert_circular(provider.resolve_named::<Config>("loop"), &["Config", "Config"]);
}

#[test]
fn test_singleton_factory_resolving_itself_fails_instead_of_blocking() {
    let mut config = DependencyConfiguration::new();
    config.register_factory::<Config, _>(Lifecycle::Singleton, |resolver| resolver.resolve::<Config>());

    let provider = config.build();
    let (tx, rx) = std::sync::mpsc::channel();
    let worker = provider.clone();
    std::thread::spawn(move || {
        let first = worker.resolve::<Config>().err().map(|e| e.is_circular());
        let second = worker.resolve::<Config>().err().map(|e| e.is_circular());
        let _ = tx.send((first, second));
    });

    let outcome = rx
        .recv_timeout(std::time::Duration::from_secs(5))
        .expect("resolution blocked");
    assert_eq!(outcome, (Some(true), Some(true)));
}
