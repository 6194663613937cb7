/// Property-based tests for record selection
///
/// Registration order alone decides default selection and the order of
/// `resolve_all`, whatever mix of keys and lifecycles is registered.
use ferrous_wire::{DependencyConfiguration, DiResult, Lifecycle, Resolver, ResolverContext, Service};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug)]
struct Numbered(usize);

impl Service for Numbered {}

#[derive(Debug, Clone)]
struct Record {
    keyed: bool,
    singleton: bool,
}

fn record() -> impl Strategy<Value = Record> {
    (any::<bool>(), any::<bool>()).prop_map(|(keyed, singleton)| Record { keyed, singleton })
}

fn configure(records: &[Record]) -> DependencyConfiguration {
    let mut config = DependencyConfiguration::new();
    for (index, record) in records.iter().enumerate() {
        let lifecycle = if record.singleton {
            Lifecycle::Singleton
        } else {
            Lifecycle::InstancePerDependency
        };
        let factory = move |_: &ResolverContext<'_>| -> DiResult<Arc<Numbered>> { Ok(Arc::new(Numbered(index))) };
        if record.keyed {
            config.register_factory_named::<Numbered, _>(lifecycle, index, factory);
        } else {
            config.register_factory::<Numbered, _>(lifecycle, factory);
        }
    }
    config
}

proptest! {
    #[test]
    fn resolve_all_preserves_registration_order(records in prop::collection::vec(record(), 0..12)) {
        let provider = configure(&records).build();

        let all = provider.resolve_all::<Numbered>().unwrap();
        let indices: Vec<usize> = all.iter().map(|n| n.0).collect();
        prop_assert_eq!(indices, (0..records.len()).collect::<Vec<_>>());
    }
}

proptest! {
    #[test]
    fn default_is_first_unkeyed_else_first(records in prop::collection::vec(record(), 1..12)) {
        let provider = configure(&records).build();

        let expected = records.iter().position(|r| !r.keyed).unwrap_or(0);
        prop_assert_eq!(provider.resolve::<Numbered>().unwrap().0, expected);
    }
}

proptest! {
    #[test]
    fn keyed_resolution_finds_its_record(records in prop::collection::vec(record(), 1..12)) {
        let provider = configure(&records).build();

        for (index, record) in records.iter().enumerate() {
            let resolved = provider.resolve_named::<Numbered>(index);
            if record.keyed {
                prop_assert_eq!(resolved.unwrap().0, index);
            } else {
                prop_assert!(resolved.err().unwrap().is_not_registered());
            }
        }
    }
}

proptest! {
    #[test]
    fn singleton_records_repeat_instances(records in prop::collection::vec(record(), 1..8)) {
        let provider = configure(&records).build();

        let first = provider.resolve_all::<Numbered>().unwrap();
        let second = provider.resolve_all::<Numbered>().unwrap();
        for ((a, b), record) in first.iter().zip(&second).zip(&records) {
            prop_assert_eq!(Arc::ptr_eq(a, b), record.singleton);
        }
    }
}
