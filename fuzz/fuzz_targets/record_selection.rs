#![no_main]

use ferrous_wire::{DependencyConfiguration, DiResult, Lifecycle, Resolver, ResolverContext, Service};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

struct Numbered(usize);
impl Service for Numbered {}

// Each byte is one registration: bit 0 keyed, bit 1 singleton, upper bits the key.
fuzz_target!(|data: &[u8]| {
    let mut config = DependencyConfiguration::new();
    for (index, byte) in data.iter().take(64).enumerate() {
        let lifecycle = if byte & 0b10 != 0 {
            Lifecycle::Singleton
        } else {
            Lifecycle::InstancePerDependency
        };
        let factory = move |_: &ResolverContext<'_>| -> DiResult<Arc<Numbered>> { Ok(Arc::new(Numbered(index))) };
        if byte & 1 != 0 {
            config.register_factory_named::<Numbered, _>(lifecycle, u32::from(byte >> 2), factory);
        } else {
            config.register_factory::<Numbered, _>(lifecycle, factory);
        }
    }

    let registrations: Vec<u8> = data.iter().take(64).copied().collect();
    let provider = config.build();

    let all = provider.resolve_all::<Numbered>().unwrap();
    assert_eq!(all.len(), registrations.len());
    assert!(all.iter().enumerate().all(|(i, n)| n.0 == i));

    match provider.resolve::<Numbered>() {
        Ok(default) => {
            let expected = registrations.iter().position(|b| b & 1 == 0).unwrap_or(0);
            assert_eq!(default.0, expected);
        }
        Err(err) => {
            assert!(registrations.is_empty());
            assert!(err.is_not_registered());
        }
    }

    for key in 0u32..64 {
        let expected = registrations
            .iter()
            .position(|b| b & 1 != 0 && u32::from(b >> 2) == key);
        let resolved = provider.resolve_named::<Numbered>(key).ok().map(|n| n.0);
        assert_eq!(resolved, expected);
    }
});
