use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_wire::*;
use std::sync::Arc;

trait Repository: Send + Sync {
    fn id(&self) -> usize;
}
impl Service for dyn Repository {}

struct SqlRepository;
impl Repository for SqlRepository {
    fn id(&self) -> usize {
        1
    }
}
impl Implements<dyn Repository> for SqlRepository {
    fn upcast(self: Arc<Self>) -> Arc<dyn Repository> {
        self
    }
}
impl Injectable for SqlRepository {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new().build(|_| Ok(SqlRepository))]
    }
}

struct Handler<R: ?Sized> {
    repository: Arc<R>,
}
impl<R: ?Sized + Service> Service for Handler<R> {
    fn service_type() -> ServiceType {
        ServiceType::closed::<Self, Handler<Unbound>>([TypeKey::of::<R>()])
    }
}
impl<R: ?Sized + Service> Injectable for Handler<R> {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new()
            .param::<R>()
            .build(|args| Ok(Handler { repository: args.next()? }))]
    }
}

struct Level<const N: usize> {
    _inner: Arc<dyn Repository>,
}
impl<const N: usize> Service for Level<N> {}
impl<const N: usize> Injectable for Level<N> {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new()
            .param::<dyn Repository>()
            .build(|args| Ok(Level { _inner: args.next()? }))]
    }
}

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let mut config = DependencyConfiguration::new();
    config.register_singleton::<dyn Repository, SqlRepository>();
    let provider = config.build();

    // Prime the singleton
    let _ = provider.resolve::<dyn Repository>().unwrap();

    c.bench_function("singleton_hit", |b| {
        b.iter(|| {
            let v = provider.resolve::<dyn Repository>().unwrap();
            black_box(v.id());
        })
    });
}

fn bench_per_dependency(c: &mut Criterion) {
    let mut config = DependencyConfiguration::new();
    config
        .register::<dyn Repository, SqlRepository>()
        .register::<Level<0>, Level<0>>();
    let provider = config.build();

    c.bench_function("per_dependency_with_parameter", |b| {
        b.iter(|| black_box(provider.resolve::<Level<0>>().unwrap()))
    });
}

fn bench_open_generic(c: &mut Criterion) {
    let mut config = DependencyConfiguration::new();
    config
        .register_singleton::<dyn Repository, SqlRepository>()
        .register_generic::<Handler<Unbound>>(
            OpenGeneric::new::<Handler<Unbound>>().close::<Handler<dyn Repository>, Handler<dyn Repository>>(),
            Lifecycle::InstancePerDependency,
        );
    let provider = config.build();

    c.bench_function("open_generic_closed_form", |b| {
        b.iter(|| black_box(provider.resolve::<Handler<dyn Repository>>().unwrap().repository.id()))
    });
}

fn bench_resolve_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_all");
    for count in [1usize, 8, 64] {
        let mut config = DependencyConfiguration::new();
        for _ in 0..count {
            config.register::<dyn Repository, SqlRepository>();
        }
        let provider = config.build();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(provider.resolve_all::<dyn Repository>().unwrap().len()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_per_dependency,
    bench_open_generic,
    bench_resolve_all
);
criterion_main!(benches);
