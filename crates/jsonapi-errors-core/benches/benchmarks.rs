//! Criterion benchmarks for the failure-handling hot path.
//!
//! Registries are built outside the benchmark loop so only lookup and
//! rendering are measured.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use jsonapi_errors_core::{
    DescriptorAttrs, ErrorRef, ErrorTypeRegistry, FailureId, MappingRegistry, Resolver, Source,
};

#[derive(Debug, thiserror::Error)]
#[error("record not found")]
struct RecordNotFound;

#[derive(Debug, thiserror::Error)]
#[error("unmapped")]
struct Unmapped;

fn registry() -> MappingRegistry {
    let registry = MappingRegistry::new(Arc::new(ErrorTypeRegistry::loaded()));
    registry
        .set_mapping([(FailureId::of::<RecordNotFound>(), ErrorRef::from("not_found"))])
        .unwrap();
    registry.set_fallback(500u16).unwrap();
    registry
}

fn bench_lookup(c: &mut Criterion) {
    let registry = registry();

    c.bench_function("lookup/mapped", |b| {
        b.iter(|| registry.lookup_error(black_box(&RecordNotFound)))
    });
    c.bench_function("lookup/fallback", |b| {
        b.iter(|| registry.lookup_error(black_box(&Unmapped)))
    });
}

fn bench_render(c: &mut Criterion) {
    let types = ErrorTypeRegistry::loaded();
    let descriptor = types.require(422u16).unwrap().instantiate(
        DescriptorAttrs::new()
            .detail("email is invalid")
            .source(Source::pointer("/data/attributes/email")),
    );
    let batch: Vec<_> = std::iter::repeat(descriptor.clone()).take(10).collect();

    c.bench_function("render/single_full", |b| {
        let resolver = Resolver::from(descriptor.clone());
        b.iter(|| black_box(&resolver).render(false).unwrap())
    });
    c.bench_function("render/batch_short", |b| {
        let resolver = Resolver::try_from(batch.clone()).unwrap();
        b.iter(|| black_box(&resolver).render(true).unwrap())
    });
}

criterion_group!(benches, bench_lookup, bench_render);
criterion_main!(benches);
