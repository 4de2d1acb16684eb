use babel_ir::{CompositeType, Namespace, Route, TypeArena, TypeId};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

/// Build a namespace with `count` types: a single inheritance chain
/// registered leaf-first, plus one route referencing the leaf.
fn build_chain(count: usize) -> (TypeArena, Namespace) {
    let mut types = TypeArena::new();
    let mut ids = Vec::with_capacity(count);
    let mut parent = None;
    for i in 0..count {
        let mut composite = CompositeType::structure(format!("T{i}"));
        if let Some(parent) = parent {
            composite = composite.extends(parent);
        }
        let id = types.composite(composite).expect("parent exists");
        ids.push(id);
        parent = Some(id);
    }

    let mut ns = Namespace::new("bench");
    for &id in ids.iter().rev() {
        ns.add_data_type(&types, id).expect("named type");
    }
    let leaf = *ids.last().expect("non-empty chain");
    ns.add_route(Route::new("get", TypeId::EMPTY, leaf, TypeId::EMPTY))
        .expect("unique route");
    (types, ns)
}

fn bench_linearize(c: &mut Criterion) {
    let mut group = c.benchmark_group("linearize_data_types");
    for count in [100, 1_000, 10_000] {
        let (types, ns) = build_chain(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| ns.linearize_data_types(&types).expect("acyclic"))
        });
    }
    group.finish();
}

fn bench_distinct(c: &mut Criterion) {
    let (types, ns) = build_chain(1_000);
    c.bench_function("distinct_route_io_data_types", |b| {
        b.iter(|| ns.distinct_route_io_data_types(&types).expect("known ids"))
    });
}

criterion_group!(benches, bench_linearize, bench_distinct);
criterion_main!(benches);
