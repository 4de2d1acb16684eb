//! Integration tests for namespace linearization and route I/O extraction.

use std::collections::{BTreeSet, HashSet};

use babel_ir::{
    Api, CompositeType, DependencyLink, DuplicatePolicy, IrConfig, IrError, Namespace,
    NamespaceConfig, PrimitiveType, Route, TypeArena, TypeId,
};

fn names(types: &TypeArena, ids: &[TypeId]) -> String {
    ids.iter()
        .map(|&id| types.display_name(id))
        .collect::<Vec<_>>()
        .join(", ")
}

fn position(order: &[TypeId], id: TypeId) -> usize {
    order
        .iter()
        .position(|&x| x == id)
        .unwrap_or_else(|| panic!("{id} missing from {order:?}"))
}

// === Reference scenario ===

#[test]
fn empty_then_parent_then_child() {
    let mut api = Api::new("1.0").unwrap();
    let types = api.types_mut();
    let a = types.composite(CompositeType::structure("A")).unwrap();
    let b = types
        .composite(CompositeType::structure("B").extends(a))
        .unwrap();

    api.add_data_type("ns", a).unwrap();
    api.add_data_type("ns", b).unwrap();
    api.add_route("ns", Route::new("R", TypeId::EMPTY, b, TypeId::EMPTY))
        .unwrap();

    let ns = api.namespace("ns").unwrap();
    let order = ns.linearize_data_types(api.types()).unwrap();
    insta::assert_snapshot!(names(api.types(), &order), @"Empty, A, B");

    let distinct = ns.distinct_route_io_data_types(api.types()).unwrap();
    assert_eq!(distinct, BTreeSet::from([b]));
}

// === Linearization ===

#[test]
fn empty_appears_once_even_when_many_routes_use_it() {
    let mut types = TypeArena::new();
    let info = types.composite(CompositeType::structure("Info")).unwrap();

    let mut ns = Namespace::new("users");
    ns.add_data_type(&types, info).unwrap();
    ns.add_route(Route::new("a", info, info, TypeId::EMPTY))
        .unwrap();
    ns.add_route(Route::new("b", TypeId::EMPTY, TypeId::EMPTY, TypeId::EMPTY))
        .unwrap();
    ns.add_route(Route::new("c", TypeId::EMPTY, info, info))
        .unwrap();

    let order = ns.linearize_data_types(&types).unwrap();
    assert_eq!(order, vec![TypeId::EMPTY, info]);
}

#[test]
fn no_empty_without_a_route_using_it() {
    let mut types = TypeArena::new();
    let info = types.composite(CompositeType::structure("Info")).unwrap();

    let mut ns = Namespace::new("users");
    ns.add_data_type(&types, info).unwrap();
    ns.add_route(Route::new("get", info, info, info)).unwrap();

    assert_eq!(ns.linearize_data_types(&types).unwrap(), vec![info]);
}

#[test]
fn ordering_is_complete_and_respects_every_link() {
    let mut types = TypeArena::new();
    let string = types.primitive(PrimitiveType::String).unwrap();
    let metadata = types
        .composite(CompositeType::union("Metadata"))
        .unwrap();
    let file = types
        .composite(CompositeType::structure("FileMetadata").extends(metadata))
        .unwrap();
    let folder = types
        .composite(CompositeType::structure("FolderMetadata").extends(metadata))
        .unwrap();
    let photo = types
        .composite(CompositeType::structure("PhotoMetadata").extends(file))
        .unwrap();
    let deleted = types
        .composite(CompositeType::structure("Deleted"))
        .unwrap();
    let tag = types
        .composite(CompositeType::union("Tag").extended_by(deleted))
        .unwrap();
    let lonely = types.composite(CompositeType::structure("Lonely")).unwrap();

    let registered = [photo, tag, lonely, folder, deleted, file, metadata];
    let mut ns = Namespace::new("files");
    for id in registered {
        ns.add_data_type(&types, id).unwrap();
    }
    ns.add_route(Route::new("get_metadata", string, metadata, TypeId::EMPTY))
        .unwrap();

    let order = ns.linearize_data_types(&types).unwrap();
    insta::assert_snapshot!(
        names(&types, &order),
        @"Empty, Metadata, FileMetadata, PhotoMetadata, Deleted, Tag, Lonely, FolderMetadata"
    );

    assert_eq!(order.len(), registered.len() + 1);
    let emitted: HashSet<_> = order.iter().copied().collect();
    let expected: HashSet<_> = registered.iter().copied().chain([TypeId::EMPTY]).collect();
    assert_eq!(emitted, expected);

    for &id in &registered {
        let composite = types.get(id).unwrap().as_composite().unwrap();
        if let Some(parent) = composite.supertype() {
            assert!(position(&order, parent) < position(&order, id));
        } else if let Some(child) = composite.subtype() {
            assert!(position(&order, child) < position(&order, id));
        }
    }
}

#[test]
fn duplicate_registration_of_the_same_type_is_emitted_once() {
    let mut types = TypeArena::new();
    let account = types.composite(CompositeType::structure("Account")).unwrap();

    let mut ns = Namespace::new("users");
    ns.add_data_type(&types, account).unwrap();
    ns.add_data_type(&types, account).unwrap();

    assert_eq!(ns.data_types().len(), 2);
    assert_eq!(ns.linearize_data_types(&types).unwrap(), vec![account]);
}

#[test]
fn deep_inheritance_chain_does_not_exhaust_the_stack() {
    let mut types = TypeArena::new();
    let mut chain = vec![types.composite(CompositeType::structure("T0")).unwrap()];
    for i in 1..50_000 {
        let parent = *chain.last().unwrap();
        let id = types
            .composite(CompositeType::structure(format!("T{i}")).extends(parent))
            .unwrap();
        chain.push(id);
    }

    let mut ns = Namespace::new("deep");
    for &id in chain.iter().rev() {
        ns.add_data_type(&types, id).unwrap();
    }

    assert_eq!(ns.linearize_data_types(&types).unwrap(), chain);
}

#[test]
fn cycle_formed_by_late_links_is_an_error() {
    let mut types = TypeArena::new();
    let a = types.composite(CompositeType::structure("A")).unwrap();
    let b = types.composite(CompositeType::structure("B")).unwrap();
    types.set_link(a, DependencyLink::Supertype(b)).unwrap();
    types.set_link(b, DependencyLink::Subtype(a)).unwrap();

    let mut ns = Namespace::new("loop");
    ns.add_data_type(&types, b).unwrap();

    let err = ns.linearize_data_types(&types).unwrap_err();
    assert!(matches!(err, IrError::CyclicDependency { .. }));
    insta::assert_snapshot!(err.to_string(), @"cyclic type dependency: B -> A -> B");
}

// === Distinct route I/O types ===

#[test]
fn nested_lists_are_unwrapped() {
    let mut types = TypeArena::new();
    let foo = types.composite(CompositeType::structure("Foo")).unwrap();
    let inner = types.list_of(foo).unwrap();
    let outer = types.list_of(inner).unwrap();

    let mut ns = Namespace::new("ns");
    ns.add_route(Route::new("list", TypeId::EMPTY, outer, TypeId::EMPTY))
        .unwrap();

    let distinct = ns.distinct_route_io_data_types(&types).unwrap();
    assert_eq!(distinct, BTreeSet::from([foo]));
    assert!(!distinct.contains(&inner) && !distinct.contains(&outer));
}

#[test]
fn primitive_response_contributes_nothing() {
    let mut types = TypeArena::new();
    let string = types.primitive(PrimitiveType::String).unwrap();
    let binary = types.primitive(PrimitiveType::Binary).unwrap();
    let binaries = types.list_of(binary).unwrap();

    let mut ns = Namespace::new("ns");
    ns.add_route(Route::new("get", string, string, TypeId::EMPTY))
        .unwrap();
    ns.add_route(Route::new("download", TypeId::EMPTY, binaries, string))
        .unwrap();

    assert!(ns.distinct_route_io_data_types(&types).unwrap().is_empty());
}

#[test]
fn type_shared_by_routes_appears_once() {
    let mut types = TypeArena::new();
    let error = types.composite(CompositeType::union("ApiError")).unwrap();
    let entry = types.composite(CompositeType::structure("Entry")).unwrap();
    let entries = types.list_of(entry).unwrap();
    let base = types.composite(CompositeType::structure("Base")).unwrap();
    let _derived = types
        .composite(CompositeType::structure("Derived").extends(base))
        .unwrap();

    let mut ns = Namespace::new("ns");
    ns.add_route(Route::new("get", entry, entry, error)).unwrap();
    ns.add_route(Route::new("list", TypeId::EMPTY, entries, error))
        .unwrap();

    let distinct = ns.distinct_route_io_data_types(&types).unwrap();
    assert_eq!(distinct, BTreeSet::from([error, entry]));
}

// === Configuration ===

#[test]
fn namespace_config_built_from_crate_root_sets_policy() {
    let config = IrConfig {
        namespace: NamespaceConfig {
            duplicates: DuplicatePolicy::Reject,
        },
    };
    assert_eq!(config, IrConfig::strict());

    let mut api = Api::with_config("1.0", config).unwrap();
    let route = Route::new("get", TypeId::EMPTY, TypeId::EMPTY, TypeId::EMPTY);
    api.add_route("files", route.clone()).unwrap();
    assert!(matches!(
        api.add_route("files", route),
        Err(IrError::DuplicateRoute { .. })
    ));
    assert_eq!(
        api.namespace("files").unwrap().policy(),
        DuplicatePolicy::Reject
    );
}

// === Shared readers ===

#[test]
fn populated_namespace_can_be_read_from_many_threads() {
    let mut api = Api::new("1.0").unwrap();
    let types = api.types_mut();
    let a = types.composite(CompositeType::structure("A")).unwrap();
    let b = types
        .composite(CompositeType::structure("B").extends(a))
        .unwrap();
    api.add_data_type("ns", b).unwrap();
    api.add_data_type("ns", a).unwrap();
    api.add_route("ns", Route::new("r", a, b, TypeId::EMPTY))
        .unwrap();

    let api = &api;
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(move || {
                    let ns = api.namespace("ns").unwrap();
                    ns.linearize_data_types(api.types()).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec![TypeId::EMPTY, a, b]);
        }
    });
}
