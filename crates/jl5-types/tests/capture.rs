use jl5_types::{is_subtype, ClassDef, TyContext, Type, TypeEnv, TypeStore};

use pretty_assertions::assert_eq;

fn captured_vars(ty: &Type) -> Vec<jl5_types::TypeVarId> {
    let Type::Parameterized(ct) = ty else {
        panic!("expected a parameterized type, got {ty:?}");
    };
    ct.args
        .iter()
        .filter_map(|arg| match arg {
            Type::TypeVar(tv) => Some(*tv),
            _ => None,
        })
        .collect()
}

#[test]
fn capture_allocates_context_local_vars() {
    let store = TypeStore::with_minimal_jdk();
    let list = store.class_id("java.util.List").unwrap();
    let integer = Type::class(store.well_known().integer);

    let mut ctx = TyContext::new(&store);
    let list_extends_integer = Type::parameterized(list, vec![Type::extends(integer.clone())]);
    let captured = ctx.capture_conversion(&list_extends_integer);

    let vars = captured_vars(&captured);
    assert_eq!(vars.len(), 1);
    let def = ctx.type_param(vars[0]).unwrap();
    assert!(def.name.starts_with("CAP#"));
    // `Object` from the declaration is dropped next to the explicit bound.
    assert_eq!(def.upper_bounds, vec![integer]);
    assert_eq!(def.lower_bound, None);

    // The global store never sees capture variables.
    assert!(store.type_param(vars[0]).is_none());
}

#[test]
fn capture_without_wildcards_is_identity() {
    let store = TypeStore::with_minimal_jdk();
    let list = store.class_id("java.util.List").unwrap();
    let list_string = Type::parameterized(list, vec![Type::class(store.well_known().string)]);

    let mut ctx = TyContext::new(&store);
    assert_eq!(ctx.capture_conversion(&list_string), list_string);
    assert_eq!(ctx.local_count(), 0);
}

#[test]
fn capturing_twice_yields_distinct_variables() {
    let store = TypeStore::with_minimal_jdk();
    let list = store.class_id("java.util.List").unwrap();
    let list_any = Type::parameterized(list, vec![Type::unbounded()]);

    let mut ctx = TyContext::new(&store);
    let first = captured_vars(&ctx.capture_conversion(&list_any));
    let second = captured_vars(&ctx.capture_conversion(&list_any));
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_ne!(first[0], second[0]);
}

#[test]
fn super_wildcards_become_lower_bounds() {
    let store = TypeStore::with_minimal_jdk();
    let wk = store.well_known();
    let list = store.class_id("java.util.List").unwrap();
    let integer = Type::class(wk.integer);

    let mut ctx = TyContext::new(&store);
    let captured =
        ctx.capture_conversion(&Type::parameterized(list, vec![Type::super_of(integer.clone())]));
    let cap = captured_vars(&captured)[0];

    let def = ctx.type_param(cap).unwrap();
    assert_eq!(def.lower_bound, Some(integer.clone()));
    assert_eq!(def.upper_bounds, vec![Type::class(wk.object)]);

    // `Integer <: CAP#1` through the lower bound.
    assert!(is_subtype(&ctx, &integer, &Type::TypeVar(cap)));
    assert!(!is_subtype(&ctx, &Type::class(wk.string), &Type::TypeVar(cap)));
}

#[test]
fn sibling_bounds_refer_to_fresh_captures() {
    let mut store = TypeStore::with_minimal_jdk();
    let comparable = store.well_known().comparable;

    // class Pair<A extends Comparable<B>, B>
    let a = store.add_type_param("A", vec![]);
    let b = store.add_type_param("B", vec![]);
    store.set_type_param_bounds(a, vec![Type::parameterized(comparable, vec![Type::TypeVar(b)])]);
    let pair = store.add_class(ClassDef {
        type_params: vec![a, b],
        ..ClassDef::class("com.example.Pair")
    });

    let mut ctx = TyContext::new(&store);
    let captured =
        ctx.capture_conversion(&Type::parameterized(pair, vec![Type::unbounded(), Type::unbounded()]));
    let vars = captured_vars(&captured);
    assert_eq!(vars.len(), 2);

    let first = ctx.type_param(vars[0]).unwrap();
    assert_eq!(
        first.upper_bounds,
        vec![Type::parameterized(comparable, vec![Type::TypeVar(vars[1])])]
    );
}

#[test]
fn reset_forgets_captures() {
    let store = TypeStore::with_minimal_jdk();
    let list = store.class_id("java.util.List").unwrap();

    let mut ctx = TyContext::new(&store);
    let captured = ctx.capture_conversion(&Type::parameterized(list, vec![Type::unbounded()]));
    let cap = captured_vars(&captured)[0];
    assert!(ctx.type_param(cap).is_some());

    ctx.reset();
    assert_eq!(ctx.local_count(), 0);
    assert!(ctx.type_param(cap).is_none());
}
