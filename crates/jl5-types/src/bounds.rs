//! Declaration-level checks on bound lists and explicit type arguments.

use crate::{
    erasure, format_type, is_subtype, ClassId, Result, Substitution, Type, TypeEnv, TypeError,
    TypeVarId,
};

/// Validate the bound list of a type variable (JLS §4.4).
///
/// Bounds must be reference types; at most two of them may be classes, and only when one
/// is a subtype of the other; two parameterizations of the same generic interface are
/// rejected.
pub fn check_intersection_bounds(env: &dyn TypeEnv, bounds: &[Type]) -> Result<(), TypeError> {
    for (idx, first) in bounds.iter().enumerate() {
        if !first.is_reference() || matches!(first, Type::Null) {
            return Err(invalid(env, first, first, "bound is not a reference type"));
        }
        for second in &bounds[idx + 1..] {
            let (Some(a), Some(b)) = (first.class_id(), second.class_id()) else {
                continue;
            };
            if a == b {
                if first != second {
                    return Err(invalid(
                        env,
                        first,
                        second,
                        "the same type is inherited with different arguments",
                    ));
                }
                continue;
            }
            if is_class(env, a)
                && is_class(env, b)
                && !is_subtype(env, &erasure(env, first), &erasure(env, second))
                && !is_subtype(env, &erasure(env, second), &erasure(env, first))
            {
                return Err(invalid(env, first, second, "unrelated classes"));
            }
        }
    }
    Ok(())
}

fn is_class(env: &dyn TypeEnv, id: ClassId) -> bool {
    env.class(id).is_some_and(|def| !def.is_interface())
}

fn invalid(env: &dyn TypeEnv, first: &Type, second: &Type, reason: &str) -> TypeError {
    TypeError::InvalidIntersection {
        first: format_type(env, first),
        second: format_type(env, second),
        reason: reason.to_string(),
    }
}

/// Reject a bound that mentions a type parameter declared later in the same list.
///
/// Self references (`T extends Comparable<T>`) are allowed.
pub fn check_forward_references(env: &dyn TypeEnv, params: &[TypeVarId]) -> Result<(), TypeError> {
    for (i, param) in params.iter().enumerate() {
        let Some(def) = env.type_param(*param) else {
            continue;
        };
        for later in &params[i + 1..] {
            if def.upper_bounds.iter().any(|bound| bound.mentions_type_var(*later)) {
                let referenced = env
                    .type_param(*later)
                    .map(|d| d.name.clone())
                    .unwrap_or_default();
                return Err(TypeError::IllegalForwardReference {
                    param: def.name.clone(),
                    referenced,
                });
            }
        }
    }
    Ok(())
}

/// Check `args` against the declared bounds of `params`.
///
/// Bounds are checked with the whole substitution applied, so a bound that mentions
/// another parameter of the list (`<T, U extends List<T>>`) sees its argument.
pub fn check_type_arguments(
    env: &dyn TypeEnv,
    params: &[TypeVarId],
    args: &[Type],
) -> Result<(), TypeError> {
    if params.len() != args.len() {
        return Err(TypeError::WrongTypeArgumentCount {
            class: String::new(),
            expected: params.len(),
            found: args.len(),
        });
    }
    let subst = Substitution::new(params.to_vec(), args.to_vec());
    for (param, arg) in params.iter().zip(args) {
        let Some(def) = env.type_param(*param) else {
            continue;
        };
        if arg.is_wildcard() {
            continue;
        }
        for bound in &def.upper_bounds {
            let bound = subst.apply(bound);
            if !is_subtype(env, arg, &bound) {
                return Err(TypeError::InvalidTypeArgument {
                    param: def.name.clone(),
                    arg: format_type(env, arg),
                    bound: format_type(env, &bound),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassDef, TypeStore};

    #[test]
    fn rejects_unrelated_classes_and_accepts_interfaces() {
        let mut store = TypeStore::with_minimal_jdk();
        let wk = store.well_known().clone();
        let a = store.add_class(ClassDef::class("com.example.A"));
        let b = store.add_class(ClassDef::class("com.example.B"));

        let err = check_intersection_bounds(&store, &[Type::class(a), Type::class(b)])
            .unwrap_err();
        assert!(matches!(err, TypeError::InvalidIntersection { .. }));

        check_intersection_bounds(&store, &[Type::class(a), Type::class(wk.serializable)]).unwrap();
        check_intersection_bounds(&store, &[Type::class(wk.integer), Type::class(wk.number)])
            .unwrap();
    }

    #[test]
    fn rejects_two_parameterizations_of_one_interface() {
        let store = TypeStore::default();
        let wk = store.well_known();
        let bounds = [
            Type::parameterized(wk.comparable, vec![Type::class(wk.string)]),
            Type::parameterized(wk.comparable, vec![Type::class(wk.integer)]),
        ];
        assert!(check_intersection_bounds(&store, &bounds).is_err());
        assert!(check_intersection_bounds(&store, &[Type::int()]).is_err());
    }

    #[test]
    fn forward_references_are_rejected_self_references_are_not() {
        let mut store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let comparable = store.well_known().comparable;

        let t = store.add_type_param("T", vec![]);
        let u = store.add_type_param("U", vec![]);
        store.set_type_param_bounds(t, vec![Type::parameterized(list, vec![Type::TypeVar(u)])]);
        assert_eq!(
            check_forward_references(&store, &[t, u]),
            Err(TypeError::IllegalForwardReference {
                param: "T".to_string(),
                referenced: "U".to_string(),
            })
        );
        // Backward references are fine.
        assert!(check_forward_references(&store, &[u, t]).is_ok());

        let s = store.add_type_param("S", vec![]);
        store.set_type_param_bounds(s, vec![Type::parameterized(comparable, vec![Type::TypeVar(s)])]);
        assert!(check_forward_references(&store, &[s]).is_ok());
    }

    #[test]
    fn type_arguments_see_earlier_substitutions() {
        let mut store = TypeStore::with_minimal_jdk();
        let wk = store.well_known().clone();
        let list = store.class_id("java.util.List").unwrap();
        let array_list = store.class_id("java.util.ArrayList").unwrap();

        let t = store.add_type_param("T", vec![]);
        let u = store.add_type_param("U", vec![Type::parameterized(list, vec![Type::TypeVar(t)])]);

        let string = Type::class(wk.string);
        let good = Type::parameterized(array_list, vec![string.clone()]);
        let bad = Type::parameterized(array_list, vec![Type::class(wk.integer)]);
        assert!(check_type_arguments(&store, &[t, u], &[string.clone(), good]).is_ok());
        assert!(matches!(
            check_type_arguments(&store, &[t, u], &[string, bad]),
            Err(TypeError::InvalidTypeArgument { .. })
        ));
    }
}
