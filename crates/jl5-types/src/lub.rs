//! Least upper bound of reference types (JLS §15.12.2.7, simplified).

use std::collections::{HashSet, VecDeque};

use crate::members::{as_super, direct_supertypes};
use crate::{erasure, is_generic_class, is_subtype, types_equal, ClassId, Type, TypeEnv};

/// Least upper bound of `types`.
///
/// Primitives are boxed and the null type is ignored. If one input is a supertype of all
/// others it is the answer. Otherwise the minimal erased common supertypes are
/// instantiated: identical parameterizations are kept, differing ones become `?`, and a
/// raw instance anywhere makes the result raw. Classes are listed before interfaces. The
/// result never contains a [`Type::Lub`].
pub fn lub(env: &dyn TypeEnv, types: &[Type]) -> Type {
    let wk = env.well_known();
    let mut tys: Vec<Type> = Vec::with_capacity(types.len());
    for ty in flatten(types) {
        let ty = match ty {
            Type::Null => continue,
            Type::Primitive(prim) => Type::class(wk.boxed(prim)),
            other => other,
        };
        if !tys.iter().any(|existing| types_equal(env, existing, &ty)) {
            tys.push(ty);
        }
    }

    match tys.len() {
        0 => return Type::Null,
        1 => return tys.remove(0),
        _ => {}
    }
    if tys.iter().any(Type::is_unknown) {
        return Type::Unknown;
    }

    if let Some(top) = tys
        .iter()
        .find(|candidate| tys.iter().all(|ty| is_subtype(env, ty, candidate)))
    {
        return top.clone();
    }

    if let Some(elems) = reference_array_elems(&tys) {
        return Type::array(lub(env, &elems));
    }

    let mut common = erased_supertypes(env, &tys[0]);
    for ty in &tys[1..] {
        let supers = erased_supertypes(env, ty);
        common.retain(|id| supers.contains(id));
    }

    let minimal: Vec<ClassId> = common
        .iter()
        .copied()
        .filter(|c| {
            !common
                .iter()
                .any(|d| d != c && is_subtype(env, &Type::Raw(*d), &Type::Raw(*c)))
        })
        .collect();

    let mut classes = Vec::new();
    let mut interfaces = Vec::new();
    for id in minimal {
        let part = instantiate(env, &tys, id);
        if env.class(id).is_some_and(|def| def.is_interface()) {
            interfaces.push(part);
        } else {
            classes.push(part);
        }
    }
    classes.append(&mut interfaces);

    tracing::trace!(inputs = tys.len(), parts = classes.len(), "computed lub");
    match classes.len() {
        0 => Type::class(wk.object),
        1 => classes.remove(0),
        _ => Type::Intersection(classes),
    }
}

fn flatten(types: &[Type]) -> Vec<Type> {
    let mut out = Vec::with_capacity(types.len());
    for ty in types {
        match ty {
            Type::Lub(parts) => out.extend(flatten(parts)),
            other => out.push(other.clone()),
        }
    }
    out
}

fn reference_array_elems(tys: &[Type]) -> Option<Vec<Type>> {
    tys.iter()
        .map(|ty| match ty.array_elem() {
            Some(elem) if !elem.is_primitive() => Some(elem.clone()),
            _ => None,
        })
        .collect()
}

/// Erased supertypes of `ty` (itself included) in breadth-first order.
fn erased_supertypes(env: &dyn TypeEnv, ty: &Type) -> Vec<ClassId> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([erasure(env, ty)]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        if let Some(id) = current.class_id() {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        queue.extend(
            direct_supertypes(env, &current)
                .iter()
                .map(|sup| erasure(env, sup)),
        );
    }
    out
}

fn instantiate(env: &dyn TypeEnv, tys: &[Type], id: ClassId) -> Type {
    if !is_generic_class(env, id) {
        return Type::class(id);
    }
    let mut invocations = Vec::with_capacity(tys.len());
    for ty in tys {
        match as_super(env, ty, id) {
            Some(Type::Parameterized(ct)) => invocations.push(ct),
            _ => return Type::Raw(id),
        }
    }
    let Some(first) = invocations.first() else {
        return Type::Raw(id);
    };
    let args = (0..first.args.len())
        .map(|idx| {
            let arg = &first.args[idx];
            let uniform = invocations
                .iter()
                .all(|ct| ct.args.get(idx).is_some_and(|other| types_equal(env, arg, other)));
            if uniform {
                arg.clone()
            } else {
                Type::unbounded()
            }
        })
        .collect();
    Type::parameterized(id, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeStore;

    #[test]
    fn supertype_of_all_inputs_wins() {
        let store = TypeStore::default();
        let wk = store.well_known();
        let number = Type::class(wk.number);
        let integer = Type::class(wk.integer);
        assert_eq!(lub(&store, &[integer, number.clone()]), number);
    }

    #[test]
    fn primitives_are_boxed_and_null_ignored() {
        let store = TypeStore::default();
        let wk = store.well_known();
        assert_eq!(
            lub(&store, &[Type::int(), Type::Null]),
            Type::class(wk.integer)
        );
    }

    #[test]
    fn sibling_boxes_meet_at_number_and_comparable() {
        let store = TypeStore::default();
        let wk = store.well_known();
        let joined = lub(&store, &[Type::class(wk.integer), Type::class(wk.long)]);
        assert_eq!(
            joined,
            Type::Intersection(vec![
                Type::class(wk.number),
                Type::parameterized(wk.comparable, vec![Type::unbounded()]),
            ])
        );
    }

    #[test]
    fn identical_parameterizations_are_kept() {
        let store = TypeStore::with_minimal_jdk();
        let array_list = store.class_id("java.util.ArrayList").unwrap();
        let list = store.class_id("java.util.List").unwrap();
        let string = Type::class(store.well_known().string);

        let a = Type::parameterized(array_list, vec![string.clone()]);
        let b = Type::parameterized(list, vec![string.clone()]);
        assert_eq!(lub(&store, &[a, b.clone()]), b);
    }
}
