use std::collections::HashSet;

use crate::{ArrayType, ClassId, Type, TypeEnv, TypeVarId};

pub fn is_generic_class(env: &dyn TypeEnv, id: ClassId) -> bool {
    env.class(id).is_some_and(|def| def.is_generic())
}

/// Project a class type onto its raw form.
///
/// `Parameterized` types and bare references to generic classes become `Raw`; everything
/// else is returned unchanged. Idempotent.
pub fn rawify(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Parameterized(ct) => {
            if is_generic_class(env, ct.def) {
                Type::Raw(ct.def)
            } else {
                Type::Class(ct.def)
            }
        }
        Type::Class(id) if is_generic_class(env, *id) => Type::Raw(*id),
        _ => ty.clone(),
    }
}

/// The enclosing type of a raw (or erased) nested class.
///
/// Raw-ness propagates outward: the enclosing view is raw whenever the enclosing class is
/// generic.
pub fn raw_outer(env: &dyn TypeEnv, id: ClassId) -> Option<Type> {
    let outer = env.class(id)?.outer?;
    Some(rawify(env, &Type::Class(outer)))
}

/// Type erasure (JLS §4.6).
///
/// Type variables and intersections erase to the erasure of their *first* bound only.
pub fn erasure(env: &dyn TypeEnv, ty: &Type) -> Type {
    erasure_inner(env, ty, &mut HashSet::new())
}

fn erasure_inner(env: &dyn TypeEnv, ty: &Type, seen: &mut HashSet<TypeVarId>) -> Type {
    match ty {
        Type::Class(_) | Type::Parameterized(_) => rawify(env, ty),
        Type::TypeVar(tv) => {
            if !seen.insert(*tv) {
                // Bound cycles are rejected when declarations are checked.
                return Type::class(env.well_known().object);
            }
            let first = env
                .type_param(*tv)
                .and_then(|def| def.upper_bounds.first().cloned())
                .unwrap_or_else(|| Type::class(env.well_known().object));
            let erased = erasure_inner(env, &first, seen);
            seen.remove(tv);
            erased
        }
        Type::Intersection(parts) => match parts.first() {
            Some(first) => erasure_inner(env, first, seen),
            None => Type::class(env.well_known().object),
        },
        Type::Array(arr) => Type::Array(ArrayType {
            elem: Box::new(erasure_inner(env, &arr.elem, seen)),
            is_varargs: arr.is_varargs,
        }),
        Type::Wildcard(w) => erasure_inner(env, &w.upper_bound(env), seen),
        Type::Lub(parts) => {
            let joined = crate::lub(env, parts);
            erasure_inner(env, &joined, seen)
        }
        Type::Void
        | Type::Primitive(_)
        | Type::Null
        | Type::Raw(_)
        | Type::Named(_)
        | Type::Unknown => ty.clone(),
    }
}

/// Whether `ty` is reifiable (JLS §4.7): its runtime representation carries all of its
/// type information.
pub fn is_reifiable(env: &dyn TypeEnv, ty: &Type) -> bool {
    match ty {
        Type::Parameterized(ct) => {
            ct.args
                .iter()
                .all(|arg| matches!(arg, Type::Wildcard(crate::WildcardBound::Unbounded)))
                && ct.outer.as_deref().map_or(true, |o| is_reifiable(env, o))
        }
        Type::TypeVar(_) | Type::Intersection(_) | Type::Lub(_) | Type::Wildcard(_) => false,
        Type::Array(arr) => is_reifiable(env, &arr.elem),
        _ => true,
    }
}
