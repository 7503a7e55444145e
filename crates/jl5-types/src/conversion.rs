//! Boxing, primitive widening and method invocation conversion (JLS §5.1, §5.3).

use crate::{is_generic_class, is_subtype, rawify, PrimitiveType, Type, TypeEnv};

/// Wrapper class type for a primitive; `None` for anything else.
pub fn box_type(env: &dyn TypeEnv, ty: &Type) -> Option<Type> {
    match ty {
        Type::Primitive(prim) => Some(Type::class(env.well_known().boxed(*prim))),
        _ => None,
    }
}

/// Primitive wrapped by a wrapper class type, looking through type variable bounds.
pub fn unbox_type(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    match ty {
        Type::Class(id) => env.well_known().unboxed(*id),
        Type::TypeVar(tv) => env
            .type_param(*tv)?
            .upper_bounds
            .iter()
            .find_map(|bound| unbox_type(env, bound)),
        Type::Intersection(parts) => parts.iter().find_map(|part| unbox_type(env, part)),
        _ => None,
    }
}

/// Widening primitive conversion (JLS §5.1.2), identity excluded.
pub fn is_primitive_widening(from: PrimitiveType, to: PrimitiveType) -> bool {
    use PrimitiveType::*;
    match from {
        Byte => matches!(to, Short | Int | Long | Float | Double),
        Short | Char => matches!(to, Int | Long | Float | Double),
        Int => matches!(to, Long | Float | Double),
        Long => matches!(to, Float | Double),
        Float => matches!(to, Double),
        Boolean | Double => false,
    }
}

/// Unchecked conversion: a raw type to a parameterization of one of its ancestors.
fn is_unchecked_convertible(env: &dyn TypeEnv, from: &Type, to: &Type) -> bool {
    let raw_source = match from {
        Type::Raw(_) => true,
        Type::Class(id) => is_generic_class(env, *id),
        _ => false,
    };
    raw_source && matches!(to, Type::Parameterized(_)) && is_subtype(env, from, &rawify(env, to))
}

fn is_strict_convertible(env: &dyn TypeEnv, from: &Type, to: &Type) -> bool {
    match (from, to) {
        (Type::Primitive(a), Type::Primitive(b)) => a == b || is_primitive_widening(*a, *b),
        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
        _ => is_subtype(env, from, to) || is_unchecked_convertible(env, from, to),
    }
}

/// Method invocation conversion (JLS §5.3).
///
/// Without boxing: identity, widening primitive, widening reference and unchecked
/// conversion. With boxing additionally boxing followed by widening reference and
/// unboxing followed by widening primitive.
pub fn is_method_invocation_convertible(
    env: &dyn TypeEnv,
    from: &Type,
    to: &Type,
    allow_boxing: bool,
) -> bool {
    if from.is_unknown() || to.is_unknown() {
        return true;
    }
    if is_strict_convertible(env, from, to) {
        return true;
    }
    if !allow_boxing {
        return false;
    }
    match (from, to) {
        (Type::Primitive(_), _) => {
            box_type(env, from).is_some_and(|boxed| is_subtype(env, &boxed, to))
        }
        (_, Type::Primitive(target)) => unbox_type(env, from)
            .is_some_and(|prim| prim == *target || is_primitive_widening(prim, *target)),
        _ => false,
    }
}
