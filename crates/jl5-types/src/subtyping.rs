use crate::members::supertype_instances;
use crate::{is_generic_class, lub, Type, TypeEnv, TypeVarOwner, WildcardBound};

/// Subtyping oracle (`sub <: sup`).
///
/// Rules are tried in a fixed order:
/// 1. a wildcard is never a subtype of anything;
/// 2. a `Lub` on the left must be a subtype in every component;
/// 3. an intersection on the left needs *some* bound to be a subtype;
/// 4. a type variable on the right accepts nominal subtypes and subtypes of its lower
///    bound;
/// 5. a `Lub` on the right accepts subtypes of a component or of the computed bound;
/// 6. an intersection on the right needs *every* bound to be a supertype;
/// 7. everything else is nominal subtyping with containment of type arguments.
///
/// `Unknown` is compatible with everything so that one unresolved type does not cascade
/// into unrelated errors.
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    Oracle::new(env).subtype(sub, sup, 0)
}

/// Type-argument containment (JLS §4.5.1.1): `child` is an instantiation of the same
/// generic class as `ancestor` whose arguments are contained in `ancestor`'s arguments.
pub fn check_contains(env: &dyn TypeEnv, child: &Type, ancestor: &Type) -> bool {
    Oracle::new(env).contains(child, ancestor, 0)
}

/// Structural type equality with declaration-identity for type variables.
///
/// Type variables are equal when they have the same id, or the same name and the same
/// (non-synthetic) owner. Intersections are equal when they are mutual subtypes or hold
/// the same bounds in any order.
pub fn types_equal(env: &dyn TypeEnv, a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::Parameterized(x), Type::Parameterized(y)) => {
            x.def == y.def
                && x.args.len() == y.args.len()
                && x.args.iter().zip(&y.args).all(|(p, q)| types_equal(env, p, q))
                && match (x.outer.as_deref(), y.outer.as_deref()) {
                    (None, None) => true,
                    (Some(p), Some(q)) => types_equal(env, p, q),
                    _ => false,
                }
        }
        (Type::TypeVar(x), Type::TypeVar(y)) => {
            if x == y {
                return true;
            }
            match (env.type_param(*x), env.type_param(*y)) {
                (Some(p), Some(q)) => {
                    p.name == q.name && p.owner == q.owner && p.owner != TypeVarOwner::Synthetic
                }
                _ => false,
            }
        }
        (Type::Wildcard(x), Type::Wildcard(y)) => match (x, y) {
            (WildcardBound::Unbounded, WildcardBound::Unbounded) => true,
            (WildcardBound::Extends(p), WildcardBound::Extends(q))
            | (WildcardBound::Super(p), WildcardBound::Super(q)) => types_equal(env, p, q),
            _ => false,
        },
        (Type::Intersection(x), Type::Intersection(y)) => {
            (is_subtype(env, a, b) && is_subtype(env, b, a))
                || (x.len() == y.len()
                    && x.iter().all(|p| y.iter().any(|q| types_equal(env, p, q))))
        }
        (Type::Array(x), Type::Array(y)) => types_equal(env, &x.elem, &y.elem),
        (Type::Lub(x), Type::Lub(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| types_equal(env, p, q))
        }
        (Type::Class(x), Type::Raw(y)) | (Type::Raw(y), Type::Class(x)) => x == y,
        _ => a == b,
    }
}

struct Oracle<'a> {
    env: &'a dyn TypeEnv,
    max_depth: usize,
}

impl<'a> Oracle<'a> {
    fn new(env: &'a dyn TypeEnv) -> Self {
        Self {
            env,
            max_depth: env.options().max_subtype_depth,
        }
    }

    fn subtype(&self, t1: &Type, t2: &Type, depth: usize) -> bool {
        if depth > self.max_depth {
            tracing::debug!(?t1, ?t2, depth, "subtype check exceeded depth limit");
            return false;
        }
        let depth = depth + 1;

        if t1.is_wildcard() {
            return false;
        }
        if t1 == t2 {
            return true;
        }
        match t1 {
            Type::Lub(parts) => return parts.iter().all(|p| self.subtype(p, t2, depth)),
            Type::Intersection(parts) => return parts.iter().any(|p| self.subtype(p, t2, depth)),
            _ => {}
        }

        match t2 {
            Type::TypeVar(tv) => {
                if self.nominal(t1, t2, depth) {
                    return true;
                }
                match self.env.type_param(*tv).and_then(|def| def.lower_bound.as_ref()) {
                    Some(lower) => self.subtype(t1, lower, depth),
                    None => false,
                }
            }
            Type::Lub(parts) => {
                if parts.iter().any(|p| self.subtype(t1, p, depth)) {
                    return true;
                }
                let joined = lub(self.env, parts);
                !matches!(joined, Type::Lub(_)) && self.subtype(t1, &joined, depth)
            }
            Type::Intersection(parts) => parts.iter().all(|p| self.subtype(t1, p, depth)),
            _ => self.nominal(t1, t2, depth),
        }
    }

    fn nominal(&self, t1: &Type, t2: &Type, depth: usize) -> bool {
        if t1.is_unknown() || t2.is_unknown() {
            return true;
        }
        if types_equal(self.env, t1, t2) {
            return true;
        }
        let object = self.env.well_known().object;
        match (t1, t2) {
            (Type::Null, _) => t2.is_reference(),
            (_, Type::Null) => false,
            (Type::Void | Type::Primitive(_), _) | (_, Type::Void | Type::Primitive(_)) => false,
            (Type::Named(_), _) => *t2 == Type::Class(object),
            (Type::Array(a), Type::Array(b)) => {
                if a.elem.is_primitive() || b.elem.is_primitive() {
                    types_equal(self.env, &a.elem, &b.elem)
                } else {
                    self.subtype(&a.elem, &b.elem, depth)
                }
            }
            (Type::Array(_), _) => {
                let wk = self.env.well_known();
                matches!(t2, Type::Class(id) if *id == wk.object || *id == wk.cloneable || *id == wk.serializable)
            }
            (Type::TypeVar(tv), _) => match self.env.type_param(*tv) {
                Some(def) => def
                    .upper_bounds
                    .iter()
                    .any(|bound| self.subtype(bound, t2, depth)),
                None => *t2 == Type::Class(object),
            },
            (Type::Class(_) | Type::Raw(_) | Type::Parameterized(_), _) => {
                self.class_subtype(t1, t2, depth)
            }
            _ => false,
        }
    }

    fn class_subtype(&self, t1: &Type, t2: &Type, depth: usize) -> bool {
        let Some(target) = t2.class_id() else {
            return false;
        };
        if target == self.env.well_known().object && !matches!(t2, Type::Parameterized(_)) {
            return true;
        }
        let raw_target = match t2 {
            Type::Raw(_) => true,
            Type::Class(id) => is_generic_class(self.env, *id),
            _ => false,
        };

        for ancestor in supertype_instances(self.env, t1, target) {
            if raw_target {
                return true;
            }
            match (&ancestor, t2) {
                (Type::Parameterized(_), Type::Parameterized(_)) => {
                    if self.contains(&ancestor, t2, depth) {
                        return true;
                    }
                }
                (Type::Class(_), Type::Class(_)) => return true,
                // A raw ancestor reaches a parameterized target only through unchecked
                // conversion, which is not subtyping.
                _ => {}
            }
        }
        false
    }

    fn contains(&self, child: &Type, ancestor: &Type, depth: usize) -> bool {
        let (Type::Parameterized(c), Type::Parameterized(a)) = (child, ancestor) else {
            return types_equal(self.env, child, ancestor);
        };
        if c.def != a.def || c.args.len() != a.args.len() {
            return false;
        }

        let object = Type::class(self.env.well_known().object);
        for (child_arg, ancestor_arg) in c.args.iter().zip(&a.args) {
            let ok = match ancestor_arg {
                Type::Wildcard(WildcardBound::Unbounded) => true,
                Type::Wildcard(WildcardBound::Extends(bound)) => match child_arg {
                    Type::Wildcard(WildcardBound::Extends(child_bound)) => {
                        self.subtype(child_bound, bound, depth)
                    }
                    Type::Wildcard(_) => self.subtype(&object, bound, depth),
                    other => self.subtype(other, bound, depth),
                },
                Type::Wildcard(WildcardBound::Super(bound)) => match child_arg {
                    Type::Wildcard(WildcardBound::Super(child_bound)) => {
                        self.subtype(bound, child_bound, depth)
                    }
                    Type::Wildcard(_) => false,
                    other => self.subtype(bound, other, depth),
                },
                other => types_equal(self.env, child_arg, other),
            };
            if !ok {
                return false;
            }
        }

        match (c.outer.as_deref(), a.outer.as_deref()) {
            (Some(child_outer), Some(ancestor_outer)) => {
                self.contains(child_outer, ancestor_outer, depth)
            }
            _ => true,
        }
    }
}
