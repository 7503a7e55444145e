//! Supertype walks and member lookup through a container's instantiation.

use std::collections::{HashSet, VecDeque};

use crate::{
    erasure, is_generic_class, member_substitution, types_equal, ClassId, ProcedureId,
    ProcedureKind, Type, TypeEnv, TypeVarId, Visibility,
};

/// Whether members of `container` are seen through erasure (JLS §4.8).
fn is_raw_view(env: &dyn TypeEnv, container: &Type) -> bool {
    match container {
        Type::Raw(_) => true,
        Type::Class(id) => is_generic_class(env, *id),
        _ => false,
    }
}

/// Direct supertypes of `ty`, instantiated through `ty`'s type arguments.
///
/// Supertypes of a raw type are erased. Interfaces and classes without a declared
/// superclass report `Object`; arrays report `Object`, `Cloneable` and `Serializable`.
pub fn direct_supertypes(env: &dyn TypeEnv, ty: &Type) -> Vec<Type> {
    let wk = env.well_known();
    match ty {
        Type::Class(id) | Type::Raw(id) => direct_class_supertypes(env, *id, ty),
        Type::Parameterized(ct) => direct_class_supertypes(env, ct.def, ty),
        Type::TypeVar(tv) => env
            .type_param(*tv)
            .map(|def| def.upper_bounds.clone())
            .unwrap_or_else(|| vec![Type::class(wk.object)]),
        Type::Intersection(parts) => parts.clone(),
        Type::Array(_) => vec![
            Type::class(wk.object),
            Type::class(wk.cloneable),
            Type::class(wk.serializable),
        ],
        _ => Vec::new(),
    }
}

fn direct_class_supertypes(env: &dyn TypeEnv, id: ClassId, ty: &Type) -> Vec<Type> {
    let object = env.well_known().object;
    let Some(def) = env.class(id) else {
        return if id == object {
            Vec::new()
        } else {
            vec![Type::class(object)]
        };
    };

    let mut out = Vec::with_capacity(def.interfaces.len() + 1);
    out.extend(def.super_class.iter().cloned());
    out.extend(def.interfaces.iter().cloned());
    if out.is_empty() && id != object {
        out.push(Type::class(object));
    }

    if is_raw_view(env, ty) {
        out.iter().map(|sup| erasure(env, sup)).collect()
    } else {
        let subst = member_substitution(env, ty);
        out.iter().map(|sup| subst.apply(sup)).collect()
    }
}

/// Every distinct instantiation of `target` reachable from `ty` (including `ty` itself),
/// in breadth-first order.
pub fn supertype_instances(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Vec<Type> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([ty.clone()]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        if current.class_id() == Some(target) {
            if !out.contains(&current) {
                out.push(current);
            }
            continue;
        }
        queue.extend(direct_supertypes(env, &current));
    }
    out
}

/// View `ty` as an instantiation of the ancestor class `target`.
///
/// Example: `ArrayList<String>` viewed as `List` is `List<String>`.
pub fn as_super(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    supertype_instances(env, ty, target).into_iter().next()
}

/// Class-like types to search for members of `receiver`, most derived first.
fn member_search_order(env: &dyn TypeEnv, receiver: &Type) -> Vec<Type> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let start = match receiver {
        Type::Array(_) => Type::class(env.well_known().object),
        other => other.clone(),
    };
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        if current.class_id().is_some() {
            out.push(current.clone());
        }
        queue.extend(direct_supertypes(env, &current));
    }
    out
}

/// Type of the field `name` as seen from `container`.
pub fn field_type(env: &dyn TypeEnv, container: &Type, name: &str) -> Option<Type> {
    for ty in member_search_order(env, container) {
        let Some(id) = ty.class_id() else {
            continue;
        };
        let Some(def) = env.class(id) else {
            continue;
        };
        if let Some(field) = def.fields.iter().find(|f| f.name == name) {
            if is_raw_view(env, &ty) && !field.is_static {
                return Some(erasure(env, &field.ty));
            }
            return Some(member_substitution(env, &ty).apply(&field.ty));
        }
    }
    None
}

/// A method or constructor as seen through a particular container type.
///
/// Class-level type variables are already substituted (or erased, for raw containers);
/// the procedure's own type parameters are still free.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub id: ProcedureId,
    pub name: String,
    /// The (instantiated) type declaring the procedure.
    pub container: Type,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_varargs: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub visibility: Visibility,
}

impl Candidate {
    /// The `index`-th method of the class behind `container`.
    pub fn method(env: &dyn TypeEnv, container: &Type, index: usize) -> Option<Candidate> {
        let owner = container.class_id()?;
        let method = env.class(owner)?.methods.get(index)?;
        let raw = is_raw_view(env, container) && !method.is_static;
        let subst = member_substitution(env, container);
        let view = |ty: &Type| {
            if raw {
                erasure(env, ty)
            } else {
                subst.apply(ty)
            }
        };
        Some(Candidate {
            id: ProcedureId {
                owner,
                kind: ProcedureKind::Method,
                index: index as u32,
            },
            name: method.name.clone(),
            container: container.clone(),
            type_params: if raw {
                Vec::new()
            } else {
                method.type_params.clone()
            },
            params: method.params.iter().map(view).collect(),
            return_type: view(&method.return_type),
            is_varargs: method.is_varargs,
            is_static: method.is_static,
            is_abstract: method.is_abstract,
            visibility: method.visibility,
        })
    }

    /// The `index`-th constructor of the class behind `container`.
    pub fn constructor(env: &dyn TypeEnv, container: &Type, index: usize) -> Option<Candidate> {
        let owner = container.class_id()?;
        let def = env.class(owner)?;
        let ctor = def.constructors.get(index)?;
        let raw = is_raw_view(env, container);
        let subst = member_substitution(env, container);
        let view = |ty: &Type| {
            if raw {
                erasure(env, ty)
            } else {
                subst.apply(ty)
            }
        };
        Some(Candidate {
            id: ProcedureId {
                owner,
                kind: ProcedureKind::Constructor,
                index: index as u32,
            },
            name: def.name.rsplit(['.', '$']).next().unwrap_or(&def.name).to_string(),
            container: container.clone(),
            type_params: if raw {
                Vec::new()
            } else {
                ctor.type_params.clone()
            },
            params: ctor.params.iter().map(view).collect(),
            return_type: Type::Void,
            is_varargs: ctor.is_varargs,
            is_static: false,
            is_abstract: false,
            visibility: ctor.visibility,
        })
    }
}

/// Methods named `name` visible on `receiver`, inherited ones included.
///
/// Methods are collected most-derived first; an inherited method whose erased parameter
/// list matches one already collected is overridden and skipped.
pub fn collect_methods(env: &dyn TypeEnv, receiver: &Type, name: &str) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = Vec::new();
    let mut erased_sigs: Vec<Vec<Type>> = Vec::new();
    for ty in member_search_order(env, receiver) {
        let Some(def) = ty.class_id().and_then(|id| env.class(id)) else {
            continue;
        };
        for (index, method) in def.methods.iter().enumerate() {
            if method.name != name {
                continue;
            }
            let Some(candidate) = Candidate::method(env, &ty, index) else {
                continue;
            };
            let erased: Vec<Type> = candidate.params.iter().map(|p| erasure(env, p)).collect();
            let overridden = erased_sigs.iter().any(|sig| {
                sig.len() == erased.len()
                    && sig.iter().zip(&erased).all(|(a, b)| types_equal(env, a, b))
            });
            if overridden {
                continue;
            }
            erased_sigs.push(erased);
            out.push(candidate);
        }
    }
    out
}

/// Constructors of the class behind `class_type`.
pub fn collect_constructors(env: &dyn TypeEnv, class_type: &Type) -> Vec<Candidate> {
    let Some(def) = class_type.class_id().and_then(|id| env.class(id)) else {
        return Vec::new();
    };
    (0..def.constructors.len())
        .filter_map(|index| Candidate::constructor(env, class_type, index))
        .collect()
}

fn top_level_class(env: &dyn TypeEnv, mut id: ClassId) -> ClassId {
    while let Some(outer) = env.class(id).and_then(|def| def.outer) {
        id = outer;
    }
    id
}

fn package_of(env: &dyn TypeEnv, id: ClassId) -> String {
    env.class(id)
        .map(|def| def.package().to_string())
        .unwrap_or_default()
}

/// Whether a member of `owner` with `visibility` may be accessed from `caller`.
///
/// `caller == None` is code outside any class: only public members are accessible.
pub fn is_accessible(
    env: &dyn TypeEnv,
    owner: ClassId,
    visibility: Visibility,
    caller: Option<ClassId>,
) -> bool {
    if visibility == Visibility::Public {
        return true;
    }
    let Some(caller) = caller else {
        return false;
    };
    match visibility {
        Visibility::Public => true,
        Visibility::Private => top_level_class(env, caller) == top_level_class(env, owner),
        Visibility::Package => package_of(env, caller) == package_of(env, owner),
        Visibility::Protected => {
            package_of(env, caller) == package_of(env, owner)
                || crate::is_subtype(env, &erasure(env, &Type::class(caller)), &erasure(env, &Type::class(owner)))
        }
    }
}
