use crate::{ArrayType, ClassType, Type, TypeEnv, TypeVarId};

/// Replace every occurrence of `vars[i]` in `ty` by `args[i]`.
///
/// Type variables are matched by id (declaration identity), never by name. The input is
/// not modified; a structurally new value is returned.
pub fn substitute(ty: &Type, vars: &[TypeVarId], args: &[Type]) -> Type {
    debug_assert_eq!(vars.len(), args.len(), "substitution lists must be parallel");
    if vars.is_empty() {
        return ty.clone();
    }
    match ty {
        Type::TypeVar(tv) => vars
            .iter()
            .position(|v| v == tv)
            .and_then(|idx| args.get(idx))
            .cloned()
            .unwrap_or_else(|| ty.clone()),
        Type::Parameterized(ct) => Type::Parameterized(ClassType {
            def: ct.def,
            args: ct.args.iter().map(|a| substitute(a, vars, args)).collect(),
            outer: ct
                .outer
                .as_ref()
                .map(|outer| Box::new(substitute(outer, vars, args))),
        }),
        Type::Array(arr) => Type::Array(ArrayType {
            elem: Box::new(substitute(&arr.elem, vars, args)),
            is_varargs: arr.is_varargs,
        }),
        Type::Wildcard(w) => Type::Wildcard(w.map_bound(|b| substitute(b, vars, args))),
        Type::Intersection(parts) => {
            Type::Intersection(parts.iter().map(|p| substitute(p, vars, args)).collect())
        }
        Type::Lub(parts) => Type::Lub(parts.iter().map(|p| substitute(p, vars, args)).collect()),
        Type::Void
        | Type::Primitive(_)
        | Type::Null
        | Type::Class(_)
        | Type::Raw(_)
        | Type::Named(_)
        | Type::Unknown => ty.clone(),
    }
}

/// A reusable `vars -> args` mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    vars: Vec<TypeVarId>,
    args: Vec<Type>,
}

impl Substitution {
    pub fn new(vars: Vec<TypeVarId>, args: Vec<Type>) -> Self {
        debug_assert_eq!(vars.len(), args.len(), "substitution lists must be parallel");
        Self { vars, args }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn vars(&self) -> &[TypeVarId] {
        &self.vars
    }

    pub fn args(&self) -> &[Type] {
        &self.args
    }

    /// Add the mappings of `other`; existing entries win.
    pub fn extend(&mut self, other: Substitution) {
        for (var, arg) in other.vars.into_iter().zip(other.args) {
            if !self.vars.contains(&var) {
                self.vars.push(var);
                self.args.push(arg);
            }
        }
    }

    pub fn get(&self, var: TypeVarId) -> Option<&Type> {
        let idx = self.vars.iter().position(|v| *v == var)?;
        self.args.get(idx)
    }

    pub fn apply(&self, ty: &Type) -> Type {
        substitute(ty, &self.vars, &self.args)
    }

    pub fn apply_all(&self, tys: &[Type]) -> Vec<Type> {
        tys.iter().map(|ty| self.apply(ty)).collect()
    }
}

/// The substitution under which members of `container` are viewed.
///
/// For `Outer<A>.Inner<B>` this maps `Inner`'s parameters to `B` and `Outer`'s to `A`.
/// Raw and non-generic containers yield the empty substitution; member types of raw
/// containers are erased separately (see [`crate::members`]).
pub fn member_substitution(env: &dyn TypeEnv, container: &Type) -> Substitution {
    let mut subst = Substitution::empty();
    let mut current = Some(container);
    while let Some(Type::Parameterized(ct)) = current {
        if let Some(def) = env.class(ct.def) {
            if def.type_params.len() == ct.args.len() {
                subst.extend(Substitution::new(def.type_params.clone(), ct.args.clone()));
            }
        }
        current = ct.outer.as_deref();
    }
    subst
}
