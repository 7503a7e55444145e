use std::fmt;

use crate::{
    member_substitution, types_equal, ClassDef, ClassId, ClassType, Substitution, Type, TypeEnv,
    TypeParamDef, TypeStoreOptions, TypeVarId, TypeVarOwner, WellKnownTypes, WildcardBound,
};

const CONTEXT_LOCAL_BIT: u32 = 1 << 31;

pub(crate) fn is_context_local(id: TypeVarId) -> bool {
    id.0 & CONTEXT_LOCAL_BIT != 0
}

/// Per-invocation typing context used by capture conversion and overload resolution.
///
/// Capture variables are allocated here rather than in the global [`crate::TypeStore`],
/// so resolving a call never mutates shared state.
pub struct TyContext<'env> {
    base: &'env dyn TypeEnv,
    locals: Vec<TypeParamDef>,
}

impl fmt::Debug for TyContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TyContext")
            .field("locals", &self.locals)
            .finish_non_exhaustive()
    }
}

impl<'env> TyContext<'env> {
    pub fn new(base: &'env dyn TypeEnv) -> Self {
        Self {
            base,
            locals: Vec::new(),
        }
    }

    /// Drop all context-local allocations.
    pub fn reset(&mut self) {
        self.locals.clear();
    }

    /// Number of capture variables allocated so far.
    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    fn add_capture_type_param(&mut self) -> TypeVarId {
        let idx = self.locals.len() as u32;
        let object = Type::class(self.well_known().object);
        self.locals.push(TypeParamDef {
            name: format!("CAP#{}", idx + 1),
            upper_bounds: vec![object],
            lower_bound: None,
            owner: TypeVarOwner::Synthetic,
        });
        TypeVarId(CONTEXT_LOCAL_BIT | idx)
    }

    fn define_capture(&mut self, id: TypeVarId, upper_bounds: Vec<Type>, lower_bound: Option<Type>) {
        let idx = (id.0 & !CONTEXT_LOCAL_BIT) as usize;
        let object = Type::class(self.well_known().object);
        if let Some(slot) = self.locals.get_mut(idx) {
            slot.upper_bounds = if upper_bounds.is_empty() {
                vec![object]
            } else {
                upper_bounds
            };
            slot.lower_bound = lower_bound;
        }
    }

    /// Capture conversion (JLS §5.1.10).
    ///
    /// A type without wildcard arguments is returned unchanged. Otherwise every wildcard
    /// position gets a fresh capture variable; identities are never reused across calls,
    /// even for the same input. Bounds are computed only after all positions have their
    /// variable, since a declared bound may mention a sibling position.
    pub fn capture_conversion(&mut self, ty: &Type) -> Type {
        let Type::Parameterized(ct) = ty else {
            return ty.clone();
        };
        if !needs_capture(ct) {
            return ty.clone();
        }

        let outer = ct
            .outer
            .as_deref()
            .map(|outer| Box::new(self.capture_conversion(outer)));

        let formals = match self.class(ct.def) {
            Some(def) if def.type_params.len() == ct.args.len() => def.type_params.clone(),
            _ => {
                return Type::Parameterized(ClassType {
                    def: ct.def,
                    args: ct.args.clone(),
                    outer,
                })
            }
        };

        let mut captured = Vec::with_capacity(ct.args.len());
        for arg in &ct.args {
            if arg.is_wildcard() {
                captured.push(Type::TypeVar(self.add_capture_type_param()));
            } else {
                captured.push(arg.clone());
            }
        }

        let mut subst = Substitution::new(formals.clone(), captured.clone());
        if let Some(outer) = &outer {
            subst.extend(member_substitution(&*self, outer));
        }

        for (idx, arg) in ct.args.iter().enumerate() {
            let (Type::Wildcard(wildcard), Type::TypeVar(cap)) = (arg, &captured[idx]) else {
                continue;
            };
            let declared = self
                .type_param(formals[idx])
                .map(|def| subst.apply_all(&def.upper_bounds))
                .unwrap_or_default();
            let (upper, lower) = match wildcard {
                WildcardBound::Unbounded => (declared, None),
                WildcardBound::Extends(bound) => (merge_upper_bounds(&*self, bound, declared), None),
                WildcardBound::Super(bound) => (declared, Some((**bound).clone())),
            };
            self.define_capture(*cap, upper, lower);
        }

        let fresh = ct.args.iter().filter(|arg| arg.is_wildcard()).count();
        tracing::trace!(class = ?ct.def, fresh, "captured wildcard arguments");

        Type::Parameterized(ClassType {
            def: ct.def,
            args: captured,
            outer,
        })
    }
}

fn needs_capture(ct: &ClassType) -> bool {
    ct.args.iter().any(Type::is_wildcard)
        || matches!(ct.outer.as_deref(), Some(Type::Parameterized(outer)) if needs_capture(outer))
}

/// `[bound] ∪ declared`, without duplicates and without a redundant `Object`.
fn merge_upper_bounds(env: &dyn TypeEnv, bound: &Type, declared: Vec<Type>) -> Vec<Type> {
    let object = Type::class(env.well_known().object);
    let mut out = vec![bound.clone()];
    for ty in declared {
        if !out.iter().any(|existing| types_equal(env, existing, &ty)) {
            out.push(ty);
        }
    }
    if out.len() > 1 {
        out.retain(|ty| *ty != object);
    }
    out
}

impl TypeEnv for TyContext<'_> {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.base.class(id)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        if is_context_local(id) {
            return self.locals.get((id.0 & !CONTEXT_LOCAL_BIT) as usize);
        }
        self.base.type_param(id)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.base.lookup_class(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        self.base.well_known()
    }

    fn options(&self) -> &TypeStoreOptions {
        self.base.options()
    }

    fn class_name(&self, id: ClassId) -> Option<&str> {
        self.base.class_name(id)
    }
}
