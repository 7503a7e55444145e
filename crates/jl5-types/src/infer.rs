//! Type-argument inference for generic method calls.

use crate::members::as_super;
use crate::{box_type, erasure, lub, types_equal, Type, TypeEnv, TypeVarId, WildcardBound};

/// Chooses type arguments for a generic procedure from its formals and the (captured)
/// actual argument types.
///
/// The overload engine validates whatever is returned: every argument is checked against
/// its declared bound and the instantiated formals must still accept the actuals.
pub trait InferenceSolver {
    /// One type argument per entry of `type_params`, or `None` if no instantiation
    /// exists.
    fn solve(
        &self,
        env: &dyn TypeEnv,
        type_params: &[TypeVarId],
        formals: &[Type],
        actuals: &[Type],
    ) -> Option<Vec<Type>>;
}

/// Structural matching of formals against actuals (a subset of JLS §15.12.2.7).
///
/// Constraints are collected through parameterized arguments, wildcards and arrays.
/// Several lower constraints on one variable are joined with [`lub`]; a variable with no
/// constraint is instantiated to the erasure of its first bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuralSolver;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Relation {
    /// `actual <: formal`
    Lower,
    /// `actual == formal`
    Equal,
    /// `formal <: actual`
    Upper,
}

#[derive(Debug, Default)]
struct Bounds {
    equal: Vec<Type>,
    lower: Vec<Type>,
    upper: Vec<Type>,
}

struct Constraints<'a> {
    env: &'a dyn TypeEnv,
    params: &'a [TypeVarId],
    bounds: Vec<Bounds>,
}

impl<'a> Constraints<'a> {
    fn new(env: &'a dyn TypeEnv, params: &'a [TypeVarId]) -> Self {
        Self {
            env,
            params,
            bounds: params.iter().map(|_| Bounds::default()).collect(),
        }
    }

    fn add(&mut self, idx: usize, relation: Relation, ty: &Type) {
        let slot = &mut self.bounds[idx];
        let list = match relation {
            Relation::Lower => &mut slot.lower,
            Relation::Equal => &mut slot.equal,
            Relation::Upper => &mut slot.upper,
        };
        if !list.iter().any(|existing| types_equal(self.env, existing, ty)) {
            list.push(ty.clone());
        }
    }

    fn collect(&mut self, formal: &Type, actual: &Type, relation: Relation) {
        if matches!(actual, Type::Null | Type::Unknown) {
            return;
        }
        match formal {
            Type::TypeVar(tv) => {
                if let Some(idx) = self.params.iter().position(|p| p == tv) {
                    self.add(idx, relation, actual);
                }
            }
            Type::Array(formal_arr) => {
                if let Some(elem) = actual.array_elem() {
                    if !elem.is_primitive() {
                        self.collect(&formal_arr.elem, elem, relation);
                    }
                }
            }
            Type::Parameterized(formal_ct) => {
                if relation == Relation::Upper {
                    return;
                }
                let Some(Type::Parameterized(actual_ct)) = as_super(self.env, actual, formal_ct.def)
                else {
                    return;
                };
                for (formal_arg, actual_arg) in formal_ct.args.iter().zip(&actual_ct.args) {
                    self.collect_argument(formal_arg, actual_arg);
                }
            }
            _ => {}
        }
    }

    fn collect_argument(&mut self, formal_arg: &Type, actual_arg: &Type) {
        match (formal_arg, actual_arg) {
            (Type::Wildcard(WildcardBound::Extends(f)), Type::Wildcard(WildcardBound::Extends(a))) => {
                self.collect(f, a, Relation::Lower)
            }
            (Type::Wildcard(WildcardBound::Super(f)), Type::Wildcard(WildcardBound::Super(a))) => {
                self.collect(f, a, Relation::Upper)
            }
            (Type::Wildcard(WildcardBound::Extends(f)), a) if !a.is_wildcard() => {
                self.collect(f, a, Relation::Lower)
            }
            (Type::Wildcard(WildcardBound::Super(f)), a) if !a.is_wildcard() => {
                self.collect(f, a, Relation::Upper)
            }
            (f, a) if !f.is_wildcard() && !a.is_wildcard() => self.collect(f, a, Relation::Equal),
            _ => {}
        }
    }

    fn resolve(self) -> Vec<Type> {
        let env = self.env;
        self.params
            .iter()
            .zip(self.bounds)
            .map(|(param, bounds)| {
                if let Some(first) = bounds.equal.into_iter().next() {
                    return first;
                }
                if !bounds.lower.is_empty() {
                    return lub(env, &bounds.lower);
                }
                if let Some(first) = bounds.upper.into_iter().next() {
                    return first;
                }
                let declared = env
                    .type_param(*param)
                    .and_then(|def| def.upper_bounds.first().cloned())
                    .unwrap_or_else(|| Type::class(env.well_known().object));
                erasure(env, &declared)
            })
            .collect()
    }
}

impl InferenceSolver for StructuralSolver {
    fn solve(
        &self,
        env: &dyn TypeEnv,
        type_params: &[TypeVarId],
        formals: &[Type],
        actuals: &[Type],
    ) -> Option<Vec<Type>> {
        if formals.len() != actuals.len() {
            return None;
        }
        let mut constraints = Constraints::new(env, type_params);
        for (formal, actual) in formals.iter().zip(actuals) {
            let actual = box_type(env, actual).unwrap_or_else(|| actual.clone());
            constraints.collect(formal, &actual, Relation::Lower);
        }
        let solution = constraints.resolve();
        tracing::trace!(params = type_params.len(), ?solution, "inferred type arguments");
        Some(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeStore;

    #[test]
    fn infers_through_parameterized_and_wildcard_formals() {
        let mut store = TypeStore::with_minimal_jdk();
        let wk = store.well_known().clone();
        let list = store.class_id("java.util.List").unwrap();
        let array_list = store.class_id("java.util.ArrayList").unwrap();

        let t = store.add_type_param("T", vec![]);
        let formals = vec![Type::parameterized(
            list,
            vec![Type::extends(Type::TypeVar(t))],
        )];
        let actuals = vec![Type::parameterized(array_list, vec![Type::class(wk.integer)])];

        assert_eq!(
            StructuralSolver.solve(&store, &[t], &formals, &actuals),
            Some(vec![Type::class(wk.integer)])
        );
    }

    #[test]
    fn joins_lower_bounds_and_boxes_primitives() {
        let mut store = TypeStore::default();
        let wk = store.well_known().clone();
        let t = store.add_type_param("T", vec![]);
        let formals = vec![Type::TypeVar(t), Type::TypeVar(t)];

        let solution = StructuralSolver
            .solve(&store, &[t], &formals, &[Type::int(), Type::class(wk.number)])
            .unwrap();
        assert_eq!(solution, vec![Type::class(wk.number)]);
    }

    #[test]
    fn unconstrained_variables_use_their_erased_bound() {
        let mut store = TypeStore::default();
        let wk = store.well_known().clone();
        let t = store.add_type_param("T", vec![Type::class(wk.number)]);

        let solution = StructuralSolver.solve(&store, &[t], &[], &[]).unwrap();
        assert_eq!(solution, vec![Type::class(wk.number)]);
    }
}
