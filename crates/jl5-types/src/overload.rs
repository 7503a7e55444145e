//! Overload resolution (JLS §15.12.2).
//!
//! Candidates are filtered for potential applicability, instantiated (explicit type
//! arguments or inference, then a bound check), and tried in three phases: strict,
//! loose (boxing) and variable arity. The first phase with an applicable candidate
//! wins; among its candidates the single most specific one is chosen.

use crate::members::{collect_constructors, collect_methods, is_accessible, Candidate};
use crate::{
    check_type_arguments, format_type, is_method_invocation_convertible, ClassId,
    InferenceSolver, ResolutionError, Result, Substitution, TyContext, Type, TypeEnv, TypeError,
};

/// Where a call appears, for accessibility checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Class containing the call; `None` is code outside any class and sees only public
    /// members.
    pub caller: Option<ClassId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub name: String,
    pub args: Vec<Type>,
    /// `recv.<String>m(..)`; `None` when type arguments are to be inferred.
    pub explicit_type_args: Option<Vec<Type>>,
    pub context: CallContext,
}

impl CallSite {
    pub fn new(name: impl Into<String>, args: Vec<Type>) -> Self {
        Self {
            name: name.into(),
            args,
            explicit_type_args: None,
            context: CallContext::default(),
        }
    }

    pub fn with_type_args(mut self, type_args: Vec<Type>) -> Self {
        self.explicit_type_args = Some(type_args);
        self
    }

    pub fn with_caller(mut self, caller: ClassId) -> Self {
        self.context.caller = Some(caller);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Fixed arity, no boxing.
    Strict,
    /// Fixed arity, boxing and unboxing.
    Loose,
    /// Trailing array formal expanded to its element type.
    VariableArity,
}

impl Phase {
    const ALL: [Phase; 3] = [Phase::Strict, Phase::Loose, Phase::VariableArity];
}

/// The procedure selected for a call, instantiated for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedProcedure {
    pub candidate: Candidate,
    /// Formals with the procedure's type arguments substituted.
    pub params: Vec<Type>,
    pub return_type: Type,
    pub type_args: Vec<Type>,
    pub phase: Phase,
    pub used_varargs: bool,
}

#[derive(Clone, Debug)]
struct Instantiated<'c> {
    candidate: &'c Candidate,
    params: Vec<Type>,
    return_type: Type,
    type_args: Vec<Type>,
}

/// Resolve a method call on `receiver`, inherited methods included.
///
/// The receiver is capture converted first.
pub fn resolve_method_call(
    ctx: &mut TyContext<'_>,
    solver: &dyn InferenceSolver,
    receiver: &Type,
    call: &CallSite,
) -> Result<ResolvedProcedure> {
    let receiver = ctx.capture_conversion(receiver);
    let candidates = collect_methods(&*ctx, &receiver, &call.name);
    find_most_specific(ctx, solver, &receiver, &candidates, call)
}

/// Resolve `new C(..)` for the class type `class_type`.
pub fn resolve_constructor_call(
    ctx: &mut TyContext<'_>,
    solver: &dyn InferenceSolver,
    class_type: &Type,
    call: &CallSite,
) -> Result<ResolvedProcedure> {
    let candidates = collect_constructors(&*ctx, class_type);
    find_most_specific(ctx, solver, class_type, &candidates, call)
}

/// Select the single most specific applicable candidate for `call`.
///
/// `container` is only used for diagnostics.
pub fn find_most_specific(
    ctx: &mut TyContext<'_>,
    solver: &dyn InferenceSolver,
    container: &Type,
    candidates: &[Candidate],
    call: &CallSite,
) -> Result<ResolvedProcedure> {
    let actuals: Vec<Type> = call.args.iter().map(|arg| ctx.capture_conversion(arg)).collect();
    let env: &dyn TypeEnv = &*ctx;

    let mut bound_failure = None;
    let mut instantiated = Vec::new();
    for candidate in candidates {
        if let Some(reason) = not_potentially_applicable(env, candidate, call) {
            tracing::trace!(name = %candidate.name, reason, "candidate not potentially applicable");
            continue;
        }
        match instantiate(env, solver, candidate, call, &actuals) {
            Ok(Some(inst)) => instantiated.push(inst),
            Ok(None) => {
                tracing::trace!(name = %candidate.name, "inference failed");
            }
            Err(err) => {
                tracing::trace!(name = %candidate.name, %err, "type arguments out of bounds");
                bound_failure.get_or_insert(err);
            }
        }
    }

    for phase in Phase::ALL {
        let applicable: Vec<&Instantiated<'_>> = instantiated
            .iter()
            .filter(|inst| is_applicable(env, inst, &actuals, phase))
            .collect();
        if applicable.is_empty() {
            tracing::trace!(?phase, name = %call.name, "no applicable candidates");
            continue;
        }
        tracing::debug!(?phase, name = %call.name, count = applicable.len(), "applicable candidates found");

        let arity = actuals.len();
        let maximal: Vec<&Instantiated<'_>> = applicable
            .iter()
            .copied()
            .filter(|a| {
                !applicable.iter().any(|b| {
                    !std::ptr::eq(*a, *b)
                        && is_more_specific(env, solver, b.candidate, a.candidate, phase, arity)
                        && !is_more_specific(env, solver, a.candidate, b.candidate, phase, arity)
                })
            })
            .collect();

        return match maximal.as_slice() {
            [winner] => Ok(ResolvedProcedure {
                candidate: winner.candidate.clone(),
                params: winner.params.clone(),
                return_type: winner.return_type.clone(),
                type_args: winner.type_args.clone(),
                phase,
                used_varargs: phase == Phase::VariableArity,
            }),
            tied => Err(ResolutionError::AmbiguousCall {
                name: call.name.clone(),
                container: format_type(env, container),
                args: format_all(env, &call.args),
                candidates: tied
                    .iter()
                    .map(|inst| describe(env, inst.candidate))
                    .collect(),
            }),
        };
    }

    Err(match bound_failure {
        Some(err) => err,
        None => ResolutionError::NoApplicableProcedure {
            name: call.name.clone(),
            container: format_type(env, container),
            args: format_all(env, &call.args),
        },
    })
}

fn not_potentially_applicable(
    env: &dyn TypeEnv,
    candidate: &Candidate,
    call: &CallSite,
) -> Option<&'static str> {
    let declared = candidate.params.len();
    let given = call.args.len();
    let arity_ok = if candidate.is_varargs {
        given + 1 >= declared
    } else {
        given == declared
    };
    if !arity_ok {
        return Some("arity mismatch");
    }
    if let Some(explicit) = &call.explicit_type_args {
        if explicit.len() != candidate.type_params.len() {
            return Some("wrong number of explicit type arguments");
        }
    }
    if !is_accessible(env, candidate.id.owner, candidate.visibility, call.context.caller) {
        return Some("not accessible");
    }
    None
}

/// Formals as seen by inference: a variable-arity call spreads the trailing array.
fn inference_formals(candidate: &Candidate, actuals: &[Type]) -> Vec<Type> {
    let Some((last, fixed)) = candidate.params.split_last() else {
        return Vec::new();
    };
    let spreads = candidate.is_varargs
        && (actuals.len() != candidate.params.len()
            || !matches!(actuals.last(), Some(Type::Array(_) | Type::Null)));
    match (spreads, last.array_elem()) {
        (true, Some(elem)) => {
            let mut out = fixed.to_vec();
            out.resize(fixed.len().max(actuals.len()), elem.clone());
            out.truncate(actuals.len());
            out
        }
        _ => candidate.params.clone(),
    }
}

fn instantiate<'c>(
    env: &dyn TypeEnv,
    solver: &dyn InferenceSolver,
    candidate: &'c Candidate,
    call: &CallSite,
    actuals: &[Type],
) -> Result<Option<Instantiated<'c>>> {
    if candidate.type_params.is_empty() {
        return Ok(Some(Instantiated {
            candidate,
            params: candidate.params.clone(),
            return_type: candidate.return_type.clone(),
            type_args: Vec::new(),
        }));
    }

    let type_args = match &call.explicit_type_args {
        Some(explicit) => explicit.clone(),
        None => {
            let formals = inference_formals(candidate, actuals);
            match solver.solve(env, &candidate.type_params, &formals, actuals) {
                Some(args) if args.len() == candidate.type_params.len() => args,
                _ => return Ok(None),
            }
        }
    };

    check_type_arguments(env, &candidate.type_params, &type_args).map_err(|err| match err {
        TypeError::InvalidTypeArgument { param, arg, bound } => {
            ResolutionError::InvalidTypeArgument { param, arg, bound }
        }
        other => ResolutionError::InvalidTypeArgument {
            param: candidate.name.clone(),
            arg: format_all(env, &type_args).join(", "),
            bound: other.to_string(),
        },
    })?;

    let subst = Substitution::new(candidate.type_params.clone(), type_args.clone());
    Ok(Some(Instantiated {
        candidate,
        params: subst.apply_all(&candidate.params),
        return_type: subst.apply(&candidate.return_type),
        type_args,
    }))
}

/// A primitive/reference mismatch between any formal and its actual.
fn needs_boxing(formals: &[Type], actuals: &[Type]) -> bool {
    formals.iter().zip(actuals).any(|(formal, actual)| {
        !actual.is_unknown() && formal.is_primitive() != actual.is_primitive()
    })
}

fn is_applicable(env: &dyn TypeEnv, inst: &Instantiated<'_>, actuals: &[Type], phase: Phase) -> bool {
    let formals = &inst.params;
    match phase {
        Phase::Strict | Phase::Loose => {
            if formals.len() != actuals.len() {
                return false;
            }
            let allow_boxing = phase == Phase::Loose;
            if !allow_boxing && needs_boxing(formals, actuals) {
                return false;
            }
            formals
                .iter()
                .zip(actuals)
                .all(|(formal, actual)| is_method_invocation_convertible(env, actual, formal, allow_boxing))
        }
        Phase::VariableArity => {
            if !inst.candidate.is_varargs {
                return false;
            }
            let expanded = expand_to_arity(formals, true, actuals.len());
            expanded.len() == actuals.len()
                && expanded
                    .iter()
                    .zip(actuals)
                    .all(|(formal, actual)| is_method_invocation_convertible(env, actual, formal, true))
        }
    }
}

/// Replace a trailing array formal by `arity - (n - 1)` copies of its element type.
fn expand_to_arity(formals: &[Type], is_varargs: bool, arity: usize) -> Vec<Type> {
    let Some((last, fixed)) = formals.split_last() else {
        return Vec::new();
    };
    match (is_varargs, last.array_elem()) {
        (true, Some(elem)) if arity + 1 >= formals.len() => {
            let mut out = fixed.to_vec();
            out.extend(std::iter::repeat(elem.clone()).take(arity + 1 - formals.len()));
            out
        }
        _ => formals.to_vec(),
    }
}

/// Whether `a` is more specific than `b` (JLS §15.12.2.5).
///
/// Declared formals are compared, not the call-site instantiations: `a`'s type variables
/// stay free, and a generic `b` is first instantiated against `a`'s formals.
fn is_more_specific(
    env: &dyn TypeEnv,
    solver: &dyn InferenceSolver,
    a: &Candidate,
    b: &Candidate,
    phase: Phase,
    arity: usize,
) -> bool {
    let (fa, fb) = if phase == Phase::VariableArity {
        (
            expand_to_arity(&a.params, a.is_varargs, arity),
            expand_to_arity(&b.params, b.is_varargs, arity),
        )
    } else {
        (a.params.clone(), b.params.clone())
    };
    if fa.len() != fb.len() {
        return false;
    }

    let fb = if b.type_params.is_empty() {
        fb
    } else {
        match solver.solve(env, &b.type_params, &fb, &fa) {
            Some(args) if args.len() == b.type_params.len() => {
                Substitution::new(b.type_params.clone(), args).apply_all(&fb)
            }
            _ => return false,
        }
    };

    fa.iter()
        .zip(&fb)
        .all(|(x, y)| is_method_invocation_convertible(env, x, y, false))
}

fn format_all(env: &dyn TypeEnv, tys: &[Type]) -> Vec<String> {
    tys.iter().map(|ty| format_type(env, ty)).collect()
}

fn describe(env: &dyn TypeEnv, candidate: &Candidate) -> String {
    format!(
        "{}.{}({})",
        format_type(env, &candidate.container),
        candidate.name,
        format_all(env, &candidate.params).join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassDef, MethodDef, StructuralSolver, TypeStore};

    fn varargs_method(name: &str, elem: Type) -> MethodDef {
        MethodDef {
            is_varargs: true,
            ..MethodDef::new(name, vec![Type::varargs(elem)], Type::Void)
        }
    }

    #[test]
    fn expand_to_arity_spreads_trailing_array() {
        let formals = vec![Type::int(), Type::varargs(Type::boolean())];
        assert_eq!(
            expand_to_arity(&formals, true, 3),
            vec![Type::int(), Type::boolean(), Type::boolean()]
        );
        assert_eq!(expand_to_arity(&formals, true, 1), vec![Type::int()]);
        assert_eq!(expand_to_arity(&formals, false, 3), formals);
    }

    #[test]
    fn empty_varargs_call_uses_phase_three() {
        let mut store = TypeStore::default();
        let string = Type::class(store.well_known().string);
        let owner = store.add_class(ClassDef {
            methods: vec![varargs_method("m", string)],
            ..ClassDef::class("com.example.Varargs")
        });

        let mut ctx = TyContext::new(&store);
        let resolved = resolve_method_call(
            &mut ctx,
            &StructuralSolver,
            &Type::class(owner),
            &CallSite::new("m", vec![]),
        )
        .unwrap();
        assert_eq!(resolved.phase, Phase::VariableArity);
        assert!(resolved.used_varargs);
    }
}
