//! Java 5 generics: the type model and the algorithms over it.
//!
//! Types are plain values ([`Type`]) referring to class and type-parameter definitions
//! held in a [`TypeStore`]. Every algorithm takes `&dyn TypeEnv`, so the same code runs
//! against the global store and against a per-call [`TyContext`] that additionally owns
//! capture variables.
//!
//! The main entry points:
//! - [`substitute`] / [`Substitution`]
//! - [`erasure`], [`rawify`]
//! - [`TyContext::capture_conversion`]
//! - [`is_subtype`], [`check_contains`], [`types_equal`], [`lub`]
//! - [`resolve_method_call`], [`resolve_constructor_call`], [`find_most_specific`]

mod bounds;
mod conversion;
mod env;
mod erasure;
mod error;
mod format;
mod infer;
mod jdk;
mod lub;
pub mod members;
mod model;
mod options;
mod overload;
mod store;
mod subst;
mod subtyping;

pub use bounds::{check_forward_references, check_intersection_bounds, check_type_arguments};
pub use conversion::{box_type, is_method_invocation_convertible, is_primitive_widening, unbox_type};
pub use env::TyContext;
pub use erasure::{erasure, is_generic_class, is_reifiable, raw_outer, rawify};
pub use error::{ResolutionError, Result, TypeError};
pub use format::{format_type, TypeDisplay};
pub use infer::{InferenceSolver, StructuralSolver};
pub use lub::lub;
pub use members::Candidate;
pub use model::{
    ArrayType, ClassDef, ClassId, ClassKind, ClassType, ConstructorDef, FieldDef, MethodDef,
    PrimitiveType, ProcedureId, ProcedureKind, Type, TypeParamDef, TypeVarId, TypeVarOwner,
    Visibility, WildcardBound,
};
pub use options::TypeStoreOptions;
pub use overload::{
    find_most_specific, resolve_constructor_call, resolve_method_call, CallContext, CallSite,
    Phase, ResolvedProcedure,
};
pub use store::{TypeEnv, TypeStore, WellKnownTypes};
pub use subst::{member_substitution, substitute, Substitution};
pub use subtyping::{check_contains, is_subtype, types_equal};
