//! The type model: ids, the closed [`Type`] enum and the definitions stored in a
//! [`crate::TypeStore`].

use serde::{Deserialize, Serialize};

use crate::TypeEnv;

/// Handle to a [`ClassDef`] in a [`crate::TypeStore`].
///
/// Ids can be reserved before the class is defined (see
/// [`crate::TypeStore::intern_class_id`]); a reserved id behaves like a lazily
/// resolved class reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u32 {
        self.0
    }
}

/// Handle to a [`TypeParamDef`].
///
/// Ids with the high bit set are local to a [`crate::TyContext`] (capture variables).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId(pub(crate) u32);

impl TypeVarId {
    pub fn to_raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    /// The one-letter JVM descriptor code.
    pub fn descriptor(self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Short => 'S',
            PrimitiveType::Char => 'C',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
        }
    }

    pub fn from_descriptor(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.descriptor() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Boolean)
    }
}

/// A wildcard type argument.
///
/// Every wildcard has exactly one bound (see [`WildcardBound::bound`]): the upper bound
/// for `?` and `? extends B`, the lower bound for `? super B`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    /// `?`
    Unbounded,
    /// `? extends B`
    Extends(Box<Type>),
    /// `? super B`
    Super(Box<Type>),
}

impl WildcardBound {
    /// The single bound carried by this wildcard; `Object` for `?`.
    pub fn bound(&self, env: &dyn TypeEnv) -> Type {
        match self {
            WildcardBound::Unbounded => Type::class(env.well_known().object),
            WildcardBound::Extends(b) | WildcardBound::Super(b) => (**b).clone(),
        }
    }

    /// Upper bound of the wildcard (`Object` for `? super B`).
    pub fn upper_bound(&self, env: &dyn TypeEnv) -> Type {
        match self {
            WildcardBound::Extends(b) => (**b).clone(),
            WildcardBound::Unbounded | WildcardBound::Super(_) => {
                Type::class(env.well_known().object)
            }
        }
    }

    pub fn map_bound(&self, f: impl FnOnce(&Type) -> Type) -> WildcardBound {
        match self {
            WildcardBound::Unbounded => WildcardBound::Unbounded,
            WildcardBound::Extends(b) => WildcardBound::Extends(Box::new(f(b))),
            WildcardBound::Super(b) => WildcardBound::Super(Box::new(f(b))),
        }
    }
}

/// A generic class instantiated with type arguments: `Outer<A>.Inner<B>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
    /// Instantiation of the enclosing class, for inner classes of generic classes.
    pub outer: Option<Box<Type>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayType {
    pub elem: Box<Type>,
    /// Set on the trailing formal of a variable-arity procedure.
    pub is_varargs: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Primitive(PrimitiveType),
    /// The type of `null`.
    Null,
    /// Use of a class without type arguments. A bare reference to a generic class is
    /// treated as raw by [`crate::rawify`].
    Class(ClassId),
    Parameterized(ClassType),
    Raw(ClassId),
    TypeVar(TypeVarId),
    Wildcard(WildcardBound),
    /// Ordered, non-empty conjunction of reference types.
    Intersection(Vec<Type>),
    Array(ArrayType),
    /// Least upper bound produced by inference; never decoded from bytecode.
    Lub(Vec<Type>),
    /// A class reference that could not be resolved.
    Named(String),
    Unknown,
}

impl Type {
    pub fn class(def: ClassId) -> Type {
        Type::Class(def)
    }

    pub fn parameterized(def: ClassId, args: Vec<Type>) -> Type {
        Type::Parameterized(ClassType {
            def,
            args,
            outer: None,
        })
    }

    pub fn array(elem: Type) -> Type {
        Type::Array(ArrayType {
            elem: Box::new(elem),
            is_varargs: false,
        })
    }

    pub fn varargs(elem: Type) -> Type {
        Type::Array(ArrayType {
            elem: Box::new(elem),
            is_varargs: true,
        })
    }

    pub fn int() -> Type {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn boolean() -> Type {
        Type::Primitive(PrimitiveType::Boolean)
    }

    pub fn extends(bound: Type) -> Type {
        Type::Wildcard(WildcardBound::Extends(Box::new(bound)))
    }

    pub fn super_of(bound: Type) -> Type {
        Type::Wildcard(WildcardBound::Super(Box::new(bound)))
    }

    pub fn unbounded() -> Type {
        Type::Wildcard(WildcardBound::Unbounded)
    }

    /// Build an intersection type, normalizing an empty bound list to `[Object]`.
    pub fn intersection(env: &dyn TypeEnv, bounds: Vec<Type>) -> Type {
        if bounds.is_empty() {
            return Type::Intersection(vec![Type::class(env.well_known().object)]);
        }
        Type::Intersection(bounds)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Reference types, including the null type and type variables.
    pub fn is_reference(&self) -> bool {
        !matches!(
            self,
            Type::Primitive(_) | Type::Void | Type::Wildcard(_) | Type::Unknown
        )
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Type::Wildcard(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// Class id behind a class-like type (`Class`, `Parameterized`, `Raw`).
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Type::Class(id) | Type::Raw(id) => Some(*id),
            Type::Parameterized(ct) => Some(ct.def),
            _ => None,
        }
    }

    pub fn array_elem(&self) -> Option<&Type> {
        match self {
            Type::Array(arr) => Some(&arr.elem),
            _ => None,
        }
    }

    /// Visit this type and every type nested inside it.
    pub fn walk(&self, f: &mut dyn FnMut(&Type)) {
        f(self);
        match self {
            Type::Parameterized(ct) => {
                for arg in &ct.args {
                    arg.walk(f);
                }
                if let Some(outer) = &ct.outer {
                    outer.walk(f);
                }
            }
            Type::Wildcard(WildcardBound::Extends(b) | WildcardBound::Super(b)) => b.walk(f),
            Type::Intersection(parts) | Type::Lub(parts) => {
                for part in parts {
                    part.walk(f);
                }
            }
            Type::Array(arr) => arr.elem.walk(f),
            _ => {}
        }
    }

    pub fn mentions_type_var(&self, tv: TypeVarId) -> bool {
        let mut found = false;
        self.walk(&mut |ty| {
            if *ty == Type::TypeVar(tv) {
                found = true;
            }
        });
        found
    }

    pub fn contains_wildcard(&self) -> bool {
        let mut found = false;
        self.walk(&mut |ty| found |= ty.is_wildcard());
        found
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    /// Binary name, e.g. `java.util.Map$Entry`.
    pub name: String,
    pub kind: ClassKind,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub outer: Option<ClassId>,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldDef>,
    pub constructors: Vec<ConstructorDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name.into(), ClassKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            is_abstract: true,
            ..Self::new(name.into(), ClassKind::Interface)
        }
    }

    fn new(name: String, kind: ClassKind) -> Self {
        Self {
            name,
            kind,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            is_final: false,
            outer: None,
            type_params: Vec::new(),
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Package part of the binary name (empty for the default package).
    pub fn package(&self) -> &str {
        self.name.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
    }

    /// An inner (non-static nested) class whose instances capture the enclosing instance.
    pub fn is_inner(&self) -> bool {
        self.outer.is_some() && !self.is_static
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Public,
            is_static: false,
            is_final: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub throws: Vec<Type>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, params: Vec<Type>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            params,
            return_type,
            throws: Vec::new(),
            visibility: Visibility::Public,
            is_static: false,
            is_varargs: false,
            is_abstract: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorDef {
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub throws: Vec<Type>,
    pub visibility: Visibility,
    pub is_varargs: bool,
}

impl ConstructorDef {
    pub fn new(params: Vec<Type>) -> Self {
        Self {
            type_params: Vec::new(),
            params,
            throws: Vec::new(),
            visibility: Visibility::Public,
            is_varargs: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcedureKind {
    Method,
    Constructor,
}

/// Identity of a method or constructor: its declaring class and its index in the
/// class's method or constructor list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcedureId {
    pub owner: ClassId,
    pub kind: ProcedureKind,
    pub index: u32,
}

/// Declaration site of a type variable. Exactly one owner; retagging replaces it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeVarOwner {
    Class(ClassId),
    Procedure(ProcedureId),
    /// Capture variables and variables synthesized during error recovery.
    Synthetic,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    /// The upper-bound intersection; never empty once defined through the store.
    pub upper_bounds: Vec<Type>,
    /// Only set for capture variables; `None` stands for the null type.
    pub lower_bound: Option<Type>,
    pub owner: TypeVarOwner,
}

impl TypeParamDef {
    pub fn new(name: impl Into<String>, upper_bounds: Vec<Type>) -> Self {
        Self {
            name: name.into(),
            upper_bounds,
            lower_bound: None,
            owner: TypeVarOwner::Synthetic,
        }
    }

    /// The upper bound viewed as an intersection type.
    pub fn upper_bound(&self) -> Type {
        Type::Intersection(self.upper_bounds.clone())
    }
}
