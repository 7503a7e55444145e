//! Translation of parsed signatures into the `jl5-types` model.

use jl5_types::{
    check_forward_references, is_generic_class, ClassId, ClassType, Type, TypeEnv, TypeStore,
    TypeVarId,
};

use crate::error::Result;
use crate::parser::{parse_class_signature, parse_field_signature, parse_method_signature};
use crate::syntax::{self, FieldTypeSignature, TypeArgument, TypeSignature};

/// Maps binary class names found in signatures to class ids.
pub trait ClassResolver {
    fn resolve(&mut self, store: &mut TypeStore, binary_name: &str) -> Option<ClassId>;
}

impl<F> ClassResolver for F
where
    F: FnMut(&mut TypeStore, &str) -> Option<ClassId>,
{
    fn resolve(&mut self, store: &mut TypeStore, binary_name: &str) -> Option<ClassId> {
        self(store, binary_name)
    }
}

/// Resolves names against the store.
///
/// With `reserve_unknown` set, names the store has never seen get a reserved id, to be
/// defined later; otherwise they decode to [`Type::Named`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StoreResolver {
    pub reserve_unknown: bool,
}

impl StoreResolver {
    pub fn reserving() -> Self {
        Self {
            reserve_unknown: true,
        }
    }
}

impl ClassResolver for StoreResolver {
    fn resolve(&mut self, store: &mut TypeStore, binary_name: &str) -> Option<ClassId> {
        if let Some(id) = store.lookup_class(binary_name) {
            return Some(id);
        }
        self.reserve_unknown
            .then(|| store.intern_class_id(binary_name))
    }
}

/// A decoded class `Signature` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_params: Vec<TypeVarId>,
    pub super_class: Type,
    pub interfaces: Vec<Type>,
}

/// A decoded method `Signature` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub throws: Vec<Type>,
}

/// Decodes signature strings into types, allocating type parameters in a [`TypeStore`].
///
/// Type variable references resolve against the open formal parameter lists (innermost
/// first), then against the variables of the class decoded last, then against those
/// supplied through [`SignatureDecoder::set_class_type_params`]. A reference to an
/// unknown name is not an error: a fresh unbounded variable is synthesized instead.
///
/// Decoded type parameters have a synthetic owner until the class or procedure holding
/// them is added to the store.
pub struct SignatureDecoder<'a, R = StoreResolver> {
    store: &'a mut TypeStore,
    resolver: R,
    scopes: Vec<Vec<(String, TypeVarId)>>,
    /// Variables of the class whose signature was decoded last.
    class_vars: Vec<(String, TypeVarId)>,
    /// Variables supplied by the caller: enclosing classes, or an already defined owner.
    outer_vars: Vec<(String, TypeVarId)>,
}

impl<'a> SignatureDecoder<'a, StoreResolver> {
    pub fn new(store: &'a mut TypeStore) -> Self {
        Self::with_resolver(store, StoreResolver::default())
    }
}

impl<'a, R: ClassResolver> SignatureDecoder<'a, R> {
    pub fn with_resolver(store: &'a mut TypeStore, resolver: R) -> Self {
        Self {
            store,
            resolver,
            scopes: Vec::new(),
            class_vars: Vec::new(),
            outer_vars: Vec::new(),
        }
    }

    /// Make type variables of enclosing classes (or of an owning class decoded earlier)
    /// visible to the signatures decoded next. They stay visible across class signatures;
    /// a class's own parameters shadow them.
    pub fn with_class_type_params(mut self, params: &[TypeVarId]) -> Self {
        self.set_class_type_params(params);
        self
    }

    pub fn set_class_type_params(&mut self, params: &[TypeVarId]) {
        self.class_vars.clear();
        self.outer_vars = params
            .iter()
            .filter_map(|id| {
                let def = self.store.type_param(*id)?;
                Some((def.name.clone(), *id))
            })
            .collect();
    }

    /// Decode a class signature. Its type parameters become the class variables for the
    /// method and field signatures decoded afterwards.
    pub fn decode_class_signature(&mut self, signature: &str) -> Result<ClassSignature> {
        tracing::trace!(signature, "decoding class signature");
        let sig = parse_class_signature(signature)?;
        self.class_vars.clear();

        let depth = self.scopes.len();
        let decoded = self.class_signature(&sig);
        self.scopes.truncate(depth);

        let decoded = decoded?;
        self.class_vars = sig
            .type_params
            .iter()
            .map(|param| param.name.clone())
            .zip(decoded.type_params.iter().copied())
            .collect();
        Ok(decoded)
    }

    pub fn decode_method_signature(&mut self, signature: &str) -> Result<MethodSignature> {
        tracing::trace!(signature, "decoding method signature");
        let sig = parse_method_signature(signature)?;

        let depth = self.scopes.len();
        let decoded = self.method_signature(&sig);
        self.scopes.truncate(depth);
        decoded
    }

    pub fn decode_field_signature(&mut self, signature: &str) -> Result<Type> {
        tracing::trace!(signature, "decoding field signature");
        let sig = parse_field_signature(signature)?;
        Ok(self.field_type(&sig))
    }

    fn class_signature(&mut self, sig: &syntax::ClassSignature) -> Result<ClassSignature> {
        let type_params = self.formal_type_params(&sig.type_params)?;
        let super_class = self.class_type(&sig.super_class);
        let interfaces = sig
            .interfaces
            .iter()
            .map(|iface| self.class_type(iface))
            .collect();
        Ok(ClassSignature {
            type_params,
            super_class,
            interfaces,
        })
    }

    fn method_signature(&mut self, sig: &syntax::MethodSignature) -> Result<MethodSignature> {
        let type_params = self.formal_type_params(&sig.type_params)?;
        let params = sig.params.iter().map(|p| self.type_signature(p)).collect();
        let return_type = match &sig.return_type {
            Some(ty) => self.type_signature(ty),
            None => Type::Void,
        };
        let throws = sig.throws.iter().map(|t| self.field_type(t)).collect();
        Ok(MethodSignature {
            type_params,
            params,
            return_type,
            throws,
        })
    }

    /// Allocate ids for every parameter first and open their scope, then decode the
    /// bounds, so bounds may refer to any parameter of the list (including the one being
    /// declared).
    fn formal_type_params(&mut self, params: &[syntax::TypeParameter]) -> Result<Vec<TypeVarId>> {
        if params.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<TypeVarId> = params
            .iter()
            .map(|param| self.store.add_type_param(param.name.clone(), vec![]))
            .collect();
        self.scopes.push(
            params
                .iter()
                .map(|param| param.name.clone())
                .zip(ids.iter().copied())
                .collect(),
        );

        for (param, id) in params.iter().zip(&ids) {
            let mut bounds = Vec::with_capacity(1 + param.interface_bounds.len());
            if let Some(class_bound) = &param.class_bound {
                bounds.push(self.field_type(class_bound));
            }
            for iface in &param.interface_bounds {
                bounds.push(self.field_type(iface));
            }
            self.store.set_type_param_bounds(*id, bounds);
        }

        check_forward_references(&*self.store, &ids)?;
        Ok(ids)
    }

    fn type_signature(&mut self, sig: &TypeSignature) -> Type {
        match sig {
            TypeSignature::Base(prim) => Type::Primitive(*prim),
            TypeSignature::Field(field) => self.field_type(field),
        }
    }

    fn field_type(&mut self, sig: &FieldTypeSignature) -> Type {
        match sig {
            FieldTypeSignature::Class(class) => self.class_type(class),
            FieldTypeSignature::Array(elem) => Type::array(self.type_signature(elem)),
            FieldTypeSignature::TypeVariable(name) => self.type_variable(name),
        }
    }

    fn type_variable(&mut self, name: &str) -> Type {
        let in_scope = self
            .scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .chain(self.class_vars.iter())
            .chain(self.outer_vars.iter())
            .find(|(declared, _)| declared == name)
            .map(|(_, id)| *id);
        if let Some(id) = in_scope {
            return Type::TypeVar(id);
        }

        tracing::debug!(name, "type variable not in scope; synthesizing an unbounded one");
        Type::TypeVar(self.store.add_type_param(name, vec![]))
    }

    fn type_argument(&mut self, arg: &TypeArgument) -> Type {
        match arg {
            TypeArgument::Any => Type::unbounded(),
            TypeArgument::Extends(bound) => Type::extends(self.field_type(bound)),
            TypeArgument::Super(bound) => Type::super_of(self.field_type(bound)),
            TypeArgument::Exact(ty) => self.field_type(ty),
        }
    }

    fn class_type(&mut self, sig: &syntax::ClassTypeSignature) -> Type {
        let Some((last, enclosing)) = sig.segments.split_last() else {
            return Type::Unknown;
        };

        // Enclosing instantiation, kept once some segment carries arguments.
        let mut outer: Option<Type> = None;
        for (idx, segment) in enclosing.iter().enumerate() {
            let Some(id) = self.resolve(&sig.binary_name_of_prefix(idx + 1)) else {
                outer = None;
                continue;
            };
            if segment.type_args.is_empty() && outer.is_none() {
                continue;
            }
            let args = segment
                .type_args
                .iter()
                .map(|arg| self.type_argument(arg))
                .collect();
            outer = Some(Type::Parameterized(ClassType {
                def: id,
                args,
                outer: outer.take().map(Box::new),
            }));
        }

        let binary_name = sig.binary_name();
        let Some(id) = self.resolve(&binary_name) else {
            return Type::Named(binary_name);
        };
        if last.type_args.is_empty() {
            return if is_generic_class(&*self.store, id) {
                Type::Raw(id)
            } else {
                Type::Class(id)
            };
        }
        let args = last
            .type_args
            .iter()
            .map(|arg| self.type_argument(arg))
            .collect();
        Type::Parameterized(ClassType {
            def: id,
            args,
            outer: outer.map(Box::new),
        })
    }

    fn resolve(&mut self, binary_name: &str) -> Option<ClassId> {
        self.resolver.resolve(self.store, binary_name)
    }
}
