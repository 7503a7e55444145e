use std::collections::HashMap;

use crate::{
    ClassDef, ClassId, PrimitiveType, ProcedureId, ProcedureKind, Type, TypeParamDef,
    TypeStoreOptions, TypeVarId, TypeVarOwner,
};

/// Read access to class and type-parameter definitions.
///
/// Every algorithm in this crate takes `&dyn TypeEnv`; [`TypeStore`] is the global
/// implementation and [`crate::TyContext`] layers capture variables on top of it.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;

    /// Look up a class by binary name. Simple names of `java.lang` classes resolve
    /// implicitly.
    fn lookup_class(&self, name: &str) -> Option<ClassId>;

    fn well_known(&self) -> &WellKnownTypes;

    fn options(&self) -> &TypeStoreOptions;

    /// Binary name of a class, including classes that are only reserved.
    fn class_name(&self, id: ClassId) -> Option<&str> {
        self.class(id).map(|def| def.name.as_str())
    }
}

/// Classes the type system needs by identity (boxing, arrays, `Object` defaults).
///
/// Populated once when the store is constructed and reachable from every
/// [`TypeEnv`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub comparable: ClassId,
    pub number: ClassId,
    pub boolean: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub character: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
    pub void: ClassId,
}

impl WellKnownTypes {
    /// Wrapper class for a primitive type.
    pub fn boxed(&self, prim: PrimitiveType) -> ClassId {
        match prim {
            PrimitiveType::Boolean => self.boolean,
            PrimitiveType::Byte => self.byte,
            PrimitiveType::Short => self.short,
            PrimitiveType::Char => self.character,
            PrimitiveType::Int => self.integer,
            PrimitiveType::Long => self.long,
            PrimitiveType::Float => self.float,
            PrimitiveType::Double => self.double,
        }
    }

    /// Primitive type wrapped by `id`, if `id` is a wrapper class.
    pub fn unboxed(&self, id: ClassId) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .find(|prim| self.boxed(*prim) == id)
    }
}

#[derive(Clone, Debug, Default)]
struct ClassTable {
    defs: Vec<Option<ClassDef>>,
    names: Vec<String>,
    by_name: HashMap<String, ClassId>,
}

impl ClassTable {
    fn intern(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = ClassId(self.defs.len() as u32);
        self.defs.push(None);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }
}

/// Arena owning every class and type-parameter definition of a compilation.
#[derive(Clone, Debug)]
pub struct TypeStore {
    classes: ClassTable,
    type_params: Vec<TypeParamDef>,
    well_known: WellKnownTypes,
    options: TypeStoreOptions,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::with_options(TypeStoreOptions::default())
    }
}

impl TypeStore {
    /// A store containing the `java.lang` core (`Object`, `String`, the wrapper
    /// classes, `Number`, `Comparable`, `Cloneable`, `Serializable`).
    pub fn with_options(options: TypeStoreOptions) -> Self {
        let mut classes = ClassTable::default();
        let well_known = WellKnownTypes {
            object: classes.intern("java.lang.Object"),
            string: classes.intern("java.lang.String"),
            cloneable: classes.intern("java.lang.Cloneable"),
            serializable: classes.intern("java.io.Serializable"),
            comparable: classes.intern("java.lang.Comparable"),
            number: classes.intern("java.lang.Number"),
            boolean: classes.intern("java.lang.Boolean"),
            byte: classes.intern("java.lang.Byte"),
            short: classes.intern("java.lang.Short"),
            character: classes.intern("java.lang.Character"),
            integer: classes.intern("java.lang.Integer"),
            long: classes.intern("java.lang.Long"),
            float: classes.intern("java.lang.Float"),
            double: classes.intern("java.lang.Double"),
            void: classes.intern("java.lang.Void"),
        };
        let mut store = Self {
            classes,
            type_params: Vec::new(),
            well_known,
            options,
        };
        store.bootstrap_well_known();
        store
    }

    pub fn set_options(&mut self, options: TypeStoreOptions) {
        self.options = options;
    }

    /// Look up a class id by name (alias of [`TypeEnv::lookup_class`]).
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.lookup_class(name)
    }

    /// Return the id for `name`, reserving one if the class is not known yet.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        self.classes.intern(name)
    }

    pub fn is_defined(&self, id: ClassId) -> bool {
        matches!(self.classes.defs.get(id.0 as usize), Some(Some(_)))
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.classes.intern(&def.name);
        self.define_class(id, def);
        id
    }

    /// Define (or redefine) the class behind a reserved id.
    ///
    /// The owners of the class's own type parameters and of its procedures' type
    /// parameters are set here.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        for tp in &def.type_params {
            self.set_type_param_owner(*tp, TypeVarOwner::Class(id));
        }
        for (index, method) in def.methods.iter().enumerate() {
            let owner = TypeVarOwner::Procedure(ProcedureId {
                owner: id,
                kind: ProcedureKind::Method,
                index: index as u32,
            });
            for tp in &method.type_params {
                self.set_type_param_owner(*tp, owner);
            }
        }
        for (index, ctor) in def.constructors.iter().enumerate() {
            let owner = TypeVarOwner::Procedure(ProcedureId {
                owner: id,
                kind: ProcedureKind::Constructor,
                index: index as u32,
            });
            for tp in &ctor.type_params {
                self.set_type_param_owner(*tp, owner);
            }
        }

        let idx = id.0 as usize;
        if self.classes.names[idx] != def.name {
            self.classes.by_name.insert(def.name.clone(), id);
            self.classes.names[idx] = def.name.clone();
        }
        self.classes.defs[idx] = Some(def);
    }

    /// Allocate a type parameter. An empty bound list means `Object`.
    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId(self.type_params.len() as u32);
        let upper_bounds = self.normalize_bounds(upper_bounds);
        self.type_params.push(TypeParamDef::new(name, upper_bounds));
        id
    }

    /// Replace the definition of an allocated type parameter.
    pub fn define_type_param(&mut self, id: TypeVarId, mut def: TypeParamDef) {
        def.upper_bounds = self.normalize_bounds(std::mem::take(&mut def.upper_bounds));
        if let Some(slot) = self.type_params.get_mut(id.0 as usize) {
            *slot = def;
        }
    }

    pub fn set_type_param_bounds(&mut self, id: TypeVarId, upper_bounds: Vec<Type>) {
        let upper_bounds = self.normalize_bounds(upper_bounds);
        if let Some(slot) = self.type_params.get_mut(id.0 as usize) {
            slot.upper_bounds = upper_bounds;
        }
    }

    pub fn set_type_param_owner(&mut self, id: TypeVarId, owner: TypeVarOwner) {
        if let Some(slot) = self.type_params.get_mut(id.0 as usize) {
            slot.owner = owner;
        }
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.defs.get_mut(id.0 as usize)?.as_mut()
    }

    fn normalize_bounds(&self, bounds: Vec<Type>) -> Vec<Type> {
        if bounds.is_empty() {
            vec![Type::class(self.well_known.object)]
        } else {
            bounds
        }
    }

    fn bootstrap_well_known(&mut self) {
        let wk = self.well_known.clone();
        let object = Type::class(wk.object);
        let string = Type::class(wk.string);

        let mut object_def = ClassDef::class("java.lang.Object");
        object_def.methods = vec![
            crate::MethodDef::new("equals", vec![object.clone()], Type::boolean()),
            crate::MethodDef::new("hashCode", vec![], Type::int()),
            crate::MethodDef::new("toString", vec![], string.clone()),
        ];
        object_def.constructors = vec![crate::ConstructorDef::new(vec![])];
        self.define_class(wk.object, object_def);

        self.define_class(wk.serializable, ClassDef::interface("java.io.Serializable"));
        self.define_class(wk.cloneable, ClassDef::interface("java.lang.Cloneable"));

        // interface Comparable<T> { int compareTo(T o); }
        let comparable_t = self.add_type_param("T", vec![]);
        let mut compare_to =
            crate::MethodDef::new("compareTo", vec![Type::TypeVar(comparable_t)], Type::int());
        compare_to.is_abstract = true;
        self.define_class(
            wk.comparable,
            ClassDef {
                type_params: vec![comparable_t],
                methods: vec![compare_to],
                ..ClassDef::interface("java.lang.Comparable")
            },
        );

        let comparable_of = |id: ClassId| Type::parameterized(wk.comparable, vec![Type::class(id)]);

        let mut string_def = ClassDef {
            is_final: true,
            super_class: Some(object.clone()),
            interfaces: vec![Type::class(wk.serializable), comparable_of(wk.string)],
            ..ClassDef::class("java.lang.String")
        };
        string_def.methods = vec![
            crate::MethodDef::new("length", vec![], Type::int()),
            crate::MethodDef::new("charAt", vec![Type::int()], Type::Primitive(PrimitiveType::Char)),
            crate::MethodDef {
                is_static: true,
                ..crate::MethodDef::new("valueOf", vec![object.clone()], string.clone())
            },
            crate::MethodDef {
                is_static: true,
                ..crate::MethodDef::new("valueOf", vec![Type::int()], string.clone())
            },
        ];
        string_def.constructors = vec![
            crate::ConstructorDef::new(vec![]),
            crate::ConstructorDef::new(vec![string.clone()]),
        ];
        self.define_class(wk.string, string_def);

        let mut number_def = ClassDef {
            is_abstract: true,
            super_class: Some(object.clone()),
            interfaces: vec![Type::class(wk.serializable)],
            ..ClassDef::class("java.lang.Number")
        };
        number_def.methods = vec![
            crate::MethodDef::new("intValue", vec![], Type::int()),
            crate::MethodDef::new("longValue", vec![], Type::Primitive(PrimitiveType::Long)),
            crate::MethodDef::new("doubleValue", vec![], Type::Primitive(PrimitiveType::Double)),
        ];
        self.define_class(wk.number, number_def);

        for prim in PrimitiveType::ALL {
            let id = wk.boxed(prim);
            let name = self.classes.names[id.0 as usize].clone();
            let super_class = match prim {
                PrimitiveType::Boolean | PrimitiveType::Char => object.clone(),
                _ => Type::class(wk.number),
            };
            let mut value_of = crate::MethodDef::new(
                "valueOf",
                vec![Type::Primitive(prim)],
                Type::class(id),
            );
            value_of.is_static = true;
            let def = ClassDef {
                is_final: true,
                super_class: Some(super_class),
                interfaces: vec![Type::class(wk.serializable), comparable_of(id)],
                methods: vec![value_of],
                constructors: vec![crate::ConstructorDef::new(vec![Type::Primitive(prim)])],
                ..ClassDef::class(name)
            };
            self.define_class(id, def);
        }

        self.define_class(
            wk.void,
            ClassDef {
                is_final: true,
                super_class: Some(object),
                ..ClassDef::class("java.lang.Void")
            },
        );
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.defs.get(id.0 as usize)?.as_ref()
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        if crate::env::is_context_local(id) {
            return None;
        }
        self.type_params.get(id.0 as usize)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.classes.by_name.get(name) {
            return Some(*id);
        }
        if !name.contains('.') {
            return self
                .classes
                .by_name
                .get(&format!("java.lang.{name}"))
                .copied();
        }
        None
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }

    fn options(&self) -> &TypeStoreOptions {
        &self.options
    }

    fn class_name(&self, id: ClassId) -> Option<&str> {
        self.classes.names.get(id.0 as usize).map(String::as_str)
    }
}
