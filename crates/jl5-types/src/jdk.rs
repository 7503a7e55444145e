//! A tiny slice of the JDK collections API, enough to exercise generic code paths in
//! tests and examples without loading class files.

use crate::{ClassDef, ConstructorDef, MethodDef, Type, TypeEnv, TypeStore};

impl TypeStore {
    /// [`TypeStore::default`] plus `Iterable`, `Collection`, `List`, `ArrayList`, `Map`,
    /// `HashMap`, `Map$Entry`, `CharSequence` and `Enum`.
    pub fn with_minimal_jdk() -> Self {
        let mut store = TypeStore::default();
        store.add_minimal_jdk();
        store
    }

    fn add_minimal_jdk(&mut self) {
        let wk = self.well_known().clone();
        let object = Type::class(wk.object);

        self.add_class(ClassDef {
            methods: vec![abstract_method("length", vec![], Type::int())],
            ..ClassDef::interface("java.lang.CharSequence")
        });

        // interface Iterable<T>
        let iterable_t = self.add_type_param("T", vec![]);
        let iterable = self.add_class(ClassDef {
            type_params: vec![iterable_t],
            ..ClassDef::interface("java.lang.Iterable")
        });

        // interface Collection<E> extends Iterable<E>
        let collection_e = self.add_type_param("E", vec![]);
        let e = Type::TypeVar(collection_e);
        let collection = self.add_class(ClassDef {
            type_params: vec![collection_e],
            interfaces: vec![Type::parameterized(iterable, vec![e.clone()])],
            methods: vec![
                abstract_method("add", vec![e.clone()], Type::boolean()),
                abstract_method("size", vec![], Type::int()),
                abstract_method("contains", vec![object.clone()], Type::boolean()),
            ],
            ..ClassDef::interface("java.util.Collection")
        });

        // interface List<E> extends Collection<E>
        let list_e = self.add_type_param("E", vec![]);
        let e = Type::TypeVar(list_e);
        let list = self.add_class(ClassDef {
            type_params: vec![list_e],
            interfaces: vec![Type::parameterized(collection, vec![e.clone()])],
            methods: vec![
                abstract_method("get", vec![Type::int()], e.clone()),
                abstract_method("set", vec![Type::int(), e.clone()], e.clone()),
                abstract_method("add", vec![e.clone()], Type::boolean()),
                abstract_method(
                    "addAll",
                    vec![Type::parameterized(collection, vec![Type::extends(e.clone())])],
                    Type::boolean(),
                ),
            ],
            ..ClassDef::interface("java.util.List")
        });

        // class ArrayList<E> implements List<E>
        let array_list_e = self.add_type_param("E", vec![]);
        let e = Type::TypeVar(array_list_e);
        self.add_class(ClassDef {
            type_params: vec![array_list_e],
            super_class: Some(object.clone()),
            interfaces: vec![
                Type::parameterized(list, vec![e.clone()]),
                Type::class(wk.cloneable),
                Type::class(wk.serializable),
            ],
            constructors: vec![
                ConstructorDef::new(vec![]),
                ConstructorDef::new(vec![Type::int()]),
                ConstructorDef::new(vec![Type::parameterized(
                    collection,
                    vec![Type::extends(e.clone())],
                )]),
            ],
            methods: vec![
                MethodDef::new("get", vec![Type::int()], e.clone()),
                MethodDef::new("set", vec![Type::int(), e.clone()], e.clone()),
                MethodDef::new("add", vec![e.clone()], Type::boolean()),
                MethodDef::new("size", vec![], Type::int()),
            ],
            ..ClassDef::class("java.util.ArrayList")
        });

        // interface Map<K, V> { interface Entry<K, V> }
        let map_k = self.add_type_param("K", vec![]);
        let map_v = self.add_type_param("V", vec![]);
        let (k, v) = (Type::TypeVar(map_k), Type::TypeVar(map_v));
        let map = self.add_class(ClassDef {
            type_params: vec![map_k, map_v],
            methods: vec![
                abstract_method("get", vec![object.clone()], v.clone()),
                abstract_method("put", vec![k.clone(), v.clone()], v.clone()),
            ],
            ..ClassDef::interface("java.util.Map")
        });

        let entry_k = self.add_type_param("K", vec![]);
        let entry_v = self.add_type_param("V", vec![]);
        self.add_class(ClassDef {
            outer: Some(map),
            is_static: true,
            type_params: vec![entry_k, entry_v],
            methods: vec![
                abstract_method("getKey", vec![], Type::TypeVar(entry_k)),
                abstract_method("getValue", vec![], Type::TypeVar(entry_v)),
            ],
            ..ClassDef::interface("java.util.Map$Entry")
        });

        let hash_map_k = self.add_type_param("K", vec![]);
        let hash_map_v = self.add_type_param("V", vec![]);
        let (k, v) = (Type::TypeVar(hash_map_k), Type::TypeVar(hash_map_v));
        self.add_class(ClassDef {
            type_params: vec![hash_map_k, hash_map_v],
            super_class: Some(object.clone()),
            interfaces: vec![
                Type::parameterized(map, vec![k.clone(), v.clone()]),
                Type::class(wk.cloneable),
                Type::class(wk.serializable),
            ],
            constructors: vec![ConstructorDef::new(vec![])],
            methods: vec![
                MethodDef::new("get", vec![object.clone()], v.clone()),
                MethodDef::new("put", vec![k, v.clone()], v),
            ],
            ..ClassDef::class("java.util.HashMap")
        });

        // abstract class Enum<E extends Enum<E>> implements Comparable<E>, Serializable
        let enum_id = self.intern_class_id("java.lang.Enum");
        let enum_e = self.add_type_param("E", vec![]);
        self.set_type_param_bounds(
            enum_e,
            vec![Type::parameterized(enum_id, vec![Type::TypeVar(enum_e)])],
        );
        self.define_class(
            enum_id,
            ClassDef {
                is_abstract: true,
                type_params: vec![enum_e],
                super_class: Some(object),
                interfaces: vec![
                    Type::parameterized(wk.comparable, vec![Type::TypeVar(enum_e)]),
                    Type::class(wk.serializable),
                ],
                methods: vec![
                    MethodDef::new("name", vec![], Type::class(wk.string)),
                    MethodDef::new("ordinal", vec![], Type::int()),
                ],
                ..ClassDef::class("java.lang.Enum")
            },
        );
    }
}

fn abstract_method(name: &str, params: Vec<Type>, return_type: Type) -> MethodDef {
    MethodDef {
        is_abstract: true,
        ..MethodDef::new(name, params, return_type)
    }
}
