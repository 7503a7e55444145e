use jl5_signature::{
    ClassSignature, MethodSignature, SignatureDecoder, SignatureError, StoreResolver,
};
use jl5_types::{
    ClassDef, ClassType, MethodDef, PrimitiveType, ProcedureId, ProcedureKind, Type, TypeEnv,
    TypeError, TypeStore, TypeVarOwner,
};
use pretty_assertions::assert_eq;

#[test]
fn class_signature_with_single_bounded_parameter() {
    let mut store = TypeStore::with_minimal_jdk();
    let object = store.class_id("java.lang.Object").unwrap();

    let sig = SignatureDecoder::new(&mut store)
        .decode_class_signature("<K:Ljava/lang/Object;>Ljava/lang/Object;")
        .unwrap();

    assert_eq!(sig.type_params.len(), 1);
    assert_eq!(sig.super_class, Type::class(object));
    assert!(sig.interfaces.is_empty());

    let k = store.type_param(sig.type_params[0]).unwrap();
    assert_eq!(k.name, "K");
    assert_eq!(k.upper_bounds, vec![Type::class(object)]);
}

#[test]
fn plain_method_signature() {
    let mut store = TypeStore::with_minimal_jdk();
    let string = store.class_id("java.lang.String").unwrap();

    let sig = SignatureDecoder::new(&mut store)
        .decode_method_signature("(Ljava/lang/String;)V")
        .unwrap();

    assert_eq!(
        sig,
        MethodSignature {
            type_params: vec![],
            params: vec![Type::class(string)],
            return_type: Type::Void,
            throws: vec![],
        }
    );
}

#[test]
fn method_signature_refers_back_to_its_own_parameter() {
    let mut store = TypeStore::with_minimal_jdk();

    let sig = SignatureDecoder::new(&mut store)
        .decode_method_signature("<T:Ljava/lang/Object;>(TT;)TT;")
        .unwrap();

    assert_eq!(sig.type_params.len(), 1);
    let t = Type::TypeVar(sig.type_params[0]);
    assert_eq!(sig.params, vec![t.clone()]);
    assert_eq!(sig.return_type, t);
}

#[test]
fn self_referential_bound_sees_its_own_parameter() {
    let mut store = TypeStore::with_minimal_jdk();
    let object = store.class_id("java.lang.Object").unwrap();
    let comparable = store.class_id("java.lang.Comparable").unwrap();

    let sig = SignatureDecoder::new(&mut store)
        .decode_class_signature(
            "<T:Ljava/lang/Object;:Ljava/lang/Comparable<TT;>;>Ljava/lang/Object;",
        )
        .unwrap();
    let t = sig.type_params[0];

    assert_eq!(
        store.type_param(t).unwrap().upper_bounds,
        vec![
            Type::class(object),
            Type::parameterized(comparable, vec![Type::TypeVar(t)]),
        ]
    );
}

#[test]
fn empty_class_bound_adds_no_object() {
    let mut store = TypeStore::with_minimal_jdk();
    let serializable = store.class_id("java.io.Serializable").unwrap();

    let sig = SignatureDecoder::new(&mut store)
        .decode_class_signature("<T::Ljava/io/Serializable;>Ljava/lang/Object;")
        .unwrap();

    assert_eq!(
        store.type_param(sig.type_params[0]).unwrap().upper_bounds,
        vec![Type::class(serializable)]
    );
}

#[test]
fn later_parameters_may_be_referenced_only_backwards() {
    let mut store = TypeStore::with_minimal_jdk();
    let list = store.class_id("java.util.List").unwrap();

    // <T, U extends List<T>> is fine.
    let sig = SignatureDecoder::new(&mut store)
        .decode_class_signature("<T:Ljava/lang/Object;U::Ljava/util/List<TT;>;>Ljava/lang/Object;")
        .unwrap();
    let (t, u) = (sig.type_params[0], sig.type_params[1]);
    assert_eq!(
        store.type_param(u).unwrap().upper_bounds,
        vec![Type::parameterized(list, vec![Type::TypeVar(t)])]
    );

    // <T extends U, U> is not.
    let err = SignatureDecoder::new(&mut store)
        .decode_class_signature("<T:TU;U:Ljava/lang/Object;>Ljava/lang/Object;")
        .unwrap_err();
    assert_eq!(
        err,
        SignatureError::Type(TypeError::IllegalForwardReference {
            param: "T".to_string(),
            referenced: "U".to_string(),
        })
    );
}

#[test]
fn wildcards_translate() {
    let mut store = TypeStore::with_minimal_jdk();
    let list = store.class_id("java.util.List").unwrap();
    let number = store.class_id("java.lang.Number").unwrap();
    let mut decoder = SignatureDecoder::new(&mut store);

    assert_eq!(
        decoder.decode_field_signature("Ljava/util/List<*>;").unwrap(),
        Type::parameterized(list, vec![Type::unbounded()])
    );
    assert_eq!(
        decoder
            .decode_field_signature("Ljava/util/List<+Ljava/lang/Number;>;")
            .unwrap(),
        Type::parameterized(list, vec![Type::extends(Type::class(number))])
    );
    assert_eq!(
        decoder
            .decode_field_signature("Ljava/util/List<-Ljava/lang/Number;>;")
            .unwrap(),
        Type::parameterized(list, vec![Type::super_of(Type::class(number))])
    );
}

#[test]
fn bare_generic_class_decodes_as_raw() {
    let mut store = TypeStore::with_minimal_jdk();
    let list = store.class_id("java.util.List").unwrap();
    let string = store.class_id("java.lang.String").unwrap();
    let mut decoder = SignatureDecoder::new(&mut store);

    assert_eq!(
        decoder.decode_field_signature("Ljava/util/List;").unwrap(),
        Type::Raw(list)
    );
    assert_eq!(
        decoder.decode_field_signature("Ljava/lang/String;").unwrap(),
        Type::class(string)
    );
}

#[test]
fn arrays_nest_one_dimension_at_a_time() {
    let mut store = TypeStore::with_minimal_jdk();
    let string = store.class_id("java.lang.String").unwrap();
    let mut decoder = SignatureDecoder::new(&mut store);

    assert_eq!(
        decoder.decode_field_signature("[[I").unwrap(),
        Type::array(Type::array(Type::Primitive(PrimitiveType::Int)))
    );
    assert_eq!(
        decoder.decode_field_signature("[Ljava/lang/String;").unwrap(),
        Type::array(Type::class(string))
    );
}

#[test]
fn method_type_params_shadow_class_type_params() {
    let mut store = TypeStore::with_minimal_jdk();
    let mut decoder = SignatureDecoder::new(&mut store);

    let class_sig = decoder
        .decode_class_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
        .unwrap();
    let class_t = class_sig.type_params[0];

    let shadowing = decoder
        .decode_method_signature("<T:Ljava/lang/Number;>(TT;)TT;")
        .unwrap();
    let method_t = shadowing.type_params[0];
    assert_ne!(method_t, class_t);
    assert_eq!(shadowing.params, vec![Type::TypeVar(method_t)]);

    // Once the method's list is closed, `T` is the class's again.
    let plain = decoder.decode_method_signature("(TT;)V").unwrap();
    assert_eq!(plain.params, vec![Type::TypeVar(class_t)]);
}

#[test]
fn class_type_params_can_be_supplied_up_front() {
    let mut store = TypeStore::with_minimal_jdk();
    let list = store.class_id("java.util.List").unwrap();
    let list_e = store.class(list).unwrap().type_params[0];

    let ty = SignatureDecoder::new(&mut store)
        .with_class_type_params(&[list_e])
        .decode_field_signature("TE;")
        .unwrap();
    assert_eq!(ty, Type::TypeVar(list_e));
}

#[test]
fn dangling_type_variable_is_synthesized() {
    let mut store = TypeStore::with_minimal_jdk();
    let object = store.class_id("java.lang.Object").unwrap();

    let ty = SignatureDecoder::new(&mut store)
        .decode_field_signature("TX;")
        .unwrap();
    let Type::TypeVar(x) = ty else {
        panic!("expected a type variable, got {ty:?}");
    };
    let def = store.type_param(x).unwrap();
    assert_eq!(def.name, "X");
    assert_eq!(def.owner, TypeVarOwner::Synthetic);
    assert_eq!(def.upper_bounds, vec![Type::class(object)]);
}

#[test]
fn nested_segments_carry_the_enclosing_instantiation() {
    let mut store = TypeStore::with_minimal_jdk();
    let map = store.class_id("java.util.Map").unwrap();
    let entry = store.class_id("java.util.Map$Entry").unwrap();
    let string = store.class_id("java.lang.String").unwrap();
    let integer = store.class_id("java.lang.Integer").unwrap();
    let mut decoder = SignatureDecoder::new(&mut store);

    let args = vec![Type::class(string), Type::class(integer)];
    assert_eq!(
        decoder
            .decode_field_signature(
                "Ljava/util/Map<Ljava/lang/String;Ljava/lang/Integer;>.Entry<Ljava/lang/String;Ljava/lang/Integer;>;"
            )
            .unwrap(),
        Type::Parameterized(ClassType {
            def: entry,
            args: args.clone(),
            outer: Some(Box::new(Type::parameterized(map, args.clone()))),
        })
    );

    // A `$` inside a segment is part of the binary name.
    assert_eq!(
        decoder
            .decode_field_signature(
                "Ljava/util/Map$Entry<Ljava/lang/String;Ljava/lang/Integer;>;"
            )
            .unwrap(),
        Type::parameterized(entry, args)
    );
}

#[test]
fn unresolved_classes_stay_named_unless_reserved() {
    let mut store = TypeStore::with_minimal_jdk();

    let ty = SignatureDecoder::new(&mut store)
        .decode_field_signature("Lcom/example/Missing;")
        .unwrap();
    assert_eq!(ty, Type::Named("com.example.Missing".to_string()));

    let ty = SignatureDecoder::with_resolver(&mut store, StoreResolver::reserving())
        .decode_field_signature("Lcom/example/Missing;")
        .unwrap();
    let id = store.lookup_class("com.example.Missing").unwrap();
    assert_eq!(ty, Type::class(id));
    assert!(!store.is_defined(id));
}

#[test]
fn closures_resolve_classes() {
    let mut store = TypeStore::with_minimal_jdk();
    let string = store.class_id("java.lang.String").unwrap();

    let mut seen = Vec::new();
    let ty = SignatureDecoder::with_resolver(&mut store, |store: &mut TypeStore, name: &str| {
        seen.push(name.to_string());
        store.class_id(name)
    })
    .decode_field_signature("[Ljava/lang/String;")
    .unwrap();

    assert_eq!(ty, Type::array(Type::class(string)));
    assert_eq!(seen, vec!["java.lang.String".to_string()]);
}

#[test]
fn throws_clause_decodes_classes_and_type_variables() {
    let mut store = TypeStore::with_minimal_jdk();
    let object = store.class_id("java.lang.Object").unwrap();

    let sig = SignatureDecoder::new(&mut store)
        .decode_method_signature("<E:Ljava/lang/Object;>()V^TE;^Lcom/example/Failure;")
        .unwrap();
    assert_eq!(
        sig.throws,
        vec![
            Type::TypeVar(sig.type_params[0]),
            Type::Named("com.example.Failure".to_string()),
        ]
    );
    assert_eq!(
        store.type_param(sig.type_params[0]).unwrap().upper_bounds,
        vec![Type::class(object)]
    );
}

#[test]
fn defining_the_class_claims_decoded_parameters() {
    let mut store = TypeStore::with_minimal_jdk();
    let mut decoder = SignatureDecoder::new(&mut store);

    let ClassSignature {
        type_params,
        super_class,
        ..
    } = decoder
        .decode_class_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
        .unwrap();
    let method = decoder
        .decode_method_signature("<U:Ljava/lang/Object;>(TT;TU;)V")
        .unwrap();

    let box_id = store.add_class(ClassDef {
        type_params: type_params.clone(),
        super_class: Some(super_class),
        methods: vec![MethodDef {
            type_params: method.type_params.clone(),
            ..MethodDef::new("put", method.params, method.return_type)
        }],
        ..ClassDef::class("com.example.Box")
    });

    assert_eq!(
        store.type_param(type_params[0]).unwrap().owner,
        TypeVarOwner::Class(box_id)
    );
    assert_eq!(
        store.type_param(method.type_params[0]).unwrap().owner,
        TypeVarOwner::Procedure(ProcedureId {
            owner: box_id,
            kind: ProcedureKind::Method,
            index: 0,
        })
    );
}

#[test]
fn malformed_input_is_reported_with_its_offset() {
    let mut store = TypeStore::with_minimal_jdk();
    let mut decoder = SignatureDecoder::new(&mut store);

    let err = decoder
        .decode_class_signature("<T:Ljava/lang/Object;>Ljava/lang/Object")
        .unwrap_err();
    assert!(matches!(err, SignatureError::Malformed { offset: 39, .. }), "{err}");

    assert!(matches!(
        decoder.decode_method_signature("(X)V"),
        Err(SignatureError::Malformed { offset: 1, .. })
    ));
    assert!(decoder.decode_field_signature("").is_err());
}

#[test]
fn class_variables_do_not_leak_into_the_next_class() {
    let mut store = TypeStore::with_minimal_jdk();
    let comparable = store.class_id("java.lang.Comparable").unwrap();
    let mut decoder = SignatureDecoder::new(&mut store);

    let first = decoder
        .decode_class_signature("<T:Ljava/lang/Number;>Ljava/lang/Object;")
        .unwrap();
    let second = decoder
        .decode_class_signature("Ljava/lang/Object;Ljava/lang/Comparable<TT;>;")
        .unwrap();

    let [Type::Parameterized(iface)] = second.interfaces.as_slice() else {
        panic!("expected one parameterized interface, got {:?}", second.interfaces);
    };
    assert_eq!(iface.def, comparable);
    let [Type::TypeVar(t)] = iface.args.as_slice() else {
        panic!("expected a type variable argument, got {:?}", iface.args);
    };
    assert_ne!(*t, first.type_params[0]);
    assert_eq!(store.type_param(*t).unwrap().owner, TypeVarOwner::Synthetic);
}

#[test]
fn enclosing_class_variables_survive_an_inner_class_signature() {
    let mut store = TypeStore::with_minimal_jdk();
    let mut decoder = SignatureDecoder::new(&mut store);

    let outer = decoder
        .decode_class_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
        .unwrap();
    let outer_t = outer.type_params[0];
    decoder.set_class_type_params(&outer.type_params);

    // class Inner (non-generic), method T get()
    decoder.decode_class_signature("Ljava/lang/Object;").unwrap();
    let get = decoder.decode_method_signature("()TT;").unwrap();
    assert_eq!(get.return_type, Type::TypeVar(outer_t));

    // class Inner2<T>: its own T shadows the enclosing one.
    let inner = decoder
        .decode_class_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
        .unwrap();
    let get = decoder.decode_method_signature("()TT;").unwrap();
    assert_eq!(get.return_type, Type::TypeVar(inner.type_params[0]));
    assert_ne!(inner.type_params[0], outer_t);
}
