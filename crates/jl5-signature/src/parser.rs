//! Cursor-based recursive descent over the signature grammar.
//!
//! Every production takes the remaining input and returns the parsed value together
//! with the unconsumed rest. Failures record how much input was left so the caller can
//! report a byte offset.

use jl5_types::PrimitiveType;

use crate::error::{Result, SignatureError};
use crate::syntax::{
    ClassSignature, ClassTypeSignature, FieldTypeSignature, MethodSignature,
    SimpleClassTypeSignature, TypeArgument, TypeParameter, TypeSignature,
};

#[derive(Debug)]
struct Failure {
    remaining: usize,
    reason: &'static str,
}

type Parsed<'a, T> = std::result::Result<(T, &'a str), Failure>;

fn fail<'a, T>(input: &str, reason: &'static str) -> Parsed<'a, T> {
    Err(Failure {
        remaining: input.len(),
        reason,
    })
}

fn finish<T>(signature: &str, parsed: Parsed<'_, T>) -> Result<T> {
    let to_error = |failure: Failure| SignatureError::Malformed {
        signature: signature.to_string(),
        offset: signature.len() - failure.remaining,
        reason: failure.reason,
    };
    match parsed {
        Ok((value, "")) => Ok(value),
        Ok((_, rest)) => Err(to_error(Failure {
            remaining: rest.len(),
            reason: "trailing characters",
        })),
        Err(failure) => Err(to_error(failure)),
    }
}

pub fn parse_class_signature(signature: &str) -> Result<ClassSignature> {
    finish(signature, class_signature(signature))
}

pub fn parse_method_signature(signature: &str) -> Result<MethodSignature> {
    finish(signature, method_signature(signature))
}

pub fn parse_field_signature(signature: &str) -> Result<FieldTypeSignature> {
    finish(signature, field_type_signature(signature))
}

fn expect<'a>(input: &'a str, token: char, reason: &'static str) -> Parsed<'a, ()> {
    match input.strip_prefix(token) {
        Some(rest) => Ok(((), rest)),
        None => fail(input, reason),
    }
}

fn identifier(input: &str) -> Parsed<'_, String> {
    let end = input
        .find(|c: char| matches!(c, '.' | ';' | '[' | '/' | '<' | '>' | ':'))
        .unwrap_or(input.len());
    if end == 0 {
        return if input.is_empty() {
            fail(input, "unexpected end of signature")
        } else {
            fail(input, "expected identifier")
        };
    }
    Ok((input[..end].to_string(), &input[end..]))
}

fn class_signature(input: &str) -> Parsed<'_, ClassSignature> {
    let (type_params, rest) = formal_type_parameters(input)?;
    let (super_class, mut rest) = class_type_signature(rest)?;
    let mut interfaces = Vec::new();
    while !rest.is_empty() {
        let (iface, next) = class_type_signature(rest)?;
        interfaces.push(iface);
        rest = next;
    }
    Ok((
        ClassSignature {
            type_params,
            super_class,
            interfaces,
        },
        rest,
    ))
}

fn method_signature(input: &str) -> Parsed<'_, MethodSignature> {
    let (type_params, rest) = formal_type_parameters(input)?;
    let ((), mut rest) = expect(rest, '(', "expected `(`")?;

    let mut params = Vec::new();
    loop {
        if let Some(next) = rest.strip_prefix(')') {
            rest = next;
            break;
        }
        let (param, next) = type_signature(rest)?;
        params.push(param);
        rest = next;
    }

    let (return_type, mut rest) = match rest.strip_prefix('V') {
        Some(next) => (None, next),
        None => {
            let (ty, next) = type_signature(rest)?;
            (Some(ty), next)
        }
    };

    let mut throws = Vec::new();
    while let Some(next) = rest.strip_prefix('^') {
        let (thrown, next) = match next.chars().next() {
            Some('L') => {
                let (class, next) = class_type_signature(next)?;
                (FieldTypeSignature::Class(class), next)
            }
            Some('T') => type_variable_signature(next)?,
            _ => return fail(next, "expected class or type variable after `^`"),
        };
        throws.push(thrown);
        rest = next;
    }

    Ok((
        MethodSignature {
            type_params,
            params,
            return_type,
            throws,
        },
        rest,
    ))
}

fn formal_type_parameters(input: &str) -> Parsed<'_, Vec<TypeParameter>> {
    let Some(mut rest) = input.strip_prefix('<') else {
        return Ok((Vec::new(), input));
    };
    let mut params = Vec::new();
    loop {
        if let Some(next) = rest.strip_prefix('>') {
            if params.is_empty() {
                return fail(rest, "empty type parameter list");
            }
            return Ok((params, next));
        }
        let (param, next) = formal_type_parameter(rest)?;
        params.push(param);
        rest = next;
    }
}

fn formal_type_parameter(input: &str) -> Parsed<'_, TypeParameter> {
    let (name, rest) = identifier(input)?;
    let ((), rest) = expect(rest, ':', "expected `:` after type parameter name")?;

    let (class_bound, mut rest) = match rest.chars().next() {
        Some('L' | '[' | 'T') => {
            let (bound, next) = field_type_signature(rest)?;
            (Some(bound), next)
        }
        _ => (None, rest),
    };

    let mut interface_bounds = Vec::new();
    while let Some(next) = rest.strip_prefix(':') {
        let (bound, next) = field_type_signature(next)?;
        interface_bounds.push(bound);
        rest = next;
    }

    Ok((
        TypeParameter {
            name,
            class_bound,
            interface_bounds,
        },
        rest,
    ))
}

fn type_signature(input: &str) -> Parsed<'_, TypeSignature> {
    let Some(first) = input.chars().next() else {
        return fail(input, "unexpected end of signature");
    };
    if let Some(prim) = PrimitiveType::from_descriptor(first) {
        return Ok((TypeSignature::Base(prim), &input[1..]));
    }
    let (field, rest) = field_type_signature(input)?;
    Ok((TypeSignature::Field(field), rest))
}

fn field_type_signature(input: &str) -> Parsed<'_, FieldTypeSignature> {
    match input.chars().next() {
        Some('L') => {
            let (class, rest) = class_type_signature(input)?;
            Ok((FieldTypeSignature::Class(class), rest))
        }
        Some('[') => {
            let (elem, rest) = type_signature(&input[1..])?;
            Ok((FieldTypeSignature::Array(Box::new(elem)), rest))
        }
        Some('T') => type_variable_signature(input),
        Some(_) => fail(input, "expected class, array or type variable signature"),
        None => fail(input, "unexpected end of signature"),
    }
}

fn type_variable_signature(input: &str) -> Parsed<'_, FieldTypeSignature> {
    let ((), rest) = expect(input, 'T', "expected `T`")?;
    let (name, rest) = identifier(rest)?;
    let ((), rest) = expect(rest, ';', "expected `;` after type variable")?;
    Ok((FieldTypeSignature::TypeVariable(name), rest))
}

fn class_type_signature(input: &str) -> Parsed<'_, ClassTypeSignature> {
    let ((), rest) = expect(input, 'L', "expected `L`")?;

    let mut package = Vec::new();
    let (mut name, mut rest) = identifier(rest)?;
    while let Some(next) = rest.strip_prefix('/') {
        package.push(name);
        let (segment, next) = identifier(next)?;
        name = segment;
        rest = next;
    }

    let (type_args, next) = type_arguments(rest)?;
    let mut segments = vec![SimpleClassTypeSignature { name, type_args }];
    rest = next;

    while let Some(next) = rest.strip_prefix('.') {
        let (name, next) = identifier(next)?;
        let (type_args, next) = type_arguments(next)?;
        segments.push(SimpleClassTypeSignature { name, type_args });
        rest = next;
    }

    let ((), rest) = expect(rest, ';', "expected `;` after class type")?;
    Ok((ClassTypeSignature { package, segments }, rest))
}

fn type_arguments(input: &str) -> Parsed<'_, Vec<TypeArgument>> {
    let Some(mut rest) = input.strip_prefix('<') else {
        return Ok((Vec::new(), input));
    };
    let mut args = Vec::new();
    loop {
        if let Some(next) = rest.strip_prefix('>') {
            if args.is_empty() {
                return fail(rest, "empty type argument list");
            }
            return Ok((args, next));
        }
        let (arg, next) = match rest.chars().next() {
            Some('*') => (TypeArgument::Any, &rest[1..]),
            Some('+') => {
                let (bound, next) = field_type_signature(&rest[1..])?;
                (TypeArgument::Extends(bound), next)
            }
            Some('-') => {
                let (bound, next) = field_type_signature(&rest[1..])?;
                (TypeArgument::Super(bound), next)
            }
            _ => {
                let (ty, next) = field_type_signature(rest)?;
                (TypeArgument::Exact(ty), next)
            }
        };
        args.push(arg);
        rest = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn class(path: &str) -> FieldTypeSignature {
        let (pkg, name) = path.rsplit_once('/').unwrap_or(("", path));
        FieldTypeSignature::Class(ClassTypeSignature {
            package: pkg.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect(),
            segments: vec![SimpleClassTypeSignature {
                name: name.to_string(),
                type_args: vec![],
            }],
        })
    }

    #[test]
    fn parses_formal_type_parameters_with_empty_class_bound() {
        let sig = parse_class_signature(
            "<T::Ljava/lang/Comparable<TT;>;U:Ljava/lang/Object;>Ljava/lang/Object;",
        )
        .unwrap();
        assert_eq!(sig.type_params.len(), 2);
        assert_eq!(sig.type_params[0].name, "T");
        assert_eq!(sig.type_params[0].class_bound, None);
        assert_eq!(sig.type_params[0].interface_bounds.len(), 1);
        assert_eq!(sig.type_params[1].class_bound, Some(class("java/lang/Object")));
        assert!(sig.interfaces.is_empty());
    }

    #[test]
    fn parses_method_with_throws() {
        let sig = parse_method_signature("<E:Ljava/lang/Exception;>([I)V^TE;^Ljava/io/IOException;")
            .unwrap();
        assert_eq!(
            sig.params,
            vec![TypeSignature::Field(FieldTypeSignature::Array(Box::new(
                TypeSignature::Base(PrimitiveType::Int)
            )))]
        );
        assert_eq!(sig.return_type, None);
        assert_eq!(
            sig.throws,
            vec![
                FieldTypeSignature::TypeVariable("E".to_string()),
                class("java/io/IOException"),
            ]
        );
    }

    #[test]
    fn parses_nested_segments_with_arguments() {
        let sig = parse_field_signature("Ljava/util/Map<TK;TV;>.Entry<TK;TV;>;").unwrap();
        let FieldTypeSignature::Class(class) = sig else {
            panic!("expected class type");
        };
        assert_eq!(class.package, vec!["java".to_string(), "util".to_string()]);
        assert_eq!(class.segments.len(), 2);
        assert_eq!(class.binary_name(), "java.util.Map$Entry");
        assert_eq!(class.segments[0].type_args.len(), 2);
    }

    #[test]
    fn reports_offsets_of_malformed_input() {
        assert_eq!(
            parse_field_signature("Ljava/util/List<"),
            Err(SignatureError::Malformed {
                signature: "Ljava/util/List<".to_string(),
                offset: 16,
                reason: "unexpected end of signature",
            })
        );
        assert!(matches!(
            parse_method_signature("(Q)V"),
            Err(SignatureError::Malformed { offset: 1, .. })
        ));
        assert!(matches!(
            parse_field_signature("TT;extra"),
            Err(SignatureError::Malformed {
                reason: "trailing characters",
                offset: 3,
                ..
            })
        ));
        assert!(parse_method_signature("(I").is_err());
        assert!(parse_class_signature("<>Ljava/lang/Object;").is_err());
    }
}
