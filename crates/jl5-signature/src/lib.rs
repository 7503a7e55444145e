//! Decoding of JVM generic `Signature` attributes into [`jl5_types::Type`]s.
//!
//! Parsing ([`parse_class_signature`] and friends) produces a name-level [`syntax`] tree;
//! [`SignatureDecoder`] resolves class names and type variables against a
//! [`jl5_types::TypeStore`].

mod decode;
mod error;
mod parser;
pub mod syntax;

pub use decode::{
    ClassResolver, ClassSignature, MethodSignature, SignatureDecoder, StoreResolver,
};
pub use error::{Result, SignatureError};
pub use parser::{parse_class_signature, parse_field_signature, parse_method_signature};
