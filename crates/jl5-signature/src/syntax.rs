//! Syntax tree of JVM generic signatures (JVMS §4.7.9.1), before name resolution.

use jl5_types::PrimitiveType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    /// `None` for an empty class bound (`T::Ljava/lang/Comparable;`).
    pub class_bound: Option<FieldTypeSignature>,
    pub interface_bounds: Vec<FieldTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_params: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_params: Vec<TypeParameter>,
    pub params: Vec<TypeSignature>,
    /// `None` is `V`.
    pub return_type: Option<TypeSignature>,
    pub throws: Vec<FieldTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(PrimitiveType),
    Field(FieldTypeSignature),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTypeSignature {
    Class(ClassTypeSignature),
    Array(Box<TypeSignature>),
    TypeVariable(String),
}

/// `Lpkg/Outer<..>.Inner<..>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    pub package: Vec<String>,
    /// Outermost first; never empty.
    pub segments: Vec<SimpleClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleClassTypeSignature {
    pub name: String,
    pub type_args: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    /// `*`
    Any,
    /// `+T`
    Extends(FieldTypeSignature),
    /// `-T`
    Super(FieldTypeSignature),
    Exact(FieldTypeSignature),
}

impl ClassTypeSignature {
    /// Binary name of the class named by the first `count` segments: package segments
    /// joined with `.`, nested segments with `$`.
    pub fn binary_name_of_prefix(&self, count: usize) -> String {
        let mut name = String::new();
        for pkg in &self.package {
            name.push_str(pkg);
            name.push('.');
        }
        for (idx, segment) in self.segments.iter().take(count).enumerate() {
            if idx > 0 {
                name.push('$');
            }
            name.push_str(&segment.name);
        }
        name
    }

    pub fn binary_name(&self) -> String {
        self.binary_name_of_prefix(self.segments.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_names_join_packages_and_nested_segments() {
        let sig = ClassTypeSignature {
            package: vec!["java".to_string(), "util".to_string()],
            segments: vec![
                SimpleClassTypeSignature {
                    name: "Map".to_string(),
                    type_args: vec![],
                },
                SimpleClassTypeSignature {
                    name: "Entry".to_string(),
                    type_args: vec![TypeArgument::Any, TypeArgument::Any],
                },
            ],
        };
        assert_eq!(sig.binary_name(), "java.util.Map$Entry");
        assert_eq!(sig.binary_name_of_prefix(1), "java.util.Map");
    }
}
