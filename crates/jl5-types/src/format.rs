use std::fmt;

use crate::{ClassId, Type, TypeEnv, WildcardBound};

/// Render `ty` in Java source syntax, e.g. `java.util.Map<K, ? extends java.lang.Number>`.
pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    TypeDisplay::new(env, ty).to_string()
}

/// [`fmt::Display`] adapter for a [`Type`] in a [`TypeEnv`].
pub struct TypeDisplay<'a> {
    env: &'a dyn TypeEnv,
    ty: &'a Type,
}

impl<'a> TypeDisplay<'a> {
    pub fn new(env: &'a dyn TypeEnv, ty: &'a Type) -> Self {
        Self { env, ty }
    }

    fn class_name(&self, id: ClassId) -> String {
        match self.env.class_name(id) {
            Some(name) => name.replace('$', "."),
            None => format!("<class#{}>", id.to_raw()),
        }
    }

    fn simple_name(&self, id: ClassId) -> String {
        let name = self.class_name(id);
        match name.rsplit_once('.') {
            Some((_, simple)) => simple.to_string(),
            None => name,
        }
    }

    fn write_list(&self, f: &mut fmt::Formatter<'_>, tys: &[Type], sep: &str) -> fmt::Result {
        for (idx, ty) in tys.iter().enumerate() {
            if idx > 0 {
                f.write_str(sep)?;
            }
            write!(f, "{}", TypeDisplay::new(self.env, ty))?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            Type::Void => f.write_str("void"),
            Type::Primitive(prim) => f.write_str(prim.name()),
            Type::Null => f.write_str("null"),
            Type::Class(id) | Type::Raw(id) => f.write_str(&self.class_name(*id)),
            Type::Parameterized(ct) => {
                match ct.outer.as_deref() {
                    Some(outer) => write!(
                        f,
                        "{}.{}",
                        TypeDisplay::new(self.env, outer),
                        self.simple_name(ct.def)
                    )?,
                    None => f.write_str(&self.class_name(ct.def))?,
                }
                if !ct.args.is_empty() {
                    f.write_str("<")?;
                    self.write_list(f, &ct.args, ", ")?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            Type::TypeVar(tv) => match self.env.type_param(*tv) {
                Some(def) => f.write_str(&def.name),
                None => write!(f, "<tv#{}>", tv.to_raw()),
            },
            Type::Wildcard(WildcardBound::Unbounded) => f.write_str("?"),
            Type::Wildcard(WildcardBound::Extends(bound)) => {
                write!(f, "? extends {}", TypeDisplay::new(self.env, bound))
            }
            Type::Wildcard(WildcardBound::Super(bound)) => {
                write!(f, "? super {}", TypeDisplay::new(self.env, bound))
            }
            Type::Intersection(parts) => self.write_list(f, parts, " & "),
            Type::Array(arr) => {
                let suffix = if arr.is_varargs { "..." } else { "[]" };
                write!(f, "{}{suffix}", TypeDisplay::new(self.env, &arr.elem))
            }
            Type::Lub(parts) => {
                f.write_str("lub(")?;
                self.write_list(f, parts, ", ")?;
                f.write_str(")")
            }
            Type::Named(name) => f.write_str(name),
            Type::Unknown => f.write_str("<unknown>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassType, TypeStore};

    #[test]
    fn formats_generic_types_like_source() {
        let mut store = TypeStore::with_minimal_jdk();
        let map = store.class_id("java.util.Map").unwrap();
        let entry = store.class_id("java.util.Map$Entry").unwrap();
        let wk = store.well_known().clone();
        let t = store.add_type_param("T", vec![]);

        let ty = Type::parameterized(
            map,
            vec![Type::TypeVar(t), Type::extends(Type::class(wk.number))],
        );
        assert_eq!(
            format_type(&store, &ty),
            "java.util.Map<T, ? extends java.lang.Number>"
        );

        assert_eq!(format_type(&store, &Type::Raw(entry)), "java.util.Map.Entry");
        assert_eq!(
            format_type(&store, &Type::varargs(Type::array(Type::int()))),
            "int[]..."
        );

        let nested = Type::Parameterized(ClassType {
            def: entry,
            args: vec![Type::class(wk.string), Type::unbounded()],
            outer: Some(Box::new(Type::parameterized(map, vec![Type::unbounded(), Type::unbounded()]))),
        });
        assert_eq!(
            format_type(&store, &nested),
            "java.util.Map<?, ?>.Entry<java.lang.String, ?>"
        );
    }
}
