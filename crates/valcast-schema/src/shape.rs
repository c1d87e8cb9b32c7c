//! Type shape resolution
//!
//! Classifies a declared field type into the closed set of shapes the
//! coercion engine dispatches on.

use crate::model::{Schema, TypeDecl};
use std::fmt;
use std::sync::Arc;

/// Built-in primitive kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Int,
    Float,
    Str,
    Bytes,
}

impl Primitive {
    /// Diagnostic name of the primitive
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Str => "str",
            Primitive::Bytes => "bytes",
        }
    }
}

/// The resolved classification of a declared field type
#[derive(Clone)]
pub enum TypeShape {
    /// Built-in primitive
    Primitive(Primitive),

    /// Instance of a nested schema
    Nested(Arc<Schema>),

    /// Ordered sequence of an element shape
    List(Box<TypeShape>),

    /// Unordered collection of an element shape
    Set(Box<TypeShape>),

    /// Mapping with a key shape and a value shape
    Map(Box<TypeShape>, Box<TypeShape>),

    /// Unclassified; passed through unconverted
    Opaque,
}

impl TypeShape {
    /// Stable registry key for this shape
    ///
    /// Two shapes with equal keys are dispatched identically; nested
    /// schemas key by schema name.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            TypeShape::Primitive(p) => p.name().to_string(),
            TypeShape::Nested(s) => format!("schema[{}]", s.name()),
            TypeShape::List(e) => format!("list[{}]", e.key()),
            TypeShape::Set(e) => format!("set[{}]", e.key()),
            TypeShape::Map(k, v) => format!("map[{}, {}]", k.key(), v.key()),
            TypeShape::Opaque => "opaque".to_string(),
        }
    }
}

impl PartialEq for TypeShape {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Classify a type declaration into a [`TypeShape`]
///
/// Pure and total over supported declarations; container declarations
/// recurse on their type parameters.
///
/// # Errors
///
/// Returns [`crate::Error::UnsupportedType`] for `Union` and `Callable`
/// declarations, which the engine deliberately does not dispatch on.
pub fn resolve(decl: &TypeDecl, schema: &str, field: &str) -> crate::Result<TypeShape> {
    match decl {
        TypeDecl::Bool => Ok(TypeShape::Primitive(Primitive::Bool)),
        TypeDecl::Int => Ok(TypeShape::Primitive(Primitive::Int)),
        TypeDecl::Float => Ok(TypeShape::Primitive(Primitive::Float)),
        TypeDecl::Str => Ok(TypeShape::Primitive(Primitive::Str)),
        TypeDecl::Bytes => Ok(TypeShape::Primitive(Primitive::Bytes)),
        TypeDecl::List(element) => Ok(TypeShape::List(Box::new(resolve(element, schema, field)?))),
        TypeDecl::Set(element) => Ok(TypeShape::Set(Box::new(resolve(element, schema, field)?))),
        TypeDecl::Map(key, value) => Ok(TypeShape::Map(
            Box::new(resolve(key, schema, field)?),
            Box::new(resolve(value, schema, field)?),
        )),
        TypeDecl::Schema(nested) => Ok(TypeShape::Nested(Arc::clone(nested))),
        TypeDecl::Opaque => Ok(TypeShape::Opaque),
        TypeDecl::Union(_) | TypeDecl::Callable => Err(crate::Error::UnsupportedType {
            schema: schema.to_string(),
            field: field.to_string(),
            decl: decl.describe(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldDef;

    #[test]
    fn test_resolve_primitives() {
        let shape = resolve(&TypeDecl::Int, "S", "f").unwrap();
        assert_eq!(shape, TypeShape::Primitive(Primitive::Int));
        assert_eq!(shape.key(), "int");
    }

    #[test]
    fn test_resolve_nested_containers() {
        let decl = TypeDecl::list(TypeDecl::list(TypeDecl::Int));
        let shape = resolve(&decl, "S", "f").unwrap();
        assert_eq!(shape.key(), "list[list[int]]");
    }

    #[test]
    fn test_resolve_map_has_key_and_value_shapes() {
        let decl = TypeDecl::map(TypeDecl::Str, TypeDecl::Float);
        let shape = resolve(&decl, "S", "f").unwrap();
        assert_eq!(shape.key(), "map[str, float]");
    }

    #[test]
    fn test_resolve_schema_decl() {
        let nested = Schema::builder("Point")
            .field(FieldDef::new("x", TypeDecl::Int))
            .build();
        let shape = resolve(&TypeDecl::Schema(nested), "S", "f").unwrap();
        assert_eq!(shape.key(), "schema[Point]");
    }

    #[test]
    fn test_resolve_rejects_union_and_callable() {
        let union = TypeDecl::Union(vec![TypeDecl::Int, TypeDecl::Str]);
        let err = resolve(&union, "S", "f").unwrap_err();
        assert!(matches!(err, crate::Error::UnsupportedType { .. }));

        let err = resolve(&TypeDecl::Callable, "S", "f").unwrap_err();
        assert!(matches!(err, crate::Error::UnsupportedType { .. }));
    }

    #[test]
    fn test_resolve_rejects_union_inside_container() {
        let decl = TypeDecl::list(TypeDecl::Union(vec![TypeDecl::Int]));
        assert!(resolve(&decl, "S", "f").is_err());
    }

    #[test]
    fn test_opaque_passthrough_shape() {
        let shape = resolve(&TypeDecl::Opaque, "S", "f").unwrap();
        assert_eq!(shape, TypeShape::Opaque);
    }
}
