//! Schema model definitions

use crate::meta::Meta;
use crate::resolve::ResolvedSchema;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use valcast_value::{Record, Value};

/// Error returned by a conversion handler
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    /// Build a handler error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result type for conversion handlers
pub type HandlerResult = std::result::Result<Value, HandlerError>;

/// A conversion function applied to a raw field value
///
/// The first argument is the in-progress instance record: fields earlier
/// in the dependency plan are already coerced and readable, which is what
/// makes depends-on ordering meaningful for field handlers.
pub type Handler = Arc<dyn Fn(&Record, &Value) -> HandlerResult + Send + Sync>;

/// Factory producing a field's default value per instantiation
pub type DefaultFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// A declared field type
///
/// This is the declaration syntax; the shape resolver classifies it into a
/// [`crate::TypeShape`]. `Union` and `Callable` are declarable but
/// deliberately unsupported and rejected at schema resolution.
#[derive(Clone)]
pub enum TypeDecl {
    /// Boolean primitive
    Bool,
    /// Integer primitive
    Int,
    /// Floating point primitive
    Float,
    /// String primitive
    Str,
    /// Byte-string primitive
    Bytes,
    /// Ordered homogeneous sequence
    List(Box<TypeDecl>),
    /// Unordered homogeneous collection
    Set(Box<TypeDecl>),
    /// Homogeneous mapping with typed keys and values
    Map(Box<TypeDecl>, Box<TypeDecl>),
    /// A nested schema
    Schema(Arc<Schema>),
    /// Passed through unconverted by the engine
    Opaque,
    /// Union of alternatives; not classifiable
    Union(Vec<TypeDecl>),
    /// Function type; not classifiable
    Callable,
}

impl TypeDecl {
    /// Shorthand for a list-of declaration
    #[must_use]
    pub fn list(element: TypeDecl) -> Self {
        TypeDecl::List(Box::new(element))
    }

    /// Shorthand for a set-of declaration
    #[must_use]
    pub fn set(element: TypeDecl) -> Self {
        TypeDecl::Set(Box::new(element))
    }

    /// Shorthand for a map-of declaration
    #[must_use]
    pub fn map(key: TypeDecl, value: TypeDecl) -> Self {
        TypeDecl::Map(Box::new(key), Box::new(value))
    }

    /// Shorthand for a nested-schema declaration
    #[must_use]
    pub fn schema(schema: &Arc<Schema>) -> Self {
        TypeDecl::Schema(Arc::clone(schema))
    }

    /// Declaration rendering for diagnostics
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            TypeDecl::Bool => "bool".to_string(),
            TypeDecl::Int => "int".to_string(),
            TypeDecl::Float => "float".to_string(),
            TypeDecl::Str => "str".to_string(),
            TypeDecl::Bytes => "bytes".to_string(),
            TypeDecl::List(e) => format!("list[{}]", e.describe()),
            TypeDecl::Set(e) => format!("set[{}]", e.describe()),
            TypeDecl::Map(k, v) => format!("map[{}, {}]", k.describe(), v.describe()),
            TypeDecl::Schema(s) => format!("schema[{}]", s.name()),
            TypeDecl::Opaque => "opaque".to_string(),
            TypeDecl::Union(alts) => {
                let inner: Vec<String> = alts.iter().map(TypeDecl::describe).collect();
                format!("union[{}]", inner.join(", "))
            }
            TypeDecl::Callable => "callable".to_string(),
        }
    }
}

impl fmt::Debug for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Declaration of a single schema field
#[derive(Clone)]
pub struct FieldDef {
    name: String,
    decl: TypeDecl,
    default: Option<Value>,
    default_factory: Option<DefaultFactory>,
    nullable: bool,
    skip_typecast: bool,
    depends_on: Vec<String>,
    calculated: bool,
    ignore_env: bool,
}

impl FieldDef {
    /// Declare a field with a name and type
    pub fn new(name: impl Into<String>, decl: TypeDecl) -> Self {
        Self {
            name: name.into(),
            decl,
            default: None,
            default_factory: None,
            nullable: false,
            skip_typecast: false,
            depends_on: Vec::new(),
            calculated: false,
            ignore_env: false,
        }
    }

    /// Set a default value
    #[must_use]
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Set a default factory, invoked per instantiation
    #[must_use]
    pub fn default_factory(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default_factory = Some(Arc::new(factory));
        self
    }

    /// Mark the field nullable
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark the field as never typecast: the raw value is stored unchanged
    #[must_use]
    pub fn skip_typecast(mut self) -> Self {
        self.skip_typecast = true;
        self
    }

    /// Declare fields this field's coercion depends on
    #[must_use]
    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = names.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the field calculated: no caller-supplied value, produced
    /// entirely by its field handler. Declares a null default (unless one
    /// is already set) so callers never have to supply a placeholder.
    #[must_use]
    pub fn calculated(mut self) -> Self {
        self.calculated = true;
        self.ignore_env = true;
        self.default.get_or_insert(Value::Null);
        self
    }

    /// Exclude the field from environment-backed construction
    #[must_use]
    pub fn ignore_env(mut self) -> Self {
        self.ignore_env = true;
        self
    }

    /// Field name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    #[must_use]
    pub fn decl(&self) -> &TypeDecl {
        &self.decl
    }

    /// Produce the default value, if any (factory takes precedence)
    #[must_use]
    pub fn default_value(&self) -> Option<Value> {
        if let Some(factory) = &self.default_factory {
            return Some(factory());
        }
        self.default.clone()
    }

    /// Whether a default (value or factory) is declared
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.is_some() || self.default_factory.is_some()
    }

    /// Effective nullability: declared explicitly, or default is null
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable || self.default == Some(Value::Null)
    }

    /// Whether typecasting is skipped for this field
    #[must_use]
    pub fn skips_typecast(&self) -> bool {
        self.skip_typecast
    }

    /// Names of fields this field depends on
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    /// Whether the field is calculated
    #[must_use]
    pub fn is_calculated(&self) -> bool {
        self.calculated
    }

    /// Whether environment-backed construction skips this field
    #[must_use]
    pub fn ignores_env(&self) -> bool {
        self.ignore_env
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("decl", &self.decl)
            .field("default", &self.default)
            .field("has_factory", &self.default_factory.is_some())
            .field("nullable", &self.nullable)
            .field("skip_typecast", &self.skip_typecast)
            .field("depends_on", &self.depends_on)
            .field("calculated", &self.calculated)
            .finish()
    }
}

/// An immutable schema declaration
///
/// Built once via [`SchemaBuilder`], shared as `Arc<Schema>`, and resolved
/// lazily into a [`ResolvedSchema`] on first use.
pub struct Schema {
    name: String,
    parent: Option<Arc<Schema>>,
    fields: Vec<FieldDef>,
    meta: Meta,
    type_handlers: Vec<(TypeDecl, Handler)>,
    field_handlers: Vec<(String, Handler)>,
    resolved: OnceLock<crate::Result<Arc<ResolvedSchema>>>,
}

impl Schema {
    /// Start building a schema
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            parent: None,
            fields: Vec::new(),
            meta: Meta::default(),
            type_handlers: Vec::new(),
            field_handlers: Vec::new(),
        }
    }

    /// Schema name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent schema, if this schema extends one
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Schema>> {
        self.parent.as_ref()
    }

    /// Fields declared directly on this schema (inherited fields excluded)
    #[must_use]
    pub fn own_fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Meta options declared directly on this schema
    #[must_use]
    pub fn own_meta(&self) -> &Meta {
        &self.meta
    }

    /// Type handlers declared directly on this schema
    #[must_use]
    pub fn own_type_handlers(&self) -> &[(TypeDecl, Handler)] {
        &self.type_handlers
    }

    /// Field handlers declared directly on this schema
    #[must_use]
    pub fn own_field_handlers(&self) -> &[(String, Handler)] {
        &self.field_handlers
    }

    /// Resolve the schema into its cached artifacts
    ///
    /// The first call computes merged fields, type shapes, the handler
    /// registry, the dependency plan, and the resolved meta. The outcome,
    /// success or failure, is cached: later calls observe the identical
    /// result without re-resolution.
    ///
    /// # Errors
    ///
    /// Returns any schema-definition error of the taxonomy in
    /// [`crate::Error`].
    pub fn resolved(&self) -> crate::Result<Arc<ResolvedSchema>> {
        if let Some(cached) = self.resolved.get() {
            tracing::debug!("Resolution cache hit for schema: {}", self.name);
            return cached.clone();
        }
        self.resolved
            .get_or_init(|| ResolvedSchema::build(self).map(Arc::new))
            .clone()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("fields", &self.fields)
            .field("type_handlers", &self.type_handlers.len())
            .field("field_handlers", &self.field_handlers.len())
            .finish()
    }
}

/// Builder for [`Schema`]
pub struct SchemaBuilder {
    name: String,
    parent: Option<Arc<Schema>>,
    fields: Vec<FieldDef>,
    meta: Meta,
    type_handlers: Vec<(TypeDecl, Handler)>,
    field_handlers: Vec<(String, Handler)>,
}

impl SchemaBuilder {
    /// Extend a parent schema; its fields, handlers, and meta are visible
    /// unless overridden here
    #[must_use]
    pub fn extends(mut self, parent: &Arc<Schema>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declare a field
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Set meta options
    #[must_use]
    pub fn meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Register a type handler keyed by a type declaration
    #[must_use]
    pub fn type_handler(
        mut self,
        decl: TypeDecl,
        handler: impl Fn(&Record, &Value) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        self.type_handlers.push((decl, Arc::new(handler)));
        self
    }

    /// Register a field handler keyed by a field name
    #[must_use]
    pub fn field_handler(
        mut self,
        field: impl Into<String>,
        handler: impl Fn(&Record, &Value) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        self.field_handlers.push((field.into(), Arc::new(handler)));
        self
    }

    /// Finish building; validation happens at first resolution
    #[must_use]
    pub fn build(self) -> Arc<Schema> {
        Arc::new(Schema {
            name: self.name,
            parent: self.parent,
            fields: self.fields,
            meta: self.meta,
            type_handlers: self.type_handlers,
            field_handlers: self.field_handlers,
            resolved: OnceLock::new(),
        })
    }
}
