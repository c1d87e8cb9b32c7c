//! Meta configuration with layered inheritance resolution
//!
//! Each schema declares only the options it sets; unset options fall
//! through the parent chain and terminate in documented defaults. This is
//! an explicit merge over an ordered list of configuration sources, not an
//! attribute-lookup emulation.

use crate::model::HandlerError;
use std::fmt;
use std::sync::Arc;
use valcast_value::Value;

/// Pluggable serialization codec for instance round-trips
///
/// The default engine codec is JSON-backed; schemas may substitute their
/// own via [`Meta::codec`].
pub trait Codec: Send + Sync {
    /// Encode a structural value to text.
    ///
    /// # Errors
    ///
    /// Returns an error when the value has no representation in the codec's
    /// format.
    fn encode(&self, value: &Value) -> Result<String, HandlerError>;

    /// Decode text into a structural value.
    ///
    /// # Errors
    ///
    /// Returns an error when the text is not valid for the codec's format.
    fn decode(&self, text: &str) -> Result<Value, HandlerError>;
}

/// Meta options declared on a single schema
///
/// `None` means "unset, inherit".
#[derive(Clone, Default)]
pub struct Meta {
    eq: Option<bool>,
    order: Option<bool>,
    frozen: Option<bool>,
    singleton: Option<bool>,
    hide_in_record: Option<bool>,
    codec: Option<Arc<dyn Codec>>,
}

impl Meta {
    /// Create an all-unset meta declaration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether instances compare equal by field values
    #[must_use]
    pub fn eq(mut self, value: bool) -> Self {
        self.eq = Some(value);
        self
    }

    /// Whether instances support field-wise ordering
    #[must_use]
    pub fn order(mut self, value: bool) -> Self {
        self.order = Some(value);
        self
    }

    /// Whether instances reject mutation after construction
    #[must_use]
    pub fn frozen(mut self, value: bool) -> Self {
        self.frozen = Some(value);
        self
    }

    /// Whether the schema is singleton-scoped
    #[must_use]
    pub fn singleton(mut self, value: bool) -> Self {
        self.singleton = Some(value);
        self
    }

    /// Whether nested instances of this schema are skipped during an
    /// enclosing instance's record/JSON conversion
    #[must_use]
    pub fn hide_in_record(mut self, value: bool) -> Self {
        self.hide_in_record = Some(value);
        self
    }

    /// Substitute the serialization codec
    #[must_use]
    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Resolve a chain of meta sources, most-derived first
    ///
    /// The first source that sets an option wins; options no source sets
    /// take the documented defaults.
    #[must_use]
    pub fn resolve_chain<'a, I>(sources: I) -> ResolvedMeta
    where
        I: IntoIterator<Item = &'a Meta>,
    {
        let mut resolved = ResolvedMeta::default();
        let mut eq = None;
        let mut order = None;
        let mut frozen = None;
        let mut singleton = None;
        let mut hide_in_record = None;
        let mut codec = None;

        for source in sources {
            eq = eq.or(source.eq);
            order = order.or(source.order);
            frozen = frozen.or(source.frozen);
            singleton = singleton.or(source.singleton);
            hide_in_record = hide_in_record.or(source.hide_in_record);
            codec = codec.or_else(|| source.codec.clone());
        }

        resolved.eq = eq.unwrap_or(true);
        resolved.order = order.unwrap_or(false);
        resolved.frozen = frozen.unwrap_or(false);
        resolved.singleton = singleton.unwrap_or(false);
        resolved.hide_in_record = hide_in_record.unwrap_or(false);
        resolved.codec = codec;
        resolved
    }
}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meta")
            .field("eq", &self.eq)
            .field("order", &self.order)
            .field("frozen", &self.frozen)
            .field("singleton", &self.singleton)
            .field("hide_in_record", &self.hide_in_record)
            .field("has_codec", &self.codec.is_some())
            .finish()
    }
}

/// Fully resolved meta configuration
///
/// Defaults: `eq` true, everything else false, no codec override.
#[derive(Clone, Default)]
pub struct ResolvedMeta {
    /// Instances compare equal by field values
    pub eq: bool,

    /// Instances support field-wise ordering
    pub order: bool,

    /// Instances reject mutation after construction
    pub frozen: bool,

    /// Only one instance of the schema is ever created
    pub singleton: bool,

    /// Nested instances are skipped during record conversion
    pub hide_in_record: bool,

    /// Codec override, `None` means the engine default
    pub codec: Option<Arc<dyn Codec>>,
}

impl fmt::Debug for ResolvedMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedMeta")
            .field("eq", &self.eq)
            .field("order", &self.order)
            .field("frozen", &self.frozen)
            .field("singleton", &self.singleton)
            .field("hide_in_record", &self.hide_in_record)
            .field("has_codec", &self.codec.is_some())
            .finish()
    }
}
