//! Schema combinators and validation options
//!
//! Schemas are plain values built fluently and composed structurally:
//! objects hold keyed child schemas, arrays hold an item schema,
//! alternatives hold branch schemas. A schema may carry its own partial
//! options bag; those keys override whatever defaults the caller passes
//! to `validate()`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::SchemaErrorRef;

/// Partial validation options. Unset keys fall through to the caller's
/// defaults, and ultimately to the library defaults (`abort_early: true`,
/// `allow_unknown: false`, `convert: true`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOptions {
    /// Stop at the first error instead of accumulating all of them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_early: Option<bool>,
    /// Permit properties not declared in the object schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_unknown: Option<bool>,
    /// Coerce compatible payloads (string to number, string to bool)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convert: Option<bool>,
}

impl SchemaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort_early(mut self, value: bool) -> Self {
        self.abort_early = Some(value);
        self
    }

    pub fn allow_unknown(mut self, value: bool) -> Self {
        self.allow_unknown = Some(value);
        self
    }

    pub fn convert(mut self, value: bool) -> Self {
        self.convert = Some(value);
        self
    }

    /// True if no key is set.
    pub fn is_empty(&self) -> bool {
        self.abort_early.is_none() && self.allow_unknown.is_none() && self.convert.is_none()
    }

    /// Shallow per-key merge: keys set on `other` overwrite keys set here.
    pub fn merge_from(&mut self, other: &SchemaOptions) {
        if other.abort_early.is_some() {
            self.abort_early = other.abort_early;
        }
        if other.allow_unknown.is_some() {
            self.allow_unknown = other.allow_unknown;
        }
        if other.convert.is_some() {
            self.convert = other.convert;
        }
    }
}

/// Fully resolved options used during a validation walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EffectiveOptions {
    pub abort_early: bool,
    pub allow_unknown: bool,
    pub convert: bool,
}

impl EffectiveOptions {
    /// Library defaults, matching the underlying contract: strict unknown
    /// handling, stop at first error, coercion enabled.
    pub(crate) const LIBRARY_DEFAULTS: EffectiveOptions = EffectiveOptions {
        abort_early: true,
        allow_unknown: false,
        convert: true,
    };

    /// Applies a partial bag on top of these options, per key.
    pub(crate) fn overridden_by(self, partial: &SchemaOptions) -> EffectiveOptions {
        EffectiveOptions {
            abort_early: partial.abort_early.unwrap_or(self.abort_early),
            allow_unknown: partial.allow_unknown.unwrap_or(self.allow_unknown),
            convert: partial.convert.unwrap_or(self.convert),
        }
    }
}

/// The structural variant of a schema.
#[derive(Debug, Clone)]
pub enum SchemaKind {
    /// Accepts any value
    Any,
    /// UTF-8 string with optional pattern and length bounds
    String {
        pattern: Option<Regex>,
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    /// Number with optional bounds; `integer` rejects fractional values
    Number {
        integer: bool,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Boolean
    Boolean,
    /// Object with keyed child schemas, in declaration order
    Object { keys: Vec<(String, Schema)> },
    /// Homogeneous array with an optional item schema and size bounds
    Array {
        items: Option<Box<Schema>>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    /// Matches if any branch matches
    Alternatives { branches: Vec<Schema> },
}

/// A composable validation schema.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) kind: SchemaKind,
    pub(crate) required: bool,
    /// Allowed-values restriction; empty means unrestricted
    pub(crate) allowed: Vec<Value>,
    /// Schema-level option overrides, applied over caller defaults
    pub(crate) options: SchemaOptions,
    /// Custom error surfaced verbatim when this schema fails
    pub(crate) custom_error: Option<SchemaErrorRef>,
}

impl Schema {
    fn with_kind(kind: SchemaKind) -> Self {
        Self {
            kind,
            required: false,
            allowed: Vec::new(),
            options: SchemaOptions::default(),
            custom_error: None,
        }
    }

    /// A schema accepting any value.
    pub fn any() -> Self {
        Self::with_kind(SchemaKind::Any)
    }

    /// A string schema.
    pub fn string() -> Self {
        Self::with_kind(SchemaKind::String {
            pattern: None,
            min_length: None,
            max_length: None,
        })
    }

    /// A number schema accepting integers and floats.
    pub fn number() -> Self {
        Self::with_kind(SchemaKind::Number {
            integer: false,
            min: None,
            max: None,
        })
    }

    /// A number schema rejecting fractional values.
    pub fn integer() -> Self {
        Self::with_kind(SchemaKind::Number {
            integer: true,
            min: None,
            max: None,
        })
    }

    /// A boolean schema.
    pub fn boolean() -> Self {
        Self::with_kind(SchemaKind::Boolean)
    }

    /// An object schema with no declared keys. A strict empty object
    /// schema rejects all properties unless `allow_unknown` is set.
    pub fn object() -> Self {
        Self::with_kind(SchemaKind::Object { keys: Vec::new() })
    }

    /// An array schema with no item constraint.
    pub fn array() -> Self {
        Self::with_kind(SchemaKind::Array {
            items: None,
            min_items: None,
            max_items: None,
        })
    }

    /// A schema matching if any of the given branches matches.
    pub fn alternatives(branches: impl IntoIterator<Item = Schema>) -> Self {
        Self::with_kind(SchemaKind::Alternatives {
            branches: branches.into_iter().collect(),
        })
    }

    /// Marks the schema as required: a missing or null value fails.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the schema as optional (the default).
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Restricts the schema to the given values.
    pub fn valid<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.allowed.extend(values.into_iter().map(Into::into));
        self
    }

    /// String pattern constraint. Panics if the schema is not a string;
    /// that is a declaration-time misuse, never a request-time condition.
    pub fn pattern(mut self, regex: Regex) -> Self {
        match &mut self.kind {
            SchemaKind::String { pattern, .. } => *pattern = Some(regex),
            _ => panic!("pattern() requires a string schema"),
        }
        self
    }

    /// Minimum string length.
    pub fn min_length(mut self, len: usize) -> Self {
        match &mut self.kind {
            SchemaKind::String { min_length, .. } => *min_length = Some(len),
            _ => panic!("min_length() requires a string schema"),
        }
        self
    }

    /// Maximum string length.
    pub fn max_length(mut self, len: usize) -> Self {
        match &mut self.kind {
            SchemaKind::String { max_length, .. } => *max_length = Some(len),
            _ => panic!("max_length() requires a string schema"),
        }
        self
    }

    /// Minimum numeric value.
    pub fn min(mut self, value: f64) -> Self {
        match &mut self.kind {
            SchemaKind::Number { min, .. } => *min = Some(value),
            _ => panic!("min() requires a number schema"),
        }
        self
    }

    /// Maximum numeric value.
    pub fn max(mut self, value: f64) -> Self {
        match &mut self.kind {
            SchemaKind::Number { max, .. } => *max = Some(value),
            _ => panic!("max() requires a number schema"),
        }
        self
    }

    /// Declares the keyed child schemas of an object schema. Declaration
    /// order is preserved; redeclaring a key replaces its schema in place.
    pub fn keys<K, I>(mut self, entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        match &mut self.kind {
            SchemaKind::Object { keys } => {
                for (name, schema) in entries {
                    let name = name.into();
                    if let Some(pos) = keys.iter().position(|(k, _)| k == &name) {
                        keys[pos].1 = schema;
                    } else {
                        keys.push((name, schema));
                    }
                }
            }
            _ => panic!("keys() requires an object schema"),
        }
        self
    }

    /// Declares the item schema of an array schema.
    pub fn items(mut self, schema: Schema) -> Self {
        match &mut self.kind {
            SchemaKind::Array { items, .. } => *items = Some(Box::new(schema)),
            _ => panic!("items() requires an array schema"),
        }
        self
    }

    /// Minimum number of array items.
    pub fn min_items(mut self, count: usize) -> Self {
        match &mut self.kind {
            SchemaKind::Array { min_items, .. } => *min_items = Some(count),
            _ => panic!("min_items() requires an array schema"),
        }
        self
    }

    /// Maximum number of array items.
    pub fn max_items(mut self, count: usize) -> Self {
        match &mut self.kind {
            SchemaKind::Array { max_items, .. } => *max_items = Some(count),
            _ => panic!("max_items() requires an array schema"),
        }
        self
    }

    /// Applies schema-level option overrides. Set keys always win over
    /// whatever defaults the caller passes to `validate()`. Repeated calls
    /// merge per key.
    pub fn options(mut self, options: SchemaOptions) -> Self {
        self.options.merge_from(&options);
        self
    }

    /// Configures a custom error to surface verbatim when this schema (or
    /// anything beneath it) fails.
    pub fn error(mut self, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.custom_error = Some(std::sync::Arc::new(err));
        self
    }

    /// Whether the schema is marked required.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The structural variant.
    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    /// The schema-level option overrides.
    pub fn schema_options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Number of declared keys, for object schemas; 0 otherwise.
    pub fn declared_keys(&self) -> usize {
        match &self.kind {
            SchemaKind::Object { keys } => keys.len(),
            _ => 0,
        }
    }
}
