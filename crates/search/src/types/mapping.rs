//! Field mapping schema types.
//!
//! A [`TypeMapping`] is the tree of field names to type descriptors sent with
//! index creation and returned by the mapping endpoints. Fields of type
//! [`FieldType::Nested`] carry their own `properties` and open an isolated
//! matching scope for everything beneath them.
//!
//! Mappings are built by value:
//!
//! ```
//! use helios_search::types::{Property, TypeMapping};
//!
//! let mapping = TypeMapping::new()
//!     .with_property("id", Property::long())
//!     .with_property("group", Property::text().with_fielddata(true))
//!     .with_property(
//!         "user",
//!         Property::nested(
//!             TypeMapping::new()
//!                 .with_property("first", Property::keyword())
//!                 .with_property("last", Property::keyword()),
//!         ),
//!     );
//!
//! assert!(mapping.property("user").unwrap().is_nested());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The root mapping of an index (or the body of a nested/object field).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeMapping {
    /// Field name to field descriptor.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,
}

impl TypeMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field.
    pub fn with_property(mut self, name: impl Into<String>, property: Property) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Returns a top-level field.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Resolves a dotted path (`a.b.value`) through object and nested fields.
    pub fn resolve(&self, path: &str) -> Option<&Property> {
        let mut segments = path.split('.');
        let mut current = self.properties.get(segments.next()?)?;
        for segment in segments {
            current = current.properties.get(segment)?;
        }
        Some(current)
    }

    /// Returns true if the mapping declares no fields.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Type of a mapped field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Signed 64-bit integer.
    Long,
    /// Signed 32-bit integer.
    Integer,
    /// Signed 16-bit integer.
    Short,
    /// Signed 8-bit integer.
    Byte,
    /// 64-bit floating point.
    Double,
    /// 32-bit floating point.
    Float,
    /// Analyzed full text with positional data.
    Text,
    /// Exact-match, unanalyzed string.
    Keyword,
    /// Date or date-time.
    Date,
    /// `true` or `false`.
    Boolean,
    /// Array of objects matched independently of each other.
    Nested,
    /// Plain (flattened) object.
    Object,
    /// Any type this crate has no dedicated variant for.
    #[serde(untagged)]
    Other(String),
}

fn object_type() -> FieldType {
    FieldType::Object
}

/// Descriptor of one mapped field.
///
/// Options this crate does not model (`ignore_above`, `format`, ...) are kept
/// in `extra` so a mapping read from the engine can be sent back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// The field type. Object fields may omit it on the wire.
    #[serde(rename = "type", default = "object_type")]
    pub field_type: FieldType,

    /// Whether the field is searchable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<bool>,

    /// Whether a text field keeps fielddata for sorting and aggregations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fielddata: Option<bool>,

    /// Analyzer of a text field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,

    /// Child fields of an object or nested field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,

    /// Multi-fields (e.g. the `keyword` sub-field of dynamic text fields).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Property>,

    /// Options without a dedicated field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Property {
    /// Creates a field of the given type with no options.
    pub fn of(field_type: FieldType) -> Self {
        Self {
            field_type,
            index: None,
            fielddata: None,
            analyzer: None,
            properties: BTreeMap::new(),
            fields: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// A `long` field.
    pub fn long() -> Self {
        Self::of(FieldType::Long)
    }

    /// An `integer` field.
    pub fn integer() -> Self {
        Self::of(FieldType::Integer)
    }

    /// A `double` field.
    pub fn double() -> Self {
        Self::of(FieldType::Double)
    }

    /// A `text` field.
    pub fn text() -> Self {
        Self::of(FieldType::Text)
    }

    /// A `keyword` field.
    pub fn keyword() -> Self {
        Self::of(FieldType::Keyword)
    }

    /// A `date` field.
    pub fn date() -> Self {
        Self::of(FieldType::Date)
    }

    /// A `boolean` field.
    pub fn boolean() -> Self {
        Self::of(FieldType::Boolean)
    }

    /// Creates a nested field whose children form an isolated scope.
    pub fn nested(children: TypeMapping) -> Self {
        Self {
            properties: children.properties,
            ..Self::of(FieldType::Nested)
        }
    }

    /// Creates a plain object field.
    pub fn object(children: TypeMapping) -> Self {
        Self {
            properties: children.properties,
            ..Self::of(FieldType::Object)
        }
    }

    /// Sets whether the field is indexed.
    pub fn indexed(mut self, index: bool) -> Self {
        self.index = Some(index);
        self
    }

    /// Enables in-memory fielddata (needed to sort or aggregate on text).
    pub fn with_fielddata(mut self, fielddata: bool) -> Self {
        self.fielddata = Some(fielddata);
        self
    }

    /// Sets the analyzer of a text field.
    pub fn with_analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    /// Adds a multi-field.
    pub fn with_field(mut self, name: impl Into<String>, property: Property) -> Self {
        self.fields.insert(name.into(), property);
        self
    }

    /// Sets an option this crate has no dedicated setter for.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Returns true for nested fields.
    pub fn is_nested(&self) -> bool {
        self.field_type == FieldType::Nested
    }
}
