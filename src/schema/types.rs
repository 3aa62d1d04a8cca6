//! Core declaration types for struct schemas.
//!
//! This module contains the declarative pieces a schema is made of: the
//! attribute type vocabulary, schema-level options, attribute-level options,
//! defaults and whole-record validators.

use crate::error::ModelError;
use crate::record::Record;
use crate::value::Value;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Option keys that can never be changed through option mutation.
pub const PROTECTED_OPTIONS: [&str; 3] = ["name", "namespace", "cache"];

/// Prefix routing attribute options to the element specification of a list.
pub const ITEM_PREFIX: &str = "item_";

/// Declared type of an attribute.
///
/// Textual form (used by declaration documents) is the lowercase tag name,
/// `struct:<Name>` for nested structs, and any other string for a custom
/// registered type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AttributeType {
    /// Generic object; only usable through a nested struct type
    Object,
    /// Text value
    #[default]
    Text,
    /// Boolean value
    Boolean,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    Long,
    /// Floating point number
    Float,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Date and time
    DateTime,
    /// Bounded list of item values
    List,
    /// Nested record of the named struct
    Struct(String),
    /// Type handled by a custom registered pipeline
    Custom(String),
}

impl AttributeType {
    /// Nested struct type reference.
    pub fn struct_of(name: impl Into<String>) -> Self {
        Self::Struct(name.into())
    }

    /// Pipeline registry key for this type; nested structs share the object pipeline.
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Object | Self::Struct(_) => TypeTag::Object,
            Self::Text => TypeTag::Text,
            Self::Boolean => TypeTag::Boolean,
            Self::Integer => TypeTag::Integer,
            Self::Long => TypeTag::Long,
            Self::Float => TypeTag::Float,
            Self::Date => TypeTag::Date,
            Self::Time => TypeTag::Time,
            Self::DateTime => TypeTag::DateTime,
            Self::List => TypeTag::List,
            Self::Custom(tag) => TypeTag::Custom(tag.clone()),
        }
    }

    /// Name of the nested struct, if this is a struct reference.
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            Self::Struct(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct(name) => write!(f, "struct:{}", name),
            other => write!(f, "{}", other.tag()),
        }
    }
}

impl FromStr for AttributeType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix("struct:") {
            if name.is_empty() {
                return Err(ModelError::InvalidStructType {
                    struct_type: s.to_string(),
                });
            }
            return Ok(Self::Struct(name.to_string()));
        }
        Ok(match s {
            "" => return Err(ModelError::unexpected("empty attribute type")),
            "object" => Self::Object,
            "text" => Self::Text,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "long" => Self::Long,
            "float" => Self::Float,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::DateTime,
            "list" => Self::List,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl TryFrom<String> for AttributeType {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AttributeType> for String {
    fn from(value: AttributeType) -> Self {
        value.to_string()
    }
}

/// Key of the coercion pipeline registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Object,
    Text,
    Boolean,
    Integer,
    Long,
    Float,
    Date,
    Time,
    DateTime,
    List,
    Custom(String),
}

impl TypeTag {
    /// Built-in tags, in registration order.
    pub const BUILTIN: [TypeTag; 10] = [
        Self::Object,
        Self::Text,
        Self::Boolean,
        Self::Integer,
        Self::Long,
        Self::Float,
        Self::Date,
        Self::Time,
        Self::DateTime,
        Self::List,
    ];
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Object => "object",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::List => "list",
            Self::Custom(tag) => tag,
        };
        f.write_str(name)
    }
}

/// Schema-level options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOptions {
    /// Accept writes to undeclared attributes, declaring them as text
    pub open: bool,
    /// Allow deleting required attributes
    pub lenient: bool,
    /// Spaces per nesting level; `None` renders on a single line
    pub serialize_indent: Option<usize>,
    /// Written between consecutive items or members
    pub serialize_item_separator: String,
    /// Written between a member key and its value
    pub serialize_pair_separator: String,
    /// Free-form options
    #[serde(flatten)]
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            open: false,
            lenient: false,
            serialize_indent: Some(2),
            serialize_item_separator: ", ".to_string(),
            serialize_pair_separator: ": ".to_string(),
            extras: BTreeMap::new(),
        }
    }
}

impl SchemaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }

    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    pub fn indent(mut self, indent: Option<usize>) -> Self {
        self.serialize_indent = indent;
        self
    }

    pub fn separators(mut self, item: impl Into<String>, pair: impl Into<String>) -> Self {
        self.serialize_item_separator = item.into();
        self.serialize_pair_separator = pair.into();
        self
    }

    /// Set a free-form option; protected keys are ignored.
    pub fn extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        let key = key.into();
        if !PROTECTED_OPTIONS.contains(&key.as_str()) {
            self.extras.insert(key, value);
        }
        self
    }

    /// Reset one option to its default. Returns false for protected or unknown keys.
    pub fn unset(&mut self, key: &str) -> bool {
        let defaults = Self::default();
        match key {
            "open" => self.open = defaults.open,
            "lenient" => self.lenient = defaults.lenient,
            "serialize_indent" => self.serialize_indent = defaults.serialize_indent,
            "serialize_item_separator" => {
                self.serialize_item_separator = defaults.serialize_item_separator
            }
            "serialize_pair_separator" => {
                self.serialize_pair_separator = defaults.serialize_pair_separator
            }
            other => return self.extras.remove(other).is_some(),
        }
        true
    }
}

/// Producer of default values, invoked with the declared `default_args`.
pub type DefaultFactory = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Default applied by validation to attributes that are not set.
#[derive(Clone)]
pub enum DefaultValue {
    /// Fixed value
    Value(Value),
    /// Computed value
    Factory(DefaultFactory),
}

impl DefaultValue {
    /// Produce the default value.
    pub fn produce(&self, args: &[Value]) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Factory(factory) => factory(args),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Attribute-level options.
#[derive(Debug, Clone, Default)]
pub struct AttributeOptions {
    /// Declared type
    pub attr_type: AttributeType,
    /// Attribute must be present and hold a value
    pub required: bool,
    /// Regular expression text values must match from their first character
    pub pattern: Option<String>,
    /// Trim surrounding whitespace from text
    pub strip: bool,
    /// Run the cleanse text filter
    pub cleanse: bool,
    /// Run the normalize text filter
    pub normalize: bool,
    /// Lower list length bound
    pub min_length: Option<usize>,
    /// Upper list length bound
    pub max_length: Option<usize>,
    /// Temporal parse format
    pub format: Option<String>,
    /// Default applied when validating a record lacking the attribute
    pub default: Option<DefaultValue>,
    /// Arguments passed to a default factory
    pub default_args: Vec<Value>,
    /// Options of list elements
    pub item: Option<Box<AttributeOptions>>,
    /// Free-form options, readable by custom pipeline stages
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl AttributeOptions {
    /// Options of the given type with everything else at defaults.
    pub fn of(attr_type: AttributeType) -> Self {
        Self {
            attr_type,
            ..Self::default()
        }
    }

    pub fn text() -> Self {
        Self::of(AttributeType::Text)
    }

    pub fn list() -> Self {
        Self::of(AttributeType::List)
    }

    pub fn nested(struct_name: impl Into<String>) -> Self {
        Self::of(AttributeType::struct_of(struct_name))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn strip(mut self) -> Self {
        self.strip = true;
        self
    }

    pub fn cleanse(mut self) -> Self {
        self.cleanse = true;
        self
    }

    pub fn normalize(mut self) -> Self {
        self.normalize = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    pub fn default_with<F>(mut self, factory: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Factory(Arc::new(factory)));
        self
    }

    pub fn default_args<V, I>(mut self, args: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.default_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Options of list elements.
    pub fn item(mut self, item: AttributeOptions) -> Self {
        self.item = Some(Box::new(item));
        self
    }

    pub fn item_type(mut self, attr_type: AttributeType) -> Self {
        self.item_options().attr_type = attr_type;
        self
    }

    pub fn item_required(mut self) -> Self {
        self.item_options().required = true;
        self
    }

    pub fn item_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.item_options().pattern = Some(pattern.into());
        self
    }

    /// Set a free-form option; protected keys are ignored.
    pub fn extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        let key = key.into();
        if !PROTECTED_OPTIONS.contains(&key.as_str()) {
            self.extras.insert(key, value);
        }
        self
    }

    /// Free-form option by key.
    pub fn extra_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.extras.get(key)
    }

    /// Options of list elements, created on first access.
    pub fn item_options(&mut self) -> &mut AttributeOptions {
        self.item.get_or_insert_with(Box::default)
    }

    /// Reset one option to its default. Returns false for protected or unknown keys.
    ///
    /// `item_<key>` resets `<key>` on the element options.
    pub fn unset(&mut self, key: &str) -> bool {
        if PROTECTED_OPTIONS.contains(&key) {
            return false;
        }
        if let Some(item_key) = key.strip_prefix(ITEM_PREFIX) {
            return match self.item.as_mut() {
                Some(item) => item.unset(item_key),
                None => false,
            };
        }
        match key {
            "type" => self.attr_type = AttributeType::default(),
            "required" => self.required = false,
            "pattern" => self.pattern = None,
            "strip" => self.strip = false,
            "cleanse" => self.cleanse = false,
            "normalize" => self.normalize = false,
            "min_length" => self.min_length = None,
            "max_length" => self.max_length = None,
            "format" => self.format = None,
            "default" => self.default = None,
            "default_args" => self.default_args.clear(),
            other => return self.extras.remove(other).is_some(),
        }
        true
    }

    /// Build options from a flat JSON object, routing `item_*` keys to the
    /// element options.
    pub fn from_json_map(
        mut map: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, serde_json::Error> {
        let item_keys: Vec<String> = map
            .keys()
            .filter(|key| key.starts_with(ITEM_PREFIX))
            .cloned()
            .collect();
        let mut item_map = serde_json::Map::new();
        for key in item_keys {
            if let Some(value) = map.remove(&key) {
                item_map.insert(key[ITEM_PREFIX.len()..].to_string(), value);
            }
        }

        let default = map.remove("default").map(Value::from);
        let default_args = match map.remove("default_args") {
            Some(serde_json::Value::Array(args)) => args.into_iter().map(Value::from).collect(),
            Some(other) => vec![Value::from(other)],
            None => Vec::new(),
        };

        let fields: AttributeFields = serde_json::from_value(serde_json::Value::Object(map))?;
        let item = if item_map.is_empty() {
            None
        } else {
            Some(Box::new(Self::from_json_map(item_map)?))
        };

        Ok(Self {
            attr_type: fields.attr_type,
            required: fields.required,
            pattern: fields.pattern,
            strip: fields.strip,
            cleanse: fields.cleanse,
            normalize: fields.normalize,
            min_length: fields.min_length,
            max_length: fields.max_length,
            format: fields.format,
            default: default.map(DefaultValue::Value),
            default_args,
            item,
            extras: fields
                .extras
                .into_iter()
                .filter(|(key, _)| !PROTECTED_OPTIONS.contains(&key.as_str()))
                .collect(),
        })
    }
}

/// Typed view of the flat attribute keys in a declaration document.
#[derive(Deserialize)]
struct AttributeFields {
    #[serde(rename = "type", default)]
    attr_type: AttributeType,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    strip: bool,
    #[serde(default)]
    cleanse: bool,
    #[serde(default)]
    normalize: bool,
    #[serde(default)]
    min_length: Option<usize>,
    #[serde(default)]
    max_length: Option<usize>,
    #[serde(default)]
    format: Option<String>,
    #[serde(flatten)]
    extras: BTreeMap<String, serde_json::Value>,
}

impl<'de> Deserialize<'de> for AttributeOptions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = serde_json::Map::deserialize(deserializer)?;
        Self::from_json_map(map).map_err(D::Error::custom)
    }
}

/// Options of a whole-record validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatorOptions {
    /// Explanation reported when the validator rejects a record
    pub message: Option<String>,
}

impl ValidatorOptions {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Predicate over a whole record.
pub type ValidatorFn = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// A whole-record validator and its options.
#[derive(Clone)]
pub struct StructValidator {
    pub predicate: ValidatorFn,
    pub options: ValidatorOptions,
}

impl StructValidator {
    pub fn new<F>(predicate: F, options: ValidatorOptions) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            options,
        }
    }

    pub fn check(&self, record: &Record) -> bool {
        (self.predicate)(record)
    }
}

impl fmt::Debug for StructValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructValidator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
