//! Dynamic values flowing through struct models.
//!
//! [`Value`] is the closed set of shapes an attribute can hold. Raw input
//! shapes ([`Value::Array`], [`Value::Map`]) are what callers usually hand in;
//! coercion turns them into the schema-aware shapes ([`Value::List`],
//! [`Value::Record`]) that enforce their declarations on every later mutation.

use crate::record::{BoundedList, Record};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical ISO-8601 layout for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Canonical ISO-8601 layout for times; fractions only appear when non-zero.
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";
/// Canonical ISO-8601 layout for date-times; fractions only appear when non-zero.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A dynamically typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    Integer(i32),
    /// 64-bit integer
    Long(i64),
    /// Floating point number
    Float(f64),
    /// Text value
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Date and time without offset
    DateTime(NaiveDateTime),
    /// Raw sequence, not yet bound to a list declaration
    Array(Vec<Value>),
    /// Raw key/value mapping, not yet bound to a struct
    Map(BTreeMap<String, Value>),
    /// Sequence bound to a list declaration
    List(BoundedList),
    /// Nested record bound to a struct
    Record(Record),
}

impl Value {
    /// Build a raw map from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a raw array from values.
    pub fn array<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for values that count as numbers during coercion (booleans included).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Bool(_) | Self::Integer(_) | Self::Long(_) | Self::Float(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(i64::from(*n)),
            Self::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Integer(n) => Some(f64::from(*n)),
            Self::Long(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&BoundedList> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Proleptic Gregorian ordinal (0001-01-01 is day 1) of date-like values.
    pub fn ordinal(&self) -> Option<i32> {
        match self {
            Self::Date(d) => Some(d.num_days_from_ce()),
            Self::DateTime(dt) => Some(dt.date().num_days_from_ce()),
            _ => None,
        }
    }

    /// Truthiness: null, false, zero and empty containers or text are false.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::Long(n) => *n != 0,
            Self::Float(n) => *n != 0.0,
            Self::Text(s) => !s.is_empty(),
            Self::Array(items) => !items.is_empty(),
            Self::Map(entries) => !entries.is_empty(),
            Self::List(list) => !list.is_empty(),
            Self::Record(record) => !record.is_empty(),
            Self::Date(_) | Self::Time(_) | Self::DateTime(_) => true,
        }
    }

    /// Null, or a text/container with nothing in it.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            Self::Array(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            Self::List(list) => list.is_empty(),
            Self::Record(record) => record.is_empty(),
            _ => false,
        }
    }

    /// Get the type name of a value for error messages.
    pub fn type_name(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(_) => "boolean".to_string(),
            Self::Integer(_) => "integer".to_string(),
            Self::Long(_) => "long".to_string(),
            Self::Float(_) => "float".to_string(),
            Self::Text(_) => "text".to_string(),
            Self::Date(_) => "date".to_string(),
            Self::Time(_) => "time".to_string(),
            Self::DateTime(_) => "datetime".to_string(),
            Self::Array(_) => "array".to_string(),
            Self::Map(_) => "map".to_string(),
            Self::List(_) => "list".to_string(),
            Self::Record(record) => format!("struct:{}", record.struct_name()),
        }
    }

    /// Key/value view of map-like values: raw maps and records.
    pub fn entries(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(entries) => Some(entries),
            Self::Record(record) => Some(record.entries()),
            _ => None,
        }
    }

    /// Structural equality.
    ///
    /// Maps and records compare by their fields regardless of which of the
    /// two shapes each side has (the struct binding is not compared; records
    /// contribute only visible attributes), lists and arrays compare
    /// element-wise, everything else uses `==`.
    pub fn structurally_eq(&self, other: &Value) -> bool {
        if let (Some(lhs), Some(rhs)) = (self.fields(), other.fields()) {
            return fields_eq(&lhs, &rhs);
        }
        if let (Some(lhs), Some(rhs)) = (self.items(), other.items()) {
            return lhs.len() == rhs.len()
                && lhs.iter().zip(rhs).all(|(l, r)| l.structurally_eq(r));
        }
        self == other
    }

    /// Fields compared structurally: every entry of a map, the visible
    /// attributes of a record.
    pub(crate) fn fields(&self) -> Option<Vec<(&String, &Value)>> {
        match self {
            Self::Map(entries) => Some(entries.iter().collect()),
            Self::Record(record) => Some(record.visible().collect()),
            _ => None,
        }
    }

    fn items(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            Self::List(list) => Some(list.as_slice()),
            _ => None,
        }
    }

    /// Convert to a plain JSON value; records keep only their visible attributes.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Integer(n) => Json::from(*n),
            Self::Long(n) => Json::from(*n),
            Self::Float(n) => Json::from(*n),
            Self::Text(s) => Json::String(s.clone()),
            Self::Date(_) | Self::Time(_) | Self::DateTime(_) => Json::String(self.to_string()),
            Self::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::List(list) => Json::Array(list.iter().map(Value::to_json).collect()),
            Self::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Record(record) => Json::Object(
                record
                    .visible()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

pub(crate) fn fields_eq(lhs: &[(&String, &Value)], rhs: &[(&String, &Value)]) -> bool {
    lhs.len() == rhs.len()
        && lhs
            .iter()
            .zip(rhs)
            .all(|((lk, lv), (rk, rv))| lk == rk && lv.structurally_eq(rv))
}

/// Text form of a value, used for coercion to text and for number parsing.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Long(n) => write!(f, "{}", n),
            Self::Float(n) => {
                let text = n.to_string();
                if n.is_finite() && !text.contains(&['.', 'e', 'E'][..]) {
                    write!(f, "{}.0", text)
                } else {
                    write!(f, "{}", text)
                }
            }
            Self::Text(s) => write!(f, "{}", s),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            _ => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Self::Time(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl From<BoundedList> for Value {
    fn from(value: BoundedList) -> Self {
        Self::List(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::array(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => i32::try_from(i).map_or(Self::Long(i), Self::Integer),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Self::Text(s),
            Json::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Json::Object(entries) => {
                Self::Map(entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}
