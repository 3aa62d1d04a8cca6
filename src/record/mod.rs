//! Schema-bound records.
//!
//! A [`Record`] is a keyed value container bound to one declared struct. Every
//! write goes through the struct's schema: undeclared names are rejected (or
//! auto-declared on open structs) and values are coerced by the attribute's
//! pipeline before they are stored. Keys starting with `_` are hidden; they
//! bypass the schema and never appear in serialized output.
//!
//! # Examples
//!
//! ```rust
//! use structmodel::{AttributeOptions, AttributeType, Model, SchemaOptions, Value};
//!
//! # fn main() -> Result<(), structmodel::ModelError> {
//! let model = Model::new();
//! model
//!     .declare("Book", SchemaOptions::new())?
//!     .define("title", AttributeOptions::text().required())?
//!     .define("pages", AttributeOptions::of(AttributeType::Integer))?;
//!
//! let mut book = model.record("Book")?;
//! book.set("title", "Dune")?;
//! book.set("pages", "412")?;
//! assert_eq!(book.get("pages"), Some(&Value::Integer(412)));
//!
//! book.validate()?;
//! # Ok(())
//! # }
//! ```

mod list;


pub use list::BoundedList;

use crate::error::{ModelError, ModelResult};
use crate::schema::{Model, Schema, is_hidden};
use crate::value::{Value, fields_eq};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::sync::Arc;

/// Keyed value container bound to a declared struct.
#[derive(Clone)]
pub struct Record {
    model: Arc<Model>,
    struct_name: String,
    entries: BTreeMap<String, Value>,
}

impl Record {
    /// Empty record of a declared struct.
    pub fn new(model: &Arc<Model>, struct_name: &str) -> ModelResult<Self> {
        model.bound_schema(struct_name)?;
        Ok(Self {
            model: Arc::clone(model),
            struct_name: struct_name.to_string(),
            entries: BTreeMap::new(),
        })
    }

    /// Record built from a raw map or from another record's visible attributes.
    pub fn from_value(model: &Arc<Model>, struct_name: &str, value: Value) -> ModelResult<Self> {
        let entries: Vec<(String, Value)> = match value {
            Value::Map(entries) => entries.into_iter().collect(),
            Value::Record(record) => record
                .entries
                .into_iter()
                .filter(|(key, _)| !is_hidden(key))
                .collect(),
            other => {
                return Err(ModelError::InvalidStructType {
                    struct_type: other.type_name(),
                });
            }
        };
        let mut record = Self::new(model, struct_name)?;
        record.assign(entries)?;
        Ok(record)
    }

    pub fn struct_name(&self) -> &str {
        &self.struct_name
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Current schema of the bound struct.
    pub fn schema(&self) -> ModelResult<Arc<Schema>> {
        self.model.bound_schema(&self.struct_name)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Coerce and store a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> ModelResult<()> {
        let key = key.into();
        let value = self.schema()?.process_set(&self.model, &key, value.into())?;
        self.entries.insert(key, value);
        Ok(())
    }

    /// Builder-style [`Record::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> ModelResult<Self> {
        self.set(key, value)?;
        Ok(self)
    }

    /// Set every entry in turn, stopping at the first failure.
    pub fn assign<I, K, V>(&mut self, entries: I) -> ModelResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(self)
    }

    /// Remove an attribute, returning its value if it was set.
    pub fn delete(&mut self, key: &str) -> ModelResult<Option<Value>> {
        self.schema()?.process_delete(key)?;
        Ok(self.entries.remove(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Entries with hidden keys left out.
    pub fn visible(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter().filter(|(key, _)| !is_hidden(key))
    }

    /// All entries, hidden keys included.
    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mutable access to a stored list, for in-place list operations.
    pub fn list_mut(&mut self, key: &str) -> Option<&mut BoundedList> {
        match self.entries.get_mut(key) {
            Some(Value::List(list)) => Some(list),
            _ => None,
        }
    }

    /// Mutable access to a nested record.
    pub fn record_mut(&mut self, key: &str) -> Option<&mut Record> {
        match self.entries.get_mut(key) {
            Some(Value::Record(record)) => Some(record),
            _ => None,
        }
    }

    pub(crate) fn entry_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Store an already coerced value.
    pub(crate) fn put(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    /// Apply defaults and check every declared constraint.
    pub fn validate(&mut self) -> ModelResult<&mut Self> {
        self.schema()?.validate(self)?;
        Ok(self)
    }

    /// Render the visible attributes as JSON text formatted per the schema options.
    pub fn serialize(&self) -> ModelResult<String> {
        self.schema()?.serialize(self)
    }

    /// Structural comparison of the visible attributes against a raw map, a
    /// record or anything else.
    pub fn structurally_eq(&self, other: &Value) -> bool {
        let lhs: Vec<_> = self.visible().collect();
        other.fields().is_some_and(|rhs| fields_eq(&lhs, &rhs))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.visible()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.struct_name == other.struct_name && self.entries == other.entries
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("struct_name", &self.struct_name)
            .field("entries", &self.entries)
            .finish()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
