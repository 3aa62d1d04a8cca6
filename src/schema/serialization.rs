//! JSON rendering of records.
//!
//! Records render as objects of their visible attributes, raw maps render all
//! of their keys, lists and arrays recurse, and temporal values render in their
//! canonical ISO-8601 form. Layout follows the schema options of the record
//! being serialized: `serialize_indent` spaces per nesting level (or a single
//! line when unset), `serialize_item_separator` between items and
//! `serialize_pair_separator` between a key and its value. When indenting,
//! trailing whitespace of the item separator is dropped before the line break.

use super::definition::Schema;
use super::types::SchemaOptions;
use crate::error::{ModelError, ModelResult};
use crate::record::Record;
use crate::value::Value;
use serde::{Serialize, Serializer};
use serde_json::ser::Formatter;
use std::io;

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i32(*n),
            Value::Long(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) => serializer.collect_str(self),
            Value::Array(items) => serializer.collect_seq(items),
            Value::List(list) => serializer.collect_seq(list),
            Value::Map(entries) => serializer.collect_map(entries),
            Value::Record(record) => Serialize::serialize(record, serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.visible())
    }
}

/// [`Formatter`] applying the layout options of a schema.
///
/// The item separator is written as configured on single-line output. With
/// an indent set, its trailing whitespace is trimmed so lines never end in
/// spaces: the default `", "` becomes `","` before each line break, and a
/// separator made only of whitespace disappears.
#[derive(Debug, Clone)]
pub struct RecordFormatter<'a> {
    current_indent: usize,
    has_value: bool,
    indent: Option<usize>,
    item_separator: &'a str,
    pair_separator: &'a str,
}

impl<'a> RecordFormatter<'a> {
    pub fn new(options: &'a SchemaOptions) -> Self {
        Self {
            current_indent: 0,
            has_value: false,
            indent: options.serialize_indent,
            item_separator: &options.serialize_item_separator,
            pair_separator: &options.serialize_pair_separator,
        }
    }

    fn item_separator(&self) -> &'a str {
        match self.indent {
            Some(_) => self.item_separator.trim_end(),
            None => self.item_separator,
        }
    }

    fn newline<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if let Some(width) = self.indent {
            writer.write_all(b"\n")?;
            for _ in 0..self.current_indent * width {
                writer.write_all(b" ")?;
            }
        }
        Ok(())
    }

    fn begin<W>(&mut self, writer: &mut W, token: &[u8]) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.current_indent += 1;
        self.has_value = false;
        writer.write_all(token)
    }

    fn end<W>(&mut self, writer: &mut W, token: &[u8]) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.current_indent -= 1;
        if self.has_value {
            self.newline(writer)?;
        }
        writer.write_all(token)
    }

    fn begin_item<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if !first {
            writer.write_all(self.item_separator().as_bytes())?;
        }
        self.newline(writer)
    }
}

impl Formatter for RecordFormatter<'_> {
    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.begin(writer, b"[")
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.end(writer, b"]")
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.begin_item(writer, first)
    }

    fn end_array_value<W>(&mut self, _writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.begin(writer, b"{")
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.end(writer, b"}")
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.begin_item(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(self.pair_separator.as_bytes())
    }

    fn end_object_value<W>(&mut self, _writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.has_value = true;
        Ok(())
    }
}

impl Schema {
    /// Serialize a record of this schema.
    pub fn serialize(&self, record: &Record) -> ModelResult<String> {
        if record.struct_name() != self.name() {
            return Err(ModelError::InvalidStructType {
                struct_type: record.struct_name().to_string(),
            });
        }
        self.render(record)
    }

    /// Serialize a value that must be a record of this schema.
    pub fn serialize_value(&self, value: &Value) -> ModelResult<String> {
        match value {
            Value::Record(record) => self.serialize(record),
            other => Err(ModelError::InvalidStructType {
                struct_type: other.type_name(),
            }),
        }
    }

    /// Render any serializable value with this schema's layout.
    pub fn render<T>(&self, value: &T) -> ModelResult<String>
    where
        T: ?Sized + Serialize,
    {
        let mut output = Vec::with_capacity(128);
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut output, RecordFormatter::new(self.options()));
        value.serialize(&mut serializer)?;
        String::from_utf8(output)
            .map_err(|e| ModelError::unexpected(format!("serialized output is not UTF-8: {}", e)))
    }
}
