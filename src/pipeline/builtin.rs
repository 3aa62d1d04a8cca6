//! Built-in type pipelines.
//!
//! | Tag | Stages |
//! |---|---|
//! | object | nested record conversion, required |
//! | text | text form, required, pattern, strip, cleanse, normalize |
//! | boolean | boolean conversion |
//! | integer, long, float | numeric conversion, required |
//! | date, time, datetime | temporal conversion, required |
//! | list | bounded list conversion, required |
//!
//! Optional stages are only compiled into an attribute's pipeline when the
//! corresponding option is set.

use super::{Stage, StageFactory, always, stage, when};
use crate::error::{ModelError, ModelResult, TypeError, ValidationError};
use crate::record::{BoundedList, Record};
use crate::schema::types::TypeTag;
use crate::schema::{AttributeSpec, Model};
use crate::value::Value;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::Arc;

/// Parse format of dates when none is configured.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
/// Parse format of times when none is configured.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";
/// Parse format of date-times when none is configured.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Factories of a built-in tag, in stage order. Custom tags have none.
pub(crate) fn factories(tag: &TypeTag) -> Vec<StageFactory> {
    match tag {
        TypeTag::Object => vec![always(stage(object_value)), if_required(stage(required))],
        TypeTag::Text => vec![
            always(stage(text_value)),
            if_required(stage(required)),
            compiled(pattern_stage),
            when(|spec| spec.options().strip, stage(strip)),
            when(|spec| spec.options().cleanse, stage(cleanse)),
            when(|spec| spec.options().normalize, stage(normalize)),
        ],
        TypeTag::Boolean => vec![always(stage(boolean_value))],
        TypeTag::Integer => numeric(Numeric::Integer),
        TypeTag::Long => numeric(Numeric::Long),
        TypeTag::Float => numeric(Numeric::Float),
        TypeTag::Date => temporal(Temporal::Date),
        TypeTag::Time => temporal(Temporal::Time),
        TypeTag::DateTime => temporal(Temporal::DateTime),
        TypeTag::List => vec![always(stage(list_value)), if_required(stage(required))],
        TypeTag::Custom(_) => Vec::new(),
    }
}

fn if_required(check: Stage) -> StageFactory {
    when(|spec| spec.required(), check)
}

fn compiled<F>(factory: F) -> StageFactory
where
    F: Fn(&AttributeSpec) -> ModelResult<Option<Stage>> + Send + Sync + 'static,
{
    Arc::new(factory)
}

/// Generic required check: null and empty values fail.
fn required(value: Value, spec: &Arc<AttributeSpec>, _: &Arc<Model>) -> ModelResult<Value> {
    if value.is_empty() {
        return Err(ModelError::missing_value(spec.namespace(), spec.name()));
    }
    Ok(value)
}

fn object_value(value: Value, spec: &Arc<AttributeSpec>, model: &Arc<Model>) -> ModelResult<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let Some(struct_name) = spec.attr_type().struct_name() else {
        return Err(TypeError::UnrecognizedType {
            attribute: spec.qualified_name(),
            type_name: spec.attr_type().to_string(),
        }
        .into());
    };

    match value {
        Value::Record(record) if record.struct_name() == struct_name => Ok(Value::Record(record)),
        value @ (Value::Map(_) | Value::Record(_)) => {
            Record::from_value(model, struct_name, value).map(Value::Record)
        }
        other => Err(TypeError::IncompatibleType {
            attribute: spec.qualified_name(),
            expected_type: spec.attr_type().to_string(),
            found_type: other.type_name(),
        }
        .into()),
    }
}

fn text_value(value: Value, _: &Arc<AttributeSpec>, _: &Arc<Model>) -> ModelResult<Value> {
    Ok(match value {
        Value::Null | Value::Text(_) => value,
        other => Value::Text(other.to_string()),
    })
}

fn pattern_stage(spec: &AttributeSpec) -> ModelResult<Option<Stage>> {
    let Some(pattern) = spec.options().pattern.clone() else {
        return Ok(None);
    };
    let regex = Regex::new(&pattern).map_err(|e| {
        ModelError::unexpected(format!(
            "invalid pattern for '{}': {}",
            spec.qualified_name(),
            e
        ))
    })?;

    Ok(Some(stage(move |value, spec, _| match value {
        Value::Text(text) => {
            if regex.find(&text).is_some_and(|found| found.start() == 0) {
                Ok(Value::Text(text))
            } else {
                Err(ValidationError::PatternMismatch {
                    attribute: spec.qualified_name(),
                    pattern: pattern.clone(),
                    value: text,
                }
                .into())
            }
        }
        other => Ok(other),
    })))
}

fn strip(value: Value, _: &Arc<AttributeSpec>, _: &Arc<Model>) -> ModelResult<Value> {
    Ok(match value {
        Value::Text(text) => Value::Text(text.trim().to_string()),
        other => other,
    })
}

fn cleanse(value: Value, _: &Arc<AttributeSpec>, model: &Arc<Model>) -> ModelResult<Value> {
    Ok(match value {
        Value::Text(text) => Value::Text((model.text_filters().cleanse)(&text)),
        other => other,
    })
}

fn normalize(value: Value, _: &Arc<AttributeSpec>, model: &Arc<Model>) -> ModelResult<Value> {
    Ok(match value {
        Value::Text(text) => Value::Text((model.text_filters().normalize)(&text)),
        other => other,
    })
}

fn boolean_value(value: Value, _: &Arc<AttributeSpec>, _: &Arc<Model>) -> ModelResult<Value> {
    Ok(Value::Bool(match &value {
        Value::Bool(b) => *b,
        Value::Text(text) if text.eq_ignore_ascii_case("true") => true,
        Value::Text(text) if text.eq_ignore_ascii_case("false") => false,
        other => other.truthy(),
    }))
}

#[derive(Debug, Clone, Copy)]
enum Numeric {
    Integer,
    Long,
    Float,
}

impl Numeric {
    fn holds(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Integer, Value::Integer(_))
                | (Self::Long, Value::Long(_))
                | (Self::Float, Value::Float(_))
        )
    }

    fn from_i64(self, n: i64) -> Result<Value, &'static str> {
        match self {
            Self::Integer => i32::try_from(n)
                .map(Value::Integer)
                .map_err(|_| "out of range"),
            Self::Long => Ok(Value::Long(n)),
            Self::Float => Ok(Value::Float(n as f64)),
        }
    }

    fn from_f64(self, n: f64) -> Result<Value, &'static str> {
        if let Self::Float = self {
            return Ok(Value::Float(n));
        }
        let whole = n.trunc();
        if !whole.is_finite() || whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
            return Err("out of range");
        }
        self.from_i64(whole as i64)
    }

    fn parse(self, text: &str) -> Result<Value, &'static str> {
        let parsed = match self {
            Self::Integer => text.parse::<i32>().ok().map(Value::Integer),
            Self::Long => text.parse::<i64>().ok().map(Value::Long),
            Self::Float => text.parse::<f64>().ok().map(Value::Float),
        };
        parsed.ok_or("not a number")
    }
}

fn numeric(kind: Numeric) -> Vec<StageFactory> {
    vec![
        always(stage(move |value, spec, _| numeric_value(kind, value, spec))),
        if_required(stage(numeric_required)),
    ]
}

fn numeric_value(kind: Numeric, value: Value, spec: &AttributeSpec) -> ModelResult<Value> {
    if value.is_null() || kind.holds(&value) {
        return Ok(value);
    }
    let converted = match &value {
        Value::Bool(b) => kind.from_i64(i64::from(*b)),
        Value::Integer(n) => kind.from_i64(i64::from(*n)),
        Value::Long(n) => kind.from_i64(*n),
        Value::Float(n) => kind.from_f64(*n),
        other => match other.ordinal() {
            Some(ordinal) => kind.from_i64(i64::from(ordinal)),
            None => kind.parse(other.to_string().trim()),
        },
    };
    converted.map_err(|reason| {
        ValidationError::InvalidValue {
            attribute: spec.qualified_name(),
            reason: reason.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

/// Numeric required check; reports `InvalidValue` rather than a missing value.
fn numeric_required(value: Value, spec: &Arc<AttributeSpec>, _: &Arc<Model>) -> ModelResult<Value> {
    if value.is_null() {
        return Err(ValidationError::InvalidValue {
            attribute: spec.qualified_name(),
            reason: "required".to_string(),
            value: value.to_string(),
        }
        .into());
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy)]
enum Temporal {
    Date,
    Time,
    DateTime,
}

impl Temporal {
    fn holds(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Date, Value::Date(_))
                | (Self::Time, Value::Time(_))
                | (Self::DateTime, Value::DateTime(_))
        )
    }

    fn default_format(self) -> &'static str {
        match self {
            Self::Date => DEFAULT_DATE_FORMAT,
            Self::Time => DEFAULT_TIME_FORMAT,
            Self::DateTime => DEFAULT_DATETIME_FORMAT,
        }
    }

    fn from_datetime(self, dt: NaiveDateTime) -> Value {
        match self {
            Self::Date => Value::Date(dt.date()),
            Self::Time => Value::Time(dt.time()),
            Self::DateTime => Value::DateTime(dt),
        }
    }

    /// Parse text with the configured format. A format without time fields
    /// still yields a date-time (at midnight); one without date fields still
    /// yields a time.
    fn parse(self, text: &str, spec: &AttributeSpec) -> ModelResult<Value> {
        let format = spec
            .options()
            .format
            .as_deref()
            .unwrap_or(self.default_format());
        let full = NaiveDateTime::parse_from_str(text, format);
        let parsed = match self {
            Self::Date => full
                .map(|dt| dt.date())
                .or_else(|_| NaiveDate::parse_from_str(text, format))
                .map(Value::Date),
            Self::Time => full
                .map(|dt| dt.time())
                .or_else(|_| NaiveTime::parse_from_str(text, format))
                .map(Value::Time),
            Self::DateTime => full
                .or_else(|_| {
                    NaiveDate::parse_from_str(text, format).map(|d| d.and_time(NaiveTime::MIN))
                })
                .map(Value::DateTime),
        };
        parsed.map_err(|source| {
            ValidationError::UnparseableValue {
                attribute: spec.qualified_name(),
                value: text.to_string(),
                format: format.to_string(),
                source,
            }
            .into()
        })
    }
}

fn temporal(kind: Temporal) -> Vec<StageFactory> {
    vec![
        always(stage(move |value, spec, _| temporal_value(kind, value, spec))),
        if_required(stage(required)),
    ]
}

fn temporal_value(kind: Temporal, value: Value, spec: &AttributeSpec) -> ModelResult<Value> {
    if value.is_null() || kind.holds(&value) {
        return Ok(value);
    }
    match (kind, value) {
        (kind, Value::DateTime(dt)) => Ok(kind.from_datetime(dt)),
        (Temporal::DateTime, Value::Date(d)) => Ok(Value::DateTime(d.and_time(NaiveTime::MIN))),
        (Temporal::DateTime, Value::Time(t)) => {
            Ok(Value::DateTime(Local::now().date_naive().and_time(t)))
        }
        (kind, value) if value.is_numeric() => Ok(kind.from_datetime(from_epoch(&value, spec)?)),
        (_, Value::Text(text)) if text.is_empty() => Ok(Value::Null),
        (kind, other) => kind.parse(&other.to_string(), spec),
    }
}

/// UTC date-time of an epoch value in seconds.
fn from_epoch(value: &Value, spec: &AttributeSpec) -> ModelResult<NaiveDateTime> {
    let (seconds, nanos) = match value {
        Value::Bool(b) => (i64::from(*b), 0),
        Value::Integer(n) => (i64::from(*n), 0),
        Value::Long(n) => (*n, 0),
        Value::Float(n) if n.is_finite() => {
            let whole = n.floor();
            (whole as i64, ((n - whole) * 1e9).min(999_999_999.0) as u32)
        }
        _ => (i64::MAX, 0),
    };
    DateTime::from_timestamp(seconds, nanos)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| {
            ValidationError::InvalidValue {
                attribute: spec.qualified_name(),
                reason: "timestamp out of range".to_string(),
                value: value.to_string(),
            }
            .into()
        })
}

fn list_value(value: Value, spec: &Arc<AttributeSpec>, model: &Arc<Model>) -> ModelResult<Value> {
    let items = match value {
        Value::Null => return Ok(Value::Null),
        Value::Array(items) => items,
        Value::List(list) => list.into_vec(),
        other => {
            return Err(TypeError::NonIterableType {
                attribute: spec.qualified_name(),
                found_type: other.type_name(),
            }
            .into());
        }
    };
    let mut list = BoundedList::new(model, Arc::clone(spec));
    list.extend(items)?;
    Ok(Value::List(list))
}
