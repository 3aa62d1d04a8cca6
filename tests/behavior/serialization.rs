//! Serialization behavior: layout options and the full round trip.

use crate::assert_model_error;
use crate::common::{kitchen_sink_model, model_with};
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use structmodel::{AttributeOptions, AttributeType, ModelError, Record, SchemaOptions, Value};

fn filled_sink() -> Record {
    let model = kitchen_sink_model();
    let mut sink = model.record("Sink").unwrap();
    sink.assign([
        ("text", Value::from("X")),
        ("integer", Value::from(1)),
        ("float", Value::from(1.0)),
        ("list", Value::array(["A", "B"])),
        ("date", Value::from("2000-01-01")),
        ("time", Value::from("10:15:20")),
        ("datetime", Value::from("2015-12-01T10:15:20")),
        ("nested", Value::map([("foo", "Foo")])),
    ])
    .unwrap();
    sink.validate().unwrap();
    sink
}

#[test]
fn test_round_trip_of_every_kind() {
    let sink = filled_sink();
    assert_eq!(
        sink.get("date"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()))
    );
    assert_eq!(
        sink.get("time"),
        Some(&Value::Time(NaiveTime::from_hms_opt(10, 15, 20).unwrap()))
    );

    let text = sink.serialize().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        parsed,
        json!({
            "text": "X",
            "integer": 1,
            "float": 1.0,
            "list": ["A", "B"],
            "date": "2000-01-01",
            "time": "10:15:20",
            "datetime": "2015-12-01T10:15:20",
            "nested": {"foo": "Foo"}
        })
    );
    assert_eq!(sink.to_json(), parsed);
    assert!(
        sink.get("nested")
            .unwrap()
            .structurally_eq(&Value::map([("foo", "Foo")]))
    );
}

#[test]
fn test_default_layout_is_indented() {
    let sink = filled_sink();
    let text = sink.serialize().unwrap();
    assert!(text.starts_with("{\n  \"date\": \"2000-01-01\",\n"));
    assert!(text.contains("  \"list\": [\n    \"A\",\n    \"B\"\n  ],\n"));
    assert!(text.contains("  \"nested\": {\n    \"foo\": \"Foo\"\n  },\n"));
    assert!(text.ends_with("  \"time\": \"10:15:20\"\n}"));
}

#[test]
fn test_single_line_layout_with_custom_separators() {
    let model = model_with("Pair", SchemaOptions::new().indent(None).separators(",", ":"));
    model
        .define("Pair", "left", AttributeOptions::of(AttributeType::Integer))
        .unwrap();
    model
        .define("Pair", "right", AttributeOptions::of(AttributeType::Boolean))
        .unwrap();

    let mut pair = model.record("Pair").unwrap();
    pair.assign([("left", Value::from("3")), ("right", Value::from("TRUE"))])
        .unwrap();
    pair.set("_note", "hidden").unwrap();
    assert_eq!(pair.serialize().unwrap(), r#"{"left":3,"right":true}"#);
}

#[test]
fn test_schema_serializes_only_its_own_records() {
    let model = model_with("A", SchemaOptions::new());
    model.declare("B", SchemaOptions::new()).unwrap();
    let b = model.record("B").unwrap();

    let schema = model.schema("A").unwrap();
    assert_model_error!(schema.serialize(&b), ModelError::InvalidStructType { .. });
    assert_model_error!(
        schema.serialize_value(&Value::array([1])),
        ModelError::InvalidStructType { .. }
    );
    assert_eq!(
        model.schema("B").unwrap().serialize_value(&Value::Record(b)).unwrap(),
        "{}"
    );
}

#[test]
fn test_forgotten_struct_cannot_serialize() {
    let model = model_with("Gone", SchemaOptions::new());
    let record = model.record("Gone").unwrap();
    model.forget("Gone");
    assert_model_error!(record.serialize(), ModelError::UnknownStruct { .. });
}
