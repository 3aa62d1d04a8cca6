//! Registry behavior: declaring, looking up, forgetting and extending types.

use crate::assert_model_error;
use crate::common::{init_logging, model_with};
use std::sync::Arc;
use structmodel::pipeline::{always, stage};
use structmodel::{
    AttributeOptions, AttributeType, Model, ModelError, SchemaOptions, TypeError, TypeTag,
    ValidationError, ValidatorOptions, Value,
};

#[test]
fn test_declare_and_lookup() {
    let model = model_with("Person", SchemaOptions::new());
    assert!(model.is_declared("Person"));
    assert_eq!(model.schema("Person").unwrap().name(), "Person");
    assert_model_error!(model.schema("Nobody"), ModelError::UnknownStruct { .. });
    assert_model_error!(
        model.declare("", SchemaOptions::new()),
        ModelError::InvalidStructType { .. }
    );
}

#[test]
fn test_redeclaring_replaces_schema() {
    let model = model_with("S", SchemaOptions::new());
    model.define("S", "a", AttributeOptions::text()).unwrap();
    model.declare("S", SchemaOptions::new().open()).unwrap();

    let schema = model.schema("S").unwrap();
    assert!(schema.attribute("a").is_none());
    assert!(schema.options().open);
}

#[test]
fn test_forgotten_struct_differs_from_undeclared() {
    let model = model_with("S", SchemaOptions::new());
    assert!(model.forget("S"));
    assert!(!model.forget("S"));

    assert_model_error!(model.record("S"), ModelError::UnknownStruct { .. });
    assert_model_error!(model.record("Never"), ModelError::UndeclaredStruct { .. });
    assert_model_error!(model.schema("S"), ModelError::UnknownStruct { .. });
}

#[test]
fn test_define_on_unknown_struct_fails() {
    let model = Model::new();
    assert_model_error!(
        model.define("Missing", "a", AttributeOptions::text()),
        ModelError::UndeclaredStruct { .. }
    );
}

#[test]
fn test_schemas_are_listed_by_name() {
    init_logging();
    let model = Model::new();
    for name in ["Zeta", "Alpha", "Mid"] {
        model.declare(name, SchemaOptions::new()).unwrap();
    }
    let names: Vec<String> = model
        .schemas()
        .iter()
        .map(|schema| schema.name().to_string())
        .collect();
    assert_eq!(names, ["Alpha", "Mid", "Zeta"]);
}

#[test]
fn test_records_see_schema_updates() {
    let model = model_with("S", SchemaOptions::new());
    let mut record = model.record("S").unwrap();
    assert_model_error!(record.set("late", 1), ModelError::UndefinedAttribute { .. });

    model
        .define("S", "late", AttributeOptions::of(AttributeType::Long))
        .unwrap();
    record.set("late", "9000000000").unwrap();
    assert_eq!(record.get("late"), Some(&Value::Long(9_000_000_000)));
}

#[test]
fn test_custom_type_registration() {
    let model = model_with("S", SchemaOptions::new());
    model
        .register_type(
            TypeTag::Custom("upper".to_string()),
            vec![always(stage(|value, _, _| {
                Ok(Value::Text(value.to_string().to_uppercase()))
            }))],
        )
        .unwrap();
    model
        .define(
            "S",
            "code",
            AttributeOptions::of(AttributeType::Custom("upper".to_string())),
        )
        .unwrap();

    let mut record = model.record("S").unwrap();
    record.set("code", "abc").unwrap();
    assert_eq!(record.get("code"), Some(&Value::from("ABC")));
    assert!(model.types().is_registered(&TypeTag::Custom("upper".to_string())));
}

#[test]
fn test_unregistered_custom_type_fails_on_write() {
    let model = model_with("S", SchemaOptions::new());
    model
        .define(
            "S",
            "code",
            AttributeOptions::of(AttributeType::Custom("mystery".to_string())),
        )
        .unwrap();

    let mut record = model.record("S").unwrap();
    match record.set("code", "x").unwrap_err() {
        ModelError::Type(TypeError::UnrecognizedType {
            attribute,
            type_name,
        }) => {
            assert_eq!(attribute, "S.code");
            assert_eq!(type_name, "mystery");
        }
        other => panic!("Expected UnrecognizedType, got {:?}", other),
    }
}

#[test]
fn test_model_is_shared_across_threads() {
    let model = model_with("S", SchemaOptions::new());
    model
        .define("S", "n", AttributeOptions::of(AttributeType::Integer).required())
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let model = Arc::clone(&model);
            std::thread::spawn(move || {
                let mut record = model.record("S").unwrap();
                record.set("n", i.to_string()).unwrap();
                record.validate().unwrap();
                record.get("n").cloned()
            })
        })
        .collect();

    let mut values: Vec<Value> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();
    values.sort_by_key(|value| value.as_i64());
    assert_eq!(
        values,
        [0, 1, 2, 3].map(Value::Integer).to_vec()
    );
}

#[test]
fn test_numeric_conversion_failure() {
    let model = model_with("S", SchemaOptions::new());
    model
        .define("S", "n", AttributeOptions::of(AttributeType::Integer))
        .unwrap();
    let mut record = model.record("S").unwrap();
    match record.set("n", "twelve").unwrap_err() {
        ModelError::Validation(ValidationError::InvalidValue { attribute, value, .. }) => {
            assert_eq!(attribute, "S.n");
            assert_eq!(value, "twelve");
        }
        other => panic!("Expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_validator_may_call_back_into_model() {
    let model = model_with("S", SchemaOptions::new());
    model.define("S", "a", AttributeOptions::text()).unwrap();

    let handle = Arc::downgrade(&model);
    model
        .attach_validator(
            "S",
            move |record| {
                handle.upgrade().is_some_and(|model| {
                    model.define("S", "seen", AttributeOptions::text()).is_ok()
                        && model.schemas().len() == 1
                        && record.contains("a")
                })
            },
            ValidatorOptions::message("needs a"),
        )
        .unwrap();

    let mut record = model.record("S").unwrap();
    record.set("a", "x").unwrap();
    record.validate().unwrap();
    assert!(model.schema("S").unwrap().attribute("seen").is_some());

    model
        .define("S", "a", AttributeOptions::text().pattern("^y$"))
        .unwrap();
    assert_model_error!(
        record.set("a", "x"),
        ModelError::Validation(ValidationError::PatternMismatch { .. })
    );
}
