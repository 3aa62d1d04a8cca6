//! Common test utilities for struct model testing.
//!
//! This module provides model builders, fixture loading and assertion macros
//! shared by the behavior tests.

use std::path::PathBuf;
use std::sync::{Arc, Once};
use structmodel::{AttributeOptions, AttributeType, Model, SchemaOptions, Value};

static LOGGER: Once = Once::new();

/// Install `env_logger` once so `RUST_LOG=structmodel=trace` shows pipeline logs.
pub fn init_logging() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Absolute path of a file or directory under `tests/fixtures`.
pub fn fixture_path(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(path)
}

/// Load a JSON fixture as a model value.
pub fn load_record_fixture(name: &str) -> Value {
    let path = fixture_path(&format!("records/{}.json", name));
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", path.display()));
    let json: serde_json::Value = serde_json::from_str(&content)
        .unwrap_or_else(|_| panic!("Failed to parse JSON fixture: {}", path.display()));
    Value::from(json)
}

/// Fresh model with a single struct declared.
pub fn model_with(name: &str, options: SchemaOptions) -> Arc<Model> {
    init_logging();
    let model = Model::new();
    model.declare(name, options).expect("Failed to declare struct");
    model
}

/// Model with one attribute of every built-in kind plus a nested struct, used
/// by the round trip tests.
pub fn kitchen_sink_model() -> Arc<Model> {
    init_logging();
    let model = Model::new();
    model
        .declare("Nested", SchemaOptions::new().open())
        .expect("Failed to declare Nested");
    model
        .declare("Sink", SchemaOptions::new())
        .and_then(|d| d.define("text", AttributeOptions::text()))
        .and_then(|d| d.define("integer", AttributeOptions::of(AttributeType::Integer)))
        .and_then(|d| d.define("float", AttributeOptions::of(AttributeType::Float)))
        .and_then(|d| d.define("list", AttributeOptions::list()))
        .and_then(|d| d.define("date", AttributeOptions::of(AttributeType::Date)))
        .and_then(|d| d.define("time", AttributeOptions::of(AttributeType::Time)))
        .and_then(|d| d.define("datetime", AttributeOptions::of(AttributeType::DateTime)))
        .and_then(|d| d.define("nested", AttributeOptions::nested("Nested")))
        .expect("Failed to declare Sink");
    model
}

/// Assert that a result failed with an error matching the given pattern.
#[macro_export]
macro_rules! assert_model_error {
    ($result:expr, $pattern:pat) => {
        match $result {
            Err($pattern) => {}
            Ok(_) => panic!("Expected error {}, but the operation succeeded", stringify!($pattern)),
            Err(other) => panic!("Expected error {}, got {:?}", stringify!($pattern), other),
        }
    };
}

/// Assert that a result failed with an error whose message contains a substring.
#[macro_export]
macro_rules! assert_error_message_contains {
    ($result:expr, $substring:expr) => {
        match $result {
            Err(err) => assert!(
                err.to_string().contains($substring),
                "Error message '{}' does not contain '{}'",
                err,
                $substring
            ),
            Ok(_) => panic!(
                "Expected error containing '{}', but the operation succeeded",
                $substring
            ),
        }
    };
}
