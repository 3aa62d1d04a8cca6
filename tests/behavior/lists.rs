//! Bounded list behavior on record attributes.

use crate::assert_model_error;
use crate::common::model_with;
use std::sync::Arc;
use structmodel::{
    AttributeOptions, AttributeType, Model, ModelError, SchemaOptions, TypeError, ValidationError,
    Value,
};

fn tagged(options: AttributeOptions) -> Arc<Model> {
    let model = model_with("Post", SchemaOptions::new());
    model.define("Post", "tags", options).unwrap();
    model
}

fn tags(model: &Arc<Model>, items: &[&str]) -> structmodel::Record {
    let mut post = model.record("Post").unwrap();
    post.set("tags", Value::array(items.iter().copied())).unwrap();
    post
}

#[test]
fn test_bounds_one_to_two() {
    let model = tagged(AttributeOptions::list().min_length(1).max_length(2));
    let mut post = tags(&model, &["a"]);
    let list = post.list_mut("tags").unwrap();
    list.push("b").unwrap();

    match list.push("c").unwrap_err() {
        ModelError::Validation(ValidationError::ListBoundaryViolation {
            attribute,
            estimated_length,
            min_length,
            max_length,
        }) => {
            assert_eq!(attribute, "Post.tags");
            assert_eq!(estimated_length, 3);
            assert_eq!((min_length, max_length), (Some(1), Some(2)));
        }
        other => panic!("Expected ListBoundaryViolation, got {:?}", other),
    }
    assert_eq!(list.len(), 2);

    list.remove(0).unwrap();
    assert_model_error!(
        list.remove(0),
        ModelError::Validation(ValidationError::ListBoundaryViolation {
            estimated_length: 0,
            ..
        })
    );
    assert_eq!(list.as_slice(), &[Value::from("b")]);
}

#[test]
fn test_assignment_checks_bounds() {
    let model = tagged(AttributeOptions::list().min_length(1).max_length(2));
    let mut post = model.record("Post").unwrap();
    assert_model_error!(
        post.set("tags", Value::array(["a", "b", "c"])),
        ModelError::Validation(ValidationError::ListBoundaryViolation { .. })
    );
    assert_model_error!(
        post.set("tags", Value::array(Vec::<Value>::new())),
        ModelError::Validation(ValidationError::ListBoundaryViolation { .. })
    );
    assert!(!post.contains("tags"));
}

#[test]
fn test_non_iterable_value() {
    let model = tagged(AttributeOptions::list());
    let mut post = model.record("Post").unwrap();
    match post.set("tags", true).unwrap_err() {
        ModelError::Type(TypeError::NonIterableType {
            attribute,
            found_type,
        }) => {
            assert_eq!(attribute, "Post.tags");
            assert_eq!(found_type, "boolean");
        }
        other => panic!("Expected NonIterableType, got {:?}", other),
    }
}

#[test]
fn test_element_pattern() {
    let model = tagged(AttributeOptions::list().item_pattern("^[ab]$"));
    let mut post = tags(&model, &["a", "b"]);
    let list = post.list_mut("tags").unwrap();
    assert_model_error!(
        list.push("c"),
        ModelError::Validation(ValidationError::PatternMismatch { .. })
    );
    assert_model_error!(
        list.set(0, "z"),
        ModelError::Validation(ValidationError::PatternMismatch { .. })
    );
    assert_eq!(list.as_slice(), &[Value::from("a"), Value::from("b")]);
}

#[test]
fn test_required_elements() {
    let model = tagged(
        AttributeOptions::list()
            .item_type(AttributeType::Integer)
            .item_required(),
    );
    let mut post = model.record("Post").unwrap();
    assert_model_error!(
        post.set("tags", Value::array([Value::from(1), Value::Null])),
        ModelError::Validation(ValidationError::MissingRequiredValue { .. })
    );
    post.set("tags", Value::array(["1", "2"])).unwrap();
    assert_eq!(
        post.get("tags").unwrap().as_list().unwrap().as_slice(),
        &[Value::Integer(1), Value::Integer(2)]
    );
}

#[test]
fn test_validate_rechecks_list_length() {
    let model = tagged(AttributeOptions::list().min_length(2));
    let mut post = tags(&model, &["a", "b"]);
    post.validate().unwrap();

    model
        .define("Post", "tags", AttributeOptions::list().min_length(3))
        .unwrap();
    assert_model_error!(
        post.validate(),
        ModelError::Validation(ValidationError::ListBoundaryViolation { .. })
    );
}

#[test]
fn test_null_list_with_minimum_is_missing() {
    let model = tagged(AttributeOptions::list().min_length(1));
    let mut post = model.record("Post").unwrap();
    post.set("tags", Value::Null).unwrap();
    assert_model_error!(
        post.validate(),
        ModelError::Validation(ValidationError::MissingRequiredValue { .. })
    );
}

#[test]
fn test_splice_and_concat_keep_bounds() {
    let model = tagged(AttributeOptions::list().min_length(1).max_length(3));
    let mut post = tags(&model, &["a", "b"]);
    let list = post.list_mut("tags").unwrap();

    let longer = list.concat(["c"]).unwrap();
    assert_eq!(longer.len(), 3);
    assert_model_error!(list.concat(["c", "d"]), ModelError::Validation(_));

    list.splice(0..2, ["x"]).unwrap();
    assert_eq!(list.as_slice(), &[Value::from("x")]);
    assert_model_error!(list.splice(0..1, Vec::<&str>::new()), ModelError::Validation(_));
}
