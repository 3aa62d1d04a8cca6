//! Property-based tests for the bounded list length invariant.
//!
//! Random sequences of mutations are applied to a list with random bounds.
//! Whatever the sequence, the list length never leaves the bounds, and a
//! rejected mutation leaves the list exactly as it was.

use crate::common::model_with;
use proptest::prelude::*;
use std::ops::Range;
use std::sync::Arc;
use structmodel::{AttributeOptions, BoundedList, ModelError, SchemaOptions, ValidationError, Value};

/// One list mutation, with indexes taken modulo the current length.
#[derive(Debug, Clone)]
enum ListOp {
    Push(String),
    Pop,
    Insert(usize, String),
    Remove(usize),
    Splice(usize, usize, Vec<String>),
    DeleteRange(usize, usize),
    Repeat(usize),
    Clear,
}

prop_compose! {
    fn word_strategy()(word in "[a-z]{1,4}") -> String {
        word
    }
}

fn op_strategy() -> impl Strategy<Value = ListOp> {
    prop_oneof![
        word_strategy().prop_map(ListOp::Push),
        Just(ListOp::Pop),
        (any::<usize>(), word_strategy()).prop_map(|(i, w)| ListOp::Insert(i, w)),
        any::<usize>().prop_map(ListOp::Remove),
        (any::<usize>(), any::<usize>(), prop::collection::vec(word_strategy(), 0..3))
            .prop_map(|(a, b, words)| ListOp::Splice(a, b, words)),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| ListOp::DeleteRange(a, b)),
        (0usize..3).prop_map(ListOp::Repeat),
        Just(ListOp::Clear),
    ]
}

fn valid_range(len: usize, a: usize, b: usize) -> Range<usize> {
    let (a, b) = (a % (len + 1), b % (len + 1));
    a.min(b)..a.max(b)
}

fn apply(list: &mut BoundedList, op: &ListOp) -> Result<(), ModelError> {
    let len = list.len();
    match op {
        ListOp::Push(word) => list.push(word.as_str()),
        ListOp::Pop => list.pop().map(|_| ()),
        ListOp::Insert(i, word) => list.insert(i % (len + 1), word.as_str()),
        ListOp::Remove(i) if len > 0 => list.remove(i % len).map(|_| ()),
        ListOp::Remove(_) => Ok(()),
        ListOp::Splice(a, b, words) => list.splice(
            valid_range(len, *a, *b),
            words.iter().map(String::as_str),
        ),
        ListOp::DeleteRange(a, b) => list.delete_range(valid_range(len, *a, *b)),
        ListOp::Repeat(times) => list.repeat(*times),
        ListOp::Clear => list.clear(),
    }
}

fn within(len: usize, min: usize, max: usize) -> bool {
    (min == 0 || len >= min) && (max == 0 || len <= max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_length_stays_within_bounds(
        min in 0usize..3,
        extra in 0usize..4,
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let max = if extra == 0 { 0 } else { min.max(1) + extra };
        let model = model_with("Bag", SchemaOptions::new());
        let spec = model
            .define(
                "Bag",
                "words",
                AttributeOptions::list().min_length(min).max_length(max),
            )
            .unwrap();

        let mut list = BoundedList::new(&model, Arc::clone(&spec));
        let seed: Vec<Value> = (0..min.max(1)).map(|i| Value::from(format!("w{}", i))).collect();
        list.extend(seed).unwrap();
        prop_assert!(within(list.len(), min, max));

        for op in &ops {
            let before = list.clone();
            match apply(&mut list, op) {
                Ok(()) => prop_assert!(
                    within(list.len(), min, max),
                    "{:?} left {} items, bounds {}..{}", op, list.len(), min, max
                ),
                Err(ModelError::Validation(ValidationError::ListBoundaryViolation { .. })) => {
                    prop_assert_eq!(&list, &before);
                }
                Err(other) => prop_assert!(false, "{:?} failed unexpectedly: {}", op, other),
            }
        }
    }

    #[test]
    fn prop_elements_are_always_coerced(
        numbers in prop::collection::vec(-1000i64..1000, 0..20),
    ) {
        let model = model_with("Bag", SchemaOptions::new());
        let spec = model
            .define(
                "Bag",
                "numbers",
                AttributeOptions::list().item_type(structmodel::AttributeType::Integer),
            )
            .unwrap();

        let mut list = BoundedList::new(&model, spec);
        list.extend(numbers.iter().map(|n| n.to_string())).unwrap();
        let expected: Vec<Value> = numbers
            .iter()
            .map(|&n| Value::Integer(n as i32))
            .collect();
        prop_assert_eq!(list.as_slice(), expected.as_slice());
    }
}
