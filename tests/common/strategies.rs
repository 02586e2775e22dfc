//! Proptest strategies for dispatcher properties.

#![allow(dead_code)]

use proptest::prelude::*;

/// Between one and `max` subscribers
pub fn subscriber_count_strategy(max: usize) -> impl Strategy<Value = usize> {
    1..=max
}

/// A short sequence of published payloads
pub fn payloads_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z ]{0,16}", 1..8)
}

/// Which of three value kinds to publish at each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Published {
    Int(i32),
    Long(i64),
    Text,
}

pub fn published_strategy() -> impl Strategy<Value = Vec<Published>> {
    prop::collection::vec(
        prop_oneof![
            any::<i32>().prop_map(Published::Int),
            any::<i64>().prop_map(Published::Long),
            Just(Published::Text),
        ],
        0..16,
    )
}
