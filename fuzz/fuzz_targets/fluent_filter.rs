//! Fuzz target for the fluent filter builder.
//!
//! Generates arbitrary builder call sequences and checks that compiling
//! never panics and is repeatable.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_fluent_filter
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sieve_query::{Filter, FilterValue};

/// A fuzzable operand.
#[derive(Debug, Arbitrary, Clone)]
enum FuzzValue {
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<FuzzValue>),
}

impl From<FuzzValue> for FilterValue {
    fn from(val: FuzzValue) -> Self {
        match val {
            FuzzValue::Bool(b) => FilterValue::Bool(b),
            FuzzValue::Int(i) => FilterValue::Int(i),
            FuzzValue::String(s) => FilterValue::String(s),
            FuzzValue::List(list) => {
                FilterValue::List(list.into_iter().map(FilterValue::from).collect())
            }
        }
    }
}

/// One builder call.
#[derive(Debug, Arbitrary)]
enum FuzzCall {
    Where(String, FuzzValue),
    Or(String, FuzzValue),
    Not(String, FuzzValue),
    Order(String),
    Reorder(String),
    Limit(i64),
    Offset(i64),
    SoftDelete(bool),
    Unscoped,
    Raw(String, Vec<FuzzValue>),
}

fuzz_target!(|calls: Vec<FuzzCall>| {
    let mut filter = Filter::new();
    for call in calls.into_iter().take(64) {
        match call {
            FuzzCall::Where(expr, value) => filter.where_(&expr, value),
            FuzzCall::Or(expr, value) => filter.or(&expr, value),
            FuzzCall::Not(field, value) => filter.not(&field, value),
            FuzzCall::Order(value) => filter.order(&value),
            FuzzCall::Reorder(value) => filter.reorder(&value),
            FuzzCall::Limit(n) => filter.limit(n),
            FuzzCall::Offset(n) => filter.offset(n),
            FuzzCall::SoftDelete(enabled) => filter.soft_delete(enabled),
            FuzzCall::Unscoped => filter.unscoped(),
            FuzzCall::Raw(sql, params) => filter.add_condition(sql, params),
        };
    }

    let first = filter.to_sql();
    let second = filter.to_sql();
    match (first, second) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(a), Err(b)) => assert_eq!(a.code, b.code),
        _ => panic!("compiling the same filter gave different outcomes"),
    }
});
