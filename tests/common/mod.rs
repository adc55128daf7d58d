//! # Combotest Test Helpers
//!
//! Shared dimensions, contexts and decision functions for the integration tests.

#![allow(dead_code)]

use combotest::{
    Dimension, Dimensions, EnumerateOptions, Harness, OutcomeMatrix, Order, Values,
};

/// The context the example dimensions write into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleContext {
    pub string_value: String,
    pub number_value: i32,
}

pub fn string_dimension() -> Dimension<&'static str, ExampleContext> {
    Dimension::builder("String", ["a", "b", "c"])
        .apply(|value, ctx: &mut ExampleContext| ctx.string_value = value.to_string())
        .build()
        .unwrap()
}

pub fn number_dimension() -> Dimension<i32, ExampleContext> {
    Dimension::builder("Number", [1, 2, 3])
        .apply(|value, ctx: &mut ExampleContext| ctx.number_value = *value)
        .build()
        .unwrap()
}

pub fn example_dimensions() -> Dimensions<ExampleContext> {
    Dimensions::new()
        .with("string", string_dimension())
        .with("number", number_dimension())
}

/// `(a, 1)` and `(b, 2)` resolve to `outcome2`; everything else to the default.
pub fn example_decision(values: &Values<'_>) -> Option<&'static str> {
    let string = values.get::<&str>("string").copied();
    let number = values.get::<i32>("number").copied();
    match (string, number) {
        (Some("a"), Some(1)) | (Some("b"), Some(2)) => Some("outcome2"),
        _ => None,
    }
}

pub fn example_matrix() -> OutcomeMatrix<&'static str, ExampleContext> {
    let mut matrix =
        OutcomeMatrix::new(example_dimensions(), ["outcome1", "outcome2"], "outcome1").unwrap();
    matrix.define_outcomes(example_decision);
    matrix
}

/// Every visited combination as `(labels, outcome)`, in visit order.
pub fn visited<O: Clone + PartialEq + std::fmt::Debug, C>(
    matrix: &OutcomeMatrix<O, C>,
    options: &EnumerateOptions<O>,
) -> Vec<(Vec<String>, O)> {
    let mut seen = Vec::new();
    matrix
        .for_each(options, |combination, outcome| {
            seen.push((combination.labels(), outcome.clone()));
        })
        .unwrap();
    seen
}

pub fn in_order<O>(order: Order) -> EnumerateOptions<O> {
    EnumerateOptions::new().order(order)
}

pub fn labels(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

/// A harness that only remembers names, in registration order.
#[derive(Debug, Default)]
pub struct NameLog {
    pub groups: Vec<String>,
    pub tests: Vec<String>,
}

impl Harness for NameLog {
    fn group<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.groups.push(name.to_string());
        body(self);
    }

    fn test<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(),
    {
        self.tests.push(name.to_string());
        body();
    }
}
