//! Integration tests for the test-framework binding: generated group names,
//! lazily built contexts, effect ordering and failure isolation.

mod common;

use std::sync::{Arc, Mutex};

use combotest::config::{merge_defaults, PartialRenderConfig};
use combotest::{
    Dimension, Dimensions, EnumerateOptions, Harness, Order, OutcomeMatrix, Recorder,
    RenderConfig, TestOutcomeMatrix, TestStatus,
};
use common::*;

fn plain_config() -> RenderConfig {
    merge_defaults(
        RenderConfig::default(),
        PartialRenderConfig {
            use_colors: Some(false),
            ..PartialRenderConfig::default()
        },
    )
}

/// Runs `matrix` and returns `(group name, context, outcome)` per combination.
fn generated(
    matrix: &TestOutcomeMatrix<&'static str, ExampleContext>,
) -> (Vec<String>, Vec<(ExampleContext, &'static str)>) {
    let mut log = NameLog::default();
    let mut bodies = Vec::new();
    matrix
        .test_outcomes(&mut log, |_, apply, outcome| {
            let ctx = apply.context(ExampleContext::default());
            bodies.push((ctx, *outcome));
        })
        .unwrap();
    (log.groups, bodies)
}

fn ctx(string_value: &str, number_value: i32) -> ExampleContext {
    ExampleContext {
        string_value: string_value.to_string(),
        number_value,
    }
}

// =============================================================================
// NAMING AND CONTEXTS
// =============================================================================

#[cfg(test)]
mod naming_tests {
    use super::*;

    #[test]
    fn test_generates_every_combination_with_names_and_contexts() {
        let matrix = TestOutcomeMatrix::with_config(example_matrix(), plain_config());
        let (names, bodies) = generated(&matrix);

        let expected = [
            ("a      | 2     ", ctx("a", 2), "outcome1"),
            ("a      | 3     ", ctx("a", 3), "outcome1"),
            ("b      | 1     ", ctx("b", 1), "outcome1"),
            ("b      | 3     ", ctx("b", 3), "outcome1"),
            ("c      | 1     ", ctx("c", 1), "outcome1"),
            ("c      | 2     ", ctx("c", 2), "outcome1"),
            ("c      | 3     ", ctx("c", 3), "outcome1"),
            ("a      | 1     ", ctx("a", 1), "outcome2"),
            ("b      | 2     ", ctx("b", 2), "outcome2"),
        ];

        assert_eq!(names.len(), expected.len() + 1);
        assert_eq!(bodies.len(), expected.len());
        assert_eq!(names[0], "String | Number");
        for (index, (name, context, outcome)) in expected.into_iter().enumerate() {
            assert_eq!(names[index + 1], name);
            assert_eq!(bodies[index], (context, outcome));
        }
    }

    #[test]
    fn test_formatted_values_wider_than_the_header() {
        let long = Dimension::builder("Shorter", ["aaa", "b"])
            .format_with(|value| value.repeat(5))
            .apply(|value, ctx: &mut ExampleContext| ctx.string_value = value.to_string())
            .build()
            .unwrap();
        let dims = Dimensions::new()
            .with("long", long)
            .with("number", number_dimension());
        let mut matrix = TestOutcomeMatrix::with_config(
            OutcomeMatrix::new(dims, ["outcome1", "outcome2"], "outcome1").unwrap(),
            plain_config(),
        );
        matrix.define_outcomes(|values| {
            let long = values.get::<&str>("long").copied();
            let number = values.get::<i32>("number").copied();
            match (long, number) {
                (Some("aaa"), Some(1)) | (Some("b"), Some(2)) => Some("outcome2"),
                _ => None,
            }
        });

        let (names, bodies) = generated(&matrix);
        assert_eq!(matrix.column_widths(), &[15, 6]);
        assert_eq!(
            names,
            vec![
                "Shorter         | Number",
                "aaaaaaaaaaaaaaa | 2     ",
                "aaaaaaaaaaaaaaa | 3     ",
                "bbbbb           | 1     ",
                "bbbbb           | 3     ",
                "aaaaaaaaaaaaaaa | 1     ",
                "bbbbb           | 2     ",
            ]
        );
        // contexts carry raw values, not their formatted labels
        assert_eq!(bodies[0].0, ctx("aaa", 2));
        assert_eq!(bodies[5], (ctx("b", 2), "outcome2"));
    }

    #[test]
    fn test_header_group_holds_one_placeholder_test() {
        let matrix = TestOutcomeMatrix::with_config(example_matrix(), plain_config());
        let mut recorder = Recorder::new();
        matrix
            .test_outcomes(&mut recorder, |_, _, _| {})
            .unwrap();
        let records = recorder.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].full_name(), "String | Number > Outcome");
        assert_eq!(records[0].status, TestStatus::Passed);
    }

    #[test]
    fn test_custom_separator_and_placeholder_name() {
        let config = merge_defaults(
            plain_config(),
            PartialRenderConfig {
                separator: Some(" / ".to_string()),
                header_test_name: Some("Expected".to_string()),
                order: Some(Order::Dimensions),
                ..PartialRenderConfig::default()
            },
        );
        let matrix = TestOutcomeMatrix::with_config(example_matrix(), config);
        let mut recorder = Recorder::new();
        matrix
            .test_outcomes(&mut recorder, |harness, _, outcome| {
                harness.test(outcome, || {});
            })
            .unwrap();
        let names: Vec<String> = recorder.records().iter().map(|r| r.full_name()).collect();
        assert_eq!(names[0], "String / Number > Expected");
        assert_eq!(names[1], "a      / 1      > outcome2");
        assert_eq!(names[2], "a      / 2      > outcome1");
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_explicit_options_override_the_configured_order() {
        let matrix = TestOutcomeMatrix::with_config(example_matrix(), plain_config());
        let options = EnumerateOptions::new()
            .order(Order::Dimensions)
            .only(|values, _| values.is("number", &3));
        let mut log = NameLog::default();
        matrix
            .test_outcomes_with(&mut log, &options, |_, _, _| {})
            .unwrap();
        assert_eq!(
            log.groups,
            vec!["String | Number", "a      | 3     ", "b      | 3     ", "c      | 3     "]
        );
    }
}

// =============================================================================
// CONTEXTS AND EFFECTS
// =============================================================================

#[cfg(test)]
mod context_tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Shared {
        owner: String,
        extra: u8,
    }

    #[test]
    fn test_later_dimensions_win_on_the_same_field() {
        let first = Dimension::builder("First", ["one"])
            .apply(|value, ctx: &mut Shared| ctx.owner = value.to_string())
            .build()
            .unwrap();
        let second = Dimension::builder("Second", ["two"])
            .apply(|value, ctx: &mut Shared| ctx.owner = value.to_string())
            .build()
            .unwrap();
        let dims = Dimensions::new().with("first", first).with("second", second);
        let matrix = TestOutcomeMatrix::new(OutcomeMatrix::new(dims, ["x"], "x").unwrap());

        let mut contexts = Vec::new();
        matrix
            .test_outcomes(&mut NameLog::default(), |_, apply, _| {
                contexts.push(apply.context(Shared {
                    owner: "seed".to_string(),
                    extra: 7,
                }));
            })
            .unwrap();
        assert_eq!(
            contexts,
            vec![Shared {
                owner: "two".to_string(),
                extra: 7
            }]
        );
    }

    #[test]
    fn test_contexts_are_built_only_on_demand() {
        let applied = Arc::new(Mutex::new(0usize));
        let seen = Arc::clone(&applied);
        let dim = Dimension::builder("Value", [1, 2, 3])
            .apply(move |_, _: &mut Shared| *seen.lock().unwrap() += 1)
            .build()
            .unwrap();
        let matrix = TestOutcomeMatrix::new(
            OutcomeMatrix::new(Dimensions::new().with("value", dim), ["x"], "x").unwrap(),
        );

        matrix
            .test_outcomes(&mut NameLog::default(), |_, _, _| {})
            .unwrap();
        assert_eq!(*applied.lock().unwrap(), 0);

        matrix
            .test_outcomes(&mut NameLog::default(), |_, apply, _| {
                let _ = apply.default_context();
                let mut again = Shared::default();
                apply.apply_to(&mut again);
            })
            .unwrap();
        assert_eq!(*applied.lock().unwrap(), 6);
    }

    #[test]
    fn test_setup_runs_in_dimension_order_inside_each_group() {
        let events = Arc::new(Mutex::new(Vec::<String>::new()));
        let letters = {
            let events = Arc::clone(&events);
            Dimension::builder("Letter", ["a", "b"])
                .setup(move |value| events.lock().unwrap().push(format!("setup {value}")))
                .build()
                .unwrap()
        };
        let flag = {
            let events = Arc::clone(&events);
            Dimension::boolean("Flag")
                .setup(move |value| events.lock().unwrap().push(format!("setup {value}")))
                .build()
                .unwrap()
        };
        let dims = Dimensions::<()>::new()
            .with("letter", letters)
            .with("flag", flag);
        let matrix = TestOutcomeMatrix::new(OutcomeMatrix::new(dims, ["x"], "x").unwrap());

        let mut log = NameLog::default();
        matrix
            .test_outcomes(&mut log, |_, apply, _| {
                let values = apply.values();
                events.lock().unwrap().push(format!(
                    "body {} {}",
                    values.get::<&str>("letter").unwrap(),
                    values.get::<bool>("flag").unwrap()
                ));
            })
            .unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            events[..3],
            ["setup a", "setup false", "body a false"].map(String::from)
        );
        assert_eq!(events.len(), 12);
    }

    #[derive(Debug, Default)]
    struct StringPart {
        value: String,
    }

    #[derive(Debug, Default)]
    struct NumberPart {
        value: i32,
    }

    #[derive(Debug, Default)]
    struct Combined {
        string: StringPart,
        number: NumberPart,
    }

    impl AsMut<StringPart> for Combined {
        fn as_mut(&mut self) -> &mut StringPart {
            &mut self.string
        }
    }

    impl AsMut<NumberPart> for Combined {
        fn as_mut(&mut self) -> &mut NumberPart {
            &mut self.number
        }
    }

    #[test]
    fn test_dimensions_written_against_parts_of_the_context() {
        let string = Dimension::builder("String", ["a", "b"])
            .apply(|value, part: &mut StringPart| part.value = value.to_string())
            .build()
            .unwrap();
        let number = Arc::new(
            Dimension::builder("Number", [1, 2])
                .apply(|value, part: &mut NumberPart| part.value = *value)
                .build()
                .unwrap(),
        );
        let dims = Dimensions::<Combined>::new()
            .with_part("string", string)
            .with_shared_part("number", Arc::clone(&number));
        let matrix = TestOutcomeMatrix::new(OutcomeMatrix::new(dims, ["x"], "x").unwrap());

        let mut seen = Vec::new();
        matrix
            .test_outcomes(&mut NameLog::default(), |_, apply, _| {
                let ctx = apply.default_context();
                seen.push((ctx.string.value, ctx.number.value));
            })
            .unwrap();
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), 1),
                ("a".to_string(), 2),
                ("b".to_string(), 1),
                ("b".to_string(), 2),
            ]
        );
        assert_eq!(Arc::strong_count(&number), 2);
    }
}

// =============================================================================
// FAILURE ISOLATION
// =============================================================================

#[cfg(test)]
mod isolation_tests {
    use super::*;

    #[test]
    fn test_a_failing_test_does_not_stop_the_matrix() {
        let matrix = TestOutcomeMatrix::with_config(example_matrix(), plain_config());
        let mut recorder = Recorder::new();
        matrix
            .test_outcomes(&mut recorder, |harness, apply, _| {
                let ctx = apply.context(ExampleContext::default());
                harness.test("is not c3", move || {
                    assert!(!(ctx.string_value == "c" && ctx.number_value == 3), "hit c3");
                });
            })
            .unwrap();

        let report = recorder.report();
        assert_eq!(report.total(), 10);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].full_name(), "c      | 3      > is not c3");
        assert_eq!(report.failures[0].status, TestStatus::Failed("hit c3".to_string()));
    }

    #[test]
    fn test_a_panicking_setup_fails_only_its_group() {
        let flaky = Dimension::builder("Flaky", [1, 2])
            .setup(|value| {
                if *value == 2 {
                    panic!("setup refused {value}");
                }
            })
            .build()
            .unwrap();
        let dims = Dimensions::<()>::new().with("flaky", flaky);
        let matrix = TestOutcomeMatrix::new(OutcomeMatrix::new(dims, ["x"], "x").unwrap());

        let mut recorder = Recorder::new();
        matrix
            .test_outcomes(&mut recorder, |harness, _, _| harness.test("runs", || {}))
            .unwrap();

        let report = recorder.report();
        assert_eq!((report.passed, report.failed), (2, 1));
        assert_eq!(report.failures[0].full_name(), "2     > <group>");
    }
}
