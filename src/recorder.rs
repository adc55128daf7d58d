//! An in-process [`Harness`] that records and runs generated tests.
//!
//! [`Recorder`] keeps the full group/test tree in registration order and runs each
//! test body immediately, treating a panic as a failure of that one test. A panic
//! escaping a group body (a failing setup or apply effect, say) fails only that
//! group; enumeration carries on with the next combination.
//!
//! It is what the crate's own tests use to observe generated names, and it is a
//! workable harness for running a matrix from a plain `#[test]` function:
//!
//! ```rust
//! use combotest::{Dimension, Dimensions, Harness, OutcomeMatrix, Recorder, TestOutcomeMatrix};
//!
//! let dims = Dimensions::<()>::new().with("flag", Dimension::boolean("Flag").build().unwrap());
//! let matrix = TestOutcomeMatrix::new(OutcomeMatrix::new(dims, ["ok"], "ok").unwrap());
//!
//! let mut recorder = Recorder::new();
//! matrix
//!     .test_outcomes(&mut recorder, |harness, _apply, outcome| {
//!         harness.test(outcome, || assert_eq!(1 + 1, 2));
//!     })
//!     .unwrap();
//! assert!(recorder.report().is_success());
//! ```

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::harness::Harness;

/// Name recorded for a failure that escaped a group body rather than a test.
pub const GROUP_FAILURE: &str = "<group>";

/// Result of running one test body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
    Passed,
    Failed(String),
}

/// One registered test, with the names of its enclosing groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    pub path: Vec<String>,
    pub name: String,
    pub status: TestStatus,
}

impl TestRecord {
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }

    /// Group path and test name joined with `" > "`.
    pub fn full_name(&self) -> String {
        let mut parts: Vec<&str> = self.path.iter().map(String::as_str).collect();
        parts.push(&self.name);
        parts.join(" > ")
    }
}

/// Records groups and tests, running test bodies as they are registered.
#[derive(Debug, Default)]
pub struct Recorder {
    path: Vec<String>,
    groups: Vec<String>,
    records: Vec<TestRecord>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every group name, in the order the groups were opened.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn report(&self) -> SuiteReport {
        let passed = self.records.iter().filter(|r| r.passed()).count();
        SuiteReport {
            passed,
            failed: self.records.len() - passed,
            failures: self
                .records
                .iter()
                .filter(|r| !r.passed())
                .cloned()
                .collect(),
        }
    }
}

impl Harness for Recorder {
    fn group<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut Self),
    {
        self.groups.push(name.to_string());
        self.path.push(name.to_string());
        let depth = self.path.len();

        let result = panic::catch_unwind(AssertUnwindSafe(|| body(self)));

        self.path.truncate(depth);
        if let Err(payload) = result {
            self.records.push(TestRecord {
                path: self.path.clone(),
                name: GROUP_FAILURE.to_string(),
                status: TestStatus::Failed(panic_message(payload.as_ref())),
            });
        }
        self.path.pop();
    }

    fn test<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(),
    {
        let status = match panic::catch_unwind(AssertUnwindSafe(body)) {
            Ok(()) => TestStatus::Passed,
            Err(payload) => TestStatus::Failed(panic_message(payload.as_ref())),
        };
        self.records.push(TestRecord {
            path: self.path.clone(),
            name: name.to_string(),
            status,
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

// =============================================================================
// REPORTING
// =============================================================================

/// Pass/fail totals of a recorded run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    pub passed: usize,
    pub failed: usize,
    pub failures: Vec<TestRecord>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Writes each failure and a summary line, colored when `out` supports it.
    pub fn write_to<W: WriteColor>(&self, out: &mut W) -> io::Result<()> {
        for failure in &self.failures {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(out, "FAIL")?;
            out.reset()?;
            writeln!(out, " {}", failure.full_name())?;
            if let TestStatus::Failed(message) = &failure.status {
                writeln!(out, "     {message}")?;
            }
        }

        let color = if self.is_success() {
            Color::Green
        } else {
            Color::Red
        };
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(out, "{} passed, {} failed", self.passed, self.failed)?;
        out.reset()?;
        writeln!(out, " ({} total)", self.total())
    }
}
