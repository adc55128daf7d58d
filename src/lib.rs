//! Combotest: combinatorial test-case generation.
//!
//! Declare the independent inputs of a behaviour as [`Dimension`]s, declare the
//! outcomes you expect, and write one decision function mapping every combination
//! of values to an outcome. [`OutcomeMatrix`] enumerates the full cartesian
//! product and resolves each combination; [`TestOutcomeMatrix`] turns each one
//! into a named test group with a context built from the dimensions' effects.
//!
//! ```rust
//! use combotest::{Dimension, Dimensions, Harness, OutcomeMatrix, Recorder, TestOutcomeMatrix};
//!
//! #[derive(Default)]
//! struct Ctx {
//!     role: String,
//!     feature: bool,
//! }
//!
//! fn is_allowed(ctx: &Ctx) -> bool {
//!     ctx.role == "admin" || ctx.feature
//! }
//!
//! let role = Dimension::builder("Role", ["admin", "user", "readonly"])
//!     .apply(|role, ctx: &mut Ctx| ctx.role = role.to_string())
//!     .build()
//!     .unwrap();
//! let feature = Dimension::boolean("Feature Enabled")
//!     .apply(|enabled, ctx: &mut Ctx| ctx.feature = *enabled)
//!     .build()
//!     .unwrap();
//!
//! let dims = Dimensions::new().with("role", role).with("feature", feature);
//! let mut matrix = TestOutcomeMatrix::new(
//!     OutcomeMatrix::new(dims, ["allowed", "notAllowed"], "notAllowed").unwrap(),
//! );
//! matrix.define_outcomes(|v| {
//!     (v.is("role", &"admin") || v.is("feature", &true)).then_some("allowed")
//! });
//!
//! let mut recorder = Recorder::new();
//! matrix
//!     .test_outcomes(&mut recorder, |harness, apply, outcome| {
//!         let ctx = apply.default_context();
//!         let expected = *outcome == "allowed";
//!         harness.test("is allowed?", move || assert_eq!(is_allowed(&ctx), expected));
//!     })
//!     .unwrap();
//! assert_eq!(recorder.report().passed, 7);
//! ```

pub mod cli;
pub mod config;
pub mod dimension;
pub mod errors;
pub mod groups;
pub mod harness;
pub mod manifest;
pub mod matrix;
pub mod recorder;
pub mod table;
pub mod utils;

pub use crate::config::{PartialRenderConfig, RenderConfig};
pub use crate::dimension::{Dimension, DimensionBuilder};
pub use crate::errors::{ErrorCategory, MatrixError};
pub use crate::groups::ValueGroups;
pub use crate::harness::{ApplyDimensions, Harness, TestOutcomeMatrix};
pub use crate::matrix::{Combination, Dimensions, EnumerateOptions, Order, OutcomeMatrix, Values};
pub use crate::recorder::{Recorder, SuiteReport, TestRecord, TestStatus};
