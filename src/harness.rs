//! Binding an outcome matrix to a test framework.
//!
//! [`TestOutcomeMatrix`] turns every combination of an [`OutcomeMatrix`] into a
//! named group of tests. The framework itself stays external: the binding only
//! needs the two registration primitives of the [`Harness`] trait.
//!
//! For each call to [`TestOutcomeMatrix::test_outcomes`]:
//!
//! 1. a header group is emitted, named by the header row and holding a single
//!    placeholder test, so the dimension headers render as a table row;
//! 2. for every accepted combination a group named by the padded value row is
//!    opened; inside it every dimension's setup effect runs (in dimension order),
//!    then the caller's body is invoked with an [`ApplyDimensions`] handle and the
//!    resolved outcome.
//!
//! The context is only built when the body asks for it through
//! [`ApplyDimensions::context`]. Apply effects run in dimension order over the
//! seed, so a later dimension wins when two write the same field.

use std::fmt;

use log::debug;

use crate::config::RenderConfig;
use crate::errors::{MatrixError, Result};
use crate::matrix::{Combination, EnumerateOptions, OutcomeMatrix, Values};
use crate::table::TableLayout;

/// The registration primitives of an external test framework.
///
/// Both methods must run their body synchronously, before returning.
pub trait Harness {
    /// Opens a named scope and runs `body` inside it.
    fn group<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut Self);

    /// Registers (and, for synchronous harnesses, runs) a single test.
    fn test<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce();
}

/// Builds the context of one combination on demand.
pub struct ApplyDimensions<'a, C> {
    combination: Combination<'a, C>,
}

impl<'a, C> ApplyDimensions<'a, C> {
    /// Runs every apply effect over `seed`, in dimension order, and returns it.
    pub fn context(&self, mut seed: C) -> C {
        self.combination.apply_to(&mut seed);
        seed
    }

    /// Runs every apply effect over `C::default()`.
    pub fn default_context(&self) -> C
    where
        C: Default,
    {
        self.context(C::default())
    }

    /// Runs every apply effect over an existing context.
    pub fn apply_to(&self, context: &mut C) {
        self.combination.apply_to(context);
    }

    /// The values of the combination being exercised.
    pub fn values(&self) -> Values<'a> {
        self.combination.values()
    }
}

impl<C> fmt::Debug for ApplyDimensions<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApplyDimensions")
            .field(&self.combination)
            .finish()
    }
}

/// An outcome matrix that generates named test groups.
pub struct TestOutcomeMatrix<O, C = ()> {
    matrix: OutcomeMatrix<O, C>,
    layout: TableLayout,
    config: RenderConfig,
}

impl<O, C> TestOutcomeMatrix<O, C>
where
    O: Clone + PartialEq + fmt::Debug,
{
    pub fn new(matrix: OutcomeMatrix<O, C>) -> Self {
        Self::with_config(matrix, RenderConfig::default())
    }

    /// Measures the columns once, using `config.separator` between cells.
    pub fn with_config(matrix: OutcomeMatrix<O, C>, config: RenderConfig) -> Self {
        let layout = TableLayout::for_matrix(&matrix, config.separator.as_str());
        Self {
            matrix,
            layout,
            config,
        }
    }

    /// Sets the decision function of the underlying matrix. Last write wins.
    pub fn define_outcomes<F>(&mut self, decide: F)
    where
        F: Fn(&Values<'_>) -> Option<O> + 'static,
    {
        self.matrix.define_outcomes(decide);
    }

    pub fn matrix(&self) -> &OutcomeMatrix<O, C> {
        &self.matrix
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn column_widths(&self) -> &[usize] {
        self.layout.widths()
    }

    /// The dimension headers, padded and joined.
    pub fn header_row(&self) -> String {
        let headers: Vec<&str> = self.matrix.headers().collect();
        self.layout.render_row(&headers)
    }

    /// The formatted values of `combination`, padded and joined.
    pub fn row_name(&self, combination: &Combination<'_, C>) -> String {
        self.layout.render_row(&combination.labels())
    }

    /// Generates one group per accepted combination, in the configured order.
    pub fn test_outcomes<H, F>(&self, harness: &mut H, body: F) -> Result<()>
    where
        H: Harness,
        F: FnMut(&mut H, &ApplyDimensions<'_, C>, &O),
    {
        let options = EnumerateOptions::new().order(self.config.order);
        self.test_outcomes_with(harness, &options, body)
    }

    /// Like [`test_outcomes`](Self::test_outcomes), with explicit traversal order
    /// and filter. Options pass through to the engine unchanged.
    pub fn test_outcomes_with<H, F>(
        &self,
        harness: &mut H,
        options: &EnumerateOptions<O>,
        mut body: F,
    ) -> Result<()>
    where
        H: Harness,
        F: FnMut(&mut H, &ApplyDimensions<'_, C>, &O),
    {
        self.print_headers(harness);

        let mut generated = 0usize;
        self.matrix
            .try_for_each(options, |combination, outcome| {
                let name = self.row_name(combination);
                let apply = ApplyDimensions {
                    combination: *combination,
                };
                harness.group(&name, |harness| {
                    combination.run_setup();
                    body(harness, &apply, outcome);
                });
                generated += 1;
                Ok::<(), MatrixError>(())
            })?;

        debug!(
            "generated {} group(s) for {} combination(s)",
            generated,
            self.matrix.combination_count()
        );
        Ok(())
    }

    fn print_headers<H: Harness>(&self, harness: &mut H) {
        let header = self.header_row();
        harness.group(&header, |harness| {
            // placeholder so the header renders as a row of its own
            harness.test(&self.config.header_test_name, || {});
        });
    }
}

impl<O: fmt::Debug, C> fmt::Debug for TestOutcomeMatrix<O, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestOutcomeMatrix")
            .field("matrix", &self.matrix)
            .field("column_widths", &self.layout.widths())
            .finish()
    }
}
