//! The outcome resolution engine.
//!
//! An [`OutcomeMatrix`] owns an ordered set of dimensions, a closed set of declared
//! outcomes with a default, and a decision function. Enumeration walks the full
//! cartesian product of the dimension domains, depth-first in registration order,
//! resolves every combination to exactly one declared outcome, and hands accepted
//! combinations to a visitor.
//!
//! # Traversal order
//!
//! - [`Order::Dimensions`]: raw cartesian order, outcomes interleaved.
//! - [`Order::Outcomes`] (the default): one full cartesian pass per declared
//!   outcome, in declaration order, keeping only the combinations resolving to
//!   that outcome. The set of visited combinations is the same as in dimension
//!   order; only grouping differs. The decision function is consulted once per
//!   combination *per pass*, so it must be free of side effects.
//!
//! # Values and typing
//!
//! Dimensions keep their own value type `T`. The engine erases it behind
//! [`Values`], from which the decision function reads values back by key with
//! [`Values::get`]. The context type `C` is fixed per matrix; dimensions written
//! against a smaller part of the context are registered with
//! [`Dimensions::with_part`], which requires `C: AsMut<Part>` at compile time.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;
use crate::errors::{MatrixError, Result};
use crate::utils::repeated;

/// Maps a combination's values to an outcome; `None` selects the default.
pub type DecisionFn<O> = Box<dyn Fn(&Values<'_>) -> Option<O>>;

/// Inclusion filter over a resolved combination.
pub type Filter<O> = Box<dyn Fn(&Values<'_>, &O) -> bool>;

// =============================================================================
// TYPE-ERASED DIMENSIONS
// =============================================================================

/// A dimension with its value type erased, as stored inside a matrix.
pub(crate) trait ErasedDimension<C> {
    fn header(&self) -> &str;
    fn len(&self) -> usize;
    fn value(&self, index: usize) -> &(dyn Any + 'static);
    fn label(&self, index: usize) -> String;
    fn setup(&self, index: usize);
    fn apply(&self, index: usize, context: &mut C);
}

impl<T: 'static, C> ErasedDimension<C> for Arc<Dimension<T, C>> {
    fn header(&self) -> &str {
        Dimension::header(self)
    }

    fn len(&self) -> usize {
        Dimension::len(self)
    }

    fn value(&self, index: usize) -> &(dyn Any + 'static) {
        &self.values()[index]
    }

    fn label(&self, index: usize) -> String {
        self.format_value(&self.values()[index])
    }

    fn setup(&self, index: usize) {
        self.run_setup(&self.values()[index]);
    }

    fn apply(&self, index: usize, context: &mut C) {
        Dimension::apply(self, &self.values()[index], context);
    }
}

/// A dimension whose effects target a part `P` of the matrix context.
struct PartDimension<T, P> {
    inner: Arc<Dimension<T, P>>,
}

impl<T: 'static, P, C: AsMut<P>> ErasedDimension<C> for PartDimension<T, P> {
    fn header(&self) -> &str {
        self.inner.header()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn value(&self, index: usize) -> &(dyn Any + 'static) {
        &self.inner.values()[index]
    }

    fn label(&self, index: usize) -> String {
        self.inner.format_value(&self.inner.values()[index])
    }

    fn setup(&self, index: usize) {
        self.inner.run_setup(&self.inner.values()[index]);
    }

    fn apply(&self, index: usize, context: &mut C) {
        Dimension::apply(&self.inner, &self.inner.values()[index], context.as_mut());
    }
}

pub(crate) struct Entry<C> {
    pub(crate) key: String,
    pub(crate) dimension: Box<dyn ErasedDimension<C>>,
}

impl<C> Entry<C> {
    /// Formatted labels of every value, in domain order.
    pub(crate) fn labels(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.dimension.len()).map(|index| self.dimension.label(index))
    }
}

// =============================================================================
// DIMENSION SET
// =============================================================================

/// Ordered collection of keyed dimensions sharing a context type `C`.
///
/// Registration order is enumeration order, display order, and the order in which
/// apply effects run (so later dimensions win when they touch the same field).
pub struct Dimensions<C = ()> {
    entries: Vec<Entry<C>>,
}

impl<C: 'static> Dimensions<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a dimension whose effects target the whole context.
    pub fn with<T: 'static>(self, key: impl Into<String>, dimension: Dimension<T, C>) -> Self {
        self.with_shared(key, Arc::new(dimension))
    }

    /// Registers a dimension shared with other matrices.
    pub fn with_shared<T: 'static>(
        mut self,
        key: impl Into<String>,
        dimension: Arc<Dimension<T, C>>,
    ) -> Self {
        self.entries.push(Entry {
            key: key.into(),
            dimension: Box::new(dimension),
        });
        self
    }

    /// Registers a dimension whose effects target a part of the context.
    pub fn with_part<T: 'static, P: 'static>(
        self,
        key: impl Into<String>,
        dimension: Dimension<T, P>,
    ) -> Self
    where
        C: AsMut<P>,
    {
        self.with_shared_part(key, Arc::new(dimension))
    }

    /// Shared variant of [`Dimensions::with_part`].
    pub fn with_shared_part<T: 'static, P: 'static>(
        mut self,
        key: impl Into<String>,
        dimension: Arc<Dimension<T, P>>,
    ) -> Self
    where
        C: AsMut<P>,
    {
        self.entries.push(Entry {
            key: key.into(),
            dimension: Box::new(PartDimension { inner: dimension }),
        });
        self
    }
}

impl<C> Dimensions<C> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }
}

impl<C: 'static> Default for Dimensions<C> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// VALUE VIEWS
// =============================================================================

/// The plain, value-only view of a combination: dimension key to value.
#[derive(Clone)]
pub struct Values<'a> {
    entries: Vec<(&'a str, &'a (dyn Any + 'static))>,
}

impl<'a> Values<'a> {
    /// The value of dimension `key`, if it exists and holds a `T`.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&'a T> {
        self.raw(key)?.downcast_ref::<T>()
    }

    /// Whether dimension `key` currently holds `expected`.
    pub fn is<T: PartialEq + 'static>(&self, key: &str, expected: &T) -> bool {
        self.get::<T>(key) == Some(expected)
    }

    pub fn raw(&self, key: &str) -> Option<&'a (dyn Any + 'static)> {
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| *value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Values<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

/// One full assignment of a value to every dimension, alive for one visit.
pub struct Combination<'a, C> {
    entries: &'a [Entry<C>],
    indices: &'a [usize],
}

impl<C> Clone for Combination<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Combination<'_, C> {}

impl<'a, C> Combination<'a, C> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    /// Index of each dimension's current value within its domain.
    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    pub fn get<T: 'static>(&self, key: &str) -> Option<&'a T> {
        self.values().get(key)
    }

    pub fn values(&self) -> Values<'a> {
        Values {
            entries: self
                .entries
                .iter()
                .zip(self.indices)
                .map(|(entry, &index)| (entry.key.as_str(), entry.dimension.value(index)))
                .collect(),
        }
    }

    /// Each dimension's current value, formatted for display.
    pub fn labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .zip(self.indices)
            .map(|(entry, &index)| entry.dimension.label(index))
            .collect()
    }

    /// Runs every dimension's setup effect for its current value, in order.
    pub fn run_setup(&self) {
        for (entry, &index) in self.entries.iter().zip(self.indices) {
            entry.dimension.setup(index);
        }
    }

    /// Runs every dimension's apply effect for its current value, in order.
    pub fn apply_to(&self, context: &mut C) {
        for (entry, &index) in self.entries.iter().zip(self.indices) {
            entry.dimension.apply(index, context);
        }
    }
}

impl<C> fmt::Debug for Combination<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.keys().zip(self.labels()))
            .finish()
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// How enumeration groups the combinations it visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// One pass per declared outcome, in declaration order.
    #[default]
    Outcomes,
    /// Pure cartesian order.
    Dimensions,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Outcomes => write!(f, "outcomes"),
            Order::Dimensions => write!(f, "dimensions"),
        }
    }
}

/// Traversal options for [`OutcomeMatrix::for_each`].
pub struct EnumerateOptions<O> {
    order: Order,
    only: Option<Filter<O>>,
}

impl<O> EnumerateOptions<O> {
    pub fn new() -> Self {
        Self {
            order: Order::default(),
            only: None,
        }
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Keeps only combinations for which `filter` returns true. Rejected
    /// combinations are never visited.
    pub fn only<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Values<'_>, &O) -> bool + 'static,
    {
        self.only = Some(Box::new(filter));
        self
    }

    pub fn traversal_order(&self) -> Order {
        self.order
    }

    fn accepts(&self, values: &Values<'_>, outcome: &O) -> bool {
        self.only
            .as_ref()
            .map_or(true, |filter| filter(values, outcome))
    }
}

impl<O> Default for EnumerateOptions<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> fmt::Debug for EnumerateOptions<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumerateOptions")
            .field("order", &self.order)
            .field("only", &self.only.is_some())
            .finish()
    }
}

// =============================================================================
// OUTCOME MATRIX
// =============================================================================

/// Cartesian enumeration and outcome resolution over a set of dimensions.
pub struct OutcomeMatrix<O, C = ()> {
    dimensions: Vec<Entry<C>>,
    outcomes: Vec<O>,
    default_outcome: O,
    decide: Option<DecisionFn<O>>,
}

impl<O, C> OutcomeMatrix<O, C>
where
    O: Clone + PartialEq + fmt::Debug,
{
    /// Builds a matrix, validating its configuration.
    ///
    /// Fails when there are no dimensions, a dimension key repeats, an outcome is
    /// declared twice, or `default_outcome` is not among `outcomes`.
    pub fn new(
        dimensions: Dimensions<C>,
        outcomes: impl IntoIterator<Item = O>,
        default_outcome: O,
    ) -> Result<Self> {
        let outcomes: Vec<O> = outcomes.into_iter().collect();

        if dimensions.is_empty() {
            return Err(MatrixError::NoDimensions);
        }
        let keys: Vec<&str> = dimensions.keys().collect();
        if let Some(key) = repeated(&keys).first() {
            return Err(MatrixError::DuplicateDimension {
                key: key.to_string(),
            });
        }
        if let Some(outcome) = repeated(&outcomes).first() {
            return Err(MatrixError::DuplicateOutcome {
                outcome: format!("{outcome:?}"),
            });
        }
        if !outcomes.contains(&default_outcome) {
            return Err(MatrixError::undeclared_default(&default_outcome, &outcomes));
        }

        Ok(Self {
            dimensions: dimensions.entries,
            outcomes,
            default_outcome,
            decide: None,
        })
    }

    /// Sets the decision function. Last write wins; an unset function always
    /// yields the default outcome.
    pub fn define_outcomes<F>(&mut self, decide: F)
    where
        F: Fn(&Values<'_>) -> Option<O> + 'static,
    {
        self.decide = Some(Box::new(decide));
    }

    /// Resolves a value view to its declared outcome.
    pub fn resolve(&self, values: &Values<'_>) -> Result<O> {
        let outcome = self
            .decide
            .as_ref()
            .and_then(|decide| decide(values))
            .unwrap_or_else(|| self.default_outcome.clone());

        if !self.outcomes.contains(&outcome) {
            return Err(MatrixError::undeclared_outcome(&outcome, &self.outcomes));
        }
        Ok(outcome)
    }

    /// Visits every accepted combination with its outcome.
    pub fn for_each<F>(&self, options: &EnumerateOptions<O>, mut visit: F) -> Result<()>
    where
        F: FnMut(&Combination<'_, C>, &O),
    {
        self.try_for_each(options, |combination, outcome| {
            visit(combination, outcome);
            Ok::<(), MatrixError>(())
        })
    }

    /// Like [`for_each`](Self::for_each), but the visitor may abort the traversal
    /// with its own error, which is returned unmodified.
    pub fn try_for_each<E, F>(&self, options: &EnumerateOptions<O>, mut visit: F) -> Result<(), E>
    where
        E: From<MatrixError>,
        F: FnMut(&Combination<'_, C>, &O) -> Result<(), E>,
    {
        debug!(
            "enumerating {} combination(s) over {} dimension(s) in {} order",
            self.combination_count(),
            self.dimensions.len(),
            options.order
        );
        let mut indices = Vec::with_capacity(self.dimensions.len());

        match options.order {
            Order::Dimensions => self.walk(
                &mut indices,
                &|values: &Values<'_>, outcome: &O| options.accepts(values, outcome),
                &mut visit,
            ),
            Order::Outcomes => {
                for target in &self.outcomes {
                    trace!("outcome pass {target:?}");
                    self.walk(
                        &mut indices,
                        &|values: &Values<'_>, outcome: &O| {
                            outcome == target && options.accepts(values, outcome)
                        },
                        &mut visit,
                    )?;
                }
                Ok(())
            }
        }
    }

    fn walk<E, A, F>(&self, indices: &mut Vec<usize>, accept: &A, visit: &mut F) -> Result<(), E>
    where
        E: From<MatrixError>,
        A: Fn(&Values<'_>, &O) -> bool,
        F: FnMut(&Combination<'_, C>, &O) -> Result<(), E>,
    {
        let Some(next) = self.dimensions.get(indices.len()) else {
            let combination = Combination {
                entries: &self.dimensions,
                indices,
            };
            let values = combination.values();
            let outcome = self.resolve(&values)?;
            if accept(&values, &outcome) {
                trace!("visit {combination:?} -> {outcome:?}");
                visit(&combination, &outcome)?;
            }
            return Ok(());
        };

        for index in 0..next.dimension.len() {
            indices.push(index);
            self.walk(indices, accept, visit)?;
            indices.pop();
        }
        Ok(())
    }
}

impl<O, C> OutcomeMatrix<O, C> {
    pub fn outcomes(&self) -> &[O] {
        &self.outcomes
    }

    pub fn default_outcome(&self) -> &O {
        &self.default_outcome
    }

    pub fn has_decision_fn(&self) -> bool {
        self.decide.is_some()
    }

    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.dimensions.iter().map(|entry| entry.key.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.dimensions.iter().map(|entry| entry.dimension.header())
    }

    /// Product of the domain sizes: how many combinations a full traversal visits.
    pub fn combination_count(&self) -> usize {
        self.dimensions
            .iter()
            .map(|entry| entry.dimension.len())
            .product()
    }

    pub(crate) fn entries(&self) -> &[Entry<C>] {
        &self.dimensions
    }
}

impl<O: fmt::Debug, C> fmt::Debug for OutcomeMatrix<O, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomeMatrix")
            .field("dimensions", &self.keys().collect::<Vec<_>>())
            .field("outcomes", &self.outcomes)
            .field("default_outcome", &self.default_outcome)
            .field("decision_fn", &self.decide.is_some())
            .finish()
    }
}
