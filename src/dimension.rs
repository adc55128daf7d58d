//! Dimensions: the independent input axes a matrix enumerates over.
//!
//! A [`Dimension`] couples a finite, ordered domain of values with the effects
//! needed to realise one of those values in a test:
//!
//! - a **formatter**, used only for display in generated test names;
//! - an optional **setup** effect, run once in the scope of every generated group
//!   that uses the value (independent of any context);
//! - an optional **apply** effect, which writes the value into a context of type `C`.
//!
//! Dimensions are immutable once built and hold no per-invocation state, so the
//! same dimension may be registered into several matrices through an `Arc`.
//!
//! ```rust
//! use combotest::Dimension;
//!
//! #[derive(Default)]
//! struct Ctx {
//!     role: String,
//! }
//!
//! let role = Dimension::builder("Role", ["admin", "user", "readonly"])
//!     .apply(|role, ctx: &mut Ctx| ctx.role = role.to_string())
//!     .build()
//!     .unwrap();
//! assert_eq!(role.len(), 3);
//! assert_eq!(role.format_value(&"admin"), "admin");
//! ```

use std::fmt;

use log::warn;

use crate::errors::{MatrixError, Result};
use crate::utils::dedup_stable;

/// Renders a value for display in test names.
pub type Formatter<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// Side effect scoped to every group using a value.
pub type SetupEffect<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Side effect installing a value into a context.
pub type ApplyEffect<T, C> = Box<dyn Fn(&T, &mut C) + Send + Sync>;

// =============================================================================
// DIMENSION
// =============================================================================

/// One input axis of an outcome matrix.
pub struct Dimension<T, C = ()> {
    header: String,
    values: Vec<T>,
    formatter: Formatter<T>,
    setup: Option<SetupEffect<T>>,
    apply: Option<ApplyEffect<T, C>>,
}

impl<T, C> Dimension<T, C>
where
    T: fmt::Display + PartialEq + 'static,
{
    /// Starts a dimension whose values display through their `Display` impl.
    pub fn builder(
        header: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> DimensionBuilder<T, C> {
        DimensionBuilder::new(header.into(), values.into_iter().collect(), |value: &T| {
            value.to_string()
        })
    }
}

impl<T, C> Dimension<T, C>
where
    T: PartialEq + 'static,
{
    /// Starts a dimension for value types without a `Display` impl.
    pub fn builder_with_format<F>(
        header: impl Into<String>,
        values: impl IntoIterator<Item = T>,
        formatter: F,
    ) -> DimensionBuilder<T, C>
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        DimensionBuilder::new(header.into(), values.into_iter().collect(), formatter)
    }
}

impl<C> Dimension<bool, C> {
    /// Starts a dimension over exactly `[false, true]`.
    pub fn boolean(header: impl Into<String>) -> DimensionBuilder<bool, C> {
        Dimension::builder(header, [false, true])
    }
}

impl<T, C> Dimension<T, C> {
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The domain, in declaration order. Never empty.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a built dimension; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn format_value(&self, value: &T) -> String {
        (self.formatter)(value)
    }

    pub fn has_setup(&self) -> bool {
        self.setup.is_some()
    }

    /// Whether this dimension contributes anything to the context.
    pub fn has_apply(&self) -> bool {
        self.apply.is_some()
    }

    /// Runs the setup effect for `value`, if one was declared.
    pub fn run_setup(&self, value: &T) {
        if let Some(setup) = &self.setup {
            setup(value);
        }
    }

    /// Installs `value` into `context`, if an apply effect was declared.
    pub fn apply(&self, value: &T, context: &mut C) {
        if let Some(apply) = &self.apply {
            apply(value, context);
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Dimension<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dimension")
            .field("header", &self.header)
            .field("values", &self.values)
            .field("setup", &self.setup.is_some())
            .field("apply", &self.apply.is_some())
            .finish()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builder returned by [`Dimension::builder`] and friends.
pub struct DimensionBuilder<T, C = ()> {
    header: String,
    values: Vec<T>,
    formatter: Formatter<T>,
    setup: Option<SetupEffect<T>>,
    apply: Option<ApplyEffect<T, C>>,
}

impl<T, C> DimensionBuilder<T, C>
where
    T: PartialEq + 'static,
{
    fn new<F>(header: String, values: Vec<T>, formatter: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            header,
            values,
            formatter: Box::new(formatter),
            setup: None,
            apply: None,
        }
    }

    /// Replaces the formatter used for test names.
    pub fn format_with<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.formatter = Box::new(formatter);
        self
    }

    /// Declares an effect run in the scope of every generated group using a value.
    pub fn setup<F>(mut self, setup: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.setup = Some(Box::new(setup));
        self
    }

    /// Declares how a value is written into the context.
    pub fn apply<F>(mut self, apply: F) -> Self
    where
        F: Fn(&T, &mut C) + Send + Sync + 'static,
    {
        self.apply = Some(Box::new(apply));
        self
    }

    /// Validates the domain and produces the dimension.
    ///
    /// Repeated values are dropped, keeping the first occurrence.
    pub fn build(self) -> Result<Dimension<T, C>> {
        if self.values.is_empty() {
            return Err(MatrixError::EmptyDomain {
                header: self.header,
            });
        }
        let (values, dropped) = dedup_stable(self.values);
        if dropped > 0 {
            warn!(
                "dimension \"{}\": dropped {} repeated value(s)",
                self.header, dropped
            );
        }
        Ok(Dimension {
            header: self.header,
            values,
            formatter: self.formatter,
            setup: self.setup,
            apply: self.apply,
        })
    }
}
