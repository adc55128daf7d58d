//! Combotest Error Handling
//!
//! Every failure the engine itself can produce is a configuration defect: a
//! dimension with nothing to enumerate, a matrix with no dimensions, or a decision
//! function answering with a label nobody declared. None of these are recoverable,
//! so they are reported immediately and never retried or coerced.
//!
//! Panics raised from inside setup effects, apply effects, or test bodies are not
//! represented here. They belong to the combination being exercised and propagate
//! unmodified.

use miette::Diagnostic;
use thiserror::Error;

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Configuration errors raised while building or resolving an outcome matrix.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum MatrixError {
    #[error("dimension \"{header}\" must have at least one value defined")]
    #[diagnostic(
        code(combotest::config::empty_domain),
        help("give the dimension at least one value to enumerate")
    )]
    EmptyDomain { header: String },

    #[error("no dimensions provided")]
    #[diagnostic(
        code(combotest::config::no_dimensions),
        help("register at least one dimension before building the matrix")
    )]
    NoDimensions,

    #[error("dimension key \"{key}\" is registered more than once")]
    #[diagnostic(code(combotest::config::duplicate_dimension))]
    DuplicateDimension { key: String },

    #[error("outcome {outcome} is declared more than once")]
    #[diagnostic(code(combotest::config::duplicate_outcome))]
    DuplicateOutcome { outcome: String },

    #[error("default outcome {outcome} is not defined in the outcomes list: {declared}")]
    #[diagnostic(
        code(combotest::config::undeclared_default),
        help("the default outcome must be one of the declared outcomes")
    )]
    UndeclaredDefaultOutcome { outcome: String, declared: String },

    #[error("outcome {outcome} is not defined in the outcomes list: {declared}")]
    #[diagnostic(
        code(combotest::resolution::undeclared_outcome),
        help("the decision function returned a label outside the declared outcomes; declare it or return None to use the default")
    )]
    UndeclaredOutcome { outcome: String, declared: String },

    #[error("cannot use [{reserved}] as group names, they are reserved (found \"{name}\")")]
    #[diagnostic(code(combotest::group::reserved_name))]
    ReservedGroupName { name: String, reserved: String },

    #[error("group \"{name}\" is declared more than once")]
    #[diagnostic(
        code(combotest::group::duplicate_name),
        help("list every member of a group in a single declaration")
    )]
    DuplicateGroupName { name: String },

    #[error("cannot create an empty group \"{name}\"")]
    #[diagnostic(
        code(combotest::group::empty),
        help("values not assigned to any group are available through the \"other\" group")
    )]
    EmptyGroup { name: String },

    #[error("cannot create a group with value [{values}] because it is not defined in the dimension values [{domain}]")]
    #[diagnostic(code(combotest::group::unknown_value))]
    UnknownGroupValue { values: String, domain: String },

    #[error("each value must appear in exactly one group but found [{values}] in multiple groups")]
    #[diagnostic(code(combotest::group::overlapping))]
    OverlappingGroups { values: String },

    #[error("not a boolean dimension: expected values to be exactly [false, true] but found [{domain}]")]
    #[diagnostic(code(combotest::group::not_boolean))]
    NotBooleanDomain { domain: String },
}

/// Coarse classification of [`MatrixError`] variants, mostly useful in test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A single dimension is malformed.
    Dimension,
    /// The matrix as a whole is malformed.
    Matrix,
    /// The decision function misbehaved during enumeration.
    Resolution,
    /// A value grouping is malformed.
    Group,
}

impl MatrixError {
    /// Get the error category for test assertions
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyDomain { .. } => ErrorCategory::Dimension,

            Self::NoDimensions
            | Self::DuplicateDimension { .. }
            | Self::DuplicateOutcome { .. }
            | Self::UndeclaredDefaultOutcome { .. } => ErrorCategory::Matrix,

            Self::UndeclaredOutcome { .. } => ErrorCategory::Resolution,

            Self::ReservedGroupName { .. }
            | Self::DuplicateGroupName { .. }
            | Self::EmptyGroup { .. }
            | Self::UnknownGroupValue { .. }
            | Self::OverlappingGroups { .. }
            | Self::NotBooleanDomain { .. } => ErrorCategory::Group,
        }
    }

    /// Short machine-friendly suffix, matching the tail of the diagnostic code.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::EmptyDomain { .. } => "empty_domain",
            Self::NoDimensions => "no_dimensions",
            Self::DuplicateDimension { .. } => "duplicate_dimension",
            Self::DuplicateOutcome { .. } => "duplicate_outcome",
            Self::UndeclaredDefaultOutcome { .. } => "undeclared_default",
            Self::UndeclaredOutcome { .. } => "undeclared_outcome",
            Self::ReservedGroupName { .. } => "reserved_name",
            Self::DuplicateGroupName { .. } => "duplicate_name",
            Self::EmptyGroup { .. } => "empty",
            Self::UnknownGroupValue { .. } => "unknown_value",
            Self::OverlappingGroups { .. } => "overlapping",
            Self::NotBooleanDomain { .. } => "not_boolean",
        }
    }

    pub(crate) fn undeclared_default<O: std::fmt::Debug>(outcome: &O, declared: &[O]) -> Self {
        Self::UndeclaredDefaultOutcome {
            outcome: format!("{outcome:?}"),
            declared: join_debug(declared),
        }
    }

    pub(crate) fn undeclared_outcome<O: std::fmt::Debug>(outcome: &O, declared: &[O]) -> Self {
        Self::UndeclaredOutcome {
            outcome: format!("{outcome:?}"),
            declared: join_debug(declared),
        }
    }
}

/// Renders a list of values the way error messages quote them: `a, b, c`.
pub(crate) fn join_debug<T: std::fmt::Debug>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("{item:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T, E = MatrixError> = std::result::Result<T, E>;

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints any diagnostic with full miette rendering (code, help, causes).
///
/// Use this for user-facing error display in CLI contexts.
pub fn print_error<E>(error: E)
where
    E: Diagnostic + Send + Sync + 'static,
{
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
