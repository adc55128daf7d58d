//! YAML manifests: outcome matrices declared as data.
//!
//! A manifest lists string-valued dimensions, the declared outcomes with their
//! default, and an ordered list of rules. The first rule whose conditions all hold
//! decides the outcome; a combination no rule matches gets the default.
//!
//! ```yaml
//! dimensions:
//!   - key: role
//!     header: Role
//!     values: [admin, user, readonly]
//!   - key: feature
//!     header: Feature Enabled
//!     values: [false, true]
//! outcomes: [allowed, notAllowed]
//! default: notAllowed
//! rules:
//!   - when: { role: admin }
//!     outcome: allowed
//!   - when: { feature: true }
//!     outcome: allowed
//! config:
//!   order: dimensions
//! ```
//!
//! Scalars are compared by their rendered text, so `true` and `"true"` are the
//! same value. Rule keys and values are checked against the dimensions when the
//! matrix is built; rule outcomes are checked by the engine as combinations are
//! resolved.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;
use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{merge_defaults, PartialRenderConfig, RenderConfig};
use crate::dimension::Dimension;
use crate::errors::MatrixError;
use crate::harness::TestOutcomeMatrix;
use crate::matrix::{Dimensions, OutcomeMatrix, Values};

// =============================================================================
// ERRORS
// =============================================================================

/// Failures loading a manifest or building its matrix.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    #[error("failed to read manifest {path}")]
    #[diagnostic(code(combotest::manifest::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {origin}: {source}")]
    #[diagnostic(
        code(combotest::manifest::yaml),
        help("a manifest needs `dimensions`, `outcomes` and `default`; `rules` and `config` are optional")
    )]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("rule {rule} refers to unknown dimension \"{key}\"")]
    #[diagnostic(
        code(combotest::manifest::unknown_dimension),
        help("declared dimensions: {known}")
    )]
    UnknownDimension {
        rule: usize,
        key: String,
        known: String,
    },

    #[error("rule {rule} matches value \"{value}\" which dimension \"{key}\" does not have")]
    #[diagnostic(
        code(combotest::manifest::unknown_value),
        help("values of \"{key}\": {domain}")
    )]
    UnknownValue {
        rule: usize,
        key: String,
        value: String,
        domain: String,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Matrix(#[from] MatrixError),
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// A YAML scalar, compared by its rendered text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::Text(value) => f.write_str(value),
        }
    }
}

/// Either a single accepted value or a list of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    One(Scalar),
    AnyOf(Vec<Scalar>),
}

impl Condition {
    fn labels(&self) -> Vec<String> {
        match self {
            Condition::One(value) => vec![value.to_string()],
            Condition::AnyOf(values) => values.iter().map(Scalar::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DimensionSpec {
    pub key: String,
    /// Column header; the key when omitted.
    #[serde(default)]
    pub header: Option<String>,
    pub values: Vec<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    /// Every listed dimension must hold one of the accepted values.
    #[serde(default)]
    pub when: BTreeMap<String, Condition>,
    pub outcome: String,
}

/// A parsed manifest, not yet validated against itself.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub dimensions: Vec<DimensionSpec>,
    pub outcomes: Vec<String>,
    pub default: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub config: PartialRenderConfig,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let origin = path.display().to_string();
        let source = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: origin.clone(),
            source,
        })?;
        Self::parse_named(&source, origin)
    }

    pub fn parse(source: &str) -> Result<Self, ManifestError> {
        Self::parse_named(source, "<inline>".to_string())
    }

    fn parse_named(source: &str, origin: String) -> Result<Self, ManifestError> {
        let manifest: Manifest =
            serde_yaml::from_str(source).map_err(|source| ManifestError::Yaml {
                origin: origin.clone(),
                source,
            })?;
        debug!(
            "loaded manifest {origin}: {} dimension(s), {} rule(s)",
            manifest.dimensions.len(),
            manifest.rules.len()
        );
        Ok(manifest)
    }

    /// Builds the matrix with the manifest's rules as its decision function.
    pub fn into_matrix(self) -> Result<OutcomeMatrix<String>, ManifestError> {
        let mut dimensions: Dimensions = Dimensions::new();
        let mut domains: Vec<(String, Vec<String>)> = Vec::with_capacity(self.dimensions.len());

        for spec in self.dimensions {
            let labels: Vec<String> = spec.values.iter().map(Scalar::to_string).collect();
            let header = spec.header.unwrap_or_else(|| spec.key.clone());
            let dimension = Dimension::builder(header, labels).build()?;
            domains.push((spec.key.clone(), dimension.values().to_vec()));
            dimensions = dimensions.with(spec.key, dimension);
        }

        let mut matrix = OutcomeMatrix::new(dimensions, self.outcomes, self.default)?;

        let rules = self
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| CompiledRule::compile(index + 1, rule, &domains))
            .collect::<Result<Vec<_>, _>>()?;

        if !rules.is_empty() {
            matrix.define_outcomes(move |values| {
                rules
                    .iter()
                    .find(|rule| rule.matches(values))
                    .map(|rule| rule.outcome.clone())
            });
        }
        Ok(matrix)
    }

    /// Builds the test binding, layering `overrides` over the manifest's own config.
    pub fn build(
        mut self,
        overrides: PartialRenderConfig,
    ) -> Result<TestOutcomeMatrix<String>, ManifestError> {
        let partial = std::mem::take(&mut self.config).overlay(overrides);
        let config = merge_defaults(RenderConfig::default(), partial);
        Ok(TestOutcomeMatrix::with_config(self.into_matrix()?, config))
    }
}

// =============================================================================
// RULES
// =============================================================================

struct CompiledRule {
    conditions: Vec<(String, Vec<String>)>,
    outcome: String,
}

impl CompiledRule {
    fn compile(
        rule_number: usize,
        rule: &Rule,
        domains: &[(String, Vec<String>)],
    ) -> Result<Self, ManifestError> {
        let mut conditions = Vec::with_capacity(rule.when.len());
        for (key, condition) in &rule.when {
            let Some((_, domain)) = domains.iter().find(|(name, _)| name == key) else {
                return Err(ManifestError::UnknownDimension {
                    rule: rule_number,
                    key: key.clone(),
                    known: domains
                        .iter()
                        .map(|(name, _)| name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            };
            let accepted = condition.labels();
            if let Some(value) = accepted.iter().find(|value| !domain.contains(value)) {
                return Err(ManifestError::UnknownValue {
                    rule: rule_number,
                    key: key.clone(),
                    value: value.clone(),
                    domain: domain.join(", "),
                });
            }
            conditions.push((key.clone(), accepted));
        }
        Ok(Self {
            conditions,
            outcome: rule.outcome.clone(),
        })
    }

    fn matches(&self, values: &Values<'_>) -> bool {
        self.conditions.iter().all(|(key, accepted)| {
            values
                .get::<String>(key)
                .is_some_and(|value| accepted.contains(value))
        })
    }
}
