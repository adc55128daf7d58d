//! Named subsets of a dimension's domain.
//!
//! Decision functions often read more clearly in terms of groups ("any privileged
//! role") than of individual values. [`ValueGroups`] precomputes such subsets once
//! and answers membership questions, so a decision function can stay a plain
//! boolean expression:
//!
//! ```rust
//! use combotest::ValueGroups;
//!
//! let roles = ValueGroups::builder(&["admin", "owner", "user", "readonly"])
//!     .group("privileged", ["admin", "owner"])
//!     .build()
//!     .unwrap();
//!
//! assert!(roles.contains("privileged", &"owner"));
//! assert!(roles.contains("other", &"user"));
//! assert!(roles.contains("all", &"readonly"));
//! assert_eq!(roles.group_of(&"readonly"), Some("other"));
//! ```
//!
//! Two group names are reserved: `all` holds the whole domain and `other` holds
//! every value not assigned to a named group. Each value belongs to at most one
//! named group.

use std::fmt;

use crate::dimension::Dimension;
use crate::errors::{join_debug, MatrixError, Result};
use crate::utils::{repeated, subtract, symmetric_difference};

/// Group names that are computed rather than declared.
pub const RESERVED_GROUP_NAMES: [&str; 2] = ["all", "other"];

/// Validated named subsets of one domain, plus `all` and `other`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGroups<T> {
    named: Vec<(String, Vec<T>)>,
    other: Vec<T>,
    all: Vec<T>,
}

impl<T> ValueGroups<T>
where
    T: PartialEq + Clone + fmt::Debug,
{
    pub fn builder(domain: &[T]) -> ValueGroupsBuilder<T> {
        ValueGroupsBuilder {
            domain: domain.to_vec(),
            groups: Vec::new(),
        }
    }

    /// Starts groups over the values of `dimension`.
    pub fn for_dimension<C>(dimension: &Dimension<T, C>) -> ValueGroupsBuilder<T> {
        Self::builder(dimension.values())
    }

    /// Members of `group`, including the reserved `all` and `other`.
    pub fn members(&self, group: &str) -> Option<&[T]> {
        match group {
            "all" => Some(&self.all),
            "other" => Some(&self.other),
            _ => self
                .named
                .iter()
                .find(|(name, _)| name == group)
                .map(|(_, members)| members.as_slice()),
        }
    }

    /// Whether `value` is a member of `group`. Unknown groups contain nothing.
    pub fn contains(&self, group: &str, value: &T) -> bool {
        self.members(group)
            .is_some_and(|members| members.contains(value))
    }

    /// The named group holding `value`, `"other"` for ungrouped domain values, or
    /// `None` when `value` is outside the domain.
    pub fn group_of(&self, value: &T) -> Option<&str> {
        if let Some((name, _)) = self.named.iter().find(|(_, members)| members.contains(value)) {
            return Some(name.as_str());
        }
        self.other.contains(value).then_some("other")
    }

    /// Declared group names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.named.iter().map(|(name, _)| name.as_str())
    }
}

impl ValueGroups<bool> {
    /// `false` and `true` groups over a domain that must be exactly `[false, true]`.
    /// `other` is empty.
    pub fn boolean(domain: &[bool]) -> Result<Self> {
        if !symmetric_difference(domain, &[false, true]).is_empty() {
            return Err(MatrixError::NotBooleanDomain {
                domain: join_debug(domain),
            });
        }
        Self::builder(domain)
            .group("false", [false])
            .group("true", [true])
            .build()
    }
}

/// Collects group declarations; validation happens in [`ValueGroupsBuilder::build`].
#[derive(Debug, Clone)]
pub struct ValueGroupsBuilder<T> {
    domain: Vec<T>,
    groups: Vec<(String, Vec<T>)>,
}

impl<T> ValueGroupsBuilder<T>
where
    T: PartialEq + Clone + fmt::Debug,
{
    pub fn group(mut self, name: impl Into<String>, members: impl IntoIterator<Item = T>) -> Self {
        self.groups
            .push((name.into(), members.into_iter().collect()));
        self
    }

    pub fn build(self) -> Result<ValueGroups<T>> {
        if let Some((name, _)) = self
            .groups
            .iter()
            .find(|(name, _)| RESERVED_GROUP_NAMES.contains(&name.as_str()))
        {
            return Err(MatrixError::ReservedGroupName {
                name: name.clone(),
                reserved: RESERVED_GROUP_NAMES.join(", "),
            });
        }

        let names: Vec<&str> = self.groups.iter().map(|(name, _)| name.as_str()).collect();
        if let Some(name) = repeated(&names).first() {
            return Err(MatrixError::DuplicateGroupName {
                name: name.to_string(),
            });
        }

        if let Some((name, _)) = self.groups.iter().find(|(_, members)| members.is_empty()) {
            return Err(MatrixError::EmptyGroup { name: name.clone() });
        }

        let grouped: Vec<T> = self
            .groups
            .iter()
            .flat_map(|(_, members)| members.iter().cloned())
            .collect();

        let unexpected = subtract(&grouped, &self.domain);
        if !unexpected.is_empty() {
            return Err(MatrixError::UnknownGroupValue {
                values: join_debug(&unexpected),
                domain: join_debug(&self.domain),
            });
        }

        let overlapping = repeated(&grouped);
        if !overlapping.is_empty() {
            return Err(MatrixError::OverlappingGroups {
                values: join_debug(&overlapping),
            });
        }

        Ok(ValueGroups {
            other: subtract(&self.domain, &grouped),
            all: self.domain,
            named: self.groups,
        })
    }
}
