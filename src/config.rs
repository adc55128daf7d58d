//! Rendering and traversal configuration.
//!
//! [`RenderConfig`] is the fully resolved configuration. Callers and manifests
//! usually only say what they want to change, so configuration arrives as a
//! [`PartialRenderConfig`] (every field optional, deserializable from YAML) and is
//! resolved with [`merge_defaults`]: a field left unset keeps its default, a field
//! that is set wins.
//!
//! ```rust
//! use combotest::config::{merge_defaults, PartialRenderConfig, RenderConfig};
//!
//! let partial = PartialRenderConfig {
//!     separator: Some(" / ".to_string()),
//!     ..PartialRenderConfig::default()
//! };
//! let config = merge_defaults(RenderConfig::default(), partial);
//! assert_eq!(config.separator, " / ");
//! assert_eq!(config.header_test_name, "Outcome");
//! ```

use serde::{Deserialize, Serialize};

use crate::matrix::Order;

/// Default separator between table cells.
pub const DEFAULT_SEPARATOR: &str = " | ";

/// Name of the placeholder test emitted under the header group.
pub const DEFAULT_HEADER_TEST_NAME: &str = "Outcome";

/// Resolved configuration for table rendering and traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Placed between cells of the header row and of every generated row.
    pub separator: String,
    /// Name of the single placeholder test under the header group.
    pub header_test_name: String,
    /// Traversal order used when the caller does not pick one.
    pub order: Order,
    /// Whether CLI output is colorized.
    pub use_colors: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            header_test_name: DEFAULT_HEADER_TEST_NAME.to_string(),
            order: Order::default(),
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl RenderConfig {
    /// Loads a partial configuration from YAML and resolves it over the defaults.
    pub fn from_yaml_str(source: &str) -> Result<Self, serde_yaml::Error> {
        let partial: PartialRenderConfig = serde_yaml::from_str(source)?;
        Ok(merge_defaults(Self::default(), partial))
    }
}

/// A configuration where every field may be left unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialRenderConfig {
    pub separator: Option<String>,
    pub header_test_name: Option<String>,
    pub order: Option<Order>,
    pub use_colors: Option<bool>,
}

impl PartialRenderConfig {
    /// Layers `over` on top of `self`; fields set in `over` win.
    pub fn overlay(self, over: PartialRenderConfig) -> PartialRenderConfig {
        PartialRenderConfig {
            separator: over.separator.or(self.separator),
            header_test_name: over.header_test_name.or(self.header_test_name),
            order: over.order.or(self.order),
            use_colors: over.use_colors.or(self.use_colors),
        }
    }
}

/// Fills every unset field of `partial` from `defaults`.
pub fn merge_defaults(defaults: RenderConfig, partial: PartialRenderConfig) -> RenderConfig {
    RenderConfig {
        separator: partial.separator.unwrap_or(defaults.separator),
        header_test_name: partial.header_test_name.unwrap_or(defaults.header_test_name),
        order: partial.order.unwrap_or(defaults.order),
        use_colors: partial.use_colors.unwrap_or(defaults.use_colors),
    }
}
