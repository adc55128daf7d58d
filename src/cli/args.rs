//! Defines the command-line arguments and subcommands for the Combotest CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::matrix::Order;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "combotest",
    version,
    about = "Enumerates outcome matrices declared in YAML manifests."
)]
pub struct CombotestArgs {
    /// Log filter directives (e.g. `debug`, `combotest::matrix=trace`). Applied on top of RUST_LOG.
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every combination of a manifest with its resolved outcome.
    Table {
        /// The manifest to enumerate.
        #[arg(required = true)]
        file: PathBuf,
        /// Traversal order; overrides the manifest's `config.order`.
        #[arg(long, value_enum)]
        order: Option<OrderArg>,
        /// Only print combinations resolving to this outcome.
        #[arg(long, value_name = "LABEL")]
        outcome: Option<String>,
        /// Print one JSON object per combination instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Build and fully resolve every manifest under a path.
    Check {
        /// A manifest file, or a directory searched for `.yaml`/`.yml` files.
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    Outcomes,
    Dimensions,
}

impl From<OrderArg> for Order {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Outcomes => Order::Outcomes,
            OrderArg::Dimensions => Order::Dimensions,
        }
    }
}
