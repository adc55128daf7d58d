//! The Combotest Command-Line Interface.
//!
//! `table` prints a manifest's combinations with their outcomes; `check` builds
//! and fully resolves every manifest under a path, reporting each failure as a
//! miette diagnostic.

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use miette::Diagnostic;
use thiserror::Error;
use walkdir::WalkDir;

use crate::cli::args::{Command, CombotestArgs, OrderArg};
use crate::config::PartialRenderConfig;
use crate::errors::{print_error, MatrixError};
use crate::manifest::{Manifest, ManifestError};
use crate::matrix::{EnumerateOptions, Order};

pub mod args;
pub mod output;

/// Filter used when neither `RUST_LOG` nor `--log-filter` is given.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Everything a CLI command can fail with.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Matrix(#[from] MatrixError),

    #[error("failed to write output")]
    #[diagnostic(code(combotest::cli::output))]
    Output(#[from] io::Error),

    #[error("no manifests found under {path}")]
    #[diagnostic(
        code(combotest::cli::no_manifests),
        help("manifests are files ending in .yaml or .yml")
    )]
    NoManifests { path: String },

    #[error("{failed} of {checked} manifest(s) failed")]
    #[diagnostic(code(combotest::cli::check_failed))]
    CheckFailed { failed: usize, checked: usize },
}

/// The main entry point for the CLI.
pub fn run() {
    let args = CombotestArgs::parse();
    init_logging(args.log_filter.as_deref());

    let result = match args.command {
        Command::Table {
            file,
            order,
            outcome,
            json,
        } => handle_table(&file, order, outcome, json),
        Command::Check { path } => handle_check(&path),
    };

    if let Err(e) = result {
        print_error(e);
        process::exit(1);
    }
}

pub fn init_logging(cli_filter: Option<&str>) {
    let env = Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(filter) = cli_filter {
        builder.parse_filters(filter);
    }
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{:<5} {}] {}",
            record.level(),
            record.target(),
            record.args()
        )
    });
    // keeps any logger installed earlier
    let _ = builder.try_init();
}

/// Handles the `table` subcommand.
fn handle_table(
    file: &Path,
    order: Option<OrderArg>,
    outcome: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let overrides = PartialRenderConfig {
        order: order.map(Order::from),
        ..PartialRenderConfig::default()
    };
    let matrix = Manifest::load(file)?.build(overrides)?;

    let mut options = EnumerateOptions::new().order(matrix.config().order);
    if let Some(label) = outcome {
        let declared = matrix.matrix().outcomes();
        if !declared.contains(&label) {
            return Err(MatrixError::undeclared_outcome(&label, declared).into());
        }
        options = options.only(move |_, resolved: &String| *resolved == label);
    }

    let mut out = output::stdout(matrix.config().use_colors);
    let rows = if json {
        output::write_json_rows(&mut out, &matrix, &options)?
    } else {
        output::write_table(&mut out, &matrix, &options)?
    };
    debug!("printed {rows} row(s) from {}", file.display());
    Ok(())
}

/// Handles the `check` subcommand.
fn handle_check(path: &Path) -> Result<(), CliError> {
    let manifests = discover_manifests(path)?;
    let mut out = output::stdout(atty::is(atty::Stream::Stdout));
    let mut failed = 0usize;

    for manifest in &manifests {
        match check_manifest(manifest) {
            Ok(combinations) => output::write_check_ok(&mut out, manifest, combinations)?,
            Err(e) => {
                failed += 1;
                output::write_check_failed(&mut out, manifest)?;
                out.flush()?;
                print_error(e);
            }
        }
    }
    output::write_check_summary(&mut out, manifests.len(), failed)?;
    out.flush()?;

    if manifests.is_empty() {
        return Err(CliError::NoManifests {
            path: path.display().to_string(),
        });
    }
    if failed > 0 {
        return Err(CliError::CheckFailed {
            failed,
            checked: manifests.len(),
        });
    }
    Ok(())
}

/// The manifest files under `path`, sorted by name. A file path is taken as is;
/// a path that does not exist is an I/O error.
pub fn discover_manifests(path: &Path) -> Result<Vec<PathBuf>, ManifestError> {
    let metadata = path.metadata().map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    if metadata.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    Ok(WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect())
}

/// Builds a manifest's matrix and resolves every combination once.
fn check_manifest(path: &Path) -> Result<usize, CliError> {
    let matrix = Manifest::load(path)?.into_matrix()?;
    let mut combinations = 0usize;
    let options = EnumerateOptions::new().order(Order::Dimensions);
    matrix.for_each(&options, |_, _| combinations += 1)?;
    info!("{}: {combinations} combination(s) resolved", path.display());
    Ok(combinations)
}
