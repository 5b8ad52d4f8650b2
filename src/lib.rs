pub mod catalog;
pub mod commands;
pub mod pattern;
#[cfg(feature = "python")]
mod python;
pub mod sources;
pub mod utils;

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand, ValueEnum, builder::ValueHint};
use clap_complete::Shell;

use crate::catalog::Catalog;
use crate::sources::{Criteria, Criterion, FileSource, PathAsPattern, UrlPath, parse_field_criterion};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn pqtool(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python::register_module(m)
}

#[derive(Parser, Debug)]
#[command(version = env!("PQTOOL_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the files of a source, optionally narrowed with --where.
    ///
    /// Examples:
    ///   # Every file matching a template
    ///   pqtool files 'data/{date:%Y-%m-%d}.csv'
    ///
    ///   # Only February
    ///   pqtool files 'data/{date:%Y-%m-%d}.csv' --where date=2020-02-01..2020-03-01
    ///
    ///   # A catalog entry
    ///   pqtool files --catalog catalog.json --source daily --where region=us,eu
    #[command(verbatim_doc_comment)]
    Files(SourceCommand),

    /// Show the schema of a source.
    Schema(SourceCommand),

    /// Show the field values decoded from each file path.
    ///
    /// Examples:
    ///   pqtool fields '{region}/{run:d}.csv'
    ///   pqtool fields '{region}/{run:d}.csv' --where run=3.. --format json
    #[command(verbatim_doc_comment)]
    Fields(SourceCommand),

    /// Show the arguments and metadata a source was built from.
    Describe(SourceCommand),

    /// List the entries of a catalog file.
    Catalog(CatalogCommand),

    /// Generate shell completions for your shell.
    ///
    /// To add completions for your current shell session only:
    ///   zsh:  eval "$(pqtool completions zsh)"
    ///   bash: eval "$(pqtool completions bash)"
    ///   fish: pqtool completions fish | source
    ///
    /// To persist completions across sessions:
    ///   zsh:  echo 'eval "$(pqtool completions zsh)"' >> ~/.zshrc
    ///   bash: echo 'eval "$(pqtool completions bash)"' >> ~/.bashrc
    ///   fish: pqtool completions fish > ~/.config/fish/completions/pqtool.fish
    #[command(verbatim_doc_comment)]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

impl Commands {
    pub fn generate_completions(shell: Shell) {
        clap_complete::generate(shell, &mut Cli::command(), "pqtool", &mut std::io::stdout());
    }
}

/// Arguments shared by every command that opens a source.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// A urlpath (glob or field template) or several explicit file paths.
    #[arg(value_hint = ValueHint::AnyPath, conflicts_with = "catalog")]
    pub urlpath: Vec<String>,

    /// Catalog file to take the source from.
    #[arg(long, value_hint = ValueHint::FilePath, requires = "source")]
    pub catalog: Option<PathBuf>,

    /// Name of the catalog entry to open.
    #[arg(long, requires = "catalog")]
    pub source: Option<String>,

    /// Treat the urlpath as a plain glob; fields are not decoded.
    #[arg(long, conflicts_with = "pattern")]
    pub no_path_as_pattern: bool,

    /// Decode fields with this template instead of the urlpath.
    #[arg(long, value_name = "TEMPLATE")]
    pub pattern: Option<String>,
}

impl SourceArgs {
    pub fn path_as_pattern(&self) -> PathAsPattern {
        match (&self.pattern, self.no_path_as_pattern) {
            (Some(template), _) => PathAsPattern::Template(template.clone()),
            (None, no_pattern) => PathAsPattern::Flag(!no_pattern),
        }
    }

    pub fn open(&self) -> Result<FileSource> {
        if let (Some(catalog), Some(name)) = (&self.catalog, &self.source) {
            return open_catalog_source(catalog, name);
        }

        let urlpath = match self.urlpath.as_slice() {
            [] => bail!("Either a URLPATH or --catalog with --source is required"),
            [single] => UrlPath::Pattern(single.clone()),
            many => UrlPath::Paths(many.to_vec()),
        };

        FileSource::new(urlpath, None, self.path_as_pattern())
    }
}

fn open_catalog_source(path: &Path, name: &str) -> Result<FileSource> {
    Catalog::from_path(path)?.source(name)
}

/// Criteria narrowing a source, one `--where` per field.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Keep files whose decoded field matches EXPR.
    ///
    /// EXPR forms:
    ///   date=2020-01-01              - equal to a value
    ///   region=us,eu                 - one of several values
    ///   date=2020-01-01..2020-02-01  - start inclusive, stop exclusive
    ///   run=3..                      - open-ended range
    ///   run=..10
    ///
    /// Repeat for more fields; all criteria must match.
    #[arg(
        long = "where",
        short = 'w',
        value_name = "FIELD=EXPR",
        value_parser = parse_field_criterion,
        verbatim_doc_comment
    )]
    pub criteria: Vec<(String, Criterion)>,
}

impl SelectionArgs {
    /// Later criteria on the same field replace earlier ones.
    pub fn criteria(&self) -> Criteria {
        self.criteria.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

#[derive(Args, Debug)]
pub struct SourceCommand {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output format (auto-detects based on TTY if not specified)
    #[arg(long, short = 'f', value_enum, default_value = "auto")]
    pub format: OutputFormat,
}

impl SourceCommand {
    /// Open the source and apply any `--where` criteria.
    pub fn resolve(&self) -> Result<FileSource> {
        let source = self.source.open()?;
        if self.selection.is_empty() {
            return Ok(source);
        }
        source.subset(&self.selection.criteria())
    }
}

#[derive(Args, Debug)]
pub struct CatalogCommand {
    /// Path to the catalog file
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Output format (auto-detects based on TTY if not specified)
    #[arg(long, short = 'f', value_enum, default_value = "auto")]
    pub format: OutputFormat,
}

/// Output format for reporting commands
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Auto-detect: JSON if stdout is not a TTY, otherwise text
    #[default]
    Auto,
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
}

impl OutputFormat {
    pub fn resolves_to_json(&self) -> bool {
        match self {
            OutputFormat::Auto => !io::stdout().is_terminal(),
            OutputFormat::Text => false,
            OutputFormat::Json => true,
        }
    }
}
