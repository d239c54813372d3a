//! Command-line log viewer built on the `lognav` navigation engine.
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod interactive;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lognav::{ColumnConfig, FileConfig, Navigator, NavigatorConfig, SearchOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI-specific error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Navigation library error
    #[error(transparent)]
    Navigator(#[from] lognav::Error),

    /// Column sizes without matching headers
    #[error("{sizes} column sizes given for {headers} headers")]
    ColumnSizes { headers: usize, sizes: usize },

    /// Terminal I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bad log filter directive
    #[error("invalid log filter: {0}")]
    LogFilter(String),

    /// The follow thread panicked
    #[error("follow thread panicked")]
    FollowerPanicked,
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long, short, env = "LOGNAV_CONFIG")]
    config: Option<PathBuf>,

    /// Log file to view; repeat for several files. Replaces configured files
    #[arg(long = "file", short = 'f')]
    files: Vec<PathBuf>,

    /// Column delimiter of structured lines
    #[arg(long, env = "LOGNAV_DELIMITER")]
    delimiter: Option<String>,

    /// Comma separated column headers. Replaces configured columns
    #[arg(long, value_delimiter = ',')]
    headers: Vec<String>,

    /// Comma separated column widths matching --headers; 0 is unbounded
    #[arg(long, value_delimiter = ',')]
    column_sizes: Vec<usize>,

    /// Header of the column holding the severity
    #[arg(long)]
    severity_column: Option<String>,

    /// Rows per page
    #[arg(long, short = 'n', env = "LOGNAV_CAPACITY")]
    capacity: Option<usize>,

    /// Diagnostics filter, written to stderr
    #[arg(long, default_value = "warn", env = "LOGNAV_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Print the last page of the first file
    Tail,

    /// Print the first page of the first file
    Head,

    /// Print the page holding the first line that contains a term
    Search {
        /// Text or pattern to look for
        term: String,

        /// Treat the term as a regular expression
        #[arg(long)]
        regex: bool,

        /// Match case exactly
        #[arg(long)]
        case_sensitive: bool,

        /// Start after this 1-based line
        #[arg(long, default_value_t = 0)]
        after: usize,
    },

    /// Navigate with commands read from stdin
    Interactive {
        /// How often a followed file is checked for new lines
        #[arg(long, default_value_t = 1000, env = "LOGNAV_POLL_INTERVAL_MS")]
        poll_interval_ms: u64,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let config = build_config(&args)?;
    let mut navigator = Navigator::new(config)?;

    match args.command {
        Command::Tail => {
            let page = navigator.tail();
            print_page(&navigator, &page, None)?;
        }
        Command::Head => {
            let page = navigator.head();
            print_page(&navigator, &page, None)?;
        }
        Command::Search {
            term,
            regex,
            case_sensitive,
            after,
        } => {
            let options = SearchOptions {
                case_sensitive,
                use_regex: regex,
            };
            let outcome = navigator.search_with(&term, after, &options)?;
            match outcome.line {
                Some(line) => info!(line, wrapped = outcome.wrapped, "match found"),
                None => eprintln!("{term:?} not found"),
            }
            print_page(&navigator, &outcome.page, outcome.highlight)?;
        }
        Command::Interactive { poll_interval_ms } => {
            interactive::run(navigator, Duration::from_millis(poll_interval_ms))?;
        }
    }

    Ok(())
}

fn init_tracing(directive: &str) -> Result<(), Error> {
    let filter = EnvFilter::try_new(directive).map_err(|e| Error::LogFilter(e.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

/// Load the config file, if any, and apply command-line overrides
fn build_config(args: &Args) -> Result<NavigatorConfig, Error> {
    let mut config = match &args.config {
        Some(path) => NavigatorConfig::read(path)?,
        None => NavigatorConfig::default(),
    };

    if !args.files.is_empty() {
        config.files = args.files.iter().cloned().map(FileConfig::new).collect();
    }

    if let Some(delimiter) = &args.delimiter {
        config.delimiter.clone_from(delimiter);
    }

    if !args.headers.is_empty() {
        config.columns = columns(&args.headers, &args.column_sizes)?;
    } else if !args.column_sizes.is_empty() {
        return Err(Error::ColumnSizes {
            headers: 0,
            sizes: args.column_sizes.len(),
        });
    }

    if let Some(severity) = &args.severity_column {
        config.severity_column = Some(severity.clone());
    }

    if let Some(capacity) = args.capacity {
        config.initial_capacity = capacity;
    }

    config.validate()?;
    Ok(config)
}

/// Pair headers with widths; missing widths leave the column unbounded
fn columns(headers: &[String], sizes: &[usize]) -> Result<Vec<ColumnConfig>, Error> {
    if sizes.len() > headers.len() {
        return Err(Error::ColumnSizes {
            headers: headers.len(),
            sizes: sizes.len(),
        });
    }

    Ok(headers
        .iter()
        .enumerate()
        .map(|(i, header)| ColumnConfig::new(header.trim(), sizes.get(i).copied().unwrap_or(0)))
        .collect())
}

fn print_page(navigator: &Navigator, page: &lognav::Page, highlight: Option<usize>) -> io::Result<()> {
    let widths = navigator.column_widths();
    let mut out = io::stdout().lock();
    render::write_header(&mut out, &navigator.headers(), &widths)?;
    render::write_page(&mut out, page, &widths, highlight)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("lognav").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_build_a_config() {
        let args = parse(&[
            "--file",
            "a.log",
            "-f",
            "b.log",
            "--delimiter",
            "|",
            "--headers",
            "Date,Level,Message",
            "--column-sizes",
            "10,5",
            "--severity-column",
            "Level",
            "-n",
            "7",
            "tail",
        ]);

        let config = build_config(&args).unwrap();
        assert_eq!(config.files.len(), 2);
        assert_eq!(config.delimiter, "|");
        assert_eq!(
            config.columns,
            vec![
                ColumnConfig::new("Date", 10),
                ColumnConfig::new("Level", 5),
                ColumnConfig::new("Message", 0),
            ]
        );
        assert_eq!(config.initial_capacity, 7);
    }

    #[test]
    fn test_flags_override_the_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lognav.toml");
        fs::write(
            &path,
            "delimiter = \"|\"\ninitial_capacity = 3\n[[files]]\npath = \"server.log\"\n",
        )
        .unwrap();

        let args = parse(&["--config", path.to_str().unwrap(), "-n", "9", "head"]);
        let config = build_config(&args).unwrap();

        assert_eq!(config.delimiter, "|");
        assert_eq!(config.initial_capacity, 9);
        assert_eq!(config.files, vec![FileConfig::new("server.log")]);
    }

    #[test]
    fn test_too_many_column_sizes() {
        let args = parse(&["-f", "a.log", "--headers", "Date", "--column-sizes", "1,2", "tail"]);
        assert!(matches!(
            build_config(&args),
            Err(Error::ColumnSizes { headers: 1, sizes: 2 })
        ));
    }

    #[test]
    fn test_files_are_required() {
        let args = parse(&["tail"]);
        assert!(matches!(build_config(&args), Err(Error::Navigator(_))));
    }

    #[test]
    fn test_search_arguments() {
        let args = parse(&["-f", "a.log", "search", "Caused by", "--regex", "--after", "12"]);
        match args.command {
            Command::Search {
                term,
                regex,
                case_sensitive,
                after,
            } => {
                assert_eq!(term, "Caused by");
                assert!(regex);
                assert!(!case_sensitive);
                assert_eq!(after, 12);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
