//! cdm-query - fetch CDM benchmark metrics and join them with run parameters
//!
//! Usage: cdm-query [--runs <ids>] [--iterations <ids>] [--metric-types <types>]
//!                  [--params <names>] [-o out.json|out.csv] [--sql]
//!
//! The aligned table always goes to stdout; `-o` writes an extra JSON or CSV
//! copy chosen by file extension.

use cdm_query_lib::format::{render_table, write_output, WriteOutcome};
use cdm_query_lib::{run_report, OpenSearchClient, ReportRequest, Settings};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Main CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "cdm-query")]
#[command(version, about = "Query CDM metrics from OpenSearch", long_about = None)]
struct Cli {
    /// Run uuids to fetch results for, ex: <uuid-1>,<uuid-2>
    #[arg(long, value_delimiter = ',')]
    runs: Vec<String>,

    /// Iteration uuids to fetch results for, ex: <uuid-1>,<uuid-2>
    #[arg(long, value_delimiter = ',')]
    iterations: Vec<String>,

    /// Metric types to fetch results for, ex: <name-1>,<name-2>
    #[arg(long, value_delimiter = ',')]
    metric_types: Vec<String>,

    /// Run parameters to include as extra columns
    #[arg(long, value_delimiter = ',')]
    params: Vec<String>,

    /// Also write results to this file; '.json' and '.csv' are supported
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print the SQL sent to OpenSearch
    #[arg(long)]
    sql: bool,

    /// Settings file (default: <config dir>/cdm-query/settings.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// OpenSearch host, overrides the settings file
    #[arg(long)]
    host: Option<String>,

    /// OpenSearch port, overrides the settings file
    #[arg(long)]
    port: Option<u16>,

    /// Detailed logging
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Like `Cli::parse`, but argument errors exit with 1 instead of clap's 2.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

fn main() {
    // Exit quietly when stdout is closed early (e.g. piped into head)
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if info.to_string().contains("Broken pipe") {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = parse_cli();
    init_logging(cli.verbose);

    if let Err(e) = run_cli(cli) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> cdm_query_lib::Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        settings.host = host;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }

    let client = OpenSearchClient::new(&settings)?;
    debug!(endpoint = client.endpoint(), "connecting");

    let request = ReportRequest {
        runs: cli.runs,
        iterations: cli.iterations,
        metric_types: cli.metric_types,
        params: cli.params,
    };

    let show_sql = cli.sql;
    let result = run_report(&client, &request, &settings, |query| {
        if show_sql {
            println!("Running:\n{}\n\n", query);
        }
    })?;

    print!("{}", render_table(&result));

    if let Some(path) = cli.output {
        match write_output(&path, &result)? {
            WriteOutcome::Written(format) => {
                debug!(path = %path.display(), ?format, "wrote output file");
            }
            WriteOutcome::Skipped => {
                eprintln!(
                    "WARNING: not sure how to write file with associated file extension {}",
                    path.display()
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_separated_lists() {
        let cli = Cli::try_parse_from([
            "cdm-query",
            "--runs",
            "r1,r2",
            "--iterations",
            "i1",
            "--metric-types",
            "lat",
            "--params",
            "threads,bs",
        ])
        .expect("list flags should parse");

        assert_eq!(cli.runs, vec!["r1", "r2"]);
        assert_eq!(cli.iterations, vec!["i1"]);
        assert_eq!(cli.metric_types, vec!["lat"]);
        assert_eq!(cli.params, vec!["threads", "bs"]);
    }

    #[test]
    fn test_no_flags_means_no_filters() {
        let cli = Cli::try_parse_from(["cdm-query"]).expect("bare invocation should parse");

        assert!(cli.runs.is_empty());
        assert!(cli.iterations.is_empty());
        assert!(cli.metric_types.is_empty());
        assert!(cli.params.is_empty());
        assert!(cli.output.is_none());
        assert!(!cli.sql);
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn test_output_sql_and_connection_overrides() {
        let cli = Cli::try_parse_from([
            "cdm-query",
            "-o",
            "out.csv",
            "--sql",
            "--host",
            "search.lab",
            "--port",
            "9201",
            "--config",
            "cdm.json",
        ])
        .expect("output and connection flags should parse");

        assert_eq!(cli.output, Some(PathBuf::from("out.csv")));
        assert!(cli.sql);
        assert_eq!(cli.host.as_deref(), Some("search.lab"));
        assert_eq!(cli.port, Some(9201));
        assert_eq!(cli.config, Some(PathBuf::from("cdm.json")));
    }

    #[test]
    fn test_bad_arguments_are_errors() {
        let err = Cli::try_parse_from(["cdm-query", "--port", "not-a-port"]).err().expect("bad port");
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = Cli::try_parse_from(["cdm-query", "--bogus"]).err().expect("unknown flag");
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);

        let err = Cli::try_parse_from(["cdm-query", "stray"]).err().expect("positional");
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_help_is_not_an_argument_error() {
        let err = Cli::try_parse_from(["cdm-query", "--help"]).err().expect("help short-circuits");
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
