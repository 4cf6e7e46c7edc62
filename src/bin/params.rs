//! cdm-params - flatten a benchmark YAML config for Crucible
//!
//! Usage: cdm-params <config.yaml>
//!
//! Prints the flattened parameters as Crucible JSON params and as script
//! variables, followed by a config template referencing those names.

use cdm_query_lib::flatten::{crucible_params, flatten, load_yaml, script_vars, template};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const PREFIX: &str = "config";
const RULE: &str = "========================================================";

#[derive(Parser)]
#[command(name = "cdm-params")]
#[command(version, about = "Flatten a YAML benchmark config into Crucible params", long_about = None)]
struct Cli {
    /// YAML config to flatten
    file: PathBuf,
}

fn banner(title: &str) {
    println!("{}", RULE);
    println!("{:=^56}", format!(" {} ", title));
    println!("{}", RULE);
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
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = parse_cli();
    if let Err(e) = run(&cli) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> cdm_query_lib::Result<()> {
    let doc = load_yaml(&cli.file)?;
    let flat = flatten(&doc, PREFIX)?;
    let templated = template(&doc, PREFIX)?;

    banner("Crucible JSON Params");
    println!("{}", serde_json::to_string_pretty(&crucible_params(&flat))?);
    banner("Crucible Script Vars");
    println!("{}", script_vars(&flat));
    banner("llm-load-test Config Template");
    print!("{}", serde_yaml::to_string(&templated)?);
    Ok(())
}
