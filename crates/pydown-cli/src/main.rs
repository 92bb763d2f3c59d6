//! pydown CLI - Rewrite Python 3.6 source so it runs on Python 3.4
//!
//! Usage:
//!   pydown [INPUT] [OUTPUT]
//!   pydown app.py app34.py --verbose
//!   pydown app.py --diff
//!   pydown --list-rules

mod config;
mod output;
mod process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use pydown_core::logging;
use pydown_fixer::FixerRegistry;
use pydown_rules::RuleRegistry;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use config::Config;
use process::Pipeline;

/// File converted when neither the command line nor the config names one
const DEFAULT_INPUT: &str = "./scripts/inject_syslog_parsers.py";

#[derive(Parser)]
#[command(name = "pydown")]
#[command(version, about = "Rewrite Python 3.6 source so it runs on Python 3.4")]
#[command(long_about = None)]
struct Cli {
    /// Python 3.6 file to convert (default: ./scripts/inject_syslog_parsers.py)
    input: Option<PathBuf>,

    /// Where to write the converted file (default: stdout)
    output: Option<PathBuf>,

    /// Path to config file (default: auto-detect .pydown.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long, conflicts_with = "config")]
    no_config: bool,

    /// Rules to run (can be specified multiple times). Overrides config file.
    #[arg(long, short = 'r', value_name = "RULE")]
    rule: Vec<String>,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Print a unified diff of input and output instead of the output
    #[arg(long)]
    diff: bool,

    /// List applied rewrites on stderr
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Write a conversion log to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// External formatter command reading stdin and writing stdout (e.g. "yapf")
    #[arg(long, value_name = "CMD")]
    formatter: Option<String>,

    /// Skip layout fixers and the external formatter
    #[arg(long)]
    no_format: bool,
}

/// A failed conversion, reported once at the top level
struct Failure {
    input: PathBuf,
    error: anyhow::Error,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Handle --list-rules
    if cli.list_rules {
        output::print_rules(&RuleRegistry::new().list_rules(), &FixerRegistry::new().list());
        return ExitCode::SUCCESS;
    }

    let result = run(&cli);
    logging::shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure { input, error }) => {
            eprintln!(
                "conversion failed on file {} with exception: {:#}",
                input.display(),
                error
            );
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<(), Failure> {
    let fallback_input = || {
        cli.input
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT))
    };

    if let Some(path) = &cli.log_file {
        logging::init_logger(Some(path.as_path()))
            .with_context(|| format!("Failed to open log file {}", path.display()))
            .map_err(|error| Failure {
                input: fallback_input(),
                error,
            })?;
    }

    let config = load_config(cli).map_err(|error| Failure {
        input: fallback_input(),
        error,
    })?;

    let input = cli
        .input
        .clone()
        .or_else(|| config.input.default.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));

    logging::log_conversion_start(&input, cli.output.as_deref());
    let result = convert(cli, config, &input);
    match &result {
        Ok(rewrites) => logging::log_conversion_complete(*rewrites, None),
        Err(error) => logging::log_conversion_complete(0, Some(&format!("{:#}", error))),
    }

    result.map(|_| ()).map_err(|error| Failure { input, error })
}

fn load_config(cli: &Cli) -> Result<Config> {
    if cli.no_config {
        return Ok(Config::default());
    }

    if let Some(path) = &cli.config {
        return Config::load_path(path);
    }

    match Config::load()? {
        Some((config, path)) => {
            if cli.verbose {
                eprintln!("{}: {}", "Using config".dimmed(), path.display());
            }
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// Convert `input`, returning the number of rewrites applied
fn convert(cli: &Cli, config: Config, input: &Path) -> Result<usize> {
    let registry = RuleRegistry::new();
    let enabled = config.effective_rules(&registry.all_names(), &cli.rule);

    let mut unknown: Vec<&str> = enabled
        .iter()
        .map(String::as_str)
        .filter(|name| registry.get(name).is_none())
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        bail!(
            "Unknown rule(s): {}. Use --list-rules to see available rules",
            unknown.join(", ")
        );
    }

    let mut format = config.format;
    if let Some(command) = &cli.formatter {
        format.command = Some(command.split_whitespace().map(String::from).collect());
    }
    if cli.no_format {
        format.enabled = false;
    }

    let pipeline = Pipeline {
        rules: &registry,
        enabled,
        options: config.rewrite,
        format,
    };

    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let conversion = pipeline.convert(&source, input)?;

    if cli.verbose {
        output::report_changes(input, &conversion.changes);
    }

    if cli.diff {
        print!("{}", output::unified_diff(input, &source, &conversion.output));
    } else if let Some(path) = &cli.output {
        fs::write(path, &conversion.output)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        print!("{}", conversion.output);
    }

    Ok(conversion.changes.len())
}
