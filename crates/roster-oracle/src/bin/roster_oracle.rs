//! Conformance runner for `manageStudents`.
//!
//! Locates the program, runs the selected properties and prints a summary
//! (or the full report with `--json`).
//!
//! Exit codes: `0` every case passed, `1` at least one case failed, `2` the
//! run was aborted by a configuration, environment or contract error.

use std::env;
use std::process::ExitCode;

use roster_oracle::config::{CliAction, OracleConfig, USAGE};
use roster_oracle::suite::{PropertySuite, RunReport};
use roster_oracle::{OracleError, Result};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = match parse_config() {
        Ok(CliAction::Run(config)) => config,
        Ok(CliAction::Help) => {
            print!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!();
            eprint!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    init_logging(config.verbose);

    match run(&config) {
        Ok(report) if report.all_passed() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(2)
        }
    }
}

fn parse_config() -> Result<CliAction> {
    let args: Vec<String> = env::args().skip(1).collect();
    OracleConfig::default()
        .apply_env(|key| env::var(key).ok())?
        .apply_args(&args)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(config: &OracleConfig) -> Result<RunReport> {
    let driver = config.driver()?;
    let suite = PropertySuite::new(driver, config.suite_config());
    let report = suite.run_all(&config.properties())?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report).map_err(OracleError::from)?);
    } else {
        print_summary(&report);
    }
    Ok(report)
}

fn print_summary(report: &RunReport) {
    println!("seed: {:#x}", report.seed);
    for property in &report.properties {
        let status = if property.all_passed() { "PASS" } else { "FAIL" };
        println!(
            "{status} {:<24} {} passed, {} failed, {} skipped",
            property.property.as_str(),
            property.passed,
            property.failed,
            property.skipped
        );
        for failure in &property.failures {
            println!(
                "    case {} (seed {:#x}, mode {}): {}",
                failure.case_index, failure.seed, failure.mode, failure.reason
            );
            if let Some(original) = failure.shrunk_from {
                println!("    shrunk from {original} records; input:");
            } else {
                println!("    input:");
            }
            for line in failure.input.lines() {
                println!("        {line:?}");
            }
        }
        for bundle in &property.bundles {
            println!("    repro bundle: {}", bundle.display());
        }
    }
    if report.all_passed() {
        println!("all properties passed");
    } else {
        println!("{} failing case(s)", report.failed_cases());
    }
}
