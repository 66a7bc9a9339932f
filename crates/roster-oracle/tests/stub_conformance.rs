//! The conforming stub must pass every property, through the library and
//! through the command-line runner.

use std::path::{Path, PathBuf};
use std::process::Command;

use roster_oracle::config::{OracleConfig, ENV_CASES, ENV_EXECUTABLE, ENV_SEED};
use roster_oracle::driver::{DriverConfig, ProgramDriver};
use roster_oracle::locate::EXECUTABLE_NAME;
use roster_oracle::suite::{CaseOutcome, Property, PropertySuite, RunReport, SuiteConfig};

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

fn stub_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_stub_students"))
}

fn suite(executable: &Path, cases: u64) -> PropertySuite {
    PropertySuite::new(
        ProgramDriver::new(DriverConfig::new(executable.to_path_buf())),
        SuiteConfig {
            cases,
            ..SuiteConfig::default()
        },
    )
}

#[test]
fn stub_passes_every_property() {
    init_test_logging();
    let report = suite(&stub_path(), 15)
        .run_all(&Property::ALL)
        .expect("no fatal errors");

    assert_eq!(report.properties.len(), Property::ALL.len());
    for property in &report.properties {
        assert!(
            property.all_passed(),
            "{} failed: {:#?}",
            property.property,
            property.failures
        );
        assert_eq!(property.skipped, 0, "{} skipped cases", property.property);
        assert_eq!(property.passed, property.cases);
    }
    let empty = &report.properties[0];
    assert_eq!(empty.property, Property::EmptyInput);
    assert_eq!(empty.cases, 2);
}

#[test]
fn runs_are_reproducible_from_the_seed() {
    let first = suite(&stub_path(), 5)
        .run_property(Property::MergeSortStable)
        .expect("run");
    let second = suite(&stub_path(), 5)
        .run_property(Property::MergeSortStable)
        .expect("run");
    assert_eq!(first, second);
}

#[test]
fn replay_runs_one_case() {
    let outcome = suite(&stub_path(), 1)
        .replay(Property::InvalidMixedFields, 0xDEAD_BEEF)
        .expect("replay");
    assert_eq!(outcome, CaseOutcome::Passed);
}

#[cfg(unix)]
#[test]
fn discovered_executable_is_used() {
    let dir = tempfile::tempdir().expect("tempdir");
    let build = dir.path().join("project").join("cmake-build-debug");
    std::fs::create_dir_all(&build).expect("mkdir");
    std::fs::copy(stub_path(), build.join(EXECUTABLE_NAME)).expect("copy stub");

    let config = OracleConfig {
        search_root: dir.path().to_path_buf(),
        cases: 3,
        ..OracleConfig::default()
    };
    let driver = config.driver().expect("discovery");
    assert!(driver.config().executable.ends_with(EXECUTABLE_NAME));

    let report = PropertySuite::new(driver, config.suite_config())
        .run_all(&[Property::BestRecord])
        .expect("run");
    assert!(report.all_passed());
}

#[test]
fn runner_prints_json_report_and_exits_zero() {
    let output = Command::new(env!("CARGO_BIN_EXE_roster_oracle"))
        .args(["--only", "best_record", "--only", "quick_sort_names", "--json"])
        .env(ENV_EXECUTABLE, stub_path())
        .env(ENV_SEED, "0x2a")
        .env(ENV_CASES, "4")
        .output()
        .expect("spawn runner");
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));

    let report: RunReport = serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report.seed, 42);
    assert!(report.all_passed());
    let properties: Vec<Property> = report.properties.iter().map(|p| p.property).collect();
    assert_eq!(properties, [Property::BestRecord, Property::QuickSortNames]);
    assert!(report.properties.iter().all(|p| p.cases == 4));
}

#[test]
fn runner_exits_two_without_an_executable() {
    let output = Command::new(env!("CARGO_BIN_EXE_roster_oracle"))
        .args(["--exe", "/nonexistent/manageStudents", "--cases", "1"])
        .env_remove(ENV_EXECUTABLE)
        .output()
        .expect("spawn runner");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("environment"));
}

#[test]
fn runner_rejects_unknown_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_roster_oracle"))
        .arg("--frobnicate")
        .output()
        .expect("spawn runner");
    assert_eq!(output.status.code(), Some(2));
}
