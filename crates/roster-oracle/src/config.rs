//! Run configuration.
//!
//! Values are layered: built-in defaults, then `ROSTER_ORACLE_*` environment
//! variables, then command-line flags. Later layers win.

use std::path::PathBuf;
use std::time::Duration;

use crate::driver::{DEFAULT_TIMEOUT, DriverConfig, ProgramDriver};
use crate::locate::{LocateConfig, locate_executable, verify_executable};
use crate::shrink::ShrinkConfig;
use crate::suite::{Property, SuiteConfig};
use crate::{OracleError, ROSTER_SEED, Result};

/// Explicit executable path; skips discovery.
pub const ENV_EXECUTABLE: &str = "ROSTER_ORACLE_EXE";
/// Base seed, decimal or `0x`-prefixed hex.
pub const ENV_SEED: &str = "ROSTER_ORACLE_SEED";
/// Cases per randomized property.
pub const ENV_CASES: &str = "ROSTER_ORACLE_CASES";

pub const DEFAULT_CASES: u64 = 100;
pub const DEFAULT_MAX_POPULATION: usize = 20;

pub const USAGE: &str = "\
roster_oracle: randomized conformance oracle for manageStudents

USAGE:
    roster_oracle [OPTIONS]

OPTIONS:
    --exe <PATH>             Program under test (skips discovery)
    --search-root <DIR>      Where discovery starts [default: ..]
    --seed <N>               Base seed, decimal or 0x-hex
    --cases <N>              Cases per randomized property [default: 100]
    --max-population <N>     Largest generated population [default: 20]
    --timeout-secs <N>       Per-invocation timeout [default: 30]
    --bundle-dir <DIR>       Write a repro bundle per failing case
    --only <PROPERTY>        Run only this property (repeatable)
    --no-shrink              Report failing populations unshrunk
    --json                   Print the run report as JSON
    --verbose                Debug-level logging
    -h, --help               Print this help

ENVIRONMENT:
    ROSTER_ORACLE_EXE, ROSTER_ORACLE_SEED, ROSTER_ORACLE_CASES
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    pub executable: Option<PathBuf>,
    pub search_root: PathBuf,
    pub seed: u64,
    pub cases: u64,
    pub max_population: usize,
    pub timeout: Duration,
    pub bundle_dir: Option<PathBuf>,
    /// Empty means every property.
    pub only: Vec<Property>,
    pub shrink: bool,
    pub json: bool,
    pub verbose: bool,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            executable: None,
            search_root: LocateConfig::default().search_root,
            seed: ROSTER_SEED,
            cases: DEFAULT_CASES,
            max_population: DEFAULT_MAX_POPULATION,
            timeout: DEFAULT_TIMEOUT,
            bundle_dir: None,
            only: Vec::new(),
            shrink: true,
            json: false,
            verbose: false,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run(OracleConfig),
    Help,
}

impl OracleConfig {
    /// Overlays environment variables read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Config`] for unparsable values.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(exe) = lookup(ENV_EXECUTABLE).filter(|v| !v.is_empty()) {
            self.executable = Some(PathBuf::from(exe));
        }
        if let Some(seed) = lookup(ENV_SEED) {
            self.seed = parse_seed(&seed)
                .map_err(|msg| OracleError::Config(format!("{ENV_SEED}: {msg}")))?;
        }
        if let Some(cases) = lookup(ENV_CASES) {
            self.cases = cases.trim().parse().map_err(|error| {
                OracleError::Config(format!("{ENV_CASES}: invalid value={cases}: {error}"))
            })?;
        }
        Ok(self)
    }

    /// Overlays command-line flags (program name already stripped).
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Config`] for unknown flags, missing values or
    /// unparsable values.
    pub fn apply_args(mut self, args: &[String]) -> Result<CliAction> {
        let mut index = 0_usize;
        while index < args.len() {
            let flag = args[index].as_str();
            match flag {
                "--exe" => {
                    self.executable = Some(PathBuf::from(take_value(args, &mut index, flag)?));
                }
                "--search-root" => {
                    self.search_root = PathBuf::from(take_value(args, &mut index, flag)?);
                }
                "--seed" => {
                    let raw = take_value(args, &mut index, flag)?;
                    self.seed = parse_seed(raw)
                        .map_err(|msg| OracleError::Config(format!("--seed: {msg}")))?;
                }
                "--cases" => {
                    self.cases = parse_number(flag, take_value(args, &mut index, flag)?)?;
                }
                "--max-population" => {
                    self.max_population = parse_number(flag, take_value(args, &mut index, flag)?)?;
                }
                "--timeout-secs" => {
                    let secs = parse_number(flag, take_value(args, &mut index, flag)?)?;
                    self.timeout = Duration::from_secs(secs);
                }
                "--bundle-dir" => {
                    self.bundle_dir = Some(PathBuf::from(take_value(args, &mut index, flag)?));
                }
                "--only" => {
                    let property = take_value(args, &mut index, flag)?.parse::<Property>()?;
                    if !self.only.contains(&property) {
                        self.only.push(property);
                    }
                }
                "--no-shrink" => self.shrink = false,
                "--json" => self.json = true,
                "--verbose" | "-v" => self.verbose = true,
                "-h" | "--help" => return Ok(CliAction::Help),
                other => {
                    return Err(OracleError::Config(format!("unknown argument: {other}")));
                }
            }
            index += 1;
        }
        self.validate()?;
        Ok(CliAction::Run(self))
    }

    /// # Errors
    ///
    /// Returns [`OracleError::Config`] when a bound is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_population == 0 {
            return Err(OracleError::Config(
                "--max-population must be at least 1".to_owned(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(OracleError::Config("--timeout-secs must be at least 1".to_owned()));
        }
        Ok(())
    }

    /// Properties selected for this run, in canonical order.
    #[must_use]
    pub fn properties(&self) -> Vec<Property> {
        Property::ALL
            .into_iter()
            .filter(|p| self.only.is_empty() || self.only.contains(p))
            .collect()
    }

    /// Resolves the program under test: the explicit path if one was
    /// given, otherwise the unique discovered candidate.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Environment`] when resolution fails.
    pub fn resolve_executable(&self) -> Result<PathBuf> {
        match &self.executable {
            Some(path) => verify_executable(path),
            None => locate_executable(&LocateConfig {
                search_root: self.search_root.clone(),
                ..LocateConfig::default()
            }),
        }
    }

    /// # Errors
    ///
    /// Returns [`OracleError::Environment`] when the executable cannot be
    /// resolved.
    pub fn driver(&self) -> Result<ProgramDriver> {
        let executable = self.resolve_executable()?;
        Ok(ProgramDriver::new(DriverConfig {
            executable,
            timeout: self.timeout,
        }))
    }

    #[must_use]
    pub fn suite_config(&self) -> SuiteConfig {
        SuiteConfig {
            seed: self.seed,
            cases: self.cases,
            max_population: self.max_population,
            shrink: self.shrink.then(ShrinkConfig::default),
            bundle_dir: self.bundle_dir.clone(),
        }
    }
}

fn take_value<'a>(args: &'a [String], index: &mut usize, flag: &str) -> Result<&'a str> {
    *index += 1;
    args.get(*index)
        .map(String::as_str)
        .ok_or_else(|| OracleError::Config(format!("missing value for {flag}")))
}

fn parse_seed(raw: &str) -> std::result::Result<u64, String> {
    let trimmed = raw.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };
    parsed.map_err(|error| format!("invalid value={raw}: {error}"))
}

fn parse_number<T>(flag: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|error| OracleError::Config(format!("invalid {flag} value={raw}: {error}")))
}
