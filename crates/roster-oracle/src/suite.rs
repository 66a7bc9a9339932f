//! Property suite: generation, invocation and comparison.
//!
//! # Architecture
//!
//! ```text
//! seed → generator → wire stream → ProgramDriver → stdout → check(reference) → CaseOutcome
//! ```
//!
//! Every case is independent: it derives its own RNG from the base seed,
//! runs exactly one process, and resolves to pass, fail or skip before the
//! next case starts. Failing valid-population cases are shrunk and may be
//! written out as repro bundles.
//!
//! # Error policy
//!
//! - Wrong output is a [`CaseFailure`]; the suite carries on.
//! - stderr output, or a best-mode run with no best-record line, is an
//!   [`OracleError::Contract`] and aborts the run.
//! - A generator that exhausts its rejection budget skips the case.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::corrupt::{CorruptionProfile, InvalidRecord, invalidate};
use crate::driver::{Mode, ProgramDriver, RunOutcome};
use crate::generate::{
    population_len, tied_grade_population, unique_name_population, valid_population,
    valid_student,
};
use crate::record::{DeletionStyle, Student};
use crate::reference::{best_student, sort_by_grade, sort_by_name};
use crate::shrink::{ShrinkConfig, minimize_population};
use crate::wire::{LineEnding, encode_students, quit_only, records_input, students_input};
use crate::{OracleError, Result, derive_case_seed};

/// The one line printed before any input is processed.
pub const BANNER: &str = "Enter student info. To exit press q, then enter";

/// Prefix of the best-record line; the rest of the line is the record.
pub const BEST_PREFIX: &str = "best student info is: ";

/// Marks a line reporting rejected input.
pub const DIAGNOSTIC_MARKER: &str = "ERROR: ";

// ── Property ────────────────────────────────────────────────────────────

/// A named family of checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Quit-only input (LF and CRLF) prints exactly the banner.
    EmptyInput,
    /// Best mode reports the highest grade/age, first occurrence on ties.
    BestRecord,
    /// CRLF-terminated valid input is accepted without diagnostics.
    CrlfTolerance,
    /// Merge mode prints the population stably sorted by grade.
    MergeSortStable,
    /// Quick mode prints a distinct-name population sorted by name.
    QuickSortNames,
    /// A record with deleted fields is rejected.
    InvalidMissingFields,
    /// A record with corrupted fields is rejected.
    InvalidCorruptFields,
    /// A record with deleted and corrupted fields is rejected.
    InvalidMixedFields,
}

impl Property {
    pub const ALL: [Self; 8] = [
        Self::EmptyInput,
        Self::BestRecord,
        Self::CrlfTolerance,
        Self::MergeSortStable,
        Self::QuickSortNames,
        Self::InvalidMissingFields,
        Self::InvalidCorruptFields,
        Self::InvalidMixedFields,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::BestRecord => "best_record",
            Self::CrlfTolerance => "crlf_tolerance",
            Self::MergeSortStable => "merge_sort_stable",
            Self::QuickSortNames => "quick_sort_names",
            Self::InvalidMissingFields => "invalid_missing_fields",
            Self::InvalidCorruptFields => "invalid_corrupt_fields",
            Self::InvalidMixedFields => "invalid_mixed_fields",
        }
    }

    /// Corruption profile of the invalid-population properties.
    #[must_use]
    pub const fn corruption_profile(self) -> Option<CorruptionProfile> {
        match self {
            Self::InvalidMissingFields => Some(CorruptionProfile::DeleteOnly),
            Self::InvalidCorruptFields => Some(CorruptionProfile::CorruptOnly),
            Self::InvalidMixedFields => Some(CorruptionProfile::Mixed),
            _ => None,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|property| property.as_str() == s)
            .ok_or_else(|| OracleError::Config(format!("unknown property '{s}'")))
    }
}

// ── Output checks ───────────────────────────────────────────────────────

/// Result of checking one output against its expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    #[must_use]
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

/// Whether any output line starts with [`DIAGNOSTIC_MARKER`].
#[must_use]
pub fn has_diagnostic_line(output: &str) -> bool {
    output.lines().any(|line| line.starts_with(DIAGNOSTIC_MARKER))
}

/// Quit-only input must print the banner line and nothing else.
#[must_use]
pub fn check_banner_only(output: &str) -> Verdict {
    let expected = format!("{BANNER}\n");
    if output == expected {
        Verdict::Pass
    } else {
        Verdict::Fail(format!(
            "quit-only input must print exactly {expected:?}, got {output:?}"
        ))
    }
}

/// The record reported on the first best-record line, trailing tab kept.
#[must_use]
pub fn extract_best_line(output: &str) -> Option<&str> {
    output
        .split('\n')
        .find_map(|line| line.strip_prefix(BEST_PREFIX))
}

/// Best mode must name the reference winner.
///
/// # Errors
///
/// Returns [`OracleError::Contract`] when no best-record line is printed at
/// all: the program is not implementing the mode.
pub fn check_best(population: &[Student], output: &str) -> Result<Verdict> {
    let Some(reported) = extract_best_line(output) else {
        return Err(OracleError::Contract(format!(
            "best mode printed no line starting with {BEST_PREFIX:?}; output was {output:?}"
        )));
    };
    let Some(expected) = best_student(population) else {
        return Ok(Verdict::Fail("best mode checked on an empty population".to_owned()));
    };
    if output.contains(DIAGNOSTIC_MARKER) {
        return Ok(Verdict::Fail(
            "diagnostic marker printed for a valid population".to_owned(),
        ));
    }
    let expected = expected.to_line();
    if reported == expected {
        Ok(Verdict::Pass)
    } else {
        Ok(Verdict::Fail(format!(
            "best record mismatch: expected {expected:?}, got {reported:?}"
        )))
    }
}

/// A sort mode must print `expected` as one contiguous block and no
/// diagnostic.
#[must_use]
pub fn check_sorted(expected: &[Student], output: &str) -> Verdict {
    if output.contains(DIAGNOSTIC_MARKER) {
        return Verdict::Fail("diagnostic marker printed for a valid population".to_owned());
    }
    let block = encode_students(expected);
    if output.contains(&block) {
        Verdict::Pass
    } else {
        Verdict::Fail(format!(
            "sorted block missing from output; expected {block:?}"
        ))
    }
}

/// Valid input must not produce any diagnostic.
#[must_use]
pub fn check_accepted(output: &str) -> Verdict {
    if output.contains(DIAGNOSTIC_MARKER) {
        Verdict::Fail("diagnostic marker printed for a valid population".to_owned())
    } else {
        Verdict::Pass
    }
}

/// Invalid input must produce at least one diagnostic line.
#[must_use]
pub fn check_rejected(output: &str) -> Verdict {
    if has_diagnostic_line(output) {
        Verdict::Pass
    } else {
        Verdict::Fail(format!(
            "no line starting with {DIAGNOSTIC_MARKER:?} for an invalid record"
        ))
    }
}

// ── Case results ────────────────────────────────────────────────────────

/// What a case fed to the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CaseSubject {
    QuitOnly { ending: LineEnding },
    Population(Vec<Student>),
    Invalid {
        case: InvalidRecord,
        style: DeletionStyle,
    },
}

/// One failing case, with everything needed to reproduce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFailure {
    pub property: Property,
    pub case_index: u64,
    pub seed: u64,
    pub mode: Mode,
    pub input: String,
    pub output: String,
    pub reason: String,
    pub subject: CaseSubject,
    /// Population size before shrinking, when shrinking reduced it.
    pub shrunk_from: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Passed,
    Failed(Box<CaseFailure>),
    Skipped(String),
}

/// Aggregate for one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyReport {
    pub property: Property,
    pub cases: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<CaseFailure>,
    pub bundles: Vec<PathBuf>,
}

impl PropertyReport {
    fn new(property: Property) -> Self {
        Self {
            property,
            cases: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            failures: Vec::new(),
            bundles: Vec::new(),
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Aggregate for a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub seed: u64,
    pub properties: Vec<PropertyReport>,
}

impl RunReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.properties.iter().all(PropertyReport::all_passed)
    }

    #[must_use]
    pub fn failed_cases(&self) -> usize {
        self.properties.iter().map(|p| p.failed).sum()
    }
}

// ── Suite ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub seed: u64,
    /// Cases per randomized property.
    pub cases: u64,
    /// Populations have `1..=max_population` records.
    pub max_population: usize,
    /// `None` disables shrinking.
    pub shrink: Option<ShrinkConfig>,
    /// Where failing cases are written; `None` disables bundles.
    pub bundle_dir: Option<PathBuf>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            seed: crate::ROSTER_SEED,
            cases: 100,
            max_population: 20,
            shrink: Some(ShrinkConfig::default()),
            bundle_dir: None,
        }
    }
}

/// Drives every property against one program.
#[derive(Debug)]
pub struct PropertySuite {
    driver: ProgramDriver,
    config: SuiteConfig,
}

/// Output of one invocation as seen by a check.
enum Captured {
    Output(String),
    TimedOut { elapsed_ms: u128, partial: String },
}

impl PropertySuite {
    #[must_use]
    pub fn new(driver: ProgramDriver, config: SuiteConfig) -> Self {
        Self { driver, config }
    }

    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Runs each property in order.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; remaining properties are not run.
    pub fn run_all(&self, properties: &[Property]) -> Result<RunReport> {
        let mut reports = Vec::with_capacity(properties.len());
        for &property in properties {
            reports.push(self.run_property(property)?);
        }
        Ok(RunReport {
            seed: self.config.seed,
            properties: reports,
        })
    }

    /// Runs every case of `property`.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error.
    pub fn run_property(&self, property: Property) -> Result<PropertyReport> {
        let case_count = match property {
            Property::EmptyInput => 2,
            _ => self.config.cases,
        };
        info!(property = %property, cases = case_count, seed = self.config.seed, "property start");

        let mut report = PropertyReport::new(property);
        for index in 0..case_count {
            let seed = derive_case_seed(self.config.seed, property.as_str(), index);
            report.cases += 1;
            match self.run_case(property, index, seed)? {
                CaseOutcome::Passed => report.passed += 1,
                CaseOutcome::Skipped(reason) => {
                    warn!(property = %property, case = index, seed, reason = %reason, "case skipped");
                    report.skipped += 1;
                }
                CaseOutcome::Failed(failure) => {
                    warn!(
                        property = %property,
                        case = index,
                        seed,
                        mode = %failure.mode,
                        reason = %failure.reason,
                        input = %failure.input,
                        "case failed"
                    );
                    if let Some(dir) = &self.config.bundle_dir {
                        report.bundles.push(crate::log::write_failure_bundle(dir, &failure)?);
                    }
                    report.failed += 1;
                    report.failures.push(*failure);
                }
            }
        }

        info!(
            property = %property,
            passed = report.passed,
            failed = report.failed,
            skipped = report.skipped,
            "property complete"
        );
        Ok(report)
    }

    /// Re-runs a single case from its seed, e.g. one taken from a report.
    ///
    /// # Errors
    ///
    /// Returns a fatal error raised by the case.
    pub fn replay(&self, property: Property, seed: u64) -> Result<CaseOutcome> {
        self.run_case(property, 0, seed)
    }

    fn run_case(&self, property: Property, index: u64, seed: u64) -> Result<CaseOutcome> {
        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = match property {
            Property::EmptyInput => {
                let ending = if index % 2 == 0 {
                    LineEnding::Lf
                } else {
                    LineEnding::CrLf
                };
                self.run_quit_only(index, seed, ending)
            }
            Property::BestRecord
            | Property::CrlfTolerance
            | Property::MergeSortStable
            | Property::QuickSortNames => self.run_population_case(property, index, seed, &mut rng),
            Property::InvalidMissingFields
            | Property::InvalidCorruptFields
            | Property::InvalidMixedFields => self.run_invalid_case(property, index, seed, &mut rng),
        };
        match outcome {
            Err(OracleError::Generation(reason)) => Ok(CaseOutcome::Skipped(reason)),
            other => other,
        }
    }

    fn invoke(&self, mode: Mode, input: &str) -> Result<Captured> {
        Ok(match self.driver.run(mode, input)? {
            RunOutcome::Completed(run) => Captured::Output(run.stdout),
            RunOutcome::TimedOut {
                elapsed,
                partial_stdout,
            } => Captured::TimedOut {
                elapsed_ms: elapsed.as_millis(),
                partial: partial_stdout,
            },
        })
    }

    fn run_quit_only(&self, index: u64, seed: u64, ending: LineEnding) -> Result<CaseOutcome> {
        let input = quit_only(ending);
        let (output, verdict) = match self.invoke(Mode::Best, &input)? {
            Captured::Output(output) => {
                let verdict = check_banner_only(&output);
                (output, verdict)
            }
            Captured::TimedOut { elapsed_ms, partial } => {
                (partial, timeout_verdict(elapsed_ms))
            }
        };
        Ok(match verdict {
            Verdict::Pass => CaseOutcome::Passed,
            Verdict::Fail(reason) => CaseOutcome::Failed(Box::new(CaseFailure {
                property: Property::EmptyInput,
                case_index: index,
                seed,
                mode: Mode::Best,
                input,
                output,
                reason,
                subject: CaseSubject::QuitOnly { ending },
                shrunk_from: None,
            })),
        })
    }

    fn run_population_case(
        &self,
        property: Property,
        index: u64,
        seed: u64,
        rng: &mut StdRng,
    ) -> Result<CaseOutcome> {
        let len = population_len(rng, self.config.max_population);
        let population = match property {
            Property::QuickSortNames => unique_name_population(rng, len)?,
            Property::MergeSortStable if rng.gen_bool(0.5) => tied_grade_population(rng, len)?,
            _ => valid_population(rng, len)?,
        };
        let (mode, ending) = population_mode(property);
        debug!(property = %property, case = index, seed, len, "population generated");

        let input = students_input(&population, ending);
        let (output, verdict, timed_out) = match self.invoke(mode, &input)? {
            Captured::Output(output) => {
                let verdict = evaluate_population(property, &population, &output)?;
                (output, verdict, false)
            }
            Captured::TimedOut { elapsed_ms, partial } => {
                (partial, timeout_verdict(elapsed_ms), true)
            }
        };
        let Verdict::Fail(reason) = verdict else {
            return Ok(CaseOutcome::Passed);
        };

        let mut failure = CaseFailure {
            property,
            case_index: index,
            seed,
            mode,
            input,
            output,
            reason,
            subject: CaseSubject::Population(population),
            shrunk_from: None,
        };
        if let (Some(shrink), false) = (self.config.shrink, timed_out) {
            self.shrink_failure(&mut failure, &shrink)?;
        }
        Ok(CaseOutcome::Failed(Box::new(failure)))
    }

    /// Replaces the failure's population, input, output and reason with
    /// those of the smallest still-failing sub-population.
    fn shrink_failure(&self, failure: &mut CaseFailure, shrink: &ShrinkConfig) -> Result<()> {
        let CaseSubject::Population(population) = &failure.subject else {
            return Ok(());
        };
        let original_len = population.len();
        if original_len <= 1 {
            return Ok(());
        }
        let (mode, ending) = population_mode(failure.property);
        let property = failure.property;
        let mut smallest: Option<(String, String, String)> = None;

        let shrunk = minimize_population(population, shrink, |candidate| {
            let input = students_input(candidate, ending);
            let Captured::Output(output) = self.invoke(mode, &input)? else {
                return Ok(false);
            };
            match evaluate_population(property, candidate, &output)? {
                Verdict::Pass => Ok(false),
                Verdict::Fail(reason) => {
                    smallest = Some((input, output, reason));
                    Ok(true)
                }
            }
        })?;

        if let Some((input, output, reason)) = smallest {
            if shrunk.population.len() < original_len {
                info!(
                    property = %property,
                    from = original_len,
                    to = shrunk.population.len(),
                    invocations = shrunk.invocations,
                    "failing population shrunk"
                );
                failure.shrunk_from = Some(original_len);
                failure.input = input;
                failure.output = output;
                failure.reason = reason;
                failure.subject = CaseSubject::Population(shrunk.population);
            }
        }
        Ok(())
    }

    fn run_invalid_case(
        &self,
        property: Property,
        index: u64,
        seed: u64,
        rng: &mut StdRng,
    ) -> Result<CaseOutcome> {
        let Some(profile) = property.corruption_profile() else {
            return Err(OracleError::Config(format!(
                "{property} is not an invalid-record property"
            )));
        };
        let student = valid_student(rng)?;
        let case = invalidate(rng, &student, profile)?;
        let style = if rng.gen_bool(0.5) {
            DeletionStyle::EmptyToken
        } else {
            DeletionStyle::Omit
        };
        let mode = Mode::ALL[rng.gen_range(0..Mode::ALL.len())];
        debug!(
            property = %property,
            case = index,
            seed,
            mode = %mode,
            corruption = %case.report,
            "invalid record generated"
        );

        let input = records_input(std::slice::from_ref(&case.record), style, LineEnding::Lf);
        let (output, verdict) = match self.invoke(mode, &input)? {
            Captured::Output(output) => {
                let verdict = check_rejected(&output);
                (output, verdict)
            }
            Captured::TimedOut { elapsed_ms, partial } => {
                (partial, timeout_verdict(elapsed_ms))
            }
        };
        Ok(match verdict {
            Verdict::Pass => CaseOutcome::Passed,
            Verdict::Fail(reason) => CaseOutcome::Failed(Box::new(CaseFailure {
                property,
                case_index: index,
                seed,
                mode,
                input,
                output,
                reason,
                subject: CaseSubject::Invalid { case, style },
                shrunk_from: None,
            })),
        })
    }
}

const fn population_mode(property: Property) -> (Mode, LineEnding) {
    match property {
        Property::CrlfTolerance => (Mode::Best, LineEnding::CrLf),
        Property::MergeSortStable => (Mode::MergeSort, LineEnding::Lf),
        Property::QuickSortNames => (Mode::QuickSort, LineEnding::Lf),
        _ => (Mode::Best, LineEnding::Lf),
    }
}

fn evaluate_population(property: Property, population: &[Student], output: &str) -> Result<Verdict> {
    Ok(match property {
        Property::BestRecord => check_best(population, output)?,
        Property::CrlfTolerance => check_accepted(output),
        Property::MergeSortStable => check_sorted(&sort_by_grade(population), output),
        Property::QuickSortNames => check_sorted(&sort_by_name(population), output),
        other => Verdict::Fail(format!("{other} is not a population property")),
    })
}

fn timeout_verdict(elapsed_ms: u128) -> Verdict {
    Verdict::Fail(format!("program did not exit within {elapsed_ms} ms"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, name: &str, grade: i64, age: i64) -> Student {
        Student::new(id, name, grade, age, "Israel", "Haifa").expect("valid")
    }

    fn al_bo() -> Vec<Student> {
        vec![
            student(1_234_567_890, "Al", 90, 20),
            student(2_234_567_890, "Bo", 90, 30),
        ]
    }

    #[test]
    fn property_names_roundtrip() {
        for property in Property::ALL {
            assert_eq!(property.as_str().parse::<Property>().expect("parse"), property);
        }
        assert!("best".parse::<Property>().is_err());
    }

    #[test]
    fn banner_must_be_alone() {
        assert_eq!(check_banner_only(&format!("{BANNER}\n")), Verdict::Pass);
        assert!(check_banner_only(&format!("{BANNER}\n{BANNER}\n")).is_fail());
        assert!(check_banner_only(BANNER).is_fail());
        assert!(check_banner_only("").is_fail());
    }

    #[test]
    fn best_line_keeps_trailing_tab() {
        let output = format!("{BANNER}\n{BEST_PREFIX}1234567890\tAl\t90\t20\tIsrael\tHaifa\t\n");
        assert_eq!(
            extract_best_line(&output),
            Some("1234567890\tAl\t90\t20\tIsrael\tHaifa\t")
        );
    }

    #[test]
    fn best_check_accepts_reference_winner() {
        let output = format!("{BANNER}\n{BEST_PREFIX}{}\n", al_bo()[0].to_line());
        assert_eq!(check_best(&al_bo(), &output).expect("check"), Verdict::Pass);
    }

    #[test]
    fn best_check_flags_wrong_winner() {
        let output = format!("{BANNER}\n{BEST_PREFIX}{}\n", al_bo()[1].to_line());
        assert!(check_best(&al_bo(), &output).expect("check").is_fail());
    }

    #[test]
    fn best_check_without_best_line_is_fatal() {
        let err = check_best(&al_bo(), &format!("{BANNER}\n")).expect_err("contract");
        assert!(matches!(err, OracleError::Contract(_)));
    }

    #[test]
    fn best_check_flags_marker_next_to_correct_winner() {
        let output = format!(
            "{BANNER}\n{DIAGNOSTIC_MARKER}spurious\n{BEST_PREFIX}{}\n",
            al_bo()[0].to_line()
        );
        let Verdict::Fail(reason) = check_best(&al_bo(), &output).expect("check") else {
            panic!("marker on valid input must fail");
        };
        assert!(reason.contains("diagnostic marker"));
    }

    #[test]
    fn accepted_output_has_no_marker_anywhere() {
        assert_eq!(check_accepted(&format!("{BANNER}\n")), Verdict::Pass);
        assert!(check_accepted(&format!("{BANNER}\n{DIAGNOSTIC_MARKER}bad id\n")).is_fail());
        assert!(check_accepted(&format!("{BANNER}\nline ERROR: inline\n")).is_fail());
    }

    #[test]
    fn sorted_check_needs_contiguous_block() {
        let expected = sort_by_grade(&al_bo());
        let good = format!("{BANNER}\n{}", encode_students(&expected));
        assert_eq!(check_sorted(&expected, &good), Verdict::Pass);

        let reversed: Vec<Student> = expected.iter().rev().cloned().collect();
        let bad = format!("{BANNER}\n{}", encode_students(&reversed));
        assert!(check_sorted(&expected, &bad).is_fail());

        let with_error = format!("{good}{DIAGNOSTIC_MARKER}oops\n");
        assert!(check_sorted(&expected, &with_error).is_fail());
    }

    #[test]
    fn rejection_needs_marker_at_line_start() {
        assert_eq!(
            check_rejected(&format!("{BANNER}\n{DIAGNOSTIC_MARKER}bad id\n")),
            Verdict::Pass
        );
        assert!(check_rejected(&format!("{BANNER}\nsaw ERROR: late\n")).is_fail());
        assert!(check_rejected(&format!("{BANNER}\n")).is_fail());
    }

    #[test]
    fn invalid_properties_map_to_profiles() {
        assert_eq!(
            Property::InvalidMissingFields.corruption_profile(),
            Some(CorruptionProfile::DeleteOnly)
        );
        assert_eq!(
            Property::InvalidCorruptFields.corruption_profile(),
            Some(CorruptionProfile::CorruptOnly)
        );
        assert_eq!(
            Property::InvalidMixedFields.corruption_profile(),
            Some(CorruptionProfile::Mixed)
        );
        assert_eq!(Property::BestRecord.corruption_profile(), None);
    }

    #[test]
    fn population_modes() {
        assert_eq!(population_mode(Property::CrlfTolerance), (Mode::Best, LineEnding::CrLf));
        assert_eq!(population_mode(Property::MergeSortStable).0, Mode::MergeSort);
        assert_eq!(population_mode(Property::QuickSortNames).0, Mode::QuickSort);
    }

    #[test]
    fn case_failure_serializes_subject() {
        let failure = CaseFailure {
            property: Property::EmptyInput,
            case_index: 1,
            seed: 5,
            mode: Mode::Best,
            input: "q\r\n".to_owned(),
            output: String::new(),
            reason: "silent".to_owned(),
            subject: CaseSubject::QuitOnly {
                ending: LineEnding::CrLf,
            },
            shrunk_from: None,
        };
        let json = serde_json::to_value(&failure).expect("serialize");
        assert_eq!(json["subject"]["kind"], "quit_only");
        assert_eq!(json["subject"]["data"]["ending"], "cr_lf");
        assert_eq!(json["property"], "empty_input");
    }
}
