//! Randomized conformance oracle for the `manageStudents` record processor.
//!
//! This crate provides the infrastructure for:
//! - **Record model**: the six-field student record and its validity envelope
//! - **Generation**: seeded synthesis of valid records and populations
//! - **Corruption**: deletion and content corruption that always yields an invalid record
//! - **Wire format**: tab-delimited lines terminated by a quit token, LF or CRLF
//! - **Process driving**: running the external program under a timeout and
//!   enforcing its single-output-channel contract
//! - **Reference oracle**: independently computed best record and sort orders
//! - **Property suite**: the pass/fail predicates tying all of the above together
//! - **Shrinking and repro bundles**: minimal failing populations, written to disk
//! - **Configuration**: defaults, environment and command-line layering

pub mod config;
pub mod corrupt;
pub mod driver;
pub mod generate;
pub mod locate;
pub mod log;
pub mod record;
pub mod reference;
pub mod shrink;
pub mod suite;
pub mod wire;

// ─── Deterministic Seed Constants ───────────────────────────────────────────
//
// Every generated case derives its RNG state from a base seed, the property
// it belongs to and its index, so any failure can be replayed exactly.

/// Canonical default base seed ("ROSTER" as ASCII bytes).
pub const ROSTER_SEED: u64 = 0x524F_5354_4552;

/// Derives the seed of one case from the base seed, a property name and the
/// case index.
///
/// `case_seed = base ^ fnv1a(property) ^ (index * 0x9E3779B97F4A7C15)`
#[must_use]
pub fn derive_case_seed(base_seed: u64, property: &str, case_index: u64) -> u64 {
    base_seed ^ fnv1a(property) ^ case_index.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn fnv1a(text: &str) -> u64 {
    let mut hash = 0xCBF2_9CE4_8422_2325_u64;
    for byte in text.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
    }
    hash
}

pub type Result<T> = std::result::Result<T, OracleError>;

/// Errors that can arise while running the oracle.
///
/// Oracle mismatches are deliberately absent: a wrong answer from the
/// external program is a [`suite::CaseFailure`], not an error.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// An I/O error from the filesystem or the process boundary.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The executable could not be located unambiguously, or the host is
    /// unsupported.
    #[error("environment: {0}")]
    Environment(String),

    /// The external program broke its I/O contract (diagnostic-channel
    /// output, malformed best-record line).
    #[error("contract violation: {0}")]
    Contract(String),

    /// A generator exhausted its rejection-sampling budget.
    #[error("generation: {0}")]
    Generation(String),

    /// Invalid caller-supplied configuration.
    #[error("config: {0}")]
    Config(String),

    /// JSON encoding of a report or repro artifact failed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl OracleError {
    /// Whether this error must abort the whole run rather than a single case.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Environment(_) | Self::Contract(_) | Self::Config(_) | Self::Io(_)
        )
    }
}
