//! Repro bundles for failing cases.
//!
//! Each failing case can be written to its own directory so it can be
//! inspected and replayed without the oracle:
//! - `meta.json` for case metadata (property, seed, mode, input digest)
//! - `events.jsonl` for structured lifecycle events
//! - `input.txt` for the exact stdin stream
//! - `stdout.log` for the captured program output
//! - `subject.json` for the generated population or invalid record

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{error, info};

use crate::driver::Mode;
use crate::suite::{CaseFailure, Property};
use crate::{OracleError, Result};

/// Version of the bundle layout.
pub const BUNDLE_SCHEMA_VERSION: u32 = 1;

/// Files present in every repro bundle.
pub const REQUIRED_BUNDLE_FILES: [&str; 5] = [
    "meta.json",
    "events.jsonl",
    "input.txt",
    "stdout.log",
    "subject.json",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseEventKind {
    CaseStart,
    Generated,
    Invoked,
    Shrunk,
    Verdict,
    CaseEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMeta {
    pub schema_version: u32,
    pub property: Property,
    pub case_index: u64,
    pub seed: u64,
    pub mode: Mode,
    pub input_sha256: String,
    pub oracle_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseEvent {
    pub kind: CaseEventKind,
    pub step: u64,
    pub message: String,
    pub payload: BTreeMap<String, Value>,
}

#[derive(Debug)]
pub struct ReproBundle {
    root: PathBuf,
    events_file: File,
    next_step: u64,
}

impl ReproBundle {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn emit_event(
        &mut self,
        kind: CaseEventKind,
        message: impl Into<String>,
        payload: BTreeMap<String, Value>,
    ) -> Result<()> {
        let event = CaseEvent {
            kind,
            step: self.next_step,
            message: message.into(),
            payload,
        };
        self.next_step = self.next_step.saturating_add(1);
        let encoded = serde_json::to_string(&event)?;
        writeln!(self.events_file, "{encoded}")?;
        self.events_file.flush()?;
        Ok(())
    }

    pub fn write_text(&self, relative_path: &str, text: &str) -> Result<PathBuf> {
        let path = self.root.join(relative_path);
        fs::write(&path, text)?;
        Ok(path)
    }

    pub fn write_artifact_json<T: Serialize>(&self, relative_path: &str, value: &T) -> Result<PathBuf> {
        let path = self.root.join(relative_path);
        fs::write(&path, serde_json::to_vec_pretty(value)?)?;
        Ok(path)
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        self.emit_event(CaseEventKind::CaseEnd, "case_end", BTreeMap::new())?;
        info!(bundle = %self.root.display(), "repro bundle finalized");
        Ok(self.root)
    }
}

/// Creates `<base_dir>/<property>-case-<index>-seed-<seed>/` with its
/// metadata and an opening `case_start` event.
///
/// # Errors
///
/// Returns [`OracleError::Io`] or [`OracleError::Json`] on write failures.
pub fn init_repro_bundle(
    base_dir: &Path,
    property: Property,
    case_index: u64,
    seed: u64,
    mode: Mode,
    input: &str,
) -> Result<ReproBundle> {
    let root = base_dir.join(format!("{property}-case-{case_index}-seed-{seed}"));
    fs::create_dir_all(&root)?;

    let meta = BundleMeta {
        schema_version: BUNDLE_SCHEMA_VERSION,
        property,
        case_index,
        seed,
        mode,
        input_sha256: sha256_hex(input.as_bytes()),
        oracle_version: env!("CARGO_PKG_VERSION").to_owned(),
    };
    fs::write(root.join("meta.json"), serde_json::to_vec_pretty(&meta)?)?;

    let events_file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(root.join("events.jsonl"))?;

    let mut bundle = ReproBundle {
        root,
        events_file,
        next_step: 0,
    };
    bundle.emit_event(CaseEventKind::CaseStart, "case_start", BTreeMap::new())?;
    Ok(bundle)
}

/// Writes a complete bundle for `failure` under `base_dir`.
///
/// # Errors
///
/// Returns [`OracleError::Io`] or [`OracleError::Json`] on write failures.
pub fn write_failure_bundle(base_dir: &Path, failure: &CaseFailure) -> Result<PathBuf> {
    let mut bundle = init_repro_bundle(
        base_dir,
        failure.property,
        failure.case_index,
        failure.seed,
        failure.mode,
        &failure.input,
    )?;
    bundle.write_text("input.txt", &failure.input)?;
    bundle.write_text("stdout.log", &failure.output)?;
    bundle.write_artifact_json("subject.json", &failure.subject)?;

    bundle.emit_event(
        CaseEventKind::Generated,
        "subject_generated",
        payload([("subject", serde_json::to_value(&failure.subject)?)]),
    )?;
    if let Some(original_len) = failure.shrunk_from {
        bundle.emit_event(
            CaseEventKind::Shrunk,
            "population_minimized",
            payload([("original_len", Value::from(original_len))]),
        )?;
    }
    bundle.emit_event(
        CaseEventKind::Invoked,
        "program_invoked",
        payload([
            ("mode", Value::from(failure.mode.token())),
            ("stdout_bytes", Value::from(failure.output.len())),
        ]),
    )?;
    bundle.emit_event(
        CaseEventKind::Verdict,
        "case_failed",
        payload([("reason", Value::from(failure.reason.as_str()))]),
    )?;
    bundle.finish()
}

/// Checks that a bundle directory is complete and well formed.
///
/// # Errors
///
/// Returns [`OracleError::Config`] describing the first defect found.
pub fn validate_bundle(bundle_root: &Path) -> Result<BundleMeta> {
    let missing: Vec<&str> = REQUIRED_BUNDLE_FILES
        .iter()
        .copied()
        .filter(|name| !bundle_root.join(name).is_file())
        .collect();
    if !missing.is_empty() {
        error!(
            bundle = %bundle_root.display(),
            missing_count = missing.len(),
            "missing required repro bundle files"
        );
        return Err(OracleError::Config(format!(
            "missing required bundle files: {}",
            missing.join(", ")
        )));
    }

    let meta: BundleMeta = serde_json::from_slice(&fs::read(bundle_root.join("meta.json"))?)?;
    if meta.schema_version != BUNDLE_SCHEMA_VERSION {
        return Err(OracleError::Config(format!(
            "unsupported bundle schema version: expected {BUNDLE_SCHEMA_VERSION}, got {}",
            meta.schema_version
        )));
    }
    let input = fs::read(bundle_root.join("input.txt"))?;
    if sha256_hex(&input) != meta.input_sha256 {
        return Err(OracleError::Config("input.txt does not match its digest".to_owned()));
    }

    let reader = BufReader::new(File::open(bundle_root.join("events.jsonl"))?);
    let mut events = Vec::new();
    for line in reader.lines() {
        let event: CaseEvent = serde_json::from_str(&line?)?;
        events.push(event.kind);
    }
    if events.first() != Some(&CaseEventKind::CaseStart) {
        return Err(OracleError::Config("events.jsonl must start with case_start".to_owned()));
    }
    if events.last() != Some(&CaseEventKind::CaseEnd) {
        return Err(OracleError::Config("events.jsonl must end with case_end".to_owned()));
    }
    Ok(meta)
}

fn payload<const N: usize>(entries: [(&str, Value); N]) -> BTreeMap<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(64);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
