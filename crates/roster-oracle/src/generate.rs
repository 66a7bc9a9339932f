//! Seeded generation of valid students and populations.
//!
//! Primitive generators (bounded integers, bounded-alphabet strings) compose
//! into record generators; cross-field constraints such as the line ceiling
//! are enforced by [`retry_until`], which discards and redraws instead of
//! trimming values.
//!
//! This module is pure computation: all randomness comes from the caller's
//! RNG, so a `StdRng` seeded from [`crate::derive_case_seed`] replays a case
//! exactly.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use rand::Rng;
use tracing::trace;

use crate::record::{
    AGE_RANGE, GRADE_RANGE, ID_RANGE, MAX_FIELD_LEN, NAME_ALPHABET, PLACE_ALPHABET, Student,
};
use crate::{OracleError, Result};

/// Draws allowed before a generator gives up.
pub const DEFAULT_ATTEMPT_BUDGET: usize = 10_000;

/// Rejection sampling: calls `attempt` until it yields `Some`, at most
/// [`DEFAULT_ATTEMPT_BUDGET`] times.
///
/// # Errors
///
/// Returns [`OracleError::Generation`] when the budget is exhausted.
pub fn retry_until<R, T, F>(rng: &mut R, what: &str, mut attempt: F) -> Result<T>
where
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> Option<T>,
{
    for rejected in 0..DEFAULT_ATTEMPT_BUDGET {
        if let Some(value) = attempt(rng) {
            if rejected > 0 {
                trace!(what, rejected, "rejection sampling accepted");
            }
            return Ok(value);
        }
    }
    Err(OracleError::Generation(format!(
        "{what}: no acceptable value after {DEFAULT_ATTEMPT_BUDGET} draws"
    )))
}

// ── Primitives ──────────────────────────────────────────────────────────

pub fn int_in<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<i64>) -> i64 {
    rng.gen_range(range)
}

/// A string of `len` characters drawn uniformly from an ASCII `alphabet`.
///
/// # Panics
///
/// Panics if `alphabet` is empty.
pub fn alphabet_string<R: Rng + ?Sized>(
    rng: &mut R,
    alphabet: &str,
    len: RangeInclusive<usize>,
) -> String {
    let symbols = alphabet.as_bytes();
    let len = rng.gen_range(len);
    (0..len)
        .map(|_| char::from(symbols[rng.gen_range(0..symbols.len())]))
        .collect()
}

/// A trimmed, non-blank name; `None` when the draw is all whitespace.
pub fn name<R: Rng + ?Sized>(rng: &mut R) -> Option<String> {
    let raw = alphabet_string(rng, NAME_ALPHABET, 1..=MAX_FIELD_LEN);
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

pub fn place<R: Rng + ?Sized>(rng: &mut R) -> String {
    alphabet_string(rng, PLACE_ALPHABET, 1..=MAX_FIELD_LEN)
}

// ── Students ────────────────────────────────────────────────────────────

/// One valid student; redrawn whole whenever the line ceiling is exceeded.
///
/// # Errors
///
/// Returns [`OracleError::Generation`] if no valid draw is found.
pub fn valid_student<R: Rng + ?Sized>(rng: &mut R) -> Result<Student> {
    retry_until(rng, "valid_student", |rng| {
        let id = int_in(rng, ID_RANGE);
        let name = name(rng)?;
        let grade = int_in(rng, GRADE_RANGE);
        let age = int_in(rng, AGE_RANGE);
        let country = place(rng);
        let city = place(rng);
        Student::new(id, name, grade, age, country, city).ok()
    })
}

/// Population size in `1..=max_len`.
pub fn population_len<R: Rng + ?Sized>(rng: &mut R, max_len: usize) -> usize {
    rng.gen_range(1..=max_len.max(1))
}

/// `len` independent valid students.
///
/// # Errors
///
/// Propagates [`valid_student`] failures.
pub fn valid_population<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Result<Vec<Student>> {
    (0..len).map(|_| valid_student(rng)).collect()
}

/// `len` valid students whose grades come from a pool of at most three
/// values, so equal-grade runs are common.
///
/// # Errors
///
/// Propagates [`valid_student`] failures.
pub fn tied_grade_population<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Result<Vec<Student>> {
    let pool_size = rng.gen_range(1..=3);
    let pool: Vec<i64> = (0..pool_size).map(|_| int_in(rng, GRADE_RANGE)).collect();
    (0..len)
        .map(|_| {
            let base = valid_student(rng)?;
            let grade = pool[rng.gen_range(0..pool.len())];
            Student::new(
                base.id(),
                base.name(),
                grade,
                base.age(),
                base.country(),
                base.city(),
            )
            .map_err(|violation| OracleError::Generation(violation.to_string()))
        })
        .collect()
}

/// `len` valid students with pairwise-distinct names.
///
/// # Errors
///
/// Propagates [`valid_student`] failures or an exhausted uniqueness budget.
pub fn unique_name_population<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Result<Vec<Student>> {
    let mut seen = BTreeSet::new();
    let mut population = Vec::with_capacity(len);
    for _ in 0..len {
        let student = retry_until(rng, "unique_name_student", |rng| {
            valid_student(rng)
                .ok()
                .filter(|candidate| !seen.contains(candidate.name()))
        })?;
        seen.insert(student.name().to_owned());
        population.push(student);
    }
    Ok(population)
}
