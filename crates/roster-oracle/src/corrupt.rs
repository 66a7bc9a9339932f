//! Corruption engine: turns a valid student into a record that is
//! guaranteed to be invalid.
//!
//! A non-empty subset of the six fields is chosen; each chosen field is
//! either deleted or has its content corrupted according to its declared
//! kind. Every corruption produces a [`CorruptionReport`] recording exactly
//! what was changed so a failing case can be read without replaying it.
//!
//! # Guarantees
//!
//! - Every numeric corruption re-checks its output against the field's
//!   domain and redraws if it landed back inside it.
//! - Deletions are applied after all content corruption has been computed.
//! - The finished record is re-checked against the line ceiling and against
//!   validity as a whole; either failure discards the draw.

use std::fmt;

use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::generate::retry_until;
use crate::record::{Field, FieldKind, FieldValue, Record, Student};
use crate::{OracleError, Result};

/// Replacement characters for content corruption.
pub const ILLEGAL_CHARACTERS: &str = "!@#$%^&*()_+=/0123456789";

/// Out-of-range magnitudes are drawn from `-OUT_OF_RANGE_BOUND..OUT_OF_RANGE_BOUND`.
pub const OUT_OF_RANGE_BOUND: i64 = 1 << 31;

/// At most this many characters are replaced in one field.
const MAX_CORRUPTED_POSITIONS: usize = 6;

// ── CorruptionProfile ───────────────────────────────────────────────────

/// Which invalidation techniques a case may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptionProfile {
    DeleteOnly,
    CorruptOnly,
    Mixed,
}

impl CorruptionProfile {
    pub const ALL: [Self; 3] = [Self::DeleteOnly, Self::CorruptOnly, Self::Mixed];

    /// Builds a profile from the two independent switches.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Config`] when both switches are off.
    pub fn from_switches(delete_fields: bool, corrupt_fields: bool) -> Result<Self> {
        match (delete_fields, corrupt_fields) {
            (true, true) => Ok(Self::Mixed),
            (true, false) => Ok(Self::DeleteOnly),
            (false, true) => Ok(Self::CorruptOnly),
            (false, false) => Err(OracleError::Config(
                "at least one of field deletion or field corruption must be enabled".to_owned(),
            )),
        }
    }

    #[must_use]
    pub const fn may_delete(self) -> bool {
        matches!(self, Self::DeleteOnly | Self::Mixed)
    }

    #[must_use]
    pub const fn may_corrupt(self) -> bool {
        matches!(self, Self::CorruptOnly | Self::Mixed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeleteOnly => "delete_only",
            Self::CorruptOnly => "corrupt_only",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for CorruptionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Report ──────────────────────────────────────────────────────────────

/// What happened to one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDamage {
    /// Field removed from the record.
    Deleted,
    /// Characters at `positions` replaced with illegal ones.
    Characters { positions: Vec<usize> },
    /// Sign flipped.
    Negated,
    /// Replaced by an integer outside the field's domain.
    OutOfRange,
    /// Decimal rendering corrupted at `positions` into non-numeric text.
    NonNumeric { positions: Vec<usize> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCorruption {
    pub field: Field,
    pub original: FieldValue,
    pub damage: FieldDamage,
}

/// Report documenting exactly what an invalidation changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorruptionReport {
    pub profile: CorruptionProfile,
    pub fields: Vec<FieldCorruption>,
}

impl CorruptionReport {
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|c| c.damage == FieldDamage::Deleted)
            .count()
    }

    #[must_use]
    pub fn corrupted_count(&self) -> usize {
        self.fields.len() - self.deleted_count()
    }
}

impl fmt::Display for CorruptionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.profile)?;
        for (i, corruption) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={:?}", corruption.field, corruption.damage)?;
        }
        f.write_str("]")
    }
}

/// An invalid record together with how it was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidRecord {
    pub record: Record,
    pub report: CorruptionReport,
}

// ── Content corruption ──────────────────────────────────────────────────

/// Replaces between one and six distinct positions of `text` with
/// characters from [`ILLEGAL_CHARACTERS`]. Returns the new text and the
/// sorted positions.
///
/// # Panics
///
/// Panics if `text` is empty.
pub fn corrupt_text<R: Rng + ?Sized>(rng: &mut R, text: &str) -> (String, Vec<usize>) {
    let chars: Vec<char> = text.chars().collect();
    let amount = rng.gen_range(1..=chars.len().min(MAX_CORRUPTED_POSITIONS));
    let mut positions = index::sample(rng, chars.len(), amount).into_vec();
    positions.sort_unstable();

    let illegal = ILLEGAL_CHARACTERS.as_bytes();
    let mut out = chars;
    for &pos in &positions {
        out[pos] = char::from(illegal[rng.gen_range(0..illegal.len())]);
    }
    (out.into_iter().collect(), positions)
}

/// Produces an out-of-domain replacement for the numeric `value` of
/// `field`: a sign flip, an out-of-range integer, or non-numeric text.
///
/// # Errors
///
/// Returns [`OracleError::Generation`] if every draw stayed valid.
pub fn corrupt_number<R: Rng + ?Sized>(
    rng: &mut R,
    field: Field,
    value: i64,
) -> Result<(FieldValue, FieldDamage)> {
    retry_until(rng, "numeric_corruption", |rng| {
        let (candidate, damage) = match rng.gen_range(0..3) {
            0 => {
                if value == 0 {
                    return None;
                }
                (FieldValue::Int(value.checked_neg()?), FieldDamage::Negated)
            }
            1 => (
                FieldValue::Int(rng.gen_range(-OUT_OF_RANGE_BOUND..OUT_OF_RANGE_BOUND)),
                FieldDamage::OutOfRange,
            ),
            _ => {
                let (text, positions) = corrupt_text(rng, &value.to_string());
                if text.parse::<i64>().is_ok() {
                    return None;
                }
                (FieldValue::Text(text), FieldDamage::NonNumeric { positions })
            }
        };
        (!field.accepts(&candidate)).then_some((candidate, damage))
    })
}

// ── Record invalidation ─────────────────────────────────────────────────

/// Derives an invalid record from `student` under `profile`.
///
/// # Errors
///
/// Returns [`OracleError::Generation`] if no acceptable record is drawn
/// within the attempt budget.
pub fn invalidate<R: Rng + ?Sized>(
    rng: &mut R,
    student: &Student,
    profile: CorruptionProfile,
) -> Result<InvalidRecord> {
    retry_until(rng, "invalid_record", |rng| {
        attempt_invalidate(rng, student, profile)
    })
}

fn attempt_invalidate<R: Rng + ?Sized>(
    rng: &mut R,
    student: &Student,
    profile: CorruptionProfile,
) -> Option<InvalidRecord> {
    let amount = rng.gen_range(1..=Field::ALL.len());
    let mut chosen = index::sample(rng, Field::ALL.len(), amount).into_vec();
    chosen.sort_unstable();

    let mut record = student.to_record();
    let mut report = Vec::with_capacity(chosen.len());
    let mut deletions = Vec::new();

    for field in chosen.into_iter().map(|i| Field::ALL[i]) {
        let original = record.get(field)?.clone();
        let delete = profile.may_delete() && (!profile.may_corrupt() || rng.gen_bool(0.5));
        if delete {
            deletions.push(field);
            report.push(FieldCorruption {
                field,
                original,
                damage: FieldDamage::Deleted,
            });
            continue;
        }

        let (value, damage) = match (field.kind(), &original) {
            (FieldKind::Text, FieldValue::Text(text)) => {
                let (text, positions) = corrupt_text(rng, text);
                (FieldValue::Text(text), FieldDamage::Characters { positions })
            }
            (FieldKind::Numeric, FieldValue::Int(v)) => corrupt_number(rng, field, *v).ok()?,
            _ => return None,
        };
        record.set(field, value);
        report.push(FieldCorruption {
            field,
            original,
            damage,
        });
    }

    for field in deletions {
        record.clear(field);
    }

    if !record.fits_line() || record.is_valid() {
        return None;
    }
    Some(InvalidRecord {
        record,
        report: CorruptionReport {
            profile,
            fields: report,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::valid_student;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn al() -> Student {
        Student::new(1_234_567_890, "Al", 0, 20, "Israel", "Haifa").expect("valid")
    }

    #[test]
    fn neither_switch_is_a_config_error() {
        assert!(matches!(
            CorruptionProfile::from_switches(false, false),
            Err(OracleError::Config(_))
        ));
        assert_eq!(
            CorruptionProfile::from_switches(true, false).expect("profile"),
            CorruptionProfile::DeleteOnly
        );
    }

    #[test]
    fn corrupt_text_replaces_at_least_one_position() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let (out, positions) = corrupt_text(&mut rng, "Haifa");
            assert!(!positions.is_empty() && positions.len() <= 5);
            assert_eq!(out.chars().count(), 5);
            for pos in positions {
                let ch = out.chars().nth(pos).expect("position in range");
                assert!(ILLEGAL_CHARACTERS.contains(ch));
            }
        }
    }

    #[test]
    fn zero_grade_never_comes_back_valid() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..500 {
            let (value, damage) = corrupt_number(&mut rng, Field::Grade, 0).expect("corrupt");
            assert!(!Field::Grade.accepts(&value), "{value:?} via {damage:?}");
            assert_ne!(damage, FieldDamage::Negated);
        }
    }

    #[test]
    fn delete_only_on_fixed_student_leaves_no_content_damage() {
        let mut rng = StdRng::seed_from_u64(3);
        let case = invalidate(&mut rng, &al(), CorruptionProfile::DeleteOnly).expect("invalidate");
        assert_eq!(case.report.corrupted_count(), 0);
        assert!(case.report.deleted_count() >= 1);
    }

    proptest! {
        #[test]
        fn invalidated_records_are_never_valid(seed in any::<u64>(), profile_idx in 0usize..3) {
            let mut rng = StdRng::seed_from_u64(seed);
            let profile = CorruptionProfile::ALL[profile_idx];
            let student = valid_student(&mut rng).expect("generate");
            let case = invalidate(&mut rng, &student, profile).expect("invalidate");

            prop_assert!(!case.record.is_valid());
            prop_assert!(case.record.fits_line());
            prop_assert!(!case.report.fields.is_empty());
            prop_assert!(case.report.fields.len() <= 6);
            if !profile.may_delete() {
                prop_assert_eq!(case.report.deleted_count(), 0);
                prop_assert_eq!(case.record.present_count(), 6);
            }
            if !profile.may_corrupt() {
                prop_assert_eq!(case.report.corrupted_count(), 0);
            }
            for corruption in &case.report.fields {
                match corruption.damage {
                    FieldDamage::Deleted => prop_assert!(!case.record.is_present(corruption.field)),
                    _ => prop_assert!(!corruption
                        .field
                        .accepts(case.record.get(corruption.field).expect("present"))),
                }
            }
        }

        #[test]
        fn numeric_corruption_leaves_domain(seed in any::<u64>(), value in 0i64..=9_999_999_999) {
            let mut rng = StdRng::seed_from_u64(seed);
            for field in [Field::Id, Field::Grade, Field::Age] {
                let (candidate, _) = corrupt_number(&mut rng, field, value).expect("corrupt");
                prop_assert!(!field.accepts(&candidate));
            }
        }
    }
}
