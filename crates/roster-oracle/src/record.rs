//! Student record model and its validity envelope.
//!
//! Two shapes share one canonical line encoding:
//! - [`Student`]: every field present, typed and within its domain.
//! - [`Record`]: every field independently optional and loosely typed, the
//!   shape produced by the corruption engine.
//!
//! Canonical line: `id \t name \t grade \t age \t country \t city \t`
//! (note the trailing tab; the newline is added by [`crate::wire`]).

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Ceiling on the canonical line length, trailing tab included.
pub const MAX_LINE_LEN: usize = 150;

/// Maximum length of each string field.
pub const MAX_FIELD_LEN: usize = 40;

pub const ID_RANGE: RangeInclusive<i64> = 1_000_000_000..=9_999_999_999;
pub const GRADE_RANGE: RangeInclusive<i64> = 0..=100;
pub const AGE_RANGE: RangeInclusive<i64> = 18..=120;

/// Alphabet for country and city.
pub const PLACE_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ-";

/// Alphabet for names: the place alphabet plus the space character.
pub const NAME_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ- ";

const FIELD_SEPARATOR: char = '\t';

// ── Field ───────────────────────────────────────────────────────────────

/// The six record positions, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Name,
    Grade,
    Age,
    Country,
    City,
}

/// Declared type of a field; decides which corruption applies to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Numeric,
    Text,
}

impl Field {
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Name,
        Self::Grade,
        Self::Age,
        Self::Country,
        Self::City,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Id => 0,
            Self::Name => 1,
            Self::Grade => 2,
            Self::Age => 3,
            Self::Country => 4,
            Self::City => 5,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Grade => "grade",
            Self::Age => "age",
            Self::Country => "country",
            Self::City => "city",
        }
    }

    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Id | Self::Grade | Self::Age => FieldKind::Numeric,
            Self::Name | Self::Country | Self::City => FieldKind::Text,
        }
    }

    /// Valid integer domain of a numeric field.
    #[must_use]
    pub const fn numeric_range(self) -> Option<RangeInclusive<i64>> {
        match self {
            Self::Id => Some(ID_RANGE),
            Self::Grade => Some(GRADE_RANGE),
            Self::Age => Some(AGE_RANGE),
            Self::Name | Self::Country | Self::City => None,
        }
    }

    /// Whether `value` lies inside this field's valid domain.
    ///
    /// Numeric fields accept either an in-range integer or text that parses
    /// to one, since the external program only ever sees text.
    #[must_use]
    pub fn accepts(self, value: &FieldValue) -> bool {
        match (self.numeric_range(), value) {
            (Some(range), FieldValue::Int(v)) => range.contains(v),
            (Some(range), FieldValue::Text(text)) => {
                text.parse::<i64>().is_ok_and(|v| range.contains(&v))
            }
            (None, FieldValue::Text(text)) => match self {
                Self::Name => is_valid_name(text),
                _ => is_valid_place(text),
            },
            (None, FieldValue::Int(_)) => false,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `1..=40` characters from [`NAME_ALPHABET`], no leading or trailing
/// whitespace, not blank.
#[must_use]
pub fn is_valid_name(text: &str) -> bool {
    let len = text.chars().count();
    (1..=MAX_FIELD_LEN).contains(&len)
        && text.chars().all(|ch| NAME_ALPHABET.contains(ch))
        && text.trim() == text
        && !text.trim().is_empty()
}

/// `1..=40` characters from [`PLACE_ALPHABET`].
#[must_use]
pub fn is_valid_place(text: &str) -> bool {
    let len = text.chars().count();
    (1..=MAX_FIELD_LEN).contains(&len) && text.chars().all(|ch| PLACE_ALPHABET.contains(ch))
}

// ── FieldValue ──────────────────────────────────────────────────────────

/// Value of one field: numeric fields may carry text after corruption.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// ── Violations ──────────────────────────────────────────────────────────

/// Why a [`Record`] is not a valid [`Student`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordViolation {
    #[error("field {0} is missing")]
    Missing(Field),
    #[error("field {field} is out of domain: {value:?}")]
    OutOfDomain { field: Field, value: FieldValue },
    #[error("line is {len} characters, ceiling is {MAX_LINE_LEN}")]
    LineTooLong { len: usize },
}

// ── DeletionStyle ───────────────────────────────────────────────────────

/// How an absent field is rendered on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionStyle {
    /// The token stays but is empty (two adjacent tabs).
    #[default]
    EmptyToken,
    /// The token and its separator are dropped, leaving fewer tokens.
    Omit,
}

// ── Record ──────────────────────────────────────────────────────────────

/// A record whose fields may be absent or out of domain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    fields: [Option<FieldValue>; 6],
}

impl Record {
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields[field.index()].as_ref()
    }

    pub fn set(&mut self, field: Field, value: impl Into<FieldValue>) {
        self.fields[field.index()] = Some(value.into());
    }

    /// Removes a field, returning its previous value.
    pub fn clear(&mut self, field: Field) -> Option<FieldValue> {
        self.fields[field.index()].take()
    }

    #[must_use]
    pub fn is_present(&self, field: Field) -> bool {
        self.fields[field.index()].is_some()
    }

    #[must_use]
    pub fn present_count(&self) -> usize {
        self.fields.iter().flatten().count()
    }

    /// Canonical line with absent fields rendered per `style`.
    #[must_use]
    pub fn to_line_with(&self, style: DeletionStyle) -> String {
        let mut line = String::new();
        for slot in &self.fields {
            match (slot, style) {
                (Some(value), _) => {
                    line.push_str(&value.to_string());
                    line.push(FIELD_SEPARATOR);
                }
                (None, DeletionStyle::EmptyToken) => line.push(FIELD_SEPARATOR),
                (None, DeletionStyle::Omit) => {}
            }
        }
        line
    }

    /// Canonical line, absent fields rendered as empty tokens.
    #[must_use]
    pub fn to_line(&self) -> String {
        self.to_line_with(DeletionStyle::EmptyToken)
    }

    /// Whether the canonical line respects [`MAX_LINE_LEN`] under every
    /// deletion style (the empty-token rendering is never shorter).
    #[must_use]
    pub fn fits_line(&self) -> bool {
        self.to_line().chars().count() <= MAX_LINE_LEN
    }

    /// First reason this record is not a valid student, if any.
    #[must_use]
    pub fn first_violation(&self) -> Option<RecordViolation> {
        for field in Field::ALL {
            match self.get(field) {
                None => return Some(RecordViolation::Missing(field)),
                Some(value) if !field.accepts(value) => {
                    return Some(RecordViolation::OutOfDomain {
                        field,
                        value: value.clone(),
                    });
                }
                Some(_) => {}
            }
        }
        let len = self.to_line().chars().count();
        (len > MAX_LINE_LEN).then_some(RecordViolation::LineTooLong { len })
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.first_violation().is_none()
    }

    /// Fields that are absent or out of domain.
    #[must_use]
    pub fn invalid_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_none_or(|value| !field.accepts(value)))
            .collect()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

// ── Student ─────────────────────────────────────────────────────────────

/// A fully valid record. Construction validates every field and the line
/// ceiling, so holders of a `Student` never re-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Record", into = "Record")]
pub struct Student {
    id: i64,
    name: String,
    grade: i64,
    age: i64,
    country: String,
    city: String,
}

impl Student {
    /// Builds a student, rejecting any out-of-domain field or an over-long
    /// line.
    ///
    /// # Errors
    ///
    /// Returns the first [`RecordViolation`] found, in wire order.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        grade: i64,
        age: i64,
        country: impl Into<String>,
        city: impl Into<String>,
    ) -> Result<Self, RecordViolation> {
        let student = Self {
            id,
            name: name.into(),
            grade,
            age,
            country: country.into(),
            city: city.into(),
        };
        match student.to_record().first_violation() {
            Some(violation) => Err(violation),
            None => Ok(student),
        }
    }

    #[must_use]
    pub fn id(&self) -> i64 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn grade(&self) -> i64 {
        self.grade
    }

    #[must_use]
    pub fn age(&self) -> i64 {
        self.age
    }

    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// `grade / age` as a real number; the best-record score.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self) -> f64 {
        self.grade as f64 / self.age as f64
    }

    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = Record::default();
        record.set(Field::Id, self.id);
        record.set(Field::Name, self.name.as_str());
        record.set(Field::Grade, self.grade);
        record.set(Field::Age, self.age);
        record.set(Field::Country, self.country.as_str());
        record.set(Field::City, self.city.as_str());
        record
    }

    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t",
            self.id, self.name, self.grade, self.age, self.country, self.city
        )
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

impl From<Student> for Record {
    fn from(student: Student) -> Self {
        student.to_record()
    }
}

impl TryFrom<Record> for Student {
    type Error = RecordViolation;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        Self::try_from(&record)
    }
}

impl TryFrom<&Record> for Student {
    type Error = RecordViolation;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        if let Some(violation) = record.first_violation() {
            return Err(violation);
        }
        let int = |field: Field| -> Result<i64, RecordViolation> {
            match record.get(field) {
                Some(FieldValue::Int(v)) => Ok(*v),
                Some(FieldValue::Text(text)) => {
                    text.parse().map_err(|_| RecordViolation::OutOfDomain {
                        field,
                        value: FieldValue::Text(text.clone()),
                    })
                }
                None => Err(RecordViolation::Missing(field)),
            }
        };
        let text = |field: Field| -> Result<String, RecordViolation> {
            match record.get(field) {
                Some(value) => Ok(value.to_string()),
                None => Err(RecordViolation::Missing(field)),
            }
        };
        Ok(Self {
            id: int(Field::Id)?,
            name: text(Field::Name)?,
            grade: int(Field::Grade)?,
            age: int(Field::Age)?,
            country: text(Field::Country)?,
            city: text(Field::City)?,
        })
    }
}
