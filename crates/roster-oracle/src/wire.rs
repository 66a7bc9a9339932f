//! Line-oriented wire format consumed by the external program.
//!
//! One canonical record line per record, each followed by a newline, and the
//! whole stream closed by the quit token on its own line. Line endings are
//! applied last, so LF and CRLF streams carry identical content.

use serde::{Deserialize, Serialize};

use crate::record::{DeletionStyle, Record, Student};

/// Line that tells the external program input is over.
pub const QUIT_TOKEN: &str = "q";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Rewrites every bare `\n` in `text` to this ending.
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Lf => text.to_owned(),
            Self::CrLf => text.replace('\n', "\r\n"),
        }
    }
}

/// Canonical lines of `students`, each terminated by `\n`, without quit.
///
/// This is also the exact block a sort mode must print.
#[must_use]
pub fn encode_students(students: &[Student]) -> String {
    students
        .iter()
        .map(|student| format!("{}\n", student.to_line()))
        .collect()
}

/// Full input stream for a valid population, quit token included.
#[must_use]
pub fn students_input(students: &[Student], ending: LineEnding) -> String {
    ending.apply(&format!("{}{QUIT_TOKEN}\n", encode_students(students)))
}

/// Full input stream for (possibly invalid) records, quit token included.
#[must_use]
pub fn records_input(records: &[Record], style: DeletionStyle, ending: LineEnding) -> String {
    let body: String = records
        .iter()
        .map(|record| format!("{}\n", record.to_line_with(style)))
        .collect();
    ending.apply(&format!("{body}{QUIT_TOKEN}\n"))
}

/// Input consisting only of the quit token.
#[must_use]
pub fn quit_only(ending: LineEnding) -> String {
    ending.apply(&format!("{QUIT_TOKEN}\n"))
}
