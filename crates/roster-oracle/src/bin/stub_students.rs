//! Minimal conforming `manageStudents` used to exercise the oracle end to
//! end. Reads records until the quit line, reports rejected lines with the
//! diagnostic marker, then prints the result of the selected mode.
//!
//! Never writes to stderr: that channel belongs to contract violations.
//!
//! Best record and both sorts are computed here, not with the oracle's
//! reference functions, so end-to-end agreement is meaningful.

use std::env;
use std::io::{self, BufRead, BufWriter, Write};
use std::process::ExitCode;

use roster_oracle::driver::Mode;
use roster_oracle::record::{MAX_LINE_LEN, Student};
use roster_oracle::suite::{BANNER, BEST_PREFIX, DIAGNOSTIC_MARKER};
use roster_oracle::wire::QUIT_TOKEN;

fn main() -> ExitCode {
    let mode = env::args().nth(1).and_then(|token| token.parse::<Mode>().ok());
    match run(mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn run(mode: Option<Mode>) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "{BANNER}")?;

    let Some(mode) = mode else {
        writeln!(out, "{DIAGNOSTIC_MARKER}usage: stub_students <best|merge|quick>")?;
        return out.flush();
    };

    let mut students: Vec<Student> = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line == QUIT_TOKEN {
            break;
        }
        match parse_student(line) {
            Ok(student) => students.push(student),
            Err(reason) => writeln!(out, "{DIAGNOSTIC_MARKER}{reason}")?,
        }
    }

    match mode {
        Mode::Best => {
            if let Some(best) = best_by_ratio(&students) {
                writeln!(out, "{BEST_PREFIX}{}", best.to_line())?;
            }
        }
        Mode::MergeSort => {
            for student in merge_sort_by_grade(students) {
                writeln!(out, "{}", student.to_line())?;
            }
        }
        Mode::QuickSort => {
            quick_sort_by_name(&mut students);
            for student in &students {
                writeln!(out, "{}", student.to_line())?;
            }
        }
    }
    out.flush()
}

/// First record with the strictly largest grade/age, compared by
/// cross-multiplication so no floating point is involved.
fn best_by_ratio(students: &[Student]) -> Option<&Student> {
    let (first, rest) = students.split_first()?;
    let mut best = first;
    for student in rest {
        if student.grade() * best.age() > best.grade() * student.age() {
            best = student;
        }
    }
    Some(best)
}

/// Top-down merge sort; takes from the left run on equal grades.
fn merge_sort_by_grade(mut students: Vec<Student>) -> Vec<Student> {
    if students.len() <= 1 {
        return students;
    }
    let right = students.split_off(students.len() / 2);
    let left = merge_sort_by_grade(students);
    let right = merge_sort_by_grade(right);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        let next = if r.grade() < l.grade() {
            right.next()
        } else {
            left.next()
        };
        merged.extend(next);
    }
    merged.extend(left);
    merged.extend(right);
    merged
}

/// Lomuto-partition quicksort by name.
fn quick_sort_by_name(students: &mut [Student]) {
    let Some(pivot) = students.len().checked_sub(1) else {
        return;
    };
    let mut store = 0;
    for i in 0..pivot {
        if students[i].name() < students[pivot].name() {
            students.swap(i, store);
            store += 1;
        }
    }
    students.swap(store, pivot);
    let (lower, upper) = students.split_at_mut(store);
    quick_sort_by_name(lower);
    quick_sort_by_name(&mut upper[1..]);
}

fn parse_student(line: &str) -> Result<Student, String> {
    if line.chars().count() > MAX_LINE_LEN {
        return Err(format!("line longer than {MAX_LINE_LEN} characters"));
    }
    let Some(body) = line.strip_suffix('\t') else {
        return Err("line must end with a tab".to_owned());
    };
    let tokens: Vec<&str> = body.split('\t').collect();
    let [id, name, grade, age, country, city] = tokens.as_slice() else {
        return Err(format!("expected 6 fields, found {}", tokens.len()));
    };
    Student::new(
        parse_int("id", id)?,
        *name,
        parse_int("grade", grade)?,
        parse_int("age", age)?,
        *country,
        *city,
    )
    .map_err(|violation| violation.to_string())
}

fn parse_int(field: &str, token: &str) -> Result<i64, String> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("{field} must be an integer, got {token:?}"));
    }
    token
        .parse()
        .map_err(|_| format!("{field} out of range: {token}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, name: &str, grade: i64, age: i64) -> Student {
        Student::new(id, name, grade, age, "Israel", "Haifa").expect("valid")
    }

    fn names(students: &[Student]) -> Vec<&str> {
        students.iter().map(Student::name).collect()
    }

    #[test]
    fn best_keeps_first_of_equal_ratios() {
        let students = vec![
            student(1_234_567_890, "Al", 50, 25),
            student(2_234_567_890, "Bo", 80, 40),
            student(3_234_567_890, "Cy", 90, 30),
        ];
        assert_eq!(best_by_ratio(&students).map(Student::name), Some("Cy"));
        assert_eq!(best_by_ratio(&students[..2]).map(Student::name), Some("Al"));
        assert!(best_by_ratio(&[]).is_none());
    }

    #[test]
    fn merge_sort_is_stable() {
        let students = vec![
            student(1_234_567_890, "Cy", 70, 20),
            student(2_234_567_890, "Al", 50, 20),
            student(3_234_567_890, "Bo", 70, 20),
            student(4_234_567_890, "Di", 50, 20),
            student(5_234_567_890, "Ed", 10, 20),
        ];
        assert_eq!(
            names(&merge_sort_by_grade(students)),
            ["Ed", "Al", "Di", "Cy", "Bo"]
        );
    }

    #[test]
    fn quick_sort_orders_names() {
        let mut students = vec![
            student(1_234_567_890, "bob", 70, 20),
            student(2_234_567_890, "Zed", 50, 20),
            student(3_234_567_890, "Amy-Lee", 70, 20),
            student(4_234_567_890, "Amy Lee", 70, 20),
        ];
        quick_sort_by_name(&mut students);
        assert_eq!(names(&students), ["Amy Lee", "Amy-Lee", "Zed", "bob"]);
    }

    #[test]
    fn parse_rejects_short_and_untrimmed_lines() {
        assert!(parse_student("1234567890\tAl\t90\t20\tIsrael\tHaifa\t").is_ok());
        assert!(parse_student("1234567890\tAl\t90\t20\tIsrael\tHaifa").is_err());
        assert!(parse_student("1234567890\tAl\t90\t20\tHaifa\t").is_err());
        assert!(parse_student("1234567890\tAl\t9x\t20\tIsrael\tHaifa\t").is_err());
    }
}
