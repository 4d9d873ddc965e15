//! Student roster conversion.
//!
//! Reads a fixed-column comma separated file of students, drops malformed and
//! duplicate rows, counts students per study program and writes the result as
//! a JSON document.
//!
//! Input rows have exactly nine columns:
//! `firstName,lastName,programName,programMode,indexSuffix,dateOfBirth,email,mothersName,fathersName`.
//! There is no header row and no quoting.

pub mod aggregate;
pub mod config;
pub mod document;
pub mod error;
pub mod model;
pub mod pipeline;

pub use aggregate::{aggregate, ActiveStudy};
pub use config::{Config, OutputFormat};
pub use document::{write_document, University, UniversityDocument};
pub use error::{Result, RosterError};
pub use model::{Student, StudentKey, StudyProgram};
pub use pipeline::{run, write_rejections, Summary};

use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const FIELD_COUNT: usize = 9;
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    WrongFieldCount { found: usize },
    EmptyField,
    InvalidDate { value: String },
    Duplicate,
    /// Line is not valid UTF-8.
    Unreadable,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::WrongFieldCount { .. } => write!(f, "wrong field count"),
            RejectReason::EmptyField => write!(f, "empty field(s)"),
            RejectReason::InvalidDate { .. } => write!(f, "invalid date"),
            RejectReason::Duplicate => write!(f, "duplicate"),
            RejectReason::Unreadable => write!(f, "unreadable row"),
        }
    }
}

/// A row that did not make it into the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// 1-based line number in the input file.
    pub line: usize,
    pub raw: String,
    pub reason: RejectReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            RejectReason::WrongFieldCount { found } => write!(
                f,
                "(Line {}) - {} (expected {}, found {}): {}",
                self.line, self.reason, FIELD_COUNT, found, self.raw
            ),
            RejectReason::InvalidDate { value } => write!(
                f,
                "(Line {}) - {} '{}': {}",
                self.line, self.reason, value, self.raw
            ),
            _ => write!(f, "(Line {}) - {}: {}", self.line, self.reason, self.raw),
        }
    }
}

/// Result of ingesting one input file.
#[derive(Debug, Default)]
pub struct Ingested {
    /// Unique students in first-seen order.
    pub students: Vec<Student>,
    pub rejections: Vec<Rejection>,
    pub rows: usize,
}

/// Accumulates students row by row, keeping the first occurrence of each
/// identity and recording every rejected row.
pub struct Registrar {
    date_format: String,
    seen: HashSet<StudentKey>,
    students: Vec<Student>,
    rejections: Vec<Rejection>,
    rows: usize,
}

impl Registrar {
    pub fn new(date_format: impl Into<String>) -> Self {
        Registrar {
            date_format: date_format.into(),
            seen: HashSet::new(),
            students: Vec::new(),
            rejections: Vec::new(),
            rows: 0,
        }
    }

    pub fn consume<'a>(&mut self, rows: impl Iterator<Item = (usize, &'a str)>) {
        rows.for_each(|(line, raw)| self.process_row(line, raw));
    }

    pub fn process_row(&mut self, line: usize, raw: &str) {
        self.rows += 1;
        match self.parse_row(raw) {
            Ok(student) => {
                if self.seen.insert(student.key()) {
                    debug!("line {}: accepted {}", line, student.index_number);
                    self.students.push(student);
                } else {
                    self.reject(line, raw, RejectReason::Duplicate);
                }
            }
            Err(reason) => self.reject(line, raw, reason),
        }
    }

    fn parse_row(&self, raw: &str) -> std::result::Result<Student, RejectReason> {
        let columns: Vec<&str> = raw.split(',').collect();
        if columns.len() != FIELD_COUNT {
            return Err(RejectReason::WrongFieldCount {
                found: columns.len(),
            });
        }
        if columns.iter().any(|c| c.trim().is_empty()) {
            return Err(RejectReason::EmptyField);
        }

        let date_of_birth = NaiveDate::parse_from_str(columns[5].trim(), &self.date_format)
            .map_err(|_| RejectReason::InvalidDate {
                value: columns[5].to_string(),
            })?;

        Ok(Student {
            index_number: format!("s{}", columns[4]),
            first_name: columns[0].to_string(),
            last_name: columns[1].to_string(),
            date_of_birth,
            email: columns[6].to_string(),
            mothers_name: columns[7].to_string(),
            fathers_name: columns[8].to_string(),
            study_program: StudyProgram::new(columns[2], columns[3]),
        })
    }

    fn reject(&mut self, line: usize, raw: &str, reason: RejectReason) {
        warn!("line {} rejected: {}", line, reason);
        self.rejections.push(Rejection {
            line,
            raw: raw.to_string(),
            reason,
        });
    }

    pub fn finish(self) -> Ingested {
        Ingested {
            students: self.students,
            rejections: self.rejections,
            rows: self.rows,
        }
    }
}

/// Reads every line of `path` through a [`Registrar`].
///
/// Only a missing or unreadable file is an error; bad rows end up in
/// [`Ingested::rejections`].
pub fn ingest(path: &Path, date_format: &str) -> Result<Ingested> {
    let file = File::open(path).map_err(|source| RosterError::InputNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut registrar = Registrar::new(date_format);

    let mut buf = Vec::new();
    let mut line = 0;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| RosterError::InputRead {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        line += 1;

        let mut bytes = strip_line_ending(&buf);
        if line == 1 {
            bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        }
        match std::str::from_utf8(bytes) {
            Ok(raw) => registrar.process_row(line, raw),
            Err(_) => {
                registrar.rows += 1;
                let raw = String::from_utf8_lossy(bytes);
                registrar.reject(line, &raw, RejectReason::Unreadable);
            }
        }
    }

    Ok(registrar.finish())
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
const VALID: &str = "Jan,Kowalski,Informatyka,Dzienne,1234,2000-01-15,jan@uni.pl,Anna,Piotr";

#[test]
fn valid_row_maps_columns() {
    let mut registrar = Registrar::new(DEFAULT_DATE_FORMAT);
    registrar.process_row(1, VALID);
    let ingested = registrar.finish();

    assert!(ingested.rejections.is_empty());
    assert_eq!(ingested.students.len(), 1);
    let student = &ingested.students[0];
    assert_eq!(student.index_number, "s1234");
    assert_eq!(student.first_name, "Jan");
    assert_eq!(student.last_name, "Kowalski");
    assert_eq!(
        student.date_of_birth,
        NaiveDate::from_ymd_opt(2000, 1, 15).unwrap()
    );
    assert_eq!(student.email, "jan@uni.pl");
    assert_eq!(student.mothers_name, "Anna");
    assert_eq!(student.fathers_name, "Piotr");
    assert_eq!(
        student.study_program,
        StudyProgram::new("Informatyka", "Dzienne")
    );
}

#[test]
fn duplicate_keeps_first_occurrence() {
    let mut registrar = Registrar::new(DEFAULT_DATE_FORMAT);
    let other = "Jan,Kowalski,Sztuka,Zaoczne,1234,2000-01-15,jan@uni.pl,Ewa,Adam";
    registrar.consume(vec![(1, VALID), (2, other)].into_iter());
    let ingested = registrar.finish();

    assert_eq!(ingested.students.len(), 1);
    assert_eq!(ingested.students[0].mothers_name, "Anna");
    assert_eq!(ingested.rejections.len(), 1);
    assert_eq!(ingested.rejections[0].line, 2);
    assert_eq!(ingested.rejections[0].reason, RejectReason::Duplicate);
}

#[test]
fn wrong_field_count_is_rejected() {
    let mut registrar = Registrar::new(DEFAULT_DATE_FORMAT);
    registrar.process_row(3, "Jan,Kowalski,Informatyka,Dzienne,1234,2000-01-15,jan@uni.pl");
    registrar.process_row(4, "");
    let ingested = registrar.finish();

    assert!(ingested.students.is_empty());
    assert_eq!(
        ingested.rejections[0].reason,
        RejectReason::WrongFieldCount { found: 7 }
    );
    assert_eq!(ingested.rejections[0].line, 3);
    assert_eq!(
        ingested.rejections[1].reason,
        RejectReason::WrongFieldCount { found: 1 }
    );
}

#[test]
fn empty_fields_are_counted_then_rejected() {
    let mut registrar = Registrar::new(DEFAULT_DATE_FORMAT);
    registrar.process_row(1, "Jan,Kowalski,Informatyka,Dzienne,1234,2000-01-15,,Anna,Piotr");
    registrar.process_row(2, "Jan,  ,Informatyka,Dzienne,1234,2000-01-15,jan@uni.pl,Anna,Piotr");
    let ingested = registrar.finish();

    assert!(ingested.students.is_empty());
    assert!(ingested
        .rejections
        .iter()
        .all(|r| r.reason == RejectReason::EmptyField));
}

#[test]
fn invalid_date_is_rejected() {
    let mut registrar = Registrar::new(DEFAULT_DATE_FORMAT);
    registrar.process_row(1, "Jan,Kowalski,Informatyka,Dzienne,1234,2000-13-45,jan@uni.pl,Anna,Piotr");
    let ingested = registrar.finish();

    assert!(ingested.students.is_empty());
    assert_eq!(
        ingested.rejections[0].reason,
        RejectReason::InvalidDate {
            value: "2000-13-45".to_string()
        }
    );
}

#[test]
fn custom_date_format() {
    let mut registrar = Registrar::new("%d.%m.%Y");
    registrar.process_row(1, "Jan,Kowalski,Informatyka,Dzienne,1234,15.01.2000,jan@uni.pl,Anna,Piotr");
    let ingested = registrar.finish();

    assert_eq!(
        ingested.students[0].date_of_birth,
        NaiveDate::from_ymd_opt(2000, 1, 15).unwrap()
    );
}

#[test]
fn rejection_log_line_carries_line_reason_and_raw() {
    let rejection = Rejection {
        line: 7,
        raw: "a,b".to_string(),
        reason: RejectReason::WrongFieldCount { found: 2 },
    };
    assert_eq!(
        rejection.to_string(),
        "(Line 7) - wrong field count (expected 9, found 2): a,b"
    );
}
