use crate::aggregate::ActiveStudy;
use crate::config::parent_dir;
use crate::error::{Result, RosterError};
use crate::model::Student;
use chrono::NaiveDateTime;
use log::info;
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Top level of the written document: `{"university": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniversityDocument {
    pub university: University,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    #[serde(with = "created_at")]
    pub created_at: NaiveDateTime,
    pub author: String,
    pub students: Vec<Student>,
    pub active_studies: Vec<ActiveStudy>,
}

impl UniversityDocument {
    pub fn assemble(
        students: Vec<Student>,
        active_studies: Vec<ActiveStudy>,
        author: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        UniversityDocument {
            university: University {
                created_at,
                author: author.into(),
                students,
                active_studies,
            },
        }
    }

    pub fn write_results<T: Write>(&self, target: T) -> Result<()> {
        serde_json::to_writer_pretty(target, self)?;
        Ok(())
    }
}

/// Writes `document` to `path` through a temporary file in the same
/// directory, so a failed write leaves the destination untouched.
pub fn write_document(document: &UniversityDocument, path: &Path) -> Result<()> {
    let output_error = |source: std::io::Error| RosterError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut file = NamedTempFile::new_in(parent_dir(path)).map_err(output_error)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        document.write_results(&mut writer).map_err(|e| match e {
            RosterError::Serialize(e) if e.is_io() => output_error(e.into()),
            e => e,
        })?;
        writer.flush().map_err(output_error)?;
    }
    file.as_file().sync_all().map_err(output_error)?;
    file.persist(path).map_err(|e| output_error(e.error))?;

    info!(
        "wrote {} students to {}",
        document.university.students.len(),
        path.display()
    );
    Ok(())
}

/// `createdAt` keeps only the day, rendered as `DD.MM.YYYY`; it reads back
/// as midnight of that day.
mod created_at {
    use crate::model::day_month_year;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(at: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        day_month_year::serialize(&at.date(), serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let date: NaiveDate = day_month_year::deserialize(deserializer)?;
        Ok(date.and_time(chrono::NaiveTime::MIN))
    }
}

#[cfg(test)]
fn now() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap()
}

#[test]
fn empty_document_shape() {
    let document = UniversityDocument::assemble(Vec::new(), Vec::new(), "Registrar", now());
    let mut output = Vec::new();
    document.write_results(&mut output).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "university": {
                "createdAt": "09.03.2024",
                "author": "Registrar",
                "students": [],
                "activeStudies": []
            }
        })
    );
}

#[test]
fn unwritable_destination_is_an_output_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("university.json");
    let document = UniversityDocument::assemble(Vec::new(), Vec::new(), "Registrar", now());

    assert!(matches!(
        write_document(&document, &path),
        Err(RosterError::OutputWrite { .. })
    ));
    assert!(!path.exists());
}
