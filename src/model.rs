use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Name and mode of a study program, e.g. `Informatyka` / `Dzienne`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudyProgram {
    pub name: String,
    pub mode: String,
}

impl StudyProgram {
    pub fn new(name: impl Into<String>, mode: impl Into<String>) -> Self {
        StudyProgram {
            name: name.into(),
            mode: mode.into(),
        }
    }
}

/// A single enrolled student.
///
/// Equality and hashing only look at the identity fields returned by
/// [`Student::key`]; parents' names and the study program are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "indexNumber")]
    pub index_number: String,
    #[serde(rename = "fname")]
    pub first_name: String,
    #[serde(rename = "lname")]
    pub last_name: String,
    #[serde(rename = "birthdate", with = "day_month_year")]
    pub date_of_birth: NaiveDate,
    pub email: String,
    #[serde(rename = "mothersName")]
    pub mothers_name: String,
    #[serde(rename = "fathersName")]
    pub fathers_name: String,
    #[serde(rename = "studies")]
    pub study_program: StudyProgram,
}

/// Owned projection of the fields that identify a student.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StudentKey {
    pub index_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
}

impl Student {
    pub fn key(&self) -> StudentKey {
        StudentKey {
            index_number: self.index_number.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth,
            email: self.email.clone(),
        }
    }

    fn key_ref(&self) -> (&str, &str, &str, NaiveDate, &str) {
        (
            &self.index_number,
            &self.first_name,
            &self.last_name,
            self.date_of_birth,
            &self.email,
        )
    }
}

impl PartialEq for Student {
    fn eq(&self, other: &Self) -> bool {
        self.key_ref() == other.key_ref()
    }
}

impl Eq for Student {}

impl Hash for Student {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_ref().hash(state)
    }
}

/// Serde helpers rendering a date as `DD.MM.YYYY`.
pub mod day_month_year {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%d.%m.%Y";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(de::Error::custom)
    }
}

#[cfg(test)]
fn student(index: &str, email: &str, program: StudyProgram) -> Student {
    Student {
        index_number: index.to_string(),
        first_name: "Jan".to_string(),
        last_name: "Kowalski".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 15).unwrap(),
        email: email.to_string(),
        mothers_name: "Anna".to_string(),
        fathers_name: "Piotr".to_string(),
        study_program: program,
    }
}

#[test]
fn identity_ignores_parents_and_program() {
    let a = student("s1234", "jan@uni.pl", StudyProgram::new("Informatyka", "Dzienne"));
    let mut b = student("s1234", "jan@uni.pl", StudyProgram::new("Sztuka", "Zaoczne"));
    b.mothers_name = "Ewa".to_string();

    assert_eq!(a, b);
    assert_eq!(a.key(), b.key());

    let set: std::collections::HashSet<Student> = vec![a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn identity_differs_on_email() {
    let program = StudyProgram::new("Informatyka", "Dzienne");
    let a = student("s1234", "jan@uni.pl", program.clone());
    let b = student("s1234", "jan2@uni.pl", program);

    assert_ne!(a, b);
    assert_ne!(a.key(), b.key());
}

#[test]
fn study_program_equality_uses_both_fields() {
    assert_eq!(
        StudyProgram::new("Informatyka", "Dzienne"),
        StudyProgram::new("Informatyka", "Dzienne")
    );
    assert_ne!(
        StudyProgram::new("Informatyka", "Dzienne"),
        StudyProgram::new("Informatyka", "Zaoczne")
    );
}

#[test]
fn birthdate_serializes_as_day_month_year() {
    let s = student("s1", "a@b.c", StudyProgram::new("Informatyka", "Dzienne"));
    let value = serde_json::to_value(&s).unwrap();

    assert_eq!(value["birthdate"], "15.01.2000");
    assert_eq!(value["fname"], "Jan");
    assert_eq!(value["studies"]["mode"], "Dzienne");
}
