use crate::model::Student;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of students enrolled in a study program, keyed by program name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStudy {
    pub name: String,
    #[serde(rename = "numberOfStudents")]
    pub student_count: usize,
}

/// Counts students per study program name in a single pass.
///
/// Programs sharing a name but differing in mode are counted together.
/// Entries come out in the order names are first seen.
pub fn aggregate<'a>(students: impl IntoIterator<Item = &'a Student>) -> Vec<ActiveStudy> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut studies: Vec<ActiveStudy> = Vec::new();

    for student in students {
        let name = student.study_program.name.as_str();
        match positions.get(name) {
            Some(&idx) => studies[idx].student_count += 1,
            None => {
                positions.insert(name, studies.len());
                studies.push(ActiveStudy {
                    name: name.to_string(),
                    student_count: 1,
                });
            }
        }
    }
    studies
}

#[cfg(test)]
use crate::model::StudyProgram;

#[cfg(test)]
fn enrolled(index: usize, name: &str, mode: &str) -> Student {
    Student {
        index_number: format!("s{}", index),
        first_name: "Jan".to_string(),
        last_name: "Nowak".to_string(),
        date_of_birth: chrono::NaiveDate::from_ymd_opt(1999, 5, 1).unwrap(),
        email: format!("{}@uni.pl", index),
        mothers_name: "Anna".to_string(),
        fathers_name: "Piotr".to_string(),
        study_program: StudyProgram::new(name, mode),
    }
}

#[test]
fn empty_input() {
    let students: Vec<Student> = Vec::new();
    assert!(aggregate(&students).is_empty());
}

#[test]
fn single_program() {
    let students: Vec<Student> = (0..4).map(|i| enrolled(i, "Informatyka", "Dzienne")).collect();
    let studies = aggregate(&students);

    assert_eq!(
        studies,
        vec![ActiveStudy {
            name: "Informatyka".to_string(),
            student_count: 4
        }]
    );
}

#[test]
fn mode_is_ignored_and_counts_sum_up() {
    let students = vec![
        enrolled(1, "Informatyka", "Dzienne"),
        enrolled(2, "Sztuka", "Dzienne"),
        enrolled(3, "Informatyka", "Zaoczne"),
        enrolled(4, "Matematyka", "Dzienne"),
        enrolled(5, "Sztuka", "Zaoczne"),
    ];
    let studies = aggregate(&students);

    assert_eq!(studies.len(), 3);
    assert_eq!(
        studies.iter().map(|s| s.student_count).sum::<usize>(),
        students.len()
    );
    let informatyka = studies.iter().find(|s| s.name == "Informatyka").unwrap();
    assert_eq!(informatyka.student_count, 2);
}
