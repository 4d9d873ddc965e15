use chrono::{NaiveDate, NaiveDateTime};
use roster::{
    aggregate, ingest, run, ActiveStudy, Config, RejectReason, RosterError, UniversityDocument,
    DEFAULT_DATE_FORMAT,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const VALID: &str = "Jan,Kowalski,Informatyka,Dzienne,1234,2000-01-15,jan@uni.pl,Anna,Piotr";

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn config_in(dir: &TempDir, input: &str) -> Config {
    let input_path = dir.path().join("dane.csv");
    fs::write(&input_path, input).unwrap();
    Config::new(
        input_path,
        dir.path().join("university.json"),
        dir.path().join("log.txt"),
        "Registrar",
    )
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn valid_short_and_duplicate_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = format!(
        "{}\nJan,Kowalski,Informatyka,Dzienne,1234,2000-01-15,jan@uni.pl\n{}\n",
        VALID, VALID
    );
    let config = config_in(&dir, &input);

    let summary = run(&config, now()).unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.students, 1);
    assert_eq!(summary.rejected, 2);

    let value = read_json(&config.output);
    let university = &value["university"];
    assert_eq!(university["createdAt"], "09.03.2024");
    assert_eq!(university["author"], "Registrar");
    assert_eq!(
        university["students"],
        serde_json::json!([{
            "indexNumber": "s1234",
            "fname": "Jan",
            "lname": "Kowalski",
            "birthdate": "15.01.2000",
            "email": "jan@uni.pl",
            "mothersName": "Anna",
            "fathersName": "Piotr",
            "studies": { "name": "Informatyka", "mode": "Dzienne" }
        }])
    );
    assert_eq!(
        university["activeStudies"],
        serde_json::json!([{ "name": "Informatyka", "numberOfStudents": 1 }])
    );

    let log = fs::read_to_string(&config.log).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("(Line 2) - wrong field count"));
    assert!(lines[1].starts_with("(Line 3) - duplicate"));
    assert!(lines[1].ends_with(VALID));
}

#[test]
fn empty_input_gives_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, "");

    let summary = run(&config, now()).unwrap();
    assert_eq!(summary, roster::Summary::default());

    let value = read_json(&config.output);
    assert_eq!(value["university"]["students"], serde_json::json!([]));
    assert_eq!(value["university"]["activeStudies"], serde_json::json!([]));
    assert_eq!(fs::read_to_string(&config.log).unwrap(), "");
}

#[test]
fn document_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let input = [
        VALID,
        "Ewa,Nowak,Sztuka,Zaoczne,77,1998-12-01,ewa@uni.pl,Maria,Jan",
        "Adam,Lis,Informatyka,Zaoczne,78,1999-06-30,adam@uni.pl,Ola,Tomasz",
    ]
    .join("\r\n");
    let config = config_in(&dir, &input);
    run(&config, now()).unwrap();

    let ingested = ingest(&config.input, DEFAULT_DATE_FORMAT).unwrap();
    let written: UniversityDocument =
        serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();
    let university = written.university;

    assert_eq!(university.created_at.date(), now().date());
    assert_eq!(university.students.len(), ingested.students.len());
    for (read, original) in university.students.iter().zip(&ingested.students) {
        assert_eq!(read.index_number, original.index_number);
        assert_eq!(read.first_name, original.first_name);
        assert_eq!(read.last_name, original.last_name);
        assert_eq!(read.date_of_birth, original.date_of_birth);
        assert_eq!(read.email, original.email);
        assert_eq!(read.mothers_name, original.mothers_name);
        assert_eq!(read.fathers_name, original.fathers_name);
        assert_eq!(read.study_program, original.study_program);
    }

    let mut expected = aggregate(&ingested.students);
    let mut actual = university.active_studies;
    expected.sort_by(|a, b| a.name.cmp(&b.name));
    actual.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(actual, expected);
    assert!(actual.contains(&ActiveStudy {
        name: "Informatyka".to_string(),
        student_count: 2
    }));
}

#[test]
fn rejection_line_numbers_are_one_based() {
    let dir = tempfile::tempdir().unwrap();
    let input = format!("{}\n\nJan,Kowalski\n{}x\n", VALID, VALID.replace("2000-01-15", "15/01/2000"));
    let config = config_in(&dir, &input);

    let ingested = ingest(&config.input, DEFAULT_DATE_FORMAT).unwrap();
    let reasons: Vec<(usize, RejectReason)> = ingested
        .rejections
        .into_iter()
        .map(|r| (r.line, r.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            (2, RejectReason::WrongFieldCount { found: 1 }),
            (3, RejectReason::WrongFieldCount { found: 2 }),
            (
                4,
                RejectReason::InvalidDate {
                    value: "15/01/2000".to_string()
                }
            ),
        ]
    );
}

#[test]
fn missing_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir, "");
    config.input = dir.path().join("nope.csv");

    assert!(matches!(
        run(&config, now()),
        Err(RosterError::InputNotFound { .. })
    ));
    assert!(!config.output.exists());
}

#[test]
fn unsupported_format_fails_before_io() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, VALID).with_format("xml");

    assert!(matches!(config, Err(RosterError::UnsupportedFormat { .. })));
    assert!(!dir.path().join("log.txt").exists());
}

#[test]
fn append_log_keeps_previous_entries() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, "broken").with_append_log(true);

    run(&config, now()).unwrap();
    run(&config, now()).unwrap();

    let log = fs::read_to_string(&config.log).unwrap();
    assert_eq!(log.lines().count(), 2);
}

#[test]
fn byte_order_mark_does_not_hide_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, &format!("\u{feff}{}\n{}\n", VALID, VALID));

    let ingested = ingest(&config.input, DEFAULT_DATE_FORMAT).unwrap();
    assert_eq!(ingested.students.len(), 1);
    assert_eq!(ingested.students[0].first_name, "Jan");
    assert_eq!(ingested.rejections.len(), 1);
    assert_eq!(ingested.rejections[0].line, 2);
    assert_eq!(ingested.rejections[0].reason, RejectReason::Duplicate);
}

#[test]
fn non_utf8_line_is_rejected_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, "");
    let mut input = Vec::new();
    input.extend_from_slice(VALID.as_bytes());
    input.extend_from_slice(b"\n\xff\xfe,bad\n");
    input.extend_from_slice(b"Ewa,Nowak,Sztuka,Zaoczne,77,1998-12-01,ewa@uni.pl,Maria,Jan\n");
    fs::write(&config.input, input).unwrap();

    let ingested = ingest(&config.input, DEFAULT_DATE_FORMAT).unwrap();
    assert_eq!(ingested.students.len(), 2);
    let reasons: Vec<(usize, RejectReason)> = ingested
        .rejections
        .into_iter()
        .map(|r| (r.line, r.reason))
        .collect();
    assert_eq!(reasons, vec![(2, RejectReason::Unreadable)]);
}

#[test]
fn unwritable_log_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir, VALID);
    config.log = dir.path().join("missing").join("log.txt");

    assert!(matches!(
        run(&config, now()),
        Err(RosterError::LogWrite { .. })
    ));
    assert!(!config.output.exists());
}
