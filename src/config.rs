use crate::error::{Result, RosterError};
use crate::DEFAULT_DATE_FORMAT;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | ".json" => Ok(OutputFormat::Json),
            _ => Err(RosterError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Everything a run needs to know; built once by the caller.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub log: PathBuf,
    pub author: String,
    pub format: OutputFormat,
    /// chrono format of the birth date column.
    pub date_format: String,
    /// Append to an existing rejection log instead of truncating it.
    pub append_log: bool,
}

impl Config {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        log: impl Into<PathBuf>,
        author: impl Into<String>,
    ) -> Self {
        Config {
            input: input.into(),
            output: output.into(),
            log: log.into(),
            author: author.into(),
            format: OutputFormat::Json,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            append_log: false,
        }
    }

    /// Sets the output format by name, failing on anything but `json`.
    pub fn with_format(mut self, format: &str) -> Result<Self> {
        self.format = format.parse()?;
        Ok(self)
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    pub fn with_append_log(mut self, append_log: bool) -> Self {
        self.append_log = append_log;
        self
    }

    /// Checks that the output can be placed before any file is touched.
    pub fn validate(&self) -> Result<()> {
        let dir = parent_dir(&self.output);
        if !dir.is_dir() {
            return Err(RosterError::OutputWrite {
                path: self.output.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("output directory {} does not exist", dir.display()),
                ),
            });
        }
        Ok(())
    }
}

/// Parent directory of `path`, `.` for bare file names.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

#[test]
fn json_is_the_only_format() {
    assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    assert_eq!(OutputFormat::Json.extension(), "json");

    match "xml".parse::<OutputFormat>() {
        Err(RosterError::UnsupportedFormat { format }) => assert_eq!(format, "xml"),
        other => panic!("expected unsupported format, got {:?}", other),
    }
}

#[test]
fn missing_output_directory_fails_validation() {
    let config = Config::new("in.csv", "/definitely/not/here/out.json", "log.txt", "me");
    assert!(matches!(
        config.validate(),
        Err(RosterError::OutputWrite { .. })
    ));
}

#[test]
fn bare_file_name_validates_against_current_dir() {
    let config = Config::new("in.csv", "out.json", "log.txt", "me");
    assert!(config.validate().is_ok());
}
