use crate::aggregate::aggregate;
use crate::config::Config;
use crate::document::{write_document, UniversityDocument};
use crate::error::{Result, RosterError};
use crate::{ingest, Rejection};
use chrono::NaiveDateTime;
use log::info;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub rows: usize,
    pub students: usize,
    pub rejected: usize,
    pub active_studies: usize,
}

pub fn write_rejections<T: Write>(rejections: &[Rejection], mut target: T) -> io::Result<()> {
    for rejection in rejections {
        writeln!(target, "{}", rejection)?;
    }
    target.flush()
}

/// Runs the whole conversion: ingest, log rejections, aggregate, write.
///
/// `created_at` is stamped into the document as given.
pub fn run(config: &Config, created_at: NaiveDateTime) -> Result<Summary> {
    config.validate()?;

    let ingested = ingest(&config.input, &config.date_format)?;
    info!(
        "read {} rows from {}: {} students, {} rejected",
        ingested.rows,
        config.input.display(),
        ingested.students.len(),
        ingested.rejections.len()
    );

    let log_error = |source: io::Error| RosterError::LogWrite {
        path: config.log.clone(),
        source,
    };
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(config.append_log)
        .truncate(!config.append_log)
        .open(&config.log)
        .map_err(log_error)?;
    write_rejections(&ingested.rejections, BufWriter::new(log_file)).map_err(log_error)?;

    let active_studies = aggregate(&ingested.students);
    let summary = Summary {
        rows: ingested.rows,
        students: ingested.students.len(),
        rejected: ingested.rejections.len(),
        active_studies: active_studies.len(),
    };

    let document = UniversityDocument::assemble(
        ingested.students,
        active_studies,
        config.author.clone(),
        created_at,
    );
    write_document(&document, &config.output)?;

    Ok(summary)
}
