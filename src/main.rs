use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use roster::{Config, DEFAULT_DATE_FORMAT};

/// Converts a CSV list of students into a university JSON document.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// CSV file with one student per line, nine columns, no header.
    #[arg(short, long, default_value = "./dane.csv")]
    input: PathBuf,

    /// Destination of the generated document.
    #[arg(short, long, default_value = "./university.json")]
    output: PathBuf,

    /// File receiving one line per rejected row.
    #[arg(short, long, default_value = "./log.txt")]
    log: PathBuf,

    #[arg(short, long, default_value = "anonymous")]
    author: String,

    /// Output format; only json is supported.
    #[arg(short, long, default_value = "json")]
    format: String,

    /// chrono format string of the birth date column.
    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    date_format: String,

    /// Append to the rejection log instead of overwriting it.
    #[arg(long)]
    append_log: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = convert(Cli::parse()) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn convert(cli: Cli) -> Result<()> {
    let mut output = cli.output;
    let config = Config::new(cli.input, output.clone(), cli.log, cli.author)
        .with_format(&cli.format)
        .context("invalid configuration")?;
    if output.extension().is_none() {
        output.set_extension(config.format.extension());
    }
    let config = Config { output, ..config }
        .with_date_format(cli.date_format)
        .with_append_log(cli.append_log);

    let summary = roster::run(&config, chrono::Local::now().naive_local())
        .with_context(|| format!("could not convert {}", config.input.display()))?;

    info!(
        "done: {} rows, {} students, {} rejected, {} active studies",
        summary.rows, summary.students, summary.rejected, summary.active_studies
    );
    if summary.rejected > 0 {
        info!("rejected rows logged to {}", config.log.display());
    }
    Ok(())
}
