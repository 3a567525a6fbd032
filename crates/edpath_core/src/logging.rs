use std::{
    fs::OpenOptions,
    io::{self, Write},
};

use env_logger::{Builder, Target, WriteStyle};
use log::{Level, Record};

use crate::{
    Error, Result,
    io::options::{LogFormat, SolverOptions},
};

/// Installs the global logger described by the `--log-*` options.
pub fn init_logger(options: &SolverOptions) -> Result<()> {
    let line = LineFormat {
        format: options.log_format,
        timestamp: options.log_timestamp,
    };

    let mut builder = Builder::new();
    builder
        .filter_level(options.log_level.to_filter())
        .write_style(WriteStyle::Never)
        .target(log_target(options)?)
        .format(move |buf, record| {
            if line.timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }
            line.write_record(buf, record)
        });

    builder
        .try_init()
        .map_err(|e| Error::other(format!("logger init failed: {e}")))
}

fn log_target(options: &SolverOptions) -> Result<Target> {
    let Some(path) = options.log_output_path() else {
        return Ok(Target::Stderr);
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            Error::other(format!(
                "failed to open log output file {}: {e}",
                path.display()
            ))
        })?;
    Ok(Target::Pipe(Box::new(file)))
}

#[derive(Clone, Copy, Debug)]
struct LineFormat {
    format: LogFormat,
    timestamp: bool,
}

impl LineFormat {
    /// Writes `LEVEL message` (compact) or `LEVEL [target] message` (pretty).
    fn write_record(&self, out: &mut impl Write, record: &Record<'_>) -> io::Result<()> {
        match self.format {
            LogFormat::Compact => writeln!(out, "{} {}", level_tag(record.level()), record.args()),
            LogFormat::Pretty => writeln!(
                out,
                "{} [{}] {}",
                level_tag(record.level()),
                record.target(),
                record.args()
            ),
        }
    }
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}
