//! Tracing setup for the dashboard binary.
//!
//! Events go to stdout and to one file per launch under `<app root>/logs`.
//! Only the newest [`MAX_LOG_FILES`] launch files are kept.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs;

pub const MAX_LOG_FILES: usize = 10;
const LOG_FILE_PREFIX: &str = "regresslab";
const DEFAULT_FILTER: &str = "info,ureq=warn,eframe=warn";

type Timestamp = &'static [BorrowedFormatItem<'static>];

const FILE_STAMP: Timestamp = format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
const LINE_STAMP: Timestamp =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]");

/// Keeps the non-blocking writer alive and remembers this launch's file.
static INSTALLED: OnceLock<(WorkerGuard, PathBuf)> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Log directory unavailable: {0}")]
    Directory(#[from] app_dirs::AppDirError),
    #[error("Could not {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not stamp the log file name: {0}")]
    Stamp(#[from] time::error::Format),
    #[error("A global tracing subscriber is already installed: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber and return the launch log file.
///
/// Repeated calls return the file chosen by the first one.
pub fn init() -> Result<PathBuf, LoggingError> {
    if let Some((_, path)) = INSTALLED.get() {
        return Ok(path.clone());
    }

    let logs = LogDir::new(app_dirs::logs_dir()?, MAX_LOG_FILES);
    let file_name = logs.create_launch_file(now())?;
    let pruned = logs.prune()?;

    let (file_writer, guard) = tracing_appender::non_blocking(rolling::never(&logs.path, &file_name));
    let timer = fmt::time::OffsetTime::new(local_offset(), LINE_STAMP);
    let subscriber = Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .with(fmt::layer().with_timer(timer.clone()).with_writer(std::io::stdout))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber)?;

    let path = logs.path.join(&file_name);
    let _ = INSTALLED.set((guard, path.clone()));
    tracing::debug!(pruned, "Old launch logs pruned");
    Ok(path)
}

/// Launch logs in one directory with a retention limit.
struct LogDir {
    path: PathBuf,
    keep: usize,
}

impl LogDir {
    fn new(path: PathBuf, keep: usize) -> Self {
        Self { path, keep }
    }

    /// Create (or reuse) the file for a launch at `at`; returns its name.
    fn create_launch_file(&self, at: OffsetDateTime) -> Result<String, LoggingError> {
        let name = launch_file_name(at)?;
        let path = self.path.join(&name);
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| io_error("create", &path, source))?;
        Ok(name)
    }

    /// Remove all but the `keep` most recently modified `.log` files.
    fn prune(&self) -> Result<usize, LoggingError> {
        let mut files = self.log_files()?;
        files.sort_by(|a, b| b.0.cmp(&a.0));
        let stale: Vec<PathBuf> = files.into_iter().skip(self.keep).map(|(_, path)| path).collect();
        for path in &stale {
            fs::remove_file(path).map_err(|source| io_error("remove", path, source))?;
        }
        Ok(stale.len())
    }

    fn log_files(&self) -> Result<Vec<(SystemTime, PathBuf)>, LoggingError> {
        let entries =
            fs::read_dir(&self.path).map_err(|source| io_error("list", &self.path, source))?;
        Ok(entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "log"))
            .map(|path| {
                let modified = fs::metadata(&path)
                    .and_then(|meta| meta.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (modified, path)
            })
            .collect())
    }
}

fn launch_file_name(at: OffsetDateTime) -> Result<String, LoggingError> {
    Ok(format!("{LOG_FILE_PREFIX}_{}.log", at.format(FILE_STAMP)?))
}

fn io_error(action: &'static str, path: &Path, source: std::io::Error) -> LoggingError {
    LoggingError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(local_offset())
}
