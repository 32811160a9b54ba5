//! Tracing setup for the gateway process.
//!
//! Events are written twice: a compact, colored stream on stdout for operators, and a plain
//! append-only log file. The file path comes from [`Config::log_file`](crate::config::Config)
//! (`PDFQA_LOG_FILE`) and falls back to `logs/pdfqa.log`. `RUST_LOG` filters both outputs and
//! defaults to `info`.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static FILE_WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "pdfqa.log";

/// Directory and file name the file layer appends to.
#[derive(Debug, PartialEq, Eq)]
struct LogTarget {
    directory: PathBuf,
    file_name: String,
}

impl LogTarget {
    /// Split the configured path, using the default location when it is unset or names no file.
    fn resolve(log_file: Option<&Path>) -> Self {
        let configured = log_file.and_then(|path| {
            let file_name = path.file_name()?.to_str()?.to_string();
            let directory = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            Some(Self {
                directory,
                file_name,
            })
        });
        configured.unwrap_or_else(|| Self {
            directory: PathBuf::from(DEFAULT_LOG_DIR),
            file_name: DEFAULT_LOG_FILE.to_string(),
        })
    }

    fn open(&self) -> Option<NonBlocking> {
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(self.file_name.as_str())
            .build(&self.directory);
        match appender {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let _ = FILE_WRITER_GUARD.set(guard);
                Some(writer)
            }
            Err(err) => {
                eprintln!(
                    "pdfqa: file logging disabled, cannot open {}: {err}",
                    self.directory.join(&self.file_name).display()
                );
                None
            }
        }
    }
}

/// Install the global subscriber. Call once, after configuration has been loaded.
pub fn init_tracing(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = fmt::layer().with_target(false).compact();
    let file = LogTarget::resolve(log_file).open().map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file)
        .init();
}
