//! Process-wide log backend for docstore events.
//!
//! # Responsibility
//! - Install a `flexi_logger` backend once per process, writing either to
//!   stderr or to size-rotated files.
//!
//! # Invariants
//! - Initialization is idempotent for an identical configuration.
//! - Reconfiguration with a different level or destination is rejected.
//! - Initialization never panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "docstore";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    config: LoggingConfig,
    _handle: LoggerHandle,
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Stderr,
    /// Absolute directory holding rotated `docstore*.log` files.
    Directory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`, or a full flexi_logger spec
    /// such as `info,docstore=debug`.
    pub level: String,
    pub destination: LogDestination,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            destination: LogDestination::Stderr,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("log level cannot be empty")]
    EmptyLevel,
    #[error("log directory must be an absolute path, got `{0}`")]
    RelativeDirectory(PathBuf),
    #[error("failed to create log directory `{path}`: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start logger: {0}")]
    Backend(#[from] flexi_logger::FlexiLoggerError),
    #[error("logging already initialized with {active:?}; refusing to switch to {requested:?}")]
    Conflict {
        active: Box<LoggingConfig>,
        requested: Box<LoggingConfig>,
    },
}

/// Installs the log backend.
///
/// # Errors
/// - `EmptyLevel` / `RelativeDirectory` for invalid configuration.
/// - `CreateDirectory` / `Backend` when the backend cannot start.
/// - `Conflict` when a different configuration is already active.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let requested = normalize(config)?;
    let state = LOGGING_STATE.get_or_try_init(|| start(&requested))?;

    if state.config != requested {
        return Err(LoggingError::Conflict {
            active: Box::new(state.config.clone()),
            requested: Box::new(requested),
        });
    }
    Ok(())
}

/// Active configuration, `None` before [`init_logging`] succeeds.
pub fn logging_status() -> Option<LoggingConfig> {
    LOGGING_STATE.get().map(|state| state.config.clone())
}

/// `debug` in debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn normalize(config: &LoggingConfig) -> Result<LoggingConfig, LoggingError> {
    let level = config.level.trim().to_ascii_lowercase();
    if level.is_empty() {
        return Err(LoggingError::EmptyLevel);
    }
    let level = if level == "warning" {
        "warn".to_string()
    } else {
        level
    };

    if let LogDestination::Directory(dir) = &config.destination {
        if !dir.is_absolute() {
            return Err(LoggingError::RelativeDirectory(dir.clone()));
        }
    }

    Ok(LoggingConfig {
        level,
        destination: config.destination.clone(),
    })
}

fn start(config: &LoggingConfig) -> Result<LoggingState, LoggingError> {
    let logger = Logger::try_with_str(&config.level)?;
    let handle = match &config.destination {
        LogDestination::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::default_format)
            .start()?,
        LogDestination::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDirectory {
                path: dir.clone(),
                source,
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()?
        }
    };

    info!(
        "event=logging_init module=logging status=ok level={} destination={:?} version={}",
        config.level,
        config.destination,
        env!("CARGO_PKG_VERSION")
    );

    Ok(LoggingState {
        config: config.clone(),
        _handle: handle,
    })
}
