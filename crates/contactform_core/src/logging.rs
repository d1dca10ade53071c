//! Rolling file logging for the contact store.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend from a resolved `StoreConfig`.
//! - Capture panics as log events before the default hook runs.
//!
//! # Invariants
//! - At most one backend per process; a second init must match the first.
//! - Log lines carry ids, counts and settings only, never contact contents.
//! - Nothing in this module panics.

use crate::config::StoreConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, LogSpecification, Logger, LoggerHandle,
    Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Once;

const LOG_FILE_BASENAME: &str = "contactform";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEPT_LOG_FILES: usize = 5;
const PANIC_TEXT_MAX_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

struct ActiveLogger {
    level: LevelFilter,
    dir: PathBuf,
    _handle: LoggerHandle,
}

/// What `init_logging` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingOutcome {
    /// `log_dir` is unset; no backend was started.
    Disabled,
    /// This call started the file backend.
    Started,
    /// An identical backend was already running.
    AlreadyActive,
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    RelativeDir(PathBuf),
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    /// A backend with different settings is already running.
    Conflict {
        active_level: LevelFilter,
        active_dir: PathBuf,
    },
    Backend(FlexiLoggerError),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeDir(dir) => {
                write!(f, "log directory must be absolute, got `{}`", dir.display())
            }
            Self::CreateDir { dir, source } => {
                write!(f, "cannot create log directory `{}`: {source}", dir.display())
            }
            Self::Conflict {
                active_level,
                active_dir,
            } => write!(
                f,
                "logging already active at level {active_level} in `{}`",
                active_dir.display()
            ),
            Self::Backend(err) => write!(f, "log backend failed to start: {err}"),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            Self::UnsupportedLevel(_) | Self::RelativeDir(_) | Self::Conflict { .. } => None,
        }
    }
}

/// Starts file logging as described by `config`.
///
/// Repeating the call with the same level and directory is a no-op;
/// different settings after a successful start return `Conflict`.
pub fn init_logging(config: &StoreConfig) -> Result<LoggingOutcome, LoggingError> {
    let Some(dir) = config.log_dir.as_deref() else {
        return Ok(LoggingOutcome::Disabled);
    };
    let level = parse_level(&config.log_level)?;
    if !dir.is_absolute() {
        return Err(LoggingError::RelativeDir(dir.to_path_buf()));
    }

    let mut started = false;
    let active = ACTIVE_LOGGER.get_or_try_init(|| {
        started = true;
        start_file_backend(level, dir)
    })?;

    if active.level != level || active.dir != dir {
        return Err(LoggingError::Conflict {
            active_level: active.level,
            active_dir: active.dir.clone(),
        });
    }

    if !started {
        return Ok(LoggingOutcome::AlreadyActive);
    }

    info!(
        "event=logging_start module=logging status=ok level={} log_dir={} db_path={} version={}",
        level,
        dir.display(),
        config.db_path.display(),
        env!("CARGO_PKG_VERSION")
    );
    Ok(LoggingOutcome::Started)
}

/// Level used when `CONTACTFORM_LOG_LEVEL` is unset: `debug` in debug
/// builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_file_backend(level: LevelFilter, dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let handle = Logger::with(LogSpecification::builder().default(level).build())
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEPT_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Backend)?;

    install_panic_hook();

    Ok(ActiveLogger {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

/// Accepts the five `log` levels case-insensitively plus `warning`.
fn parse_level(raw: &str) -> Result<LevelFilter, LoggingError> {
    let lowered = raw.trim().to_ascii_lowercase();
    let name = if lowered == "warning" {
        "warn"
    } else {
        lowered.as_str()
    };
    match name.parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(LoggingError::UnsupportedLevel(raw.trim().to_string())),
        Ok(level) => Ok(level),
    }
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let location = info.location().map_or_else(
                || "unknown".to_string(),
                |loc| format!("{}:{}", loc.file(), loc.line()),
            );
            error!(
                "event=panic module=logging status=error location={} payload={}",
                location,
                single_line(panic_text(info.payload()), PANIC_TEXT_MAX_CHARS)
            );
            previous(info);
        }));
    });
}

fn panic_text(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Flattens line breaks and caps length; panic text may echo submitted data.
fn single_line(text: &str, max_chars: usize) -> String {
    let mut flat: String = text
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(max_chars)
        .collect();
    if text.chars().count() > max_chars {
        flat.push_str("...");
    }
    flat
}
