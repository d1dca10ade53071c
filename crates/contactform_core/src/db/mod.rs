//! Store connector for the contact table.
//!
//! Opens SQLite connections with the pragmas and busy timeout the
//! repository expects, and brings the schema up to `migrations::latest_version`
//! before handing a connection out. Repositories assume that has happened.

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_with_config, DEFAULT_BUSY_TIMEOUT};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build; it is left untouched.
    SchemaTooNew { found: u32, supported: u32 },
}

impl DbError {
    /// Primary SQLite result code, when SQLite itself reported the failure.
    pub fn sqlite_code(&self) -> Option<ErrorCode> {
        if let Self::Sqlite(rusqlite::Error::SqliteFailure(failure, _)) = self {
            Some(failure.code)
        } else {
            None
        }
    }

    /// NOT NULL, CHECK and PRIMARY KEY rejections.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self.sqlite_code(), Some(ErrorCode::ConstraintViolation))
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => Display::fmt(err, f),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "contact store schema v{found} is newer than this build understands (v{supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}
