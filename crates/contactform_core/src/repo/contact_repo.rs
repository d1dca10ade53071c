//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide Create/FindAll/FindByID/Update/Delete over `contact_messages`.
//! - Keep SQL details inside the core persistence boundary.
//! - Offer an explicit unscoped view for tombstoned rows.
//!
//! # Invariants
//! - Write paths call `Contact::validate()` before SQL mutations.
//! - Default reads carry the predicate `deleted_at IS NULL`; only the
//!   `*_unscoped` / `include_deleted` paths omit it.
//! - Delete only stamps `deleted_at`; rows are never physically removed.
//! - `updated_at` strictly increases on every update or restore.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::contact::{Contact, ContactId, ContactValidationError, Timestamp};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

const CONTACT_TABLE: &str = "contact_messages";

const CONTACT_COLUMNS: [&str; 8] = [
    "id",
    "full_name",
    "email",
    "phone",
    "message",
    "created_at",
    "updated_at",
    "deleted_at",
];

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    full_name,
    email,
    phone,
    message,
    created_at,
    updated_at,
    deleted_at
FROM contact_messages";

pub type RepoResult<T> = Result<T, RepoError>;

/// Coarse failure category exposed to transport layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoErrorKind {
    /// Requested id is absent or soft-deleted.
    NotFound,
    /// Required field missing, oversized, or rejected by a store constraint.
    ConstraintViolation,
    /// Connector-level failure: I/O, locking, schema not ready.
    StoreUnavailable,
    /// Persisted row does not decode into a valid contact.
    InvalidData,
}

/// Repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Db(DbError),
    NotFound(ContactId),
    /// Update/delete called on a contact that was never persisted.
    MissingId,
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Classifies this error without altering it.
    pub fn kind(&self) -> RepoErrorKind {
        match self {
            Self::NotFound(_) => RepoErrorKind::NotFound,
            Self::Validation(_) | Self::MissingId => RepoErrorKind::ConstraintViolation,
            Self::Db(err) if err.is_constraint_violation() => RepoErrorKind::ConstraintViolation,
            Self::Db(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => RepoErrorKind::StoreUnavailable,
            Self::InvalidData(_) => RepoErrorKind::InvalidData,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::MissingId => write!(f, "contact has no id; create it first"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::MissingId
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing contacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactListQuery {
    /// Include soft-deleted rows (unscoped listing).
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for contact operations.
pub trait ContactRepository {
    /// Inserts `contact` and writes the generated id and timestamps back.
    fn create(&self, contact: &mut Contact) -> RepoResult<ContactId>;
    /// Lists every non-deleted contact ordered by id.
    fn find_all(&self) -> RepoResult<Vec<Contact>>;
    /// Loads one non-deleted contact or fails with `NotFound`.
    fn find_by_id(&self, id: ContactId) -> RepoResult<Contact>;
    /// Persists all user fields and advances `updated_at`.
    fn update(&self, contact: &mut Contact) -> RepoResult<()>;
    /// Soft-deletes the contact; idempotent on already-deleted rows.
    fn delete(&self, contact: &mut Contact) -> RepoResult<()>;
    /// Loads one contact regardless of tombstone state.
    fn find_by_id_unscoped(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    /// Lists contacts with paging and optional tombstone visibility.
    fn list_contacts(&self, query: &ContactListQuery) -> RepoResult<Vec<Contact>>;
    /// Clears the tombstone of a soft-deleted contact.
    fn restore(&self, id: ContactId) -> RepoResult<Contact>;
}

/// SQLite-backed contact repository over a caller-owned connection.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn fetch_one(&self, id: ContactId, include_deleted: bool) -> RepoResult<Option<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR deleted_at IS NULL);"
        ))?;

        let mut rows = stmt.query(params![id, i64::from(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }

        Ok(None)
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn create(&self, contact: &mut Contact) -> RepoResult<ContactId> {
        contact.validate()?;

        let now = now_epoch_ms();
        self.conn.execute(
            "INSERT INTO contact_messages (
                id,
                full_name,
                email,
                phone,
                message,
                created_at,
                updated_at,
                deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, NULL);",
            params![
                contact.id,
                contact.full_name.as_str(),
                contact.email.as_str(),
                contact.phone.as_str(),
                contact.message.as_str(),
                now,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        contact.id = Some(id);
        contact.created_at = Some(now);
        contact.updated_at = Some(now);
        contact.deleted_at = None;
        Ok(id)
    }

    fn find_all(&self) -> RepoResult<Vec<Contact>> {
        self.list_contacts(&ContactListQuery::default())
    }

    fn find_by_id(&self, id: ContactId) -> RepoResult<Contact> {
        self.fetch_one(id, false)?.ok_or(RepoError::NotFound(id))
    }

    fn update(&self, contact: &mut Contact) -> RepoResult<()> {
        let id = contact.id.ok_or(RepoError::MissingId)?;
        contact.validate()?;

        let stamps: Option<(Timestamp, Timestamp)> = self
            .conn
            .query_row(
                "UPDATE contact_messages
                 SET
                    full_name = ?2,
                    email = ?3,
                    phone = ?4,
                    message = ?5,
                    updated_at = MAX(?6, updated_at + 1)
                 WHERE id = ?1
                   AND deleted_at IS NULL
                 RETURNING created_at, updated_at;",
                params![
                    id,
                    contact.full_name.as_str(),
                    contact.email.as_str(),
                    contact.phone.as_str(),
                    contact.message.as_str(),
                    now_epoch_ms(),
                ],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (created_at, updated_at) = stamps.ok_or(RepoError::NotFound(id))?;
        contact.created_at = Some(created_at);
        contact.updated_at = Some(updated_at);
        contact.deleted_at = None;
        Ok(())
    }

    fn delete(&self, contact: &mut Contact) -> RepoResult<()> {
        let id = contact.id.ok_or(RepoError::MissingId)?;

        let stamped: Option<Timestamp> = self
            .conn
            .query_row(
                "UPDATE contact_messages
                 SET deleted_at = ?2
                 WHERE id = ?1
                   AND deleted_at IS NULL
                 RETURNING deleted_at;",
                params![id, now_epoch_ms()],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(deleted_at) = stamped {
            contact.deleted_at = Some(deleted_at);
            return Ok(());
        }

        // Already tombstoned rows keep their original deletion time.
        let existing: Option<Option<Timestamp>> = self
            .conn
            .query_row(
                "SELECT deleted_at FROM contact_messages WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(deleted_at) => {
                contact.deleted_at = deleted_at;
                Ok(())
            }
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn find_by_id_unscoped(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        self.fetch_one(id, true)
    }

    fn list_contacts(&self, query: &ContactListQuery) -> RepoResult<Vec<Contact>> {
        let mut sql = format!("{CONTACT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND deleted_at IS NULL");
        }

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut contacts = Vec::new();

        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        Ok(contacts)
    }

    fn restore(&self, id: ContactId) -> RepoResult<Contact> {
        self.conn.execute(
            "UPDATE contact_messages
             SET
                deleted_at = NULL,
                updated_at = MAX(?2, updated_at + 1)
             WHERE id = ?1
               AND deleted_at IS NOT NULL;",
            params![id, now_epoch_ms()],
        )?;

        self.fetch_one(id, true)?.ok_or(RepoError::NotFound(id))
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id: ContactId = row.get("id")?;
    let created_at: Timestamp = row.get("created_at")?;
    let updated_at: Timestamp = row.get("updated_at")?;
    if updated_at < created_at {
        return Err(RepoError::InvalidData(format!(
            "contact {id} has updated_at ({updated_at}) earlier than created_at ({created_at})"
        )));
    }

    // Field content rules live in the schema CHECKs; reads do not re-validate.
    Ok(Contact {
        id: Some(id),
        full_name: row.get("full_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        message: row.get("message")?,
        created_at: Some(created_at),
        updated_at: Some(updated_at),
        deleted_at: row.get("deleted_at")?,
    })
}

fn now_epoch_ms() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            Timestamp::try_from(elapsed.as_millis()).unwrap_or(Timestamp::MAX)
        })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, CONTACT_TABLE)? {
        return Err(RepoError::MissingRequiredTable(CONTACT_TABLE));
    }

    for column in CONTACT_COLUMNS {
        if !table_has_column(conn, CONTACT_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: CONTACT_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
