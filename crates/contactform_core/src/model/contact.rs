//! Contact domain model.
//!
//! # Responsibility
//! - Define the record shape of one contact-form submission.
//! - Provide lifecycle helpers for soft-delete semantics.
//! - Enforce column bounds before any write reaches the store.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused for another contact.
//! - `deleted_at` is the source of truth for tombstone state.
//! - `full_name`, `email` and `phone` never exceed their column bounds.
//!
//! # See also
//! - crates/contactform_core/src/db/migrations/0001_contact_messages.sql

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned integer identifier of a contact row.
pub type ContactId = i64;

/// Unix epoch milliseconds.
pub type Timestamp = i64;

/// Maximum length (in characters) of `full_name`.
pub const FULL_NAME_MAX_CHARS: usize = 100;
/// Maximum length (in characters) of `email`.
pub const EMAIL_MAX_CHARS: usize = 100;
/// Maximum length (in characters) of `phone`.
pub const PHONE_MAX_CHARS: usize = 20;

/// Column-level constraint failures detected before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    /// Required text field is empty or whitespace only.
    MissingField(&'static str),
    /// Bounded text field exceeds its column width.
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} is required"),
            Self::FieldTooLong { field, max, actual } => {
                write!(f, "{field} must be at most {max} characters, got {actual}")
            }
        }
    }
}

impl Error for ContactValidationError {}

/// One contact-form submission.
///
/// Store-maintained fields (`id`, timestamps) stay `None` until the record
/// has been written through a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub id: Option<ContactId>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    /// Soft delete tombstone. Never part of the wire shape.
    #[serde(skip)]
    pub deleted_at: Option<Timestamp>,
}

impl Contact {
    /// Creates an unsaved contact.
    ///
    /// Does not validate; repositories call [`Contact::validate`] on write.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            full_name: full_name.into(),
            email: email.into(),
            phone: phone.into(),
            message: message.into(),
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    /// Checks required fields and column bounds.
    ///
    /// Lengths count Unicode scalar values, which is what SQLite `length()`
    /// counts for TEXT columns.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        check_bounded("full_name", &self.full_name, FULL_NAME_MAX_CHARS)?;
        check_bounded("email", &self.email, EMAIL_MAX_CHARS)?;
        check_bounded("phone", &self.phone, PHONE_MAX_CHARS)?;
        if self.message.trim().is_empty() {
            return Err(ContactValidationError::MissingField("message"));
        }
        Ok(())
    }

    /// Returns whether the store has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Returns whether this contact carries a soft delete tombstone.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

fn check_bounded(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ContactValidationError> {
    if value.trim().is_empty() {
        return Err(ContactValidationError::MissingField(field));
    }
    let actual = value.chars().count();
    if actual > max {
        return Err(ContactValidationError::FieldTooLong { field, max, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Contact, ContactValidationError, PHONE_MAX_CHARS};

    fn sample() -> Contact {
        Contact::new("Ann Lee", "ann@example.com", "555-0100", "Hi")
    }

    #[test]
    fn new_contact_is_unsaved_and_active() {
        let contact = sample();
        assert!(!contact.is_persisted());
        assert!(!contact.is_deleted());
        assert_eq!(contact.created_at, None);
        assert_eq!(contact.updated_at, None);
    }

    #[test]
    fn validate_accepts_well_formed_contact() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_blank_required_field() {
        let mut contact = sample();
        contact.email = "   ".to_string();
        assert_eq!(
            contact.validate(),
            Err(ContactValidationError::MissingField("email"))
        );

        let mut contact = sample();
        contact.message = String::new();
        assert_eq!(
            contact.validate(),
            Err(ContactValidationError::MissingField("message"))
        );
    }

    #[test]
    fn validate_counts_characters_not_bytes() {
        let mut contact = sample();
        contact.phone = "é".repeat(PHONE_MAX_CHARS);
        assert_eq!(contact.validate(), Ok(()));

        contact.phone.push('1');
        assert_eq!(
            contact.validate(),
            Err(ContactValidationError::FieldTooLong {
                field: "phone",
                max: PHONE_MAX_CHARS,
                actual: PHONE_MAX_CHARS + 1,
            })
        );
    }

    #[test]
    fn message_has_no_upper_bound() {
        let mut contact = sample();
        contact.message = "x".repeat(10_000);
        assert_eq!(contact.validate(), Ok(()));
    }
}
