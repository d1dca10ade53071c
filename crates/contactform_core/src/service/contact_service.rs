//! Contact use-case service.
//!
//! # Responsibility
//! - Provide the entry points a transport layer calls for contact-form flows.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Repository errors are returned unchanged.
//! - Log events carry ids and counts only, never submitted field contents.

use crate::model::contact::{Contact, ContactId};
use crate::repo::contact_repo::{ContactRepository, RepoResult};
use log::{info, warn};

/// Raw contact-form input as received from a transport layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSubmission {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactSubmission {
    /// Builds an unsaved contact with surrounding whitespace removed.
    ///
    /// The message body keeps inner formatting; only its outer whitespace
    /// is trimmed.
    pub fn into_contact(self) -> Contact {
        Contact::new(
            self.full_name.trim(),
            self.email.trim(),
            self.phone.trim(),
            self.message.trim(),
        )
    }
}

/// Use-case service wrapper for contact operations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new submission and returns the stored record.
    pub fn submit(&self, submission: ContactSubmission) -> RepoResult<Contact> {
        let mut contact = submission.into_contact();
        match self.repo.create(&mut contact) {
            Ok(id) => {
                info!("event=contact_create module=service status=ok id={id}");
                Ok(contact)
            }
            Err(err) => {
                warn!(
                    "event=contact_create module=service status=error kind={:?} error={}",
                    err.kind(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Lists all non-deleted contacts.
    pub fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        let contacts = self.repo.find_all()?;
        info!(
            "event=contact_list module=service status=ok count={}",
            contacts.len()
        );
        Ok(contacts)
    }

    /// Gets one non-deleted contact.
    pub fn get_contact(&self, id: ContactId) -> RepoResult<Contact> {
        self.repo.find_by_id(id)
    }

    /// Persists edits to an existing contact.
    pub fn update_contact(&self, contact: &mut Contact) -> RepoResult<()> {
        self.repo.update(contact)?;
        info!(
            "event=contact_update module=service status=ok id={}",
            contact.id.unwrap_or_default()
        );
        Ok(())
    }

    /// Soft-deletes one contact by id and returns the tombstoned record.
    ///
    /// Fails with `NotFound` when the contact is absent or already deleted.
    pub fn delete_contact(&self, id: ContactId) -> RepoResult<Contact> {
        let mut contact = self.repo.find_by_id(id)?;
        self.repo.delete(&mut contact)?;
        info!("event=contact_delete module=service status=ok id={id}");
        Ok(contact)
    }

    /// Brings a soft-deleted contact back into default reads.
    pub fn restore_contact(&self, id: ContactId) -> RepoResult<Contact> {
        let contact = self.repo.restore(id)?;
        info!("event=contact_restore module=service status=ok id={id}");
        Ok(contact)
    }
}

#[cfg(test)]
mod tests {
    use super::ContactSubmission;

    #[test]
    fn submission_trims_outer_whitespace() {
        let submission = ContactSubmission {
            full_name: "  Ann Lee ".to_string(),
            email: "ann@example.com\n".to_string(),
            phone: " 555-0100".to_string(),
            message: "\n Line one\nLine two \n".to_string(),
        };

        let contact = submission.into_contact();
        assert_eq!(contact.full_name, "Ann Lee");
        assert_eq!(contact.email, "ann@example.com");
        assert_eq!(contact.phone, "555-0100");
        assert_eq!(contact.message, "Line one\nLine two");
        assert!(!contact.is_persisted());
    }
}
