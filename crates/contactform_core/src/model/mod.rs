//! Domain model for contact-form submissions.
//!
//! # Responsibility
//! - Define the canonical contact record used by repositories and services.
//!
//! # Invariants
//! - Every persisted contact is identified by a store-assigned `ContactId`.
//! - Deletion is represented by a `deleted_at` tombstone, not hard delete.

pub mod contact;
