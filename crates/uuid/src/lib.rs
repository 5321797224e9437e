//! Record identifier utilities.
//!
//! Every row written to a Mobi Mama record store carries an `id` in a *canonical* UUID
//! representation: **32 lowercase hexadecimal characters** (no hyphens).
//!
//! This crate provides:
//! - [`RecordId`], a wrapper that guarantees the canonical format once constructed.
//! - Sharding logic used by file-backed stores to spread rows across directories.
//!
//! ## Canonical form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are rejected by
//! [`RecordId::parse`].
//!
//! ## Sharded directory layout
//! For a canonical id `u`, file-backed tables store the row under
//! `table_dir/<u[0..2]>/<u[2..4]>/<u>/`.

mod record_id;

pub use record_id::{RecordId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum RecordIdError {
    /// Invalid input provided
    #[error("Invalid record id: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type RecordIdResult<T> = Result<T, RecordIdError>;
