//! Resource identifiers for generated FHIR documents.
//!
//! Every resource placed in an output bundle gets a freshly generated identifier, and every
//! internal reference to that resource is derived from the same value. Keeping both sides on
//! one type means a reference can only ever point at an identifier that was actually
//! allocated.
//!
//! ## Canonical form
//! - Lowercase hyphenated UUID v4, e.g. `550e8400-e29b-41d4-a716-446655440000`
//! - Full URL / reference form: `urn:uuid:550e8400-e29b-41d4-a716-446655440000`
//!
//! [`ResourceId::parse`] only accepts the canonical form; uppercase or simple (unhyphenated)
//! UUIDs are rejected so that string comparison of references stays exact.

mod service;

pub use service::{ResourceId, Uuid, URN_UUID_PREFIX};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
