//! FHIR R4 wire models for EPS prescription-order messages.
//!
//! This crate provides the **strict wire model** and **rendering helpers** for the message
//! bundles produced from flat prescription extracts:
//! - datatypes (identifiers, codings, references, extensions, names, addresses)
//! - the six resources a prescription-order message carries
//! - the message `Bundle` with internal-reference checks
//! - JSON and FHIR XML rendering
//!
//! Only the elements this system emits are modelled. Field declaration order follows the
//! FHIR R4 element order, because the XML form is order-sensitive and is derived from the
//! serde representation.

pub mod bundle;
pub mod datatypes;
pub mod medication_request;
pub mod message_header;
pub mod participant;
pub mod patient;
pub mod render;
mod xml;

// Re-export facades
pub use bundle::{Bundle, BundleEntry, BundleType, Resource};
pub use datatypes::{
    Address, AddressUse, CodeableConcept, Coding, ContactPoint, ContactPointSystem,
    ContactPointUse, Dosage, Extension, ExtensionValue, HumanName, Identifier, NameUse, Quantity,
    Reference,
};
pub use medication_request::{
    DispenseRequest, MedicationRequest, MedicationRequestIntent, MedicationRequestStatus,
};
pub use message_header::{MessageHeader, MessageSource};
pub use participant::{Organization, Practitioner, PractitionerRole};
pub use patient::{AdministrativeGender, Patient};
pub use render::Format;

// Re-export ResourceId from the epsfhir_uuid crate
pub use epsfhir_uuid::ResourceId;

/// Errors returned by the `fhir` wire crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML rendering error: {0}")]
    Xml(String),

    #[error("translation error: {0}")]
    Translation(String),

    #[error("reference '{0}' does not resolve to any entry in the bundle")]
    DanglingReference(String),

    #[error("full URL '{0}' is used by more than one bundle entry")]
    DuplicateFullUrl(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
