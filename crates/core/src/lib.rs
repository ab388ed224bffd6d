//! # EPS FHIR Core
//!
//! Transformation engine turning flat electronic-prescription extracts into FHIR R4
//! prescription-order message bundles.
//!
//! This crate contains the whole pipeline below the command line:
//! - placeholder-token normalisation of the raw extract text
//! - loading and grouping of prescription and line-item records
//! - participant, patient and order builders producing one bundle per prescription
//! - run configuration, output targets, and the batch loop
//!
//! **No CLI concerns**: argument parsing and logging initialisation belong in the `epsfhir`
//! binary.

pub mod batch;
pub mod config;
pub mod constants;
pub mod document;
mod error;
pub mod loader;
pub mod normalizer;
pub mod output;
pub mod participant;
pub mod record;
pub mod vocabulary;

pub use batch::{run_batch, BatchSummary};
pub use config::{RunConfig, SenderConfig};
pub use document::DocumentBuilder;
pub use error::{EpsError, EpsResult};
pub use loader::PrescriptionData;
pub use normalizer::{CharacterNormalizer, NormalizerError};
pub use output::{DirectorySink, DocumentSink, OutputTarget, StreamSink};
pub use participant::{Participant, ParticipantRole};
pub use record::{
    LineItemField, LineItemRecord, ParticipantField, PrescriptionField, PrescriptionRecord,
};

pub use fhir::Format;
