use crate::normalizer::NormalizerError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EpsError {
    #[error("cannot read configuration {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to read input file {}: {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid record at {}:{line}: {reason}", path.display())]
    InvalidRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("output {} {reason}", path.display())]
    OutputTarget { path: PathBuf, reason: String },
    #[error("failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record {record} has no field {field} (index {index}, record has {len} fields)")]
    RecordShape {
        record: String,
        field: &'static str,
        index: usize,
        len: usize,
    },
    #[error("record {record}: field {field} value '{value}' is not an integer: {source}")]
    NumberFormat {
        record: String,
        field: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("character normalizer: {0}")]
    Normalizer(#[from] NormalizerError),
    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
}

pub type EpsResult<T> = std::result::Result<T, EpsError>;
