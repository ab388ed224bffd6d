//! Mappings from extract codes to FHIR vocabulary, and the extract's date formats.
//!
//! None of these fail: every lookup has a documented default for unexpected input.

use crate::constants::{COURSE_OF_THERAPY_SYSTEM, PRESCRIPTION_TYPE_SYSTEM};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fhir::{AdministrativeGender, CodeableConcept, Coding};

/// HL7 v3 administrative gender code to FHIR gender.
///
/// `0` unknown, `1` male, `2` female, any other 32-bit integer other, anything else
/// (non-numeric or out of range) unknown.
pub fn gender_from_code(code: &str) -> AdministrativeGender {
    match code.parse::<i32>() {
        Ok(0) => AdministrativeGender::Unknown,
        Ok(1) => AdministrativeGender::Male,
        Ok(2) => AdministrativeGender::Female,
        Ok(_) => AdministrativeGender::Other,
        Err(_) => AdministrativeGender::Unknown,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CourseOfTherapy {
    Acute,
    Repeat,
    RepeatDispensing,
}

impl CourseOfTherapy {
    /// Maps the prescription treatment type. A missing field (`None`) maps to acute.
    pub fn from_treatment_type(treatment_type: Option<&str>) -> Self {
        match treatment_type.map(str::trim) {
            None | Some("") | Some("0001") => CourseOfTherapy::Acute,
            Some("0002") => CourseOfTherapy::Repeat,
            Some(_) => CourseOfTherapy::RepeatDispensing,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            CourseOfTherapy::Acute => "acute",
            CourseOfTherapy::Repeat => "repeat",
            CourseOfTherapy::RepeatDispensing => "repeat-dispensing",
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            CourseOfTherapy::Acute => "Acute",
            CourseOfTherapy::Repeat => "Repeat",
            CourseOfTherapy::RepeatDispensing => "Repeat Dispensing",
        }
    }

    pub fn to_codeable_concept(self) -> CodeableConcept {
        Coding::new(COURSE_OF_THERAPY_SYSTEM, self.code(), Some(self.display())).into()
    }
}

/// Code of the only prescription type with a known display.
const GP_PRESCRIBING_CODE: &str = "0001";

/// Prescription-type coding; display is only known for GP prescribing.
pub fn prescription_type_coding(code: &str) -> Coding {
    let display = (code == GP_PRESCRIBING_CODE).then_some("General Practitioner Prescribing");
    Coding::new(PRESCRIPTION_TYPE_SYSTEM, code, display)
}

/// Parses an HL7 v3 date (`YYYYMMDD`, optionally followed by a time) into a calendar date.
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date = value.get(..8)?;
    NaiveDate::parse_from_str(date, "%Y%m%d").ok()
}

/// Parses an HL7 v3 timestamp (`YYYYMMDDHHMMSS`) as UTC.
pub fn parse_hl7_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let timestamp = value.get(..14)?;
    NaiveDateTime::parse_from_str(timestamp, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// [`parse_hl7_timestamp`], falling back to `fallback` when absent or unparseable.
pub fn parse_hl7_timestamp_or(value: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    value.and_then(parse_hl7_timestamp).unwrap_or(fallback)
}
