//! Identifier systems, code systems and extension URLs used in prescription-order messages.
//!
//! Kept in one place so the builders and their tests agree on the exact strings.

macro_rules! nhs_url {
    (sd $name:literal) => {
        concat!("https://fhir.nhs.uk/R4/StructureDefinition/", $name)
    };
    (cs $name:literal) => {
        concat!("https://fhir.nhs.uk/R4/CodeSystem/", $name)
    };
}

// ============================================================================
// Identifier systems
// ============================================================================

pub const NHS_NUMBER_SYSTEM: &str = "https://fhir.nhs.uk/Id/nhs-number";
pub const SDS_USER_ID_SYSTEM: &str = "https://fhir.nhs.uk/Id/sds-user-id";
pub const SDS_ROLE_PROFILE_SYSTEM: &str = "https://fhir.nhs.uk/Id/sds-role-profile-id";
pub const ODS_ORGANIZATION_SYSTEM: &str = "https://fhir.nhs.uk/Id/ods-organization-code";
pub const PRESCRIPTION_LINE_ID_SYSTEM: &str = "https://fhir.nhs.uk/Id/prescription-line-id";
pub const PRESCRIPTION_SHORT_FORM_SYSTEM: &str = "https://fhir.nhs.uk/Id/prescription-short-form";
pub const SPINE_ASID_SYSTEM: &str = "https://fhir.nhs.uk/Id/spine-ASID";

/// Organisation type codes in the extract are HL7 v3 OIDs with no FHIR equivalent.
pub const ORGANISATION_TYPE_SYSTEM: &str = "urn:uuid:2.16.840.1.113883.2.1.3.2.4.17.94";

pub const SNOMED_SYSTEM: &str = "http://snomed.info/sct";

// ============================================================================
// Code systems
// ============================================================================

pub const MESSAGE_EVENT_SYSTEM: &str = nhs_url!(cs "message-event");
pub const PRESCRIPTION_ORDER_CODE: &str = "prescription-order";
pub const PRESCRIPTION_ORDER_DISPLAY: &str = "Prescription Order";

pub const NHS_NUMBER_VERIFICATION_SYSTEM: &str = nhs_url!(cs "UKCore-NHSNumberVerificationStatus");
pub const NHS_NUMBER_VERIFIED_CODE: &str = "01";
pub const NHS_NUMBER_VERIFIED_DISPLAY: &str = "Number present and verified";

pub const PRESCRIPTION_TYPE_SYSTEM: &str = nhs_url!(cs "prescription-type");
pub const COURSE_OF_THERAPY_SYSTEM: &str = nhs_url!(cs "CareConnect-PrescriptionType");
pub const DISPENSING_SITE_PREFERENCE_SYSTEM: &str = nhs_url!(cs "dispensing-site-preference");

// ============================================================================
// Extensions
// ============================================================================

pub const SPINE_ENDPOINT_EXTENSION: &str = nhs_url!(sd "Extension-spineEndpoint");
pub const NHS_NUMBER_VERIFICATION_EXTENSION: &str =
    nhs_url!(sd "Extension-UKCore-NHSNumberVerificationStatus");
pub const PRESCRIPTION_TYPE_EXTENSION: &str = nhs_url!(sd "Extension-prescriptionType");
pub const RESPONSIBLE_PRACTITIONER_EXTENSION: &str =
    nhs_url!(sd "Extension-DM-ResponsiblePractitioner");
pub const PRESCRIPTION_ID_EXTENSION: &str = nhs_url!(sd "Extension-PrescriptionId");
pub const PERFORMER_TYPE_EXTENSION: &str = nhs_url!(sd "Extension-performerType");

// ============================================================================
// Configuration keys
// ============================================================================

pub const CONFIG_ASID: &str = "uk.nhs.digital.mait.epsfhir.asid";
pub const CONFIG_ODS_CODE: &str = "uk.nhs.digital.mait.epsfhir.odscode";
pub const CONFIG_URL: &str = "uk.nhs.digital.mait.epsfhir.url";
pub const CONFIG_OUTPUT: &str = "uk.nhs.digital.mait.epsfhir.output";
pub const CONFIG_IMMEDIATE_FAIL: &str = "uk.nhs.digital.mait.epsfhir.immediatefail";

/// Prefix of the temporary file used to check that an output directory accepts new files.
pub const OUTPUT_WRITE_CHECK_PREFIX: &str = ".epsfhir-write-check";
