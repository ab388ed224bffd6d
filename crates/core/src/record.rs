//! Typed views over the tab-delimited extract records.
//!
//! A record keeps its raw fields exactly as split from the (normalised) line. Accessors take
//! a named field rather than a raw index and fail with [`EpsError::RecordShape`] when the
//! record is too short to carry the field, so a truncated line only affects the prescription
//! it belongs to.

use crate::participant::ParticipantRole;
use crate::{EpsError, EpsResult};
use epsfhir_types::{NonEmptyText, TextError};

macro_rules! field_layout {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $index:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),*
        }

        impl $name {
            /// Every field, in layout order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Zero-based position of the field.
            pub const fn index(self) -> usize {
                match self {
                    $($name::$variant => $index),*
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

field_layout! {
    /// Fields of a prescription record outside the three participant blocks.
    pub enum PrescriptionField {
        Id = 0,
        Urgent = 1,
        PatientId = 2,
        PatientAddressLine1 = 3,
        PatientAddressLine2 = 4,
        PatientAddressLine3 = 5,
        PatientAddressLine4 = 6,
        PatientAddressLine5 = 7,
        PatientAddressPostcode = 8,
        PatientAddressPafCode = 9,
        PatientAddressType = 10,
        PatientAddressUseFrom = 11,
        PatientAddressUseTo = 12,
        PatientNameTitle = 13,
        PatientGivenName1 = 14,
        PatientGivenName2 = 15,
        PatientSurname = 16,
        PatientNameSuffix = 17,
        PatientNameType = 18,
        PatientNameUseFrom = 19,
        PatientNameUseTo = 20,
        PatientGender = 21,
        PatientBirthTime = 22,
        PatientDeceasedTime = 23,
        PatientPrimaryCareProviderSdsId = 24,
        RepeatNumber = 25,
        MaxRepeatPrescriptions = 26,
        MaxRepeatDispenses = 27,
        DaysSupplyFrom = 28,
        DaysSupplyTo = 29,
        ExpectedUse = 30,
        TokenIssued = 31,
        PrescriptionTreatmentType = 32,
        PrescriptionType = 33,
        TemporaryExemptionInformation = 34,
        TemporaryExemptionFrom = 35,
        TemporaryExemptionTo = 36,
        ReviewDate = 37,
        OriginalPrescriptionReference = 38,
        NominatedPharmacyId = 39,
        DispensingSitePreference = 40,
        Handling = 92,
        PrescriptionClinicalStatementId = 93,
    }
}

field_layout! {
    /// Fields of a participant block, relative to the block's base offset.
    pub enum ParticipantField {
        RoleProfile = 0,
        JobCode = 1,
        SdsUserId = 2,
        PersonName = 3,
        PersonTelecom = 4,
        SdsOrganisationId = 5,
        OrganisationName = 6,
        OrganisationType = 7,
        OrganisationTelecom = 8,
        OrganisationAddressLine1 = 9,
        OrganisationAddressLine2 = 10,
        OrganisationAddressLine3 = 11,
        OrganisationAddressLine4 = 12,
        OrganisationAddressLine5 = 13,
        OrganisationPostcode = 14,
        PctOrganisationSdsId = 15,
        ParticipationTime = 16,
    }
}

field_layout! {
    /// Fields of a line-item record.
    pub enum LineItemField {
        PrescriptionId = 0,
        SubstanceCode = 1,
        DisplayName = 2,
        OriginalText = 3,
        QuantityText = 4,
        QuantityCode = 5,
        QuantityCount = 6,
        DosageInstructions = 7,
        AdditionalInstructions = 8,
        OriginalItemRef = 9,
        PrescriberEndorsement = 10,
        IntendedMedicationRef = 11,
        IntendedMedicationMood = 12,
        DoseQuantity = 13,
        RateQuantity = 14,
        ItemRepeatNumber = 15,
        MaxRepeats = 16,
        LineItemId = 17,
    }
}

impl ParticipantField {
    pub const BLOCK_LEN: usize = 17;
}

fn field_at<'a>(
    record: &NonEmptyText,
    fields: &'a [String],
    name: &'static str,
    index: usize,
) -> EpsResult<&'a str> {
    fields
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| EpsError::RecordShape {
            record: record.to_string(),
            field: name,
            index,
            len: fields.len(),
        })
}

/// Splits a normalised line into fields. Trailing empty fields are kept.
pub fn split_fields(line: &str) -> Vec<String> {
    line.split('\t').map(str::to_string).collect()
}

/// One prescription, keyed by its ID (field 0).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrescriptionRecord {
    id: NonEmptyText,
    fields: Vec<String>,
}

impl PrescriptionRecord {
    pub const FIELD_COUNT: usize = 94;

    /// Builds a record from split fields, validating the key.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if field 0 is missing or blank.
    pub fn from_fields(fields: Vec<String>) -> Result<Self, TextError> {
        let id = NonEmptyText::new(fields.first().map(String::as_str).unwrap_or_default())?;
        Ok(Self { id, fields })
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn key(&self) -> &NonEmptyText {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_short(&self) -> bool {
        self.fields.len() < Self::FIELD_COUNT
    }

    pub fn field(&self, field: PrescriptionField) -> EpsResult<&str> {
        field_at(&self.id, &self.fields, field.name(), field.index())
    }

    /// A field of the participant block for `role`.
    pub fn participant_field(
        &self,
        role: ParticipantRole,
        field: ParticipantField,
    ) -> EpsResult<&str> {
        field_at(
            &self.id,
            &self.fields,
            field.name(),
            role.base_offset() + field.index(),
        )
    }
}

/// One ordered item of a prescription, keyed by the prescription ID it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineItemRecord {
    prescription_id: NonEmptyText,
    fields: Vec<String>,
}

impl LineItemRecord {
    pub const FIELD_COUNT: usize = 18;

    /// Builds a record from split fields, validating the foreign key.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if field 0 is missing or blank.
    pub fn from_fields(fields: Vec<String>) -> Result<Self, TextError> {
        let prescription_id =
            NonEmptyText::new(fields.first().map(String::as_str).unwrap_or_default())?;
        Ok(Self {
            prescription_id,
            fields,
        })
    }

    pub fn prescription_id(&self) -> &str {
        self.prescription_id.as_str()
    }

    pub fn key(&self) -> &NonEmptyText {
        &self.prescription_id
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_short(&self) -> bool {
        self.fields.len() < Self::FIELD_COUNT
    }

    pub fn field(&self, field: LineItemField) -> EpsResult<&str> {
        field_at(
            &self.prescription_id,
            &self.fields,
            field.name(),
            field.index(),
        )
    }
}
