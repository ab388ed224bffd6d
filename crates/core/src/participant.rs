//! Builds the practitioner / organisation / role triad for one participant block.
//!
//! A prescription record carries three participant blocks with the same layout. The block
//! is selected by [`ParticipantRole`]; extraction is the same for every role.

use crate::constants::{
    ODS_ORGANIZATION_SYSTEM, ORGANISATION_TYPE_SYSTEM, SDS_ROLE_PROFILE_SYSTEM, SDS_USER_ID_SYSTEM,
};
use crate::record::{ParticipantField, PrescriptionRecord};
use crate::EpsResult;
use fhir::{
    Address, Coding, ContactPoint, HumanName, Identifier, Organization, Practitioner,
    PractitionerRole, Reference, ResourceId,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticipantRole {
    Author,
    ResponsibleParty,
    LegalAuthenticator,
}

impl ParticipantRole {
    /// Index of the block's first field within a prescription record.
    pub const fn base_offset(self) -> usize {
        match self {
            ParticipantRole::Author => 41,
            ParticipantRole::ResponsibleParty => 58,
            ParticipantRole::LegalAuthenticator => 75,
        }
    }
}

/// The three linked resources describing one acting party.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub role_kind: ParticipantRole,
    pub practitioner: Practitioner,
    pub organization: Organization,
    pub role: PractitionerRole,
}

impl Participant {
    /// Extracts the participant block for `role` from `record`.
    ///
    /// Each resource gets a fresh id: the same person appearing in two blocks yields two
    /// independent triads.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EpsError::RecordShape`] if the record is too short to hold the block.
    pub fn build(role: ParticipantRole, record: &PrescriptionRecord) -> EpsResult<Self> {
        let field = |f: ParticipantField| record.participant_field(role, f);

        let practitioner = Practitioner {
            id: ResourceId::new(),
            identifier: vec![Identifier::new(
                SDS_USER_ID_SYSTEM,
                field(ParticipantField::SdsUserId)?,
            )],
            name: vec![HumanName::text(field(ParticipantField::PersonName)?)],
        };

        let telecom = field(ParticipantField::OrganisationTelecom)?;
        let address_lines = [
            field(ParticipantField::OrganisationAddressLine1)?,
            field(ParticipantField::OrganisationAddressLine2)?,
            field(ParticipantField::OrganisationAddressLine3)?,
            field(ParticipantField::OrganisationAddressLine4)?,
            field(ParticipantField::OrganisationAddressLine5)?,
        ];

        let organization = Organization {
            id: ResourceId::new(),
            identifier: vec![Identifier::new(
                ODS_ORGANIZATION_SYSTEM,
                field(ParticipantField::SdsOrganisationId)?,
            )],
            org_type: vec![Coding::new(
                ORGANISATION_TYPE_SYSTEM,
                field(ParticipantField::OrganisationType)?,
                None,
            )
            .into()],
            name: epsfhir_types::optional_text(field(ParticipantField::OrganisationName)?),
            telecom: vec![ContactPoint::work_phone(telecom)],
            address: vec![Address::from_lines(
                None,
                address_lines,
                field(ParticipantField::OrganisationPostcode)?,
            )],
            part_of: Some(Reference::logical(Identifier::new(
                ODS_ORGANIZATION_SYSTEM,
                field(ParticipantField::PctOrganisationSdsId)?,
            ))),
        };

        let practitioner_role = PractitionerRole {
            id: ResourceId::new(),
            identifier: vec![Identifier::new(
                SDS_ROLE_PROFILE_SYSTEM,
                field(ParticipantField::RoleProfile)?,
            )],
            practitioner: Some(Reference::internal(&practitioner.id)),
            organization: Some(Reference::internal(&organization.id)),
            telecom: vec![ContactPoint::work_phone(telecom)],
        };

        Ok(Self {
            role_kind: role,
            practitioner,
            organization,
            role: practitioner_role,
        })
    }

    /// The person's display name, if the block carries one.
    pub fn display_name(&self) -> Option<&str> {
        self.practitioner.display_name()
    }

    /// Internal reference to the role, displayed with the person's name.
    pub fn role_reference(&self) -> Reference {
        let reference = Reference::internal(&self.role.id);
        match self.display_name() {
            Some(name) => reference.with_display(name),
            None => reference,
        }
    }

    /// Raw participation timestamp of the block, if the record carries one.
    pub fn participation_time<'a>(&self, record: &'a PrescriptionRecord) -> Option<&'a str> {
        record
            .participant_field(self.role_kind, ParticipantField::ParticipationTime)
            .ok()
    }
}
