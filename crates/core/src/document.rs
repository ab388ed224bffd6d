//! Assembles one prescription-order message bundle per prescription.
//!
//! # Responsibilities
//!
//! - Build the author participant triad, the message header and the patient
//! - Build one `MedicationRequest` per line item, in item order
//! - Wire header focus, subject, requester and performer references
//! - Check that every internal reference resolves before the bundle is returned
//!
//! Field-level problems with a documented default (dates, course of therapy) never fail a
//! document. Missing fields and unparseable quantities fail the whole prescription.

use crate::config::SenderConfig;
use crate::constants::{
    DISPENSING_SITE_PREFERENCE_SYSTEM, MESSAGE_EVENT_SYSTEM, NHS_NUMBER_SYSTEM,
    NHS_NUMBER_VERIFICATION_EXTENSION, NHS_NUMBER_VERIFICATION_SYSTEM, NHS_NUMBER_VERIFIED_CODE,
    NHS_NUMBER_VERIFIED_DISPLAY, ODS_ORGANIZATION_SYSTEM, PERFORMER_TYPE_EXTENSION,
    PRESCRIPTION_ID_EXTENSION, PRESCRIPTION_LINE_ID_SYSTEM, PRESCRIPTION_ORDER_CODE,
    PRESCRIPTION_ORDER_DISPLAY, PRESCRIPTION_SHORT_FORM_SYSTEM, PRESCRIPTION_TYPE_EXTENSION,
    RESPONSIBLE_PRACTITIONER_EXTENSION, SNOMED_SYSTEM, SPINE_ASID_SYSTEM, SPINE_ENDPOINT_EXTENSION,
};
use crate::participant::{Participant, ParticipantRole};
use crate::record::{LineItemField, LineItemRecord, PrescriptionField, PrescriptionRecord};
use crate::vocabulary::{
    gender_from_code, parse_birth_date, parse_hl7_timestamp_or, prescription_type_coding,
    CourseOfTherapy,
};
use crate::{EpsError, EpsResult};
use chrono::{DateTime, Utc};
use epsfhir_types::optional_text;
use fhir::{
    Address, AddressUse, Bundle, BundleType, CodeableConcept, Coding, DispenseRequest, Dosage,
    Extension, ExtensionValue, HumanName, Identifier, MedicationRequest, MedicationRequestIntent,
    MedicationRequestStatus, MessageHeader, MessageSource, NameUse, Patient, Quantity, Reference,
    ResourceId,
};

/// Builds message bundles for a fixed sender.
#[derive(Clone, Debug)]
pub struct DocumentBuilder {
    sender: SenderConfig,
}

impl DocumentBuilder {
    pub fn new(sender: SenderConfig) -> Self {
        Self { sender }
    }

    /// Builds the bundle for `record` and its `items`, using the current time wherever the
    /// record carries no usable authoring timestamp.
    ///
    /// # Errors
    ///
    /// - [`EpsError::RecordShape`] if a required field is missing from either record
    /// - [`EpsError::NumberFormat`] if an item quantity is not an integer
    /// - [`EpsError::Fhir`] if an internal reference fails to resolve
    pub fn build(
        &self,
        record: &PrescriptionRecord,
        items: &[LineItemRecord],
    ) -> EpsResult<Bundle> {
        self.build_at(record, items, Utc::now())
    }

    /// [`DocumentBuilder::build`] with an explicit processing time.
    pub fn build_at(
        &self,
        record: &PrescriptionRecord,
        items: &[LineItemRecord],
        now: DateTime<Utc>,
    ) -> EpsResult<Bundle> {
        let mut bundle = Bundle::new(BundleType::Message);

        let author = Participant::build(ParticipantRole::Author, record)?;
        let mut header = self.message_header(&author);
        let patient = build_patient(record)?;
        let pharmacy = nominated_pharmacy(record)?;
        let authored_on = parse_hl7_timestamp_or(author.participation_time(record), now);

        let orders = items
            .iter()
            .map(|item| {
                OrderContext {
                    record,
                    patient: &patient,
                    author: &author,
                    pharmacy: pharmacy.as_ref(),
                    authored_on,
                }
                .build(item)
            })
            .collect::<EpsResult<Vec<_>>>()?;

        for order in &orders {
            header.add_focus(&order.id);
        }
        header.add_focus(&patient.id);
        header.add_focus(&author.role.id);

        bundle.add_entry(header);
        bundle.add_entry(patient);
        bundle.add_entry(author.practitioner);
        bundle.add_entry(author.organization);
        bundle.add_entry(author.role);
        for order in orders {
            bundle.add_entry(order);
        }

        bundle.check_references()?;
        tracing::debug!(
            id = record.id(),
            bundle = %bundle.id,
            entries = bundle.entry.len(),
            "built document"
        );
        Ok(bundle)
    }

    fn message_header(&self, author: &Participant) -> MessageHeader {
        let asid = Identifier::new(
            SPINE_ASID_SYSTEM,
            self.sender.asid.as_deref().unwrap_or_default(),
        );
        MessageHeader {
            id: ResourceId::new(),
            event_coding: Coding::new(
                MESSAGE_EVENT_SYSTEM,
                PRESCRIPTION_ORDER_CODE,
                Some(PRESCRIPTION_ORDER_DISPLAY),
            ),
            sender: Some(author.role_reference()),
            source: MessageSource {
                extension: vec![Extension::new(
                    SPINE_ENDPOINT_EXTENSION,
                    ExtensionValue::Identifier(asid),
                )],
                name: self.sender.ods_code.clone(),
                endpoint: self.sender.endpoint.clone(),
            },
            focus: Vec::new(),
        }
    }
}

fn build_patient(record: &PrescriptionRecord) -> EpsResult<Patient> {
    use PrescriptionField as F;

    let verification = Extension::new(
        NHS_NUMBER_VERIFICATION_EXTENSION,
        ExtensionValue::CodeableConcept(CodeableConcept::from(Coding::new(
            NHS_NUMBER_VERIFICATION_SYSTEM,
            NHS_NUMBER_VERIFIED_CODE,
            Some(NHS_NUMBER_VERIFIED_DISPLAY),
        ))),
    );

    let name = HumanName {
        use_type: Some(NameUse::Official),
        text: None,
        family: optional_text(record.field(F::PatientSurname)?),
        given: [F::PatientGivenName1, F::PatientGivenName2]
            .into_iter()
            .map(|f| record.field(f))
            .collect::<EpsResult<Vec<_>>>()?
            .into_iter()
            .filter_map(optional_text)
            .collect(),
        prefix: optional_text(record.field(F::PatientNameTitle)?)
            .into_iter()
            .collect(),
    };

    let address = Address::from_lines(
        Some(AddressUse::Home),
        [
            record.field(F::PatientAddressLine1)?,
            record.field(F::PatientAddressLine2)?,
            record.field(F::PatientAddressLine3)?,
            record.field(F::PatientAddressLine4)?,
            record.field(F::PatientAddressLine5)?,
        ],
        record.field(F::PatientAddressPostcode)?,
    );

    let managing_organization = optional_text(record.field(F::PatientPrimaryCareProviderSdsId)?)
        .map(|code| Reference::logical(Identifier::new(ODS_ORGANIZATION_SYSTEM, &code)));

    let mut patient = Patient::new();
    patient.identifier = vec![
        Identifier::new(NHS_NUMBER_SYSTEM, record.field(F::PatientId)?)
            .with_extension(verification),
    ];
    patient.name = vec![name];
    patient.gender = Some(gender_from_code(record.field(F::PatientGender)?));
    patient.birth_date = parse_birth_date(record.field(F::PatientBirthTime)?);
    patient.address = vec![address];
    patient.managing_organization = managing_organization;
    Ok(patient)
}

/// Identifier-only reference to the nominated pharmacy, when one is named.
fn nominated_pharmacy(record: &PrescriptionRecord) -> EpsResult<Option<Reference>> {
    let code = record.field(PrescriptionField::NominatedPharmacyId)?;
    Ok(optional_text(code)
        .map(|code| Reference::logical(Identifier::new(ODS_ORGANIZATION_SYSTEM, &code))))
}

/// Everything an order shares with the rest of its document.
struct OrderContext<'a> {
    record: &'a PrescriptionRecord,
    patient: &'a Patient,
    author: &'a Participant,
    pharmacy: Option<&'a Reference>,
    authored_on: DateTime<Utc>,
}

impl OrderContext<'_> {
    fn build(&self, item: &LineItemRecord) -> EpsResult<MedicationRequest> {
        use LineItemField as I;

        let record = self.record;
        let prescription_type = record.field(PrescriptionField::PrescriptionType)?;
        let course_of_therapy = CourseOfTherapy::from_treatment_type(
            record
                .field(PrescriptionField::PrescriptionTreatmentType)
                .ok(),
        );

        let dosage_instruction = match optional_text(item.field(I::DosageInstructions)?) {
            Some(text) => vec![Dosage {
                text: Some(text),
                patient_instruction: optional_text(item.field(I::AdditionalInstructions)?),
            }],
            None => Vec::new(),
        };

        Ok(MedicationRequest {
            id: ResourceId::new(),
            extension: vec![
                Extension::new(
                    PRESCRIPTION_TYPE_EXTENSION,
                    ExtensionValue::Coding(prescription_type_coding(prescription_type)),
                ),
                Extension::new(
                    RESPONSIBLE_PRACTITIONER_EXTENSION,
                    ExtensionValue::Reference(Reference::internal(&self.author.role.id)),
                ),
            ],
            identifier: vec![Identifier::new(
                PRESCRIPTION_LINE_ID_SYSTEM,
                item.field(I::LineItemId)?,
            )],
            status: MedicationRequestStatus::Active,
            intent: MedicationRequestIntent::Order,
            medication: Coding::new(
                SNOMED_SYSTEM,
                item.field(I::SubstanceCode)?,
                Some(item.field(I::DisplayName)?),
            )
            .into(),
            subject: Reference::internal(&self.patient.id),
            authored_on: Some(self.authored_on),
            requester: Some(self.author.role_reference()),
            group_identifier: Some(self.group_identifier()?),
            course_of_therapy_type: Some(course_of_therapy.to_codeable_concept()),
            dosage_instruction,
            dispense_request: Some(self.dispense_request(item)?),
        })
    }

    /// Short-form prescription ID, always carrying the clinical-statement ID extension.
    fn group_identifier(&self) -> EpsResult<Identifier> {
        let statement_id = self
            .record
            .field(PrescriptionField::PrescriptionClinicalStatementId)?;
        let extension = Extension::new(
            PRESCRIPTION_ID_EXTENSION,
            ExtensionValue::String(statement_id.to_string()),
        );
        let identifier = Identifier::new(PRESCRIPTION_SHORT_FORM_SYSTEM, self.record.id());
        Ok(identifier.with_extension(extension))
    }

    fn dispense_request(&self, item: &LineItemRecord) -> EpsResult<DispenseRequest> {
        let site_preference = self
            .record
            .field(PrescriptionField::DispensingSitePreference)?;

        let count = item.field(LineItemField::QuantityCount)?;
        let value = count
            .trim()
            .parse::<i64>()
            .map_err(|source| EpsError::NumberFormat {
                record: self.record.id().to_string(),
                field: LineItemField::QuantityCount.name(),
                value: count.to_string(),
                source,
            })?;

        Ok(DispenseRequest {
            extension: vec![Extension::new(
                PERFORMER_TYPE_EXTENSION,
                ExtensionValue::Coding(Coding::new(
                    DISPENSING_SITE_PREFERENCE_SYSTEM,
                    site_preference,
                    None,
                )),
            )],
            quantity: Some(Quantity {
                value,
                unit: optional_text(item.field(LineItemField::QuantityText)?),
                system: Some(SNOMED_SYSTEM.to_string()),
                code: optional_text(item.field(LineItemField::QuantityCode)?),
            }),
            performer: self.pharmacy.cloned(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::split_fields;
    use crate::record::tests::{item_line, prescription_line};
    use crate::record::ParticipantField;
    use chrono::{NaiveDate, TimeZone};
    use fhir::{AdministrativeGender, Resource};

    pub(crate) fn sender() -> SenderConfig {
        SenderConfig {
            asid: Some("200000001234".into()),
            ods_code: Some("RHM".into()),
            endpoint: Some("https://sender.example.nhs.uk/eps".into()),
        }
    }

    /// A complete prescription line with realistic values.
    pub(crate) fn sample_prescription_line(
        id: &str,
        treatment_type: &str,
        pharmacy: &str,
    ) -> String {
        use PrescriptionField as F;
        let author = |f: ParticipantField| ParticipantRole::Author.base_offset() + f.index();
        prescription_line(
            id,
            &[
                (F::PatientId.index(), "9434765919"),
                (F::PatientAddressLine1.index(), "1 Trevelyan Square"),
                (F::PatientAddressLine2.index(), ""),
                (F::PatientAddressLine3.index(), "Boar Lane"),
                (F::PatientAddressLine4.index(), "Leeds"),
                (F::PatientAddressPostcode.index(), "LS1 6AE"),
                (F::PatientNameTitle.index(), "MRS"),
                (F::PatientGivenName1.index(), "Ann"),
                (F::PatientGivenName2.index(), ""),
                (F::PatientSurname.index(), "Example"),
                (F::PatientGender.index(), "2"),
                (F::PatientBirthTime.index(), "19800131"),
                (F::PatientPrimaryCareProviderSdsId.index(), "B81001"),
                (F::PrescriptionTreatmentType.index(), treatment_type),
                (F::PrescriptionType.index(), "0001"),
                (F::NominatedPharmacyId.index(), pharmacy),
                (F::DispensingSitePreference.index(), "P1"),
                (author(ParticipantField::RoleProfile), "100102238986"),
                (author(ParticipantField::SdsUserId), "3415870201"),
                (author(ParticipantField::PersonName), "Dr Jane Taylor"),
                (author(ParticipantField::SdsOrganisationId), "A83008"),
                (
                    author(ParticipantField::OrganisationName),
                    "HALLGARTH SURGERY",
                ),
                (author(ParticipantField::OrganisationType), "001"),
                (author(ParticipantField::OrganisationTelecom), "01159737320"),
                (
                    author(ParticipantField::OrganisationAddressLine1),
                    "CHEAPSIDE",
                ),
                (author(ParticipantField::OrganisationPostcode), "DL4 2HP"),
                (author(ParticipantField::PctOrganisationSdsId), "84H"),
                (
                    author(ParticipantField::ParticipationTime),
                    "20200315093000",
                ),
                (
                    F::PrescriptionClinicalStatementId.index(),
                    "A0548B97-5BF3-4F8A-8A4B-90C1E9A0D3E6",
                ),
            ],
        )
    }

    pub(crate) fn sample_item_line(prescription_id: &str, line_id: &str, count: &str) -> String {
        use LineItemField as I;
        item_line(
            prescription_id,
            &[
                (I::SubstanceCode.index(), "322237000"),
                (I::DisplayName.index(), "Paracetamol 500mg soluble tablets"),
                (I::QuantityText.index(), "tablet"),
                (I::QuantityCode.index(), "428673006"),
                (I::QuantityCount.index(), count),
                (
                    I::DosageInstructions.index(),
                    "2 tablets up to 4 times a day",
                ),
                (I::AdditionalInstructions.index(), "Dissolve in water"),
                (I::LineItemId.index(), line_id),
            ],
        )
    }

    fn prescription(line: &str) -> PrescriptionRecord {
        PrescriptionRecord::from_fields(split_fields(line)).unwrap()
    }

    fn item(line: &str) -> LineItemRecord {
        LineItemRecord::from_fields(split_fields(line)).unwrap()
    }

    fn orders(bundle: &Bundle) -> Vec<&MedicationRequest> {
        bundle
            .resources()
            .filter_map(|r| match r {
                Resource::MedicationRequest(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn count_of(bundle: &Bundle, resource_type: &str) -> usize {
        bundle
            .resources()
            .filter(|r| r.resource_type() == resource_type)
            .count()
    }

    #[test]
    fn repeat_prescription_with_pharmacy_and_two_items() {
        let record = prescription(&sample_prescription_line("RX1", "0002", "FX123"));
        let items = vec![
            item(&sample_item_line("RX1", "ITEM-1", "28")),
            item(&sample_item_line("RX1", "ITEM-2", "56")),
        ];

        let bundle = DocumentBuilder::new(sender())
            .build(&record, &items)
            .unwrap();
        assert_eq!(bundle.bundle_type, BundleType::Message);

        let types: Vec<&str> = bundle.resources().map(Resource::resource_type).collect();
        assert_eq!(
            types,
            vec![
                "MessageHeader",
                "Patient",
                "Practitioner",
                "Organization",
                "PractitionerRole",
                "MedicationRequest",
                "MedicationRequest",
            ]
        );
        assert_eq!(count_of(&bundle, "MessageHeader"), 1);
        assert_eq!(count_of(&bundle, "Patient"), 1);

        let Resource::MessageHeader(header) = &bundle.entry[0].resource else {
            panic!("first entry is not the header");
        };
        let Resource::Patient(patient) = &bundle.entry[1].resource else {
            panic!("second entry is not the patient");
        };
        let Resource::PractitionerRole(role) = &bundle.entry[4].resource else {
            panic!("fifth entry is not the role");
        };

        let orders = orders(&bundle);
        let pharmacy = Reference::logical(Identifier::new(ODS_ORGANIZATION_SYSTEM, "FX123"));
        for order in &orders {
            assert_eq!(order.subject, Reference::internal(&patient.id));
            let dispense = order.dispense_request.as_ref().unwrap();
            assert_eq!(dispense.performer.as_ref(), Some(&pharmacy));
            let course = order.course_of_therapy_type.as_ref().unwrap();
            assert_eq!(course.coding[0].code.as_deref(), Some("repeat"));
        }

        let expected_focus: Vec<Reference> = orders
            .iter()
            .map(|o| Reference::internal(&o.id))
            .chain([
                Reference::internal(&patient.id),
                Reference::internal(&role.id),
            ])
            .collect();
        assert_eq!(header.focus, expected_focus);

        bundle.check_references().unwrap();
    }

    #[test]
    fn header_carries_sender_and_author() {
        let record = prescription(&sample_prescription_line("RX1", "", ""));
        let bundle = DocumentBuilder::new(sender()).build(&record, &[]).unwrap();
        let Resource::MessageHeader(header) = &bundle.entry[0].resource else {
            panic!("first entry is not the header");
        };
        let Resource::PractitionerRole(role) = &bundle.entry[4].resource else {
            panic!("fifth entry is not the role");
        };

        assert_eq!(
            header.event_coding.code.as_deref(),
            Some(PRESCRIPTION_ORDER_CODE)
        );
        assert_eq!(
            header.event_coding.display.as_deref(),
            Some(PRESCRIPTION_ORDER_DISPLAY)
        );
        let sender_ref = header.sender.as_ref().unwrap();
        assert_eq!(sender_ref.reference, Some(role.id.full_url()));
        assert_eq!(sender_ref.display.as_deref(), Some("Dr Jane Taylor"));

        assert_eq!(header.source.name.as_deref(), Some("RHM"));
        assert_eq!(
            header.source.endpoint.as_deref(),
            Some("https://sender.example.nhs.uk/eps")
        );
        let ext = &header.source.extension[0];
        assert_eq!(ext.url, SPINE_ENDPOINT_EXTENSION);
        assert_eq!(
            ext.value,
            ExtensionValue::Identifier(Identifier::new(SPINE_ASID_SYSTEM, "200000001234"))
        );

        // No items: focus is just patient and author role.
        assert_eq!(header.focus.len(), 2);
    }

    #[test]
    fn patient_demographics() {
        let record = prescription(&sample_prescription_line("RX1", "", ""));
        let patient = build_patient(&record).unwrap();

        let nhs = &patient.identifier[0];
        assert_eq!(nhs.system.as_deref(), Some(NHS_NUMBER_SYSTEM));
        assert_eq!(nhs.value.as_deref(), Some("9434765919"));
        assert_eq!(nhs.extension[0].url, NHS_NUMBER_VERIFICATION_EXTENSION);

        let name = &patient.name[0];
        assert_eq!(name.use_type, Some(NameUse::Official));
        assert_eq!(name.family.as_deref(), Some("Example"));
        assert_eq!(name.given, vec!["Ann"]);
        assert_eq!(name.prefix, vec!["MRS"]);

        assert_eq!(patient.gender, Some(AdministrativeGender::Female));
        assert_eq!(patient.birth_date, NaiveDate::from_ymd_opt(1980, 1, 31));

        let address = &patient.address[0];
        assert_eq!(address.use_type, Some(AddressUse::Home));
        assert_eq!(
            address.line,
            vec!["1 Trevelyan Square", "Boar Lane", "Leeds"]
        );
        assert_eq!(address.postal_code.as_deref(), Some("LS1 6AE"));

        let gp = patient.managing_organization.as_ref().unwrap();
        assert!(gp.reference.is_none());
        assert_eq!(
            gp.identifier.as_ref().unwrap().value.as_deref(),
            Some("B81001")
        );
    }

    #[test]
    fn unparseable_birth_date_is_omitted() {
        let mut line = sample_prescription_line("RX1", "", "");
        line = line.replace("19800131", "not-a-date");
        let patient = build_patient(&prescription(&line)).unwrap();
        assert!(patient.birth_date.is_none());
    }

    #[test]
    fn order_fields() {
        let record = prescription(&sample_prescription_line("RX1", "0001", ""));
        let items = [item(&sample_item_line("RX1", "ITEM-1", " 28 "))];
        let bundle = DocumentBuilder::new(sender())
            .build(&record, &items)
            .unwrap();
        let Resource::PractitionerRole(role) = &bundle.entry[4].resource else {
            panic!("fifth entry is not the role");
        };
        let order = orders(&bundle)[0];

        assert_eq!(order.status, MedicationRequestStatus::Active);
        assert_eq!(order.intent, MedicationRequestIntent::Order);

        assert_eq!(order.extension[0].url, PRESCRIPTION_TYPE_EXTENSION);
        assert_eq!(
            order.extension[0].value,
            ExtensionValue::Coding(prescription_type_coding("0001"))
        );
        assert_eq!(order.extension[1].url, RESPONSIBLE_PRACTITIONER_EXTENSION);
        assert_eq!(
            order.extension[1].value,
            ExtensionValue::Reference(Reference::internal(&role.id))
        );

        assert_eq!(
            order.identifier,
            vec![Identifier::new(PRESCRIPTION_LINE_ID_SYSTEM, "ITEM-1")]
        );
        let medication = &order.medication.coding[0];
        assert_eq!(medication.system.as_deref(), Some(SNOMED_SYSTEM));
        assert_eq!(medication.code.as_deref(), Some("322237000"));

        let requester = order.requester.as_ref().unwrap();
        assert_eq!(requester.reference, Some(role.id.full_url()));
        assert_eq!(requester.display.as_deref(), Some("Dr Jane Taylor"));

        assert_eq!(
            order.authored_on,
            Some(Utc.with_ymd_and_hms(2020, 3, 15, 9, 30, 0).unwrap())
        );

        let group = order.group_identifier.as_ref().unwrap();
        assert_eq!(
            group.system.as_deref(),
            Some(PRESCRIPTION_SHORT_FORM_SYSTEM)
        );
        assert_eq!(group.value.as_deref(), Some("RX1"));
        assert_eq!(
            group.extension[0].value,
            ExtensionValue::String("A0548B97-5BF3-4F8A-8A4B-90C1E9A0D3E6".into())
        );

        let course = order.course_of_therapy_type.as_ref().unwrap();
        assert_eq!(course.coding[0].code.as_deref(), Some("acute"));

        assert_eq!(order.dosage_instruction.len(), 1);
        assert_eq!(
            order.dosage_instruction[0].patient_instruction.as_deref(),
            Some("Dissolve in water")
        );

        let dispense = order.dispense_request.as_ref().unwrap();
        let quantity = dispense.quantity.as_ref().unwrap();
        assert_eq!(quantity.value, 28);
        assert_eq!(quantity.unit.as_deref(), Some("tablet"));
        assert_eq!(quantity.code.as_deref(), Some("428673006"));
        assert_eq!(
            dispense.extension[0].value,
            ExtensionValue::Coding(Coding::new(DISPENSING_SITE_PREFERENCE_SYSTEM, "P1", None))
        );
        assert!(dispense.performer.is_none());
    }

    #[test]
    fn group_identifier_keeps_extension_for_blank_statement_id() {
        let line = sample_prescription_line("RX1", "", "")
            .replace("A0548B97-5BF3-4F8A-8A4B-90C1E9A0D3E6", "");
        let record = prescription(&line);
        let bundle = DocumentBuilder::new(sender())
            .build(&record, &[item(&sample_item_line("RX1", "ITEM-1", "1"))])
            .unwrap();

        let group = orders(&bundle)[0].group_identifier.clone().unwrap();
        assert_eq!(group.value.as_deref(), Some("RX1"));
        assert_eq!(group.extension.len(), 1);
        assert_eq!(group.extension[0].url, PRESCRIPTION_ID_EXTENSION);
        assert_eq!(
            group.extension[0].value,
            ExtensionValue::String(String::new())
        );
    }

    #[test]
    fn blank_dosage_is_omitted() {
        let record = prescription(&sample_prescription_line("RX1", "", ""));
        let line =
            sample_item_line("RX1", "ITEM-1", "1").replace("2 tablets up to 4 times a day", "  ");
        let bundle = DocumentBuilder::new(sender())
            .build(&record, &[item(&line)])
            .unwrap();
        assert!(orders(&bundle)[0].dosage_instruction.is_empty());
    }

    #[test]
    fn missing_participation_time_uses_processing_time() {
        let line = sample_prescription_line("RX1", "", "").replace("20200315093000", "");
        let record = prescription(&line);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let bundle = DocumentBuilder::new(sender())
            .build_at(
                &record,
                &[item(&sample_item_line("RX1", "ITEM-1", "1"))],
                now,
            )
            .unwrap();
        assert_eq!(orders(&bundle)[0].authored_on, Some(now));
    }

    #[test]
    fn bad_quantity_is_a_number_format_error() {
        let record = prescription(&sample_prescription_line("RX1", "", ""));
        let items = [item(&sample_item_line("RX1", "ITEM-1", "twenty"))];
        match DocumentBuilder::new(sender()).build(&record, &items) {
            Err(EpsError::NumberFormat {
                record,
                field,
                value,
                ..
            }) => {
                assert_eq!(record, "RX1");
                assert_eq!(field, "QuantityCount");
                assert_eq!(value, "twenty");
            }
            other => panic!("expected NumberFormat, got {other:?}"),
        }
    }

    #[test]
    fn short_item_fails_the_prescription() {
        let record = prescription(&sample_prescription_line("RX1", "", ""));
        let items = [item("RX1\t322237000")];
        assert!(matches!(
            DocumentBuilder::new(sender()).build(&record, &items),
            Err(EpsError::RecordShape { .. })
        ));
    }

    #[test]
    fn short_treatment_type_defaults_to_acute() {
        // Record ends before the treatment-type field.
        let record = prescription("RX1\tY\t9434765919");
        let course = CourseOfTherapy::from_treatment_type(
            record
                .field(PrescriptionField::PrescriptionTreatmentType)
                .ok(),
        );
        assert_eq!(course, CourseOfTherapy::Acute);
    }

    #[test]
    fn missing_sender_configuration_omits_fields() {
        let record = prescription(&sample_prescription_line("RX1", "", ""));
        let bundle = DocumentBuilder::new(SenderConfig::default())
            .build(&record, &[])
            .unwrap();
        let json = serde_json::to_value(&bundle).unwrap();
        let source = &json["entry"][0]["resource"]["source"];
        assert!(source.get("name").is_none());
        assert!(source.get("endpoint").is_none());
        assert_eq!(
            source["extension"][0]["valueIdentifier"],
            serde_json::json!({"system": SPINE_ASID_SYSTEM})
        );
    }
}
