//! FHIR R4 `Bundle` wire model and internal-reference checks.
//!
//! A message bundle is self-contained: every entry's `fullUrl` is `urn:uuid:<resource id>`
//! and every `reference` string inside the bundle must name exactly one of those entries.
//! Identifier-only references (no `reference` string) are logical references to resources
//! outside the bundle and are not checked.
//!
//! [`Bundle::resolve`] and [`Bundle::parse_json`] are the read-back side of the model: they
//! let a caller load a rendered document and follow its references.

use crate::medication_request::MedicationRequest;
use crate::message_header::MessageHeader;
use crate::participant::{Organization, Practitioner, PractitionerRole};
use crate::patient::Patient;
use crate::{FhirError, FhirResult, ResourceId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    Message,
}

/// Any resource that can appear as a bundle entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    MessageHeader(MessageHeader),
    Patient(Patient),
    Practitioner(Practitioner),
    Organization(Organization),
    PractitionerRole(PractitionerRole),
    MedicationRequest(MedicationRequest),
}

impl Resource {
    pub fn id(&self) -> &ResourceId {
        match self {
            Resource::MessageHeader(r) => &r.id,
            Resource::Patient(r) => &r.id,
            Resource::Practitioner(r) => &r.id,
            Resource::Organization(r) => &r.id,
            Resource::PractitionerRole(r) => &r.id,
            Resource::MedicationRequest(r) => &r.id,
        }
    }

    pub fn resource_type(&self) -> &'static str {
        match self {
            Resource::MessageHeader(_) => "MessageHeader",
            Resource::Patient(_) => "Patient",
            Resource::Practitioner(_) => "Practitioner",
            Resource::Organization(_) => "Organization",
            Resource::PractitionerRole(_) => "PractitionerRole",
            Resource::MedicationRequest(_) => "MedicationRequest",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleEntry {
    #[serde(rename = "fullUrl")]
    pub full_url: String,

    pub resource: Resource,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub struct Bundle {
    pub id: ResourceId,

    #[serde(rename = "type")]
    pub bundle_type: BundleType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    /// An empty bundle of the given type with a freshly allocated id.
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            id: ResourceId::new(),
            bundle_type,
            entry: Vec::new(),
        }
    }

    /// Appends `resource` with `fullUrl` derived from its own id.
    pub fn add_entry(&mut self, resource: impl Into<Resource>) {
        let resource = resource.into();
        self.entry.push(BundleEntry {
            full_url: resource.id().full_url(),
            resource,
        });
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().map(|e| &e.resource)
    }

    /// Finds the entry whose `fullUrl` equals `reference`.
    pub fn resolve(&self, reference: &str) -> Option<&Resource> {
        self.entry
            .iter()
            .find(|e| e.full_url == reference)
            .map(|e| &e.resource)
    }

    /// Collects every `reference` string in the serialised bundle, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidJson`] if the bundle cannot be serialised.
    pub fn internal_references(&self) -> FhirResult<Vec<String>> {
        let value = serde_json::to_value(self)?;
        let mut found = Vec::new();
        collect_references(&value, &mut found);
        Ok(found)
    }

    /// Checks that every internal reference resolves to exactly one entry.
    ///
    /// # Errors
    ///
    /// - [`FhirError::DuplicateFullUrl`] if two entries share a `fullUrl`
    /// - [`FhirError::DanglingReference`] for the first reference with no matching entry
    pub fn check_references(&self) -> FhirResult<()> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in &self.entry {
            *counts.entry(entry.full_url.as_str()).or_default() += 1;
        }
        if let Some((url, _)) = counts.iter().find(|(_, n)| **n > 1) {
            return Err(FhirError::DuplicateFullUrl((*url).to_string()));
        }

        let known: HashSet<&str> = counts.into_keys().collect();
        for reference in self.internal_references()? {
            if !known.contains(reference.as_str()) {
                return Err(FhirError::DanglingReference(reference));
            }
        }
        Ok(())
    }

    /// Parse a bundle from JSON text.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort "path" (e.g.
    /// `entry[2].resource.status`) to the failing field when the JSON does not match the
    /// wire schema.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] on any schema mismatch, and
    /// [`FhirError::InvalidInput`] if `resourceType` is not `Bundle`.
    pub fn parse_json(json_text: &str) -> FhirResult<Self> {
        let raw: Value = serde_json::from_str(json_text)?;
        if raw.get("resourceType").and_then(Value::as_str) != Some("Bundle") {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Bundle', got {}",
                raw.get("resourceType").unwrap_or(&Value::Null)
            )));
        }

        serde_path_to_error::deserialize::<_, Bundle>(raw).map_err(|err| {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>".to_string()
            } else {
                path
            };
            FhirError::Translation(format!("Bundle schema mismatch at {path}: {source}"))
        })
    }
}

fn collect_references(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("reference", Value::String(s)) => found.push(s.clone()),
                    _ => collect_references(child, found),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, found);
            }
        }
        _ => {}
    }
}

macro_rules! impl_into_resource {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Resource {
                fn from(r: $ty) -> Self {
                    Resource::$ty(r)
                }
            }
        )*
    };
}

impl_into_resource!(
    MessageHeader,
    Patient,
    Practitioner,
    Organization,
    PractitionerRole,
    MedicationRequest,
);
