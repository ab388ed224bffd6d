//! FHIR R4 `Patient` wire model.

use crate::datatypes::{Address, HumanName, Identifier, Reference};
use crate::ResourceId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Administrative gender code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

impl AdministrativeGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }
}

/// Demographics of the person the prescription is for.
///
/// `managing_organization` is a logical (identifier-only) reference: the organisation it
/// names is not an entry of the bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: ResourceId,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,

    #[serde(rename = "birthDate", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    #[serde(
        rename = "managingOrganization",
        skip_serializing_if = "Option::is_none"
    )]
    pub managing_organization: Option<Reference>,
}

impl Patient {
    /// An empty patient with a freshly allocated id.
    pub fn new() -> Self {
        Self {
            id: ResourceId::new(),
            identifier: Vec::new(),
            name: Vec::new(),
            gender: None,
            birth_date: None,
            address: Vec::new(),
            managing_organization: None,
        }
    }
}

impl Default for Patient {
    fn default() -> Self {
        Self::new()
    }
}
