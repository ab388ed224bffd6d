//! FHIR R4 `MessageHeader` wire model.

use crate::datatypes::{Coding, Extension, Reference};
use crate::ResourceId;
use serde::{Deserialize, Serialize};

/// Header of a message bundle: the event, the sender, the source system, and the resources
/// the message is about (`focus`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub id: ResourceId,

    #[serde(rename = "eventCoding")]
    pub event_coding: Coding,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<Reference>,

    pub source: MessageSource,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus: Vec<Reference>,
}

impl MessageHeader {
    pub fn add_focus(&mut self, id: &ResourceId) {
        self.focus.push(Reference::internal(id));
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSource {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}
