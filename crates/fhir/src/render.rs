//! Rendering of finished bundles to text.

use crate::{xml, Bundle, FhirResult};

/// Output representation of a rendered bundle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Json,
    Xml,
}

impl Format {
    /// Interprets a configured output setting: `xml` (any case, surrounding whitespace
    /// ignored) selects XML, anything else selects JSON.
    pub fn from_config_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("xml") => Format::Xml,
            _ => Format::Json,
        }
    }

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
        }
    }
}

/// Pretty-prints `bundle` in the requested format.
///
/// # Errors
///
/// Returns [`crate::FhirError::InvalidJson`] if serialisation fails, or
/// [`crate::FhirError::Xml`]/[`crate::FhirError::Io`] if the XML writer fails.
pub fn render(bundle: &Bundle, format: Format) -> FhirResult<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(bundle)?),
        Format::Xml => {
            let value = serde_json::to_value(bundle)?;
            xml::to_xml_string(&value)
        }
    }
}
