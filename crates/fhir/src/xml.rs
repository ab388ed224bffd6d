//! FHIR XML form derived from the JSON representation.
//!
//! The serde model is the single source of truth; this module walks the
//! order-preserving `serde_json::Value` of a resource and emits the equivalent
//! FHIR XML:
//! - primitives become `<name value="..."/>`
//! - arrays become repeated elements with the same name
//! - `extension`/`modifierExtension` carry `url` as an attribute
//! - an object with a `resourceType` is wrapped in an element named after that type

use crate::{FhirError, FhirResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde_json::{Map, Value};
use std::io::Write;

pub(crate) const FHIR_NAMESPACE: &str = "http://hl7.org/fhir";

const RESOURCE_TYPE: &str = "resourceType";

/// Renders a resource value (which must carry `resourceType`) as an XML document.
pub(crate) fn to_xml_string(resource: &Value) -> FhirResult<String> {
    let map = resource
        .as_object()
        .ok_or_else(|| FhirError::Xml("root value is not an object".into()))?;
    let resource_type = map
        .get(RESOURCE_TYPE)
        .and_then(Value::as_str)
        .ok_or_else(|| FhirError::Xml("root object has no resourceType".into()))?;

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new(resource_type);
    root.push_attribute(("xmlns", FHIR_NAMESPACE));
    writer.write_event(Event::Start(root))?;
    write_children(&mut writer, map)?;
    writer.write_event(Event::End(BytesEnd::new(resource_type)))?;

    String::from_utf8(writer.into_inner()).map_err(|e| FhirError::Xml(e.to_string()))
}

fn write_children<W: Write>(writer: &mut Writer<W>, map: &Map<String, Value>) -> FhirResult<()> {
    for (name, value) in map {
        if name == RESOURCE_TYPE {
            continue;
        }
        write_element(writer, name, value)?;
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, name: &str, value: &Value) -> FhirResult<()> {
    match value {
        Value::Null => Ok(()),
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        Value::Object(map) => write_object(writer, name, map),
        Value::String(s) => write_primitive(writer, name, s),
        Value::Bool(b) => write_primitive(writer, name, &b.to_string()),
        Value::Number(n) => write_primitive(writer, name, &n.to_string()),
    }
}

fn write_primitive<W: Write>(writer: &mut Writer<W>, name: &str, value: &str) -> FhirResult<()> {
    let mut element = BytesStart::new(name);
    element.push_attribute(("value", value));
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

fn write_object<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    map: &Map<String, Value>,
) -> FhirResult<()> {
    // Contained resource: <resource><Patient>...</Patient></resource>
    if let Some(resource_type) = map.get(RESOURCE_TYPE).and_then(Value::as_str) {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Start(BytesStart::new(resource_type)))?;
        write_children(writer, map)?;
        writer.write_event(Event::End(BytesEnd::new(resource_type)))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        return Ok(());
    }

    let mut element = BytesStart::new(name);
    let url_attribute = if is_extension(name) {
        map.get("url").and_then(Value::as_str)
    } else {
        None
    };
    if let Some(url) = url_attribute {
        element.push_attribute(("url", url));
    }

    let has_children = map
        .iter()
        .any(|(k, v)| !(url_attribute.is_some() && k == "url") && !v.is_null());
    if !has_children {
        writer.write_event(Event::Empty(element))?;
        return Ok(());
    }

    writer.write_event(Event::Start(element))?;
    for (key, child) in map {
        if url_attribute.is_some() && key == "url" {
            continue;
        }
        write_element(writer, key, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn is_extension(name: &str) -> bool {
    name == "extension" || name == "modifierExtension"
}
