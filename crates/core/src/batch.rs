//! The per-prescription loop: build, render, write.

use crate::document::DocumentBuilder;
use crate::loader::PrescriptionData;
use crate::output::DocumentSink;
use crate::EpsResult;
use fhir::{render, Format};

/// Outcome of a batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: usize,
    pub failed: Vec<String>,
}

impl BatchSummary {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Builds and writes one document per prescription, in ascending ID order.
///
/// With `immediate_fail` the first failing prescription aborts the batch and its error is
/// returned; documents already written stay written. Otherwise each failure is logged with
/// the prescription ID and the loop moves on.
///
/// # Errors
///
/// Only in immediate-fail mode: the first build, render, or write error.
pub fn run_batch(
    data: &PrescriptionData,
    builder: &DocumentBuilder,
    format: Format,
    sink: &mut dyn DocumentSink,
    immediate_fail: bool,
) -> EpsResult<BatchSummary> {
    let mut summary = BatchSummary::default();

    for id in data.prescription_ids() {
        match process_one(data, builder, format, sink, id) {
            Ok(()) => summary.written += 1,
            Err(err) if immediate_fail => {
                tracing::error!(id, error = %err, "prescription failed; stopping (immediate-fail)");
                return Err(err);
            }
            Err(err) => {
                tracing::error!(id, error = %err, "prescription failed; skipping");
                summary.failed.push(id.to_string());
            }
        }
    }

    tracing::info!(
        written = summary.written,
        failed = summary.failed_count(),
        "batch complete"
    );
    Ok(summary)
}

fn process_one(
    data: &PrescriptionData,
    builder: &DocumentBuilder,
    format: Format,
    sink: &mut dyn DocumentSink,
    id: &str,
) -> EpsResult<()> {
    let Some(record) = data.prescription(id) else {
        return Ok(());
    };
    let bundle = builder.build(record, data.items(id))?;
    let document = render::render(&bundle, format)?;
    sink.write_document(id, format, &document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::{sample_item_line, sample_prescription_line, sender};
    use crate::normalizer::CharacterNormalizer;
    use crate::output::{DirectorySink, StreamSink};
    use crate::EpsError;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn load(dir: &TempDir, prescriptions: &[String], items: &[String]) -> PrescriptionData {
        let rx = dir.path().join("prescriptions.txt");
        let it = dir.path().join("items.txt");
        fs::write(&rx, prescriptions.join("\n")).unwrap();
        fs::write(&it, items.join("\n")).unwrap();
        PrescriptionData::load(&CharacterNormalizer::new().unwrap(), &rx, &it).unwrap()
    }

    fn two_prescriptions_first_bad(dir: &TempDir) -> PrescriptionData {
        load(
            dir,
            &[
                sample_prescription_line("RX1", "0001", ""),
                sample_prescription_line("RX2", "0001", ""),
            ],
            &[
                sample_item_line("RX1", "ITEM-1", "lots"),
                sample_item_line("RX2", "ITEM-2", "14"),
            ],
        )
    }

    fn out_dir(dir: &TempDir) -> PathBuf {
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        out
    }

    #[test]
    fn continues_past_failures_when_immediate_fail_is_off() {
        let dir = TempDir::new().unwrap();
        let data = two_prescriptions_first_bad(&dir);
        let out = out_dir(&dir);
        let mut sink = DirectorySink::new(&out);

        let summary = run_batch(
            &data,
            &DocumentBuilder::new(sender()),
            Format::Json,
            &mut sink,
            false,
        )
        .unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(summary.failed, vec!["RX1"]);
        assert!(!out.join("RX1.json").exists());

        let json = fs::read_to_string(out.join("RX2.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["resourceType"], "Bundle");
        assert_eq!(value["type"], "message");
    }

    #[test]
    fn immediate_fail_stops_at_first_error() {
        let dir = TempDir::new().unwrap();
        let data = two_prescriptions_first_bad(&dir);
        let out = out_dir(&dir);
        let mut sink = DirectorySink::new(&out);

        let err = run_batch(
            &data,
            &DocumentBuilder::new(sender()),
            Format::Json,
            &mut sink,
            true,
        )
        .unwrap_err();

        assert!(matches!(err, EpsError::NumberFormat { .. }));
        assert!(!out.join("RX2.json").exists());
    }

    #[test]
    fn writes_xml_when_selected() {
        let dir = TempDir::new().unwrap();
        let data = load(
            &dir,
            &[sample_prescription_line("RX1", "0002", "FX123")],
            &[sample_item_line("RX1", "ITEM-1", "28")],
        );
        let out = out_dir(&dir);
        let mut sink = DirectorySink::new(&out);

        let summary = run_batch(
            &data,
            &DocumentBuilder::new(sender()),
            Format::Xml,
            &mut sink,
            true,
        )
        .unwrap();
        assert_eq!(summary.written, 1);

        let xml = fs::read_to_string(out.join("RX1.xml")).unwrap();
        assert!(xml.contains(r#"<Bundle xmlns="http://hl7.org/fhir">"#));
        assert!(xml.contains("<MedicationRequest>"));
        assert!(xml.contains(r#"<value value="FX123"/>"#));
    }

    #[test]
    fn streams_documents_with_id_lines() {
        let dir = TempDir::new().unwrap();
        let data = load(
            &dir,
            &[
                sample_prescription_line("RX2", "", ""),
                sample_prescription_line("RX1", "", ""),
            ],
            &[],
        );
        let mut sink = StreamSink::new(Vec::new());

        run_batch(
            &data,
            &DocumentBuilder::new(sender()),
            Format::Json,
            &mut sink,
            true,
        )
        .unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("RX1"));
        assert_eq!(lines.next(), Some("{"));
        let second = out
            .find("\nRX2\n")
            .expect("second document follows the first");
        assert!(second > 0);
    }
}
