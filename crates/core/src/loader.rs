//! Loads the prescription and line-item extracts into keyed tables.
//!
//! Each line is normalised, split on tabs, and turned into a typed record. Prescriptions are
//! indexed by ID (a repeated ID replaces the earlier line); line items are grouped, in file
//! order, under the prescription ID they reference. Items whose prescription is not present
//! are kept but never visited; an item with a blank prescription ID can never match and is
//! skipped. Bytes that are not valid UTF-8 are replaced rather than failing the load.
//!
//! Keys are trimmed, so ` RX1` and `RX1` name the same prescription and output file.

use crate::normalizer::CharacterNormalizer;
use crate::record::{split_fields, LineItemRecord, PrescriptionRecord};
use crate::{EpsError, EpsResult};
use epsfhir_types::NonEmptyText;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Both extracts, loaded and grouped.
#[derive(Clone, Debug, Default)]
pub struct PrescriptionData {
    prescriptions: BTreeMap<NonEmptyText, PrescriptionRecord>,
    items: BTreeMap<NonEmptyText, Vec<LineItemRecord>>,
}

impl PrescriptionData {
    /// Reads and groups both extract files.
    ///
    /// # Errors
    ///
    /// - [`EpsError::InputRead`] if either file cannot be opened or read
    /// - [`EpsError::InvalidRecord`] if a non-blank prescription line has an empty ID
    pub fn load(
        normalizer: &CharacterNormalizer,
        prescriptions_path: &Path,
        items_path: &Path,
    ) -> EpsResult<Self> {
        let mut data = Self::default();

        for_each_record(normalizer, prescriptions_path, |line_no, fields| {
            let record = match PrescriptionRecord::from_fields(fields) {
                Ok(record) => record,
                Err(err) => {
                    return Err(EpsError::InvalidRecord {
                        path: prescriptions_path.to_path_buf(),
                        line: line_no,
                        reason: format!("prescription ID: {err}"),
                    });
                }
            };
            if record.is_short() {
                tracing::warn!(
                    path = %prescriptions_path.display(),
                    line = line_no,
                    fields = record.len(),
                    expected = PrescriptionRecord::FIELD_COUNT,
                    "short prescription record"
                );
            }
            data.insert_prescription(record);
            Ok(())
        })?;

        for_each_record(normalizer, items_path, |line_no, fields| {
            let item = match LineItemRecord::from_fields(fields) {
                Ok(item) => item,
                Err(err) => {
                    tracing::warn!(
                        path = %items_path.display(),
                        line = line_no,
                        error = %err,
                        "line item has no prescription ID; skipping"
                    );
                    return Ok(());
                }
            };
            if item.is_short() {
                tracing::warn!(
                    path = %items_path.display(),
                    line = line_no,
                    fields = item.len(),
                    expected = LineItemRecord::FIELD_COUNT,
                    "short line-item record"
                );
            }
            data.insert_item(item);
            Ok(())
        })?;

        tracing::info!(
            prescriptions = data.prescriptions.len(),
            items = data.items.values().map(Vec::len).sum::<usize>(),
            "loaded extracts"
        );
        Ok(data)
    }

    /// Adds a prescription; an existing record with the same ID is replaced.
    pub fn insert_prescription(&mut self, record: PrescriptionRecord) {
        if let Some(previous) = self.prescriptions.insert(record.key().clone(), record) {
            tracing::debug!(
                id = previous.id(),
                "duplicate prescription ID, keeping last"
            );
        }
    }

    /// Appends an item to its prescription's list.
    pub fn insert_item(&mut self, item: LineItemRecord) {
        self.items.entry(item.key().clone()).or_default().push(item);
    }

    /// Prescription IDs in ascending order.
    pub fn prescription_ids(&self) -> impl Iterator<Item = &str> {
        self.prescriptions.keys().map(NonEmptyText::as_str)
    }

    pub fn prescription(&self, id: &str) -> Option<&PrescriptionRecord> {
        self.prescriptions.get(id)
    }

    /// Items keyed to `id`, in file order. Empty when there are none.
    pub fn items(&self, id: &str) -> &[LineItemRecord] {
        self.items.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.prescriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prescriptions.is_empty()
    }
}

/// Calls `f` with the 1-based line number and split fields of every non-blank line.
///
/// Lines end at `\n`; a trailing `\r` is dropped.
fn for_each_record<F>(normalizer: &CharacterNormalizer, path: &Path, mut f: F) -> EpsResult<()>
where
    F: FnMut(usize, Vec<String>) -> EpsResult<()>,
{
    let read_error = |source| EpsError::InputRead {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    for (index, bytes) in BufReader::new(file).split(b'\n').enumerate() {
        let line_no = index + 1;
        let line = match String::from_utf8(bytes.map_err(read_error)?) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    line = line_no,
                    "line is not valid UTF-8; replacing invalid bytes"
                );
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };
        let text = line.strip_suffix('\r').unwrap_or(&line);
        if text.trim().is_empty() {
            continue;
        }
        f(line_no, split_fields(&normalizer.normalize(text)))?;
    }
    Ok(())
}
