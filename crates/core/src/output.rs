//! Where rendered documents go.
//!
//! Documents are either written as `<prescription id>.<ext>` files into a directory, or
//! streamed to standard output as an ID line followed by the document. A document is only
//! written once it has been fully rendered.

use crate::constants::OUTPUT_WRITE_CHECK_PREFIX;
use crate::{EpsError, EpsResult};
use fhir::Format;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Output target named on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    CurrentDirectory,
    Directory(PathBuf),
    Stdout,
}

impl OutputTarget {
    /// `None` is the current directory and `-` is standard output; anything else is a
    /// directory path.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => OutputTarget::CurrentDirectory,
            Some("-") => OutputTarget::Stdout,
            Some(path) => OutputTarget::Directory(PathBuf::from(path)),
        }
    }

    /// Directory documents are written into, if this target writes files.
    pub fn directory(&self) -> Option<&Path> {
        match self {
            OutputTarget::CurrentDirectory => Some(Path::new(".")),
            OutputTarget::Directory(dir) => Some(dir),
            OutputTarget::Stdout => None,
        }
    }

    /// Checks that the target can accept documents: the directory must exist, be a
    /// directory, and allow a file to be created in it. The check creates and removes a
    /// uniquely named temporary file, so existing files are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`EpsError::OutputTarget`] describing the first failed check.
    pub fn validate(&self) -> EpsResult<()> {
        let Some(dir) = self.directory() else {
            return Ok(());
        };
        let target_error = |reason: String| EpsError::OutputTarget {
            path: dir.to_path_buf(),
            reason,
        };

        let metadata =
            fs::metadata(dir).map_err(|e| target_error(format!("cannot be accessed: {e}")))?;
        if !metadata.is_dir() {
            return Err(target_error("is not a directory".into()));
        }

        let check = tempfile::Builder::new()
            .prefix(OUTPUT_WRITE_CHECK_PREFIX)
            .tempfile_in(dir)
            .map_err(|e| target_error(format!("is not writable: {e}")))?;
        check
            .close()
            .map_err(|e| target_error(format!("write-check file cannot be removed: {e}")))
    }

    /// A sink writing to this target.
    pub fn open_sink(&self) -> Box<dyn DocumentSink> {
        match self.directory() {
            Some(dir) => Box::new(DirectorySink::new(dir)),
            None => Box::new(StreamSink::new(io::stdout())),
        }
    }
}

/// Destination for rendered documents.
pub trait DocumentSink {
    /// Persists one rendered document.
    ///
    /// # Errors
    ///
    /// Returns [`EpsError::OutputWrite`] if the document cannot be written.
    fn write_document(&mut self, id: &str, format: Format, document: &str) -> EpsResult<()>;
}

/// Writes each document to `<dir>/<id>.<ext>`.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn document_path(&self, id: &str, format: Format) -> PathBuf {
        self.dir.join(format!("{id}.{}", format.extension()))
    }
}

impl DocumentSink for DirectorySink {
    fn write_document(&mut self, id: &str, format: Format, document: &str) -> EpsResult<()> {
        let path = self.document_path(id, format);
        if id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(EpsError::OutputWrite {
                path,
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "prescription ID is not a valid file name",
                ),
            });
        }
        fs::write(&path, document).map_err(|source| EpsError::OutputWrite {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(id, path = %path.display(), "wrote document");
        Ok(())
    }
}

/// Streams documents as `<id>\n<document>\n`.
#[derive(Debug)]
pub struct StreamSink<W: Write> {
    writer: W,
}

impl<W: Write> StreamSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DocumentSink for StreamSink<W> {
    fn write_document(&mut self, id: &str, _format: Format, document: &str) -> EpsResult<()> {
        let write = |w: &mut W| -> io::Result<()> {
            writeln!(w, "{id}")?;
            w.write_all(document.as_bytes())?;
            writeln!(w)?;
            w.flush()
        };
        write(&mut self.writer).map_err(|source| EpsError::OutputWrite {
            path: PathBuf::from("-"),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn from_arg() {
        assert_eq!(OutputTarget::from_arg(None), OutputTarget::CurrentDirectory);
        assert_eq!(OutputTarget::from_arg(Some("-")), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::from_arg(Some("out")),
            OutputTarget::Directory(PathBuf::from("out"))
        );
    }

    #[test]
    fn validate_accepts_writable_directory_and_leaves_it_unchanged() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join(OUTPUT_WRITE_CHECK_PREFIX);
        fs::write(&existing, "keep me").unwrap();

        let target = OutputTarget::Directory(dir.path().to_path_buf());
        target.validate().unwrap();

        assert_eq!(fs::read_to_string(&existing).unwrap(), "keep me");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
        assert!(OutputTarget::Stdout.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_and_non_directory_targets() {
        let dir = TempDir::new().unwrap();
        let missing = OutputTarget::Directory(dir.path().join("absent"));
        assert!(matches!(
            missing.validate(),
            Err(EpsError::OutputTarget { .. })
        ));

        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        match OutputTarget::Directory(file.clone()).validate() {
            Err(EpsError::OutputTarget { path, reason }) => {
                assert_eq!(path, file);
                assert_eq!(reason, "is not a directory");
            }
            other => panic!("expected OutputTarget error, got {other:?}"),
        }
    }

    #[test]
    fn directory_sink_names_files_by_id_and_format() {
        let dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        sink.write_document("RX1", Format::Json, "{}").unwrap();
        sink.write_document("RX1", Format::Xml, "<Bundle/>")
            .unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("RX1.json")).unwrap(),
            "{}"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("RX1.xml")).unwrap(),
            "<Bundle/>"
        );
    }

    #[test]
    fn directory_sink_rejects_path_like_ids() {
        let dir = TempDir::new().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        assert!(matches!(
            sink.write_document("../escape", Format::Json, "{}"),
            Err(EpsError::OutputWrite { .. })
        ));
    }

    #[test]
    fn stream_sink_writes_id_then_document() {
        let mut sink = StreamSink::new(Vec::new());
        sink.write_document("RX1", Format::Json, "{\n}").unwrap();
        sink.write_document("RX2", Format::Json, "{}").unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "RX1\n{\n}\nRX2\n{}\n");
    }
}
