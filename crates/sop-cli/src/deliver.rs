use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sop_spec::{DeliveryError, DocumentSink, OutputDocument};
use tracing::debug;

/// Saves documents into a directory under their suggested filename.
pub struct DirectorySink {
    root: PathBuf,
    overwrite: bool,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            root: root.into(),
            overwrite,
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DocumentSink for DirectorySink {
    fn deliver(&mut self, document: &OutputDocument) -> Result<(), DeliveryError> {
        let io_error = |source: io::Error| DeliveryError::Io {
            filename: document.filename().to_string(),
            source,
        };

        fs::create_dir_all(&self.root).map_err(io_error)?;
        let path = self.root.join(document.filename());
        if path.exists() && !self.overwrite {
            return Err(DeliveryError::Unavailable(format!(
                "{} already exists; rerun with --force to overwrite",
                path.display()
            )));
        }

        write_document(&path, document).map_err(io_error)?;
        debug!(path = %path.display(), mime = document.mime_type(), "document written");
        self.written.push(path);
        Ok(())
    }
}

/// Streams the document content to standard output.
pub struct StdoutSink;

impl DocumentSink for StdoutSink {
    fn deliver(&mut self, document: &OutputDocument) -> Result<(), DeliveryError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", document.content())
            .and_then(|_| stdout.flush())
            .map_err(|source| DeliveryError::Io {
                filename: document.filename().to_string(),
                source,
            })
    }
}

fn write_document(path: &Path, document: &OutputDocument) -> io::Result<()> {
    fs::write(path, document.content())
}
