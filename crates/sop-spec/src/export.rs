use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::filename::derive_filename;
use crate::notice::Notice;
use crate::record::Record;
use crate::render::{render_csv, render_text};
use crate::spec::FormSchema;
use crate::state::FormStateProvider;

/// Output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8;",
            ExportFormat::Text => "text/plain;charset=utf-8;",
        }
    }
}

/// A finished export: content plus suggested filename and mime type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDocument {
    content: String,
    filename: String,
    mime_type: String,
}

impl OutputDocument {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

/// Builds the export document for the current state.
pub fn export<S>(schema: &FormSchema, state: &S, format: ExportFormat) -> OutputDocument
where
    S: FormStateProvider + ?Sized,
{
    let record = Record::build(schema, state);
    let content = match format {
        ExportFormat::Csv => render_csv(&record),
        ExportFormat::Text => render_text(&record, &schema.sectioning()),
    };
    let name = state.value(&schema.filename_field).unwrap_or_default();
    let filename = derive_filename(name, format.extension());
    debug!(%filename, fields = record.len(), "built export document");

    OutputDocument {
        content,
        filename,
        mime_type: format.mime_type().to_string(),
    }
}

/// Failures of the file-delivery collaborator.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to deliver {filename}: {source}")]
    Io {
        filename: String,
        #[source]
        source: io::Error,
    },
    #[error("delivery target unavailable: {0}")]
    Unavailable(String),
}

/// Receives finished documents and saves them somewhere.
pub trait DocumentSink {
    fn deliver(&mut self, document: &OutputDocument) -> Result<(), DeliveryError>;
}

/// Exports and hands the document to the sink.
pub fn export_to<S, K>(
    schema: &FormSchema,
    state: &S,
    format: ExportFormat,
    sink: &mut K,
) -> Result<Notice, DeliveryError>
where
    S: FormStateProvider + ?Sized,
    K: DocumentSink + ?Sized,
{
    let document = export(schema, state, format);
    sink.deliver(&document)?;
    Ok(Notice::Downloaded {
        filename: document.filename,
    })
}
