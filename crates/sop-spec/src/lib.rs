#![allow(missing_docs)]

pub mod events;
pub mod export;
pub mod filename;
pub mod notice;
pub mod record;
pub mod render;
pub mod resolve;
pub mod spec;
pub mod state;
pub mod state_schema;
pub mod validate;
pub mod visibility;

pub use events::{reset, select_option, set_other_text, set_text, toggle_checkbox};
pub use export::{DeliveryError, DocumentSink, ExportFormat, OutputDocument, export, export_to};
pub use filename::{derive_filename, sanitize_filename};
pub use notice::{NOTICE_DURATION, Notice};
pub use record::{Record, RecordEntry};
pub use render::{csv_escape, render_csv, render_text};
pub use resolve::resolve;
pub use spec::{
    FieldDescriptor, FieldKind, FormSchema, OTHER_SENTINEL, ReportLine, SchemaError, Sectioning,
};
pub use state::{FieldValue, FormState, FormStateProvider};
pub use state_schema::generate as state_schema;
pub use validate::{ValidationError, ValidationResult, validate};
pub use visibility::{VisibilityMap, resolve_other_visibility};
