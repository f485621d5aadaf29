pub mod field;
pub mod form;
pub mod report;

pub use field::{FieldDescriptor, FieldKind, OTHER_SENTINEL};
pub use form::{FormSchema, SchemaError, SectionSpec};
pub use report::{ReportLine, ReportSection, Sectioning};
