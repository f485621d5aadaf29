use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One line of the text report. Labels refer to record entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportLine {
    /// `Label: value`
    Field { label: String },
    /// `Label: <amount> <currency>`
    Currency {
        label: String,
        amount: String,
        currency: String,
    },
    /// `Label: before → after`, dropped when both sides are blank.
    MetricPair {
        label: String,
        before: String,
        after: String,
    },
}

impl ReportLine {
    pub fn field(label: impl Into<String>) -> Self {
        ReportLine::Field {
            label: label.into(),
        }
    }

    /// Record labels this line reads.
    pub fn referenced_labels(&self) -> Vec<&str> {
        match self {
            ReportLine::Field { label } => vec![label.as_str()],
            ReportLine::Currency {
                amount, currency, ..
            } => vec![amount.as_str(), currency.as_str()],
            ReportLine::MetricPair { before, after, .. } => vec![before.as_str(), after.as_str()],
        }
    }
}

/// A titled group of report lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub lines: Vec<ReportLine>,
}

/// Layout of the text report: a title plus ordered sections.
#[derive(Debug, Clone, PartialEq)]
pub struct Sectioning {
    pub title: String,
    pub sections: Vec<ReportSection>,
}
