use crate::record::Record;
use crate::spec::{ReportLine, Sectioning};

/// Header row of the CSV export.
pub const CSV_HEADER: &str = "Field,Value";

/// Placeholder the text report prints for blank values.
pub const BLANK_PLACEHOLDER: &str = "N/A";

/// Width of the report's rule lines.
pub const RULE_WIDTH: usize = 80;

/// Separator between the two sides of a metric pair.
pub const METRIC_ARROW: &str = " → ";

/// Quotes a CSV cell when needed: inner quotes are doubled and the cell is
/// wrapped if it holds a comma, a quote or a line break.
pub fn csv_escape(value: &str) -> String {
    let escaped = value.replace('"', "\"\"");
    if escaped.contains([',', '"', '\n', '\r']) {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

pub fn csv_row(label: &str, value: &str) -> String {
    format!("{},{}", csv_escape(label), csv_escape(value))
}

/// Renders the record as a two-column CSV document. Blank values stay empty.
pub fn render_csv(record: &Record) -> String {
    let mut rows = Vec::with_capacity(record.len() + 1);
    rows.push(CSV_HEADER.to_string());
    rows.extend(
        record
            .entries()
            .iter()
            .map(|entry| csv_row(&entry.label, &entry.value)),
    );
    rows.join("\n")
}

/// Renders the record as a sectioned plain-text report. Blank values print
/// as `N/A`.
pub fn render_text(record: &Record, sectioning: &Sectioning) -> String {
    let mut lines = Vec::new();
    lines.push(sectioning.title.clone());
    lines.push("=".repeat(RULE_WIDTH));

    for section in &sectioning.sections {
        lines.push(String::new());
        lines.push(section.title.to_uppercase());
        lines.push("-".repeat(RULE_WIDTH));
        lines.extend(
            section
                .lines
                .iter()
                .filter_map(|line| render_line(record, line)),
        );
    }

    lines.join("\n")
}

fn render_line(record: &Record, line: &ReportLine) -> Option<String> {
    match line {
        ReportLine::Field { label } => Some(format!(
            "{}: {}",
            label,
            or_placeholder(record.value_or_blank(label))
        )),
        ReportLine::Currency {
            label,
            amount,
            currency,
        } => Some(format!(
            "{}: {} {}",
            label,
            or_placeholder(record.value_or_blank(amount)),
            or_placeholder(record.value_or_blank(currency))
        )),
        ReportLine::MetricPair {
            label,
            before,
            after,
        } => {
            let before = record.value_or_blank(before);
            let after = record.value_or_blank(after);
            if before.trim().is_empty() && after.trim().is_empty() {
                return None;
            }
            Some(format!(
                "{}: {}{}{}",
                label,
                or_placeholder(before),
                METRIC_ARROW,
                or_placeholder(after)
            ))
        }
    }
}

fn or_placeholder(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        BLANK_PLACEHOLDER
    } else {
        trimmed
    }
}
