use csv::ReaderBuilder;
use pretty_assertions::assert_eq;
use serde_json::json;

use sop_spec::{ExportFormat, FormSchema, FormState, Record, export, render_csv, render_text};

fn fixture(name: &str) -> &'static str {
    match name {
        "acme_state" => include_str!("../tests/fixtures/acme_state.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn read_csv(content: &str) -> (Vec<String>, Vec<(String, String)>) {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .expect("csv headers")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|row| {
            let row = row.expect("csv row");
            assert_eq!(row.len(), 2);
            (row[0].to_string(), row[1].to_string())
        })
        .collect();
    (headers, rows)
}

fn entry_pairs(record: &Record) -> Vec<(String, String)> {
    record
        .entries()
        .iter()
        .map(|entry| (entry.label.clone(), entry.value.clone()))
        .collect()
}

fn acme() -> (FormSchema, FormState) {
    let schema = FormSchema::builtin().expect("builtin schema");
    let state = FormState::from_json(fixture("acme_state")).expect("deserialize state");
    (schema, state)
}

#[test]
fn record_resolves_other_and_multi_select_values() {
    let (schema, state) = acme();
    let record = Record::build(&schema, &state);

    assert_eq!(record.len(), schema.fields().count());
    assert_eq!(record.get("CEO"), Some("Jane \"JD\" Doe"));
    assert_eq!(record.get("Revenue currency"), Some("Other: CHF"));
    assert_eq!(record.get("Market cap currency"), Some("USD"));
    assert_eq!(record.get("Primary solution domain"), Some("Other"));
    assert_eq!(
        record.get("Secondary domains"),
        Some("Data & Analytics, Automation")
    );
    assert_eq!(
        record.get("Primary users"),
        Some("Operations teams, Other: Claims adjusters")
    );
    assert_eq!(
        record.get("Trigger (why now)"),
        Some("Regulatory pressure, Legacy system end-of-life")
    );
    assert_eq!(record.get("Cost of pain"), Some(""));
    assert_eq!(record.get("Geographic HQ in _ countries"), Some(""));
}

#[test]
fn csv_export_quotes_and_leaves_blanks_empty() {
    let (schema, state) = acme();
    let csv = render_csv(&Record::build(&schema, &state));
    let (headers, rows) = read_csv(&csv);

    assert_eq!(headers, vec!["Field", "Value"]);
    assert!(csv.starts_with("Field,Value\nCompany/Project name,Acme Corp / Claims Modernisation\n"));
    assert!(csv.contains("\nCEO,\"Jane \"\"JD\"\" Doe\"\n"));
    assert_eq!(
        rows[1],
        ("Headquartered in".to_string(), "Zürich, Switzerland".to_string())
    );
    assert_eq!(rows[2], ("Chairman".to_string(), String::new()));
    assert!(rows.contains(&(
        "Recent executive changes".to_string(),
        "New CIO\nappointed in Q2".to_string()
    )));
    assert!(!csv.contains("N/A"));
    assert!(!csv.ends_with('\n'));
}

#[test]
fn csv_round_trips_through_a_csv_reader() {
    let schema = FormSchema::builtin().expect("builtin schema");
    let state = FormState::from_value(json!({
        "companyProjectName": "a,b",
        "ceo": "He said \"hi\", ok\r\nline2",
        "chairman": "carriage\rreturn",
        "hqIn": "\"quoted\"",
        "trigger": ["Regulatory pressure", "Other"],
        "triggerOther": "audit, \"urgent\""
    }))
    .expect("state");
    let record = Record::build(&schema, &state);
    let csv = render_csv(&record);

    let (headers, rows) = read_csv(&csv);
    assert_eq!(headers, vec!["Field", "Value"]);
    assert_eq!(rows, entry_pairs(&record));
    assert_eq!(rows.len(), 42);

    let (_, with_trailing_newline) = read_csv(&format!("{csv}\n"));
    assert_eq!(with_trailing_newline, rows);
}

#[test]
fn null_and_numeric_state_values_still_export() {
    let schema = FormSchema::builtin().expect("builtin schema");
    let state =
        FormState::from_json(r#"{"ceo": null, "revenueValue": 42}"#).expect("lenient state");
    let document = export(&schema, &state, ExportFormat::Csv);

    let rows: Vec<&str> = document.content().lines().collect();
    assert!(rows.contains(&"CEO,"));
    assert!(rows.contains(&"Revenue value,42"));
    assert_eq!(document.filename(), "SOP_Unknown.csv");
}

#[test]
fn csv_lists_every_label_once_in_schema_order() {
    let (schema, _) = acme();
    let csv = render_csv(&Record::build(&schema, &FormState::new()));
    let (_, rows) = read_csv(&csv);
    let labels: Vec<String> = rows.into_iter().map(|(label, _)| label).collect();
    let expected: Vec<String> = schema.fields().map(|f| f.label.clone()).collect();
    assert_eq!(labels, expected);
}

#[test]
fn text_report_combines_currency_and_metric_lines() {
    let (schema, state) = acme();
    let report = render_text(&Record::build(&schema, &state), &schema.sectioning());
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines[0], "Standard Operating Procedure (SOP) Intake");
    assert_eq!(lines[1], "=".repeat(80));
    assert_eq!(lines[3], "COMPANY / PROJECT");
    assert_eq!(lines[4], "-".repeat(80));
    assert_eq!(lines[5], "Company/Project name: Acme Corp / Claims Modernisation");

    assert!(lines.contains(&"Chairman: N/A"));
    assert!(lines.contains(&"Revenue: 4.2B Other: CHF"));
    assert!(lines.contains(&"Market cap: N/A USD"));
    assert!(lines.contains(&"Metric 1: 14 days → 2 days"));
    assert!(!report.contains("Metric 2"));
    assert!(!report.contains("Revenue value"));
    assert!(lines.contains(&"BUSINESS IMPACT"));
    assert!(lines.contains(&"STRATEGY + SALES"));
}

#[test]
fn text_report_for_empty_form_uses_placeholders() {
    let schema = FormSchema::builtin().expect("builtin schema");
    let report = render_text(
        &Record::build(&schema, &FormState::new()),
        &schema.sectioning(),
    );
    assert!(report.contains("CEO: N/A"));
    assert!(report.contains("Revenue: N/A N/A"));
    assert!(!report.contains("Metric 1"));
    assert!(!report.contains("Metric 2"));
}

#[test]
fn metric_pair_with_only_an_after_value_is_reported() {
    let schema = FormSchema::builtin().expect("builtin schema");
    let mut state = FormState::new();
    state.set_value("metric1Before", "  ");
    state.set_value("metric1After", "10");
    let report = render_text(&Record::build(&schema, &state), &schema.sectioning());
    assert!(report.lines().any(|line| line == "Metric 1: N/A → 10"));
    assert!(!report.contains("Metric 2"));
}

#[test]
fn export_documents_share_the_filename_stem() {
    let (schema, state) = acme();
    let csv = export(&schema, &state, ExportFormat::Csv);
    let text = export(&schema, &state, ExportFormat::Text);
    assert_eq!(csv.filename(), "SOP_Acme_Corp_-_Claims_Modernisation.csv");
    assert_eq!(text.filename(), "SOP_Acme_Corp_-_Claims_Modernisation.txt");
    assert_eq!(text.mime_type(), "text/plain;charset=utf-8;");
}
