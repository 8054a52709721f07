pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// A result object split by shape: scalar fields, per-point series
/// (arrays of scalars) and per-interval records (arrays of objects).
pub(crate) struct Sections<'a> {
    pub scalars: Vec<(&'a str, &'a Value)>,
    pub series: Vec<(&'a str, &'a [Value])>,
    pub records: Vec<(&'a str, &'a [Value])>,
}

pub(crate) fn split_sections(map: &Map<String, Value>) -> Sections<'_> {
    let mut sections = Sections {
        scalars: Vec::new(),
        series: Vec::new(),
        records: Vec::new(),
    };
    for (key, val) in map {
        match val {
            Value::Array(items) if items.iter().any(Value::is_object) => {
                sections.records.push((key.as_str(), items.as_slice()))
            }
            Value::Array(items) => sections.series.push((key.as_str(), items.as_slice())),
            other => sections.scalars.push((key.as_str(), other)),
        }
    }
    sections
}

/// Column headers and rows for a set of series; shorter series are padded.
pub(crate) fn series_rows(series: &[(&str, &[Value])]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = vec!["index".to_string()];
    headers.extend(series.iter().map(|(k, _)| k.to_string()));
    let len = series.iter().map(|(_, s)| s.len()).max().unwrap_or(0);
    let rows = (0..len)
        .map(|i| {
            let mut row = vec![i.to_string()];
            row.extend(
                series
                    .iter()
                    .map(|(_, s)| s.get(i).map(cell).unwrap_or_default()),
            );
            row
        })
        .collect();
    (headers, rows)
}

/// Column headers and rows for an array of objects, keyed by the first object.
pub(crate) fn record_rows(records: &[Value]) -> (Vec<String>, Vec<Vec<String>>) {
    let headers: Vec<String> = match records.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => return (Vec::new(), Vec::new()),
    };
    let rows = records
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default())
                .collect()
        })
        .collect();
    (headers, rows)
}

pub(crate) fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
