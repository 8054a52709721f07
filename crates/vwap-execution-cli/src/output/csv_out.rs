use serde_json::{Map, Value};
use std::io;

use super::{cell, record_rows, series_rows, split_sections};

/// Write the response as CSV to stdout.
///
/// Per-interval records win over per-point series, which win over the
/// two-column field/value listing; one CSV table per invocation.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => result,
            _ => map,
        },
        other => {
            let _ = wtr.write_record([cell(other)]);
            let _ = wtr.flush();
            return;
        }
    };

    let (headers, rows) = csv_table(body);
    let _ = wtr.write_record(&headers);
    for row in rows {
        let _ = wtr.write_record(&row);
    }
    let _ = wtr.flush();
}

fn csv_table(map: &Map<String, Value>) -> (Vec<String>, Vec<Vec<String>>) {
    let sections = split_sections(map);
    if let Some((_, records)) = sections.records.first() {
        return record_rows(records);
    }
    if !sections.series.is_empty() {
        return series_rows(&sections.series);
    }
    let rows = sections
        .scalars
        .iter()
        .map(|(key, val)| vec![key.to_string(), cell(val)])
        .collect();
    (vec!["field".to_string(), "value".to_string()], rows)
}
