use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, record_rows, series_rows, split_sections};

/// Render a response as one or more tables.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                print_sections(result);
                print_envelope(map);
            }
            _ => print_sections(map),
        },
        other => println!("{}", cell(other)),
    }
}

fn print_sections(map: &Map<String, Value>) {
    let sections = split_sections(map);

    if !sections.scalars.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in &sections.scalars {
            builder.push_record([key.to_string(), cell(val)]);
        }
        println!("{}", Table::from(builder));
    }

    if !sections.series.is_empty() {
        let (headers, rows) = series_rows(&sections.series);
        println!("\n{}", grid(headers, rows));
    }

    for (name, records) in &sections.records {
        let (headers, rows) = record_rows(records);
        if headers.is_empty() {
            continue;
        }
        println!("\n{}:", name);
        println!("{}", grid(headers, rows));
    }
}

fn grid(headers: Vec<String>, rows: Vec<Vec<String>>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row);
    }
    Table::from(builder)
}

fn print_envelope(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
