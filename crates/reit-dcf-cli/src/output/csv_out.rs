use serde_json::Value;
use std::io;

use super::{flatten_scalars, format_value, primary_rows};

/// Write output as CSV to stdout: the row set if there is one, otherwise
/// `field,value` pairs for the result.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(rows) = primary_rows(value) {
        write_rows(&mut wtr, rows);
    } else {
        let source = value.get("result").unwrap_or(value);
        let _ = wtr.write_record(["field", "value"]);
        if let Value::Object(map) = source {
            let mut fields = Vec::new();
            flatten_scalars("", map, &mut fields);
            for (key, val) in fields {
                let _ = wtr.write_record([key, val]);
            }
        } else {
            let _ = wtr.write_record(["value", &format_value(source)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);

    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(csv_cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}

/// Empty cells for nulls so spreadsheets read them as blanks.
fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => format_value(other),
    }
}
