use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten_scalars, format_value, primary_rows};

/// Format output as tables: headline fields first, then the row set.
pub fn print_table(value: &Value) {
    if let Some(Value::Object(result)) = value.get("result") {
        let mut fields = Vec::new();
        flatten_scalars("", result, &mut fields);
        if !fields.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, val) in fields {
                builder.push_record([key, val]);
            }
            println!("{}", Table::from(builder));
        }
    }

    match primary_rows(value) {
        Some(rows) => print_rows(rows),
        None if value.get("result").is_none() => println!("{}", format_value(value)),
        None => {}
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(no rows)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default()),
            );
        }
    }
    println!("\n{}", Table::from(builder));
}
