pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// The primary row set of a command's output, if it has one: sweep results,
/// schedules, or a valuation's yearly cash flows.
pub(crate) fn primary_rows(value: &Value) -> Option<&Vec<Value>> {
    let candidates = [
        value.pointer("/results"),
        value.pointer("/result/results"),
        value.pointer("/result/valuation/cashFlows"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_array())
}

/// Flatten nested objects into `parent.child` keys, skipping row arrays.
pub(crate) fn flatten_scalars(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_scalars(&name, inner, out),
            Value::Array(items) if items.iter().any(Value::is_object) => {}
            _ => out.push((name, format_value(val))),
        }
    }
}

/// Non-finite engine figures arrive here as JSON null.
pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "n/a".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_rows_prefers_sweep_results() {
        let value = json!({"result": {"results": [{"value": 0.07}]}});
        assert_eq!(primary_rows(&value).map(Vec::len), Some(1));
    }

    #[test]
    fn test_primary_rows_cash_flows() {
        let value = json!({"result": {"valuation": {"cashFlows": [{"year": 1}, {"year": 2}]}}});
        assert_eq!(primary_rows(&value).map(Vec::len), Some(2));
    }

    #[test]
    fn test_flatten_skips_row_arrays() {
        let value = json!({
            "summary": {"irr": "0.08", "nav": null},
            "cashFlows": [{"year": 1}],
            "irrConverged": true
        });
        let mut out = Vec::new();
        flatten_scalars("", value.as_object().unwrap(), &mut out);
        assert!(out.contains(&("summary.irr".to_string(), "0.08".to_string())));
        assert!(out.contains(&("summary.nav".to_string(), "n/a".to_string())));
        assert!(out.iter().all(|(k, _)| k != "cashFlows"));
    }
}
