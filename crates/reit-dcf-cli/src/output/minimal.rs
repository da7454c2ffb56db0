use serde_json::Value;

use super::format_value;

/// Headline figures, most important first.
const PRIORITY_KEYS: [&str; 5] = ["fairValue", "irr", "rate", "nav", "baseline"];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

fn minimal_answer(value: &Value) -> String {
    let result = value.get("result").unwrap_or(value);
    let scopes = [result.get("summary"), Some(result)];

    for scope in scopes.into_iter().flatten() {
        for key in PRIORITY_KEYS {
            if let Some(val) = scope.get(key).filter(|v| !v.is_null()) {
                return format_value(val);
            }
        }
    }

    if let Some(Value::Array(rows)) = value.get("results") {
        if let Some(last) = rows.last() {
            return serde_json::to_string(last).unwrap_or_default();
        }
    }

    format_value(result)
}
