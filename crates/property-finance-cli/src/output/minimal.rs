use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Priority list of key output fields
    let priority_keys = [
        "monthly_net_cashflow",
        "cash_on_cash",
        "annual_rate",
        "break_even_rent",
        "payback_years",
    ];

    if let Value::Object(map) = result_obj {
        // Schedule output: the first month's payment is the headline number
        if let Some(Value::Array(entries)) = map.get("entries") {
            if let Some(Value::Object(first)) = entries.first() {
                if let Some(payment) = first.get("payment") {
                    println!("{}", format_minimal(payment));
                    return;
                }
            }
        }

        // Scenario output: the base case cashflow
        if let Some(Value::Object(base)) = map.get("base") {
            if let Some(cf) = base.get("monthly_net_cashflow") {
                println!("{}", format_minimal(cf));
                return;
            }
        }

        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "undefined".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_minimal_null_is_undefined() {
        assert_eq!(format_minimal(&Value::Null), "undefined");
    }

    #[test]
    fn test_format_minimal_string_passthrough() {
        assert_eq!(format_minimal(&json!("490.00")), "490.00");
    }
}
