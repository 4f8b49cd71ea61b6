use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
///
/// The computation envelope gets special treatment: the result section is
/// rendered first, then warnings and methodology. Schedule and scenario
/// results render their row arrays as proper tables.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value, envelope: &serde_json::Map<String, Value>) {
    match result {
        // Amortization output: entries array plus totals
        Value::Object(map) if map.contains_key("entries") => {
            if let Some(Value::Array(entries)) = map.get("entries") {
                print_array_table(entries);
            }
            if let Some(totals) = map.get("totals") {
                println!("\nTotals:");
                print_flat_object(totals);
            }
        }
        // Scenario output: base metrics plus one row block per scenario
        Value::Object(map) if map.contains_key("base") => {
            if let Some(base) = map.get("base") {
                println!("Base case:");
                print_flat_object(base);
            }
            if let Some(Value::Array(results)) = map.get("results") {
                for r in results {
                    if let Value::Object(scenario) = r {
                        let name = scenario
                            .get("name")
                            .and_then(Value::as_str)
                            .unwrap_or("scenario");
                        println!("\nScenario '{}':", name);
                        if let Some(metrics) = scenario.get("metrics") {
                            print_flat_object(metrics);
                        }
                        if let Some(dev) = scenario.get("cashflow_deviation") {
                            println!("  cashflow deviation: {}", format_value(dev));
                        }
                    }
                }
            }
        }
        Value::Object(_) => print_flat_object(result),
        _ => print_flat_object(&Value::Object(envelope.clone())),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // A null ratio is an undefined metric (e.g. payback period)
        Value::Null => "undefined".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
