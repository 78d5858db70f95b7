use serde_json::Value;

/// Fields that answer each command, most specific first.
const PRIORITY_KEYS: [&str; 8] = [
    "monthly_benefit",
    "monthly_contribution",
    "monthly_payment",
    "final_balance",
    "shortfall",
    "net_worth",
    "best",
    "savings_rate",
];

/// Print just the key answer value from the output.
///
/// Looks for the well-known result fields in priority order, then falls
/// back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // analyze nests the snapshot one level down
    let result_obj = result_obj.get("snapshot").unwrap_or(result_obj);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                println!("{}", format_minimal(val));
                return;
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
        Value::Null => "null".to_string(),
        Value::Object(map) => {
            // scenario winners and defined ratios
            if let Some(param) = map.get("parameter") {
                return format_minimal(param);
            }
            if let Some(v) = map.get("value") {
                return format_minimal(v);
            }
            serde_json::to_string(value).unwrap_or_default()
        }
        Value::Array(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
