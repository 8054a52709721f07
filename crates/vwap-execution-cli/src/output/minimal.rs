use serde_json::Value;

/// Headline figures, most specific first.
const HEADLINE_KEYS: [&str; 6] = [
    "cost_per_share",
    "trading_cost",
    "spread",
    "kappa",
    "vwap",
    "instruments",
];

/// Print only the headline number of a response.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result {
        let headline = HEADLINE_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|v| !v.is_null());
        if let Some(val) = headline {
            println!("{}", render(val));
            return;
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, render(val));
            return;
        }
    }
    println!("{}", render(result));
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
