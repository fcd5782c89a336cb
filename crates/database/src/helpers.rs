use vd_types::Value;

/// Quote a string as a SQL literal, doubling embedded single quotes.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Render a cell as a SQL literal suitable for an INSERT or a WHERE clause.
pub fn render_literal(v: &Value) -> String {
    match v {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Int(i) => i.to_string(),
        // NaN/inf have no SQL literal form
        Value::Float(x) if !x.is_finite() => "NULL".to_string(),
        Value::Float(x) => x.to_string(),
        Value::Text(s) => quote_literal(s),
        Value::Date(d) => format!("DATE '{}'", d.format("%Y-%m-%d")),
    }
}
