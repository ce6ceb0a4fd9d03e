//! Tabular result rows and the two coercions every rendering path shares.
//!
//! A [`Record`] is one row of query output. Column order is the order the
//! server declared the columns in (`serde_json` is built with
//! `preserve_order`), and nothing here assumes two records share a column set.

pub use serde_json::Value;

/// One row of query output: column name to scalar (or nested) value.
pub type Record = serde_json::Map<String, Value>;

/// Total text form of a cell value.
///
/// Null becomes the empty string, strings pass through, numbers and booleans
/// use their literal form, and arrays/objects use their compact JSON
/// encoding. Table cells and chart labels both go through this function so
/// they always agree.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Display for Value is the compact serializer and cannot fail.
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Numeric form of a cell value, `None` where the value is not a finite number.
///
/// Numbers pass through, strings are parsed as decimals (surrounding
/// whitespace ignored), everything else has no numeric form.
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Look up `column` in `record` and coerce it with [`as_number`].
pub fn number_at(record: &Record, column: &str) -> Option<f64> {
    record.get(column).and_then(as_number)
}
