use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::WebDriverResult;

/// Deserialize a JSON value into the requested type.
pub fn convert_json<T>(value: &Value) -> WebDriverResult<T>
where
    T: DeserializeOwned,
{
    let s: T = serde_json::from_value(value.clone())?;
    Ok(s)
}

/// Read a JSON value as a string, converting numbers and booleans.
///
/// Script results often carry labels or values as numbers, so these are
/// rendered rather than rejected. `null` becomes `None`.
pub fn json_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        v => Some(v.to_string()),
    }
}

/// Read a JSON value as a boolean, accepting `"true"`/`"false"` strings.
pub fn json_to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_i64().map(|x| x != 0).unwrap_or(false),
        _ => false,
    }
}
