//! Forgiving decoders for half-filled sheet documents.
//!
//! Sheets are edited field by field, so any numeric field may transiently
//! hold an empty string, `null`, or text. Each of these decoders accepts any
//! JSON value and falls back to zero (or the field's default) rather than
//! failing the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::trace;
use serde_json::Value;

/// Coerce a JSON value to an integer, truncating fractions.
pub(crate) fn coerce_int(value: &Value) -> i32 {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(v) => v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            None => n.as_f64().map(float_to_int).unwrap_or(0),
        },
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(float_to_int))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// Coerce a JSON value to a finite float.
pub(crate) fn coerce_float(value: &Value) -> f64 {
    let f = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if f.is_finite() { f } else { 0.0 }
}

/// Coerce a JSON value to text. Numbers and booleans are rendered; anything
/// else becomes empty.
pub(crate) fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Coerce a JSON value to a flag. Unrecognised values yield `default`.
pub(crate) fn coerce_bool(value: &Value, default: bool) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" => false,
            _ => default,
        },
        _ => default,
    }
}

fn float_to_int(f: f64) -> i32 {
    // `as` saturates and maps NaN to 0.
    f.trunc() as i32
}

pub(crate) fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    Value::deserialize(d).map(|v| coerce_int(&v))
}

pub(crate) fn float<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Value::deserialize(d).map(|v| coerce_float(&v))
}

pub(crate) fn quantity<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Value::deserialize(d).map(|v| coerce_int(&v).max(0) as u32)
}

pub(crate) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Value::deserialize(d).map(|v| coerce_string(&v))
}

pub(crate) fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Value::deserialize(d).map(|v| coerce_bool(&v, false))
}

/// Decode a nested object, falling back to the default when it is `null`
/// or has the wrong shape.
pub(crate) fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(d)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|err| {
        trace!(%err, "replaced malformed value with default");
        T::default()
    }))
}

/// Decode a list, dropping elements that do not decode. Anything other than
/// an array yields an empty list.
pub(crate) fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(d)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                trace!(%err, "dropped malformed list element");
                None
            }
        })
        .collect())
}

pub(crate) fn default_quantity() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ints() {
        assert_eq!(coerce_int(&json!(12)), 12);
        assert_eq!(coerce_int(&json!(-3)), -3);
        assert_eq!(coerce_int(&json!(7.9)), 7);
        assert_eq!(coerce_int(&json!("14")), 14);
        assert_eq!(coerce_int(&json!(" 5 ")), 5);
        assert_eq!(coerce_int(&json!("2.5")), 2);
        assert_eq!(coerce_int(&json!("")), 0);
        assert_eq!(coerce_int(&json!("abc")), 0);
        assert_eq!(coerce_int(&json!(null)), 0);
        assert_eq!(coerce_int(&json!([1])), 0);
        assert_eq!(coerce_int(&json!(1e12)), i32::MAX);
    }

    #[test]
    fn floats() {
        assert!((coerce_float(&json!(0.5)) - 0.5).abs() < f64::EPSILON);
        assert!((coerce_float(&json!("1.5")) - 1.5).abs() < f64::EPSILON);
        assert!(coerce_float(&json!("NaN")).abs() < f64::EPSILON);
        assert!(coerce_float(&json!(null)).abs() < f64::EPSILON);
    }

    #[test]
    fn strings() {
        assert_eq!(coerce_string(&json!("1d8")), "1d8");
        assert_eq!(coerce_string(&json!(3)), "3");
        assert_eq!(coerce_string(&json!(null)), "");
    }

    #[test]
    fn bools() {
        assert!(coerce_bool(&json!(true), false));
        assert!(coerce_bool(&json!("yes"), false));
        assert!(!coerce_bool(&json!(0), true));
        assert!(coerce_bool(&json!(null), true));
        assert!(!coerce_bool(&json!("maybe"), false));
    }

    #[derive(Debug, Default, PartialEq, serde::Deserialize)]
    struct Pair {
        left: i32,
        right: i32,
    }

    #[derive(Debug, serde::Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "or_default")]
        pair: Pair,
        #[serde(deserialize_with = "list")]
        pairs: Vec<Pair>,
    }

    #[test]
    fn malformed_nested_values_fall_back() {
        let holder: Holder = serde_json::from_value(json!({
            "pair": "",
            "pairs": [null, {"left": 1, "right": 2}, "x"],
        }))
        .unwrap();
        assert_eq!(holder.pair, Pair::default());
        assert_eq!(holder.pairs, vec![Pair { left: 1, right: 2 }]);

        let holder: Holder =
            serde_json::from_value(json!({"pair": null, "pairs": {"left": 1}})).unwrap();
        assert_eq!(holder.pair, Pair::default());
        assert!(holder.pairs.is_empty());
    }
}
