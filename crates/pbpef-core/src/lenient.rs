//! Field decoders for optional artifact scalars.
//!
//! Artifacts come from many producer versions. An optional field of an
//! unexpected type decodes to `None` (or, for text, its scalar rendering)
//! instead of failing the whole document.

use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn raw<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Option::<Value>::deserialize(d)
}

/// Any `T` that the value happens to fit; `None` otherwise.
pub fn any<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(raw(d)?.and_then(|v| serde_json::from_value(v).ok()))
}

/// Strings as-is; numbers and booleans rendered as text.
pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(raw(d)?.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(_) | Value::Bool(_) => Some(v.to_string()),
        _ => None,
    }))
}

/// Seconds as a number, a numeric string, or an RFC 3339 instant (epoch seconds).
pub fn instant<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(raw(d)?.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<f64>().ok().or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.timestamp_micros() as f64 / 1_000_000.0)
            })
        }
        _ => None,
    })
    .filter(|f| f.is_finite()))
}

/// Whole numbers, including integral floats (`1.0`) and numeric strings.
pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(raw(d)?.and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "super::text")]
        label: Option<String>,
        #[serde(default, deserialize_with = "super::instant")]
        at: Option<f64>,
        #[serde(default, deserialize_with = "super::count")]
        n: Option<i64>,
        #[serde(default, deserialize_with = "super::any")]
        flag: Option<bool>,
    }

    fn decode(v: serde_json::Value) -> Fields {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn text_renders_scalars_and_drops_containers() {
        assert_eq!(decode(json!({"label": "qa"})).label.as_deref(), Some("qa"));
        assert_eq!(decode(json!({"label": 7})).label.as_deref(), Some("7"));
        assert_eq!(decode(json!({"label": true})).label.as_deref(), Some("true"));
        assert_eq!(decode(json!({"label": {"x": 1}})).label, None);
        assert_eq!(decode(json!({"label": null})).label, None);
        assert_eq!(decode(json!({})).label, None);
    }

    #[test]
    fn instant_accepts_seconds_and_rfc3339() {
        assert_eq!(decode(json!({"at": 2})).at, Some(2.0));
        assert_eq!(decode(json!({"at": "1.5"})).at, Some(1.5));
        assert_eq!(
            decode(json!({"at": "2024-01-15T09:30:00Z"})).at,
            Some(1_705_311_000.0)
        );
        assert_eq!(decode(json!({"at": "soon"})).at, None);
        assert_eq!(decode(json!({"at": "NaN"})).at, None);
        assert_eq!(decode(json!({"at": [1]})).at, None);
    }

    #[test]
    fn count_takes_integral_values_only() {
        assert_eq!(decode(json!({"n": 3})).n, Some(3));
        assert_eq!(decode(json!({"n": 1.0})).n, Some(1));
        assert_eq!(decode(json!({"n": "4"})).n, Some(4));
        assert_eq!(decode(json!({"n": 1.5})).n, None);
        assert_eq!(decode(json!({"n": false})).n, None);
    }

    #[test]
    fn any_falls_back_to_none_on_mismatch() {
        assert_eq!(decode(json!({"flag": true})).flag, Some(true));
        assert_eq!(decode(json!({"flag": "yes"})).flag, None);
    }
}
