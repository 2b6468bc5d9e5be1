//! Forgiving field decoders for hand-maintained facility data.
//!
//! Every decoder reads the raw JSON value and maps anything it cannot make
//! sense of to "unknown" (`None` / empty) instead of failing the record.

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Trimmed string; empty strings and non-scalar values become `None`.
pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(&JsonValue::deserialize(d)?))
}

/// Trimmed string, empty when absent.
pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(scalar_text(&JsonValue::deserialize(d)?).unwrap_or_default())
}

/// Finite number from a JSON number or a numeric string.
pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(number(&JsonValue::deserialize(d)?))
}

/// Non-negative whole bed count.
pub fn opt_bed_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(number(&JsonValue::deserialize(d)?).and_then(|f| {
        if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
            Some(f as u32)
        } else {
            None
        }
    }))
}

/// Boolean from `true`/`false`, numbers, or yes/no style strings.
pub fn opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Ok(match JsonValue::deserialize(d)? {
        JsonValue::Bool(b) => Some(b),
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0),
        JsonValue::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            if s.is_empty() {
                None
            } else {
                Some(matches!(
                    s.as_str(),
                    "true" | "yes" | "y" | "1" | "24" | "24/7" | "24 7" | "247"
                ))
            }
        }
        _ => None,
    })
}

/// List of strings from an array, or a single string split on `,` `;` `/`.
pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match JsonValue::deserialize(d)? {
        JsonValue::Array(items) => items.iter().filter_map(scalar_text).collect(),
        JsonValue::String(s) => split_list(&s),
        _ => Vec::new(),
    })
}

/// Split a delimited cell such as `"ER; Maternity"` into trimmed parts.
pub fn split_list(s: &str) -> Vec<String> {
    s.split([',', ';', '/'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn scalar_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(val: &JsonValue) -> Option<f64> {
    let f = match val {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    f.is_finite().then_some(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "opt_bed_count")]
        beds: Option<u32>,
        #[serde(default, deserialize_with = "opt_f64")]
        lat: Option<f64>,
        #[serde(default, deserialize_with = "opt_bool")]
        open: Option<bool>,
        #[serde(default, deserialize_with = "string_list")]
        services: Vec<String>,
        #[serde(default, deserialize_with = "opt_string")]
        phone: Option<String>,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn numbers_accept_strings_and_reject_garbage() {
        let p = sample(r#"{"beds": "250", "lat": "-17.1"}"#);
        assert_eq!(p.beds, Some(250));
        assert_eq!(p.lat, Some(-17.1));

        let p = sample(r#"{"beds": "unknown", "lat": "NaN"}"#);
        assert_eq!(p.beds, None);
        assert_eq!(p.lat, None);

        let p = sample(r#"{"beds": -4}"#);
        assert_eq!(p.beds, None);
    }

    #[test]
    fn service_cells_are_split() {
        let p = sample(r#"{"services": "ER; Maternity / Lab"}"#);
        assert_eq!(p.services, vec!["ER", "Maternity", "Lab"]);

        let p = sample(r#"{"services": [" ICU ", "", null, "X-Ray"]}"#);
        assert_eq!(p.services, vec!["ICU", "X-Ray"]);
    }

    #[test]
    fn open_hours_flags() {
        assert_eq!(sample(r#"{"open": "24/7"}"#).open, Some(true));
        assert_eq!(sample(r#"{"open": "no"}"#).open, Some(false));
        assert_eq!(sample(r#"{"open": null}"#).open, None);
    }

    #[test]
    fn empty_contact_is_unknown() {
        assert_eq!(sample(r#"{"phone": "  "}"#).phone, None);
        assert_eq!(sample(r#"{}"#).phone, None);
    }
}
