//! Deserialization helpers for loosely-typed client input.

use serde::{Deserialize, Deserializer};

/// Deserialize an optional integer that clients may send as a JSON number
/// or as a numeric string ("5", "4.7"). Fractions are truncated toward
/// zero; absent and null both deserialize to `None`.
pub fn coerce_opt_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    int_from_value(&value).map(Some).ok_or_else(|| {
        serde::de::Error::custom(format!("expected an integer or numeric string, got {value}"))
    })
}

fn int_from_value(value: &serde_json::Value) -> Option<i32> {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).ok()
            } else {
                n.as_f64().map(|f| f.trunc() as i32)
            }
        }
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i32>() {
                Some(i)
            } else {
                trimmed.parse::<f64>().ok().map(|f| f.trunc() as i32)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct WithRating {
        #[serde(default, deserialize_with = "coerce_opt_int")]
        rating: Option<i32>,
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let v: WithRating = serde_json::from_value(serde_json::json!({"rating": 5})).unwrap();
        assert_eq!(v.rating, Some(5));
        let v: WithRating = serde_json::from_value(serde_json::json!({"rating": "4"})).unwrap();
        assert_eq!(v.rating, Some(4));
        let v: WithRating = serde_json::from_value(serde_json::json!({"rating": "4.7"})).unwrap();
        assert_eq!(v.rating, Some(4));
    }

    #[test]
    fn rejects_non_numeric_input() {
        let r: Result<WithRating, _> =
            serde_json::from_value(serde_json::json!({"rating": "five"}));
        assert!(r.is_err());
    }

    #[test]
    fn absent_and_null_become_none() {
        let v: WithRating = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(v.rating.is_none());
        let v: WithRating = serde_json::from_value(serde_json::json!({"rating": null})).unwrap();
        assert!(v.rating.is_none());
    }
}
