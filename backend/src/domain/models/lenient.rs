//! Tolerant readers for persisted fields.
//!
//! The board is stored as a single document, so one bad field or record
//! must not make the whole file unreadable. These readers log what they
//! drop and fall back to defaults instead of failing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use shared::DayKey;
use tracing::warn;

use super::finite_or_zero;

/// Money amounts: numbers and numeric strings are kept, anything else is zero
pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let amount = match &value {
        Value::Number(number) => number.as_f64().map(finite_or_zero).unwrap_or(0.0),
        Value::String(text) => match text.trim().parse::<f64>() {
            Ok(amount) => finite_or_zero(amount),
            Err(_) => {
                warn!("Treating unreadable amount {} as 0", value);
                0.0
            }
        },
        Value::Null => 0.0,
        other => {
            warn!("Treating unreadable amount {} as 0", other);
            0.0
        }
    };
    Ok(amount)
}

/// Optional fields: an unreadable value becomes the type's default
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Ignoring unreadable field: {}", e);
        T::default()
    }))
}

/// Record lists: unreadable records are skipped, the rest are kept
pub fn skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(records(Value::deserialize(deserializer)?))
}

pub(crate) fn records<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping unreadable record: {}", e);
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            warn!("Expected a list, ignoring {}", other);
            Vec::new()
        }
    }
}

/// Entries of a per-day object; unknown day keys are dropped
pub(crate) fn day_entries(value: Value) -> Vec<(DayKey, Value)> {
    let entries = match value {
        Value::Object(entries) => entries,
        Value::Null => return Vec::new(),
        other => {
            warn!("Expected an object keyed by day, ignoring {}", other);
            return Vec::new();
        }
    };
    entries
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<DayKey>(Value::String(key.clone())) {
            Ok(day) => Some((day, value)),
            Err(_) => {
                warn!("Dropping entries under unknown day '{}'", key);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Record {
        #[serde(default, deserialize_with = "amount")]
        value: f64,
        #[serde(default, deserialize_with = "or_default")]
        flag: bool,
    }

    #[test]
    fn test_amount_accepts_numbers_and_numeric_strings() {
        let record: Record = serde_json::from_value(json!({"value": "2.5"})).unwrap();
        assert_eq!(record.value, 2.5);
        let record: Record = serde_json::from_value(json!({"value": 4})).unwrap();
        assert_eq!(record.value, 4.0);
    }

    #[test]
    fn test_junk_fields_fall_back_to_defaults() {
        let record: Record = serde_json::from_value(json!({"value": null, "flag": "yes"})).unwrap();
        assert_eq!(record.value, 0.0);
        assert!(!record.flag);
        let record: Record = serde_json::from_value(json!({"value": {"nested": 1}})).unwrap();
        assert_eq!(record.value, 0.0);
    }

    #[test]
    fn test_records_skips_bad_elements() {
        let values: Vec<u8> = records(json!([1, "two", 3, 300]));
        assert_eq!(values, vec![1, 3]);
        assert!(records::<u8>(json!({"not": "a list"})).is_empty());
        assert!(records::<u8>(Value::Null).is_empty());
    }

    #[test]
    fn test_day_entries_drop_unknown_days() {
        let entries = day_entries(json!({"monday": [], "someday": [], "market": []}));
        let days: Vec<DayKey> = entries.into_iter().map(|(day, _)| day).collect();
        assert_eq!(days.len(), 2);
        assert!(days.contains(&DayKey::Monday));
        assert!(days.contains(&DayKey::Market));
    }
}
