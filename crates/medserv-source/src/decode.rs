//! Lenient decoding of API payloads
//!
//! The API is not consistent about envelopes and id types: collections come
//! either as bare arrays or wrapped in `{"data": [...]}`, and ids are numbers
//! or numeric strings depending on the endpoint.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{SourceError, SourceResult};
use crate::types::EntityId;

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(i64),
    Text(String),
}

impl IdRepr {
    fn into_id<E: serde::de::Error>(self) -> Result<EntityId, E> {
        match self {
            IdRepr::Number(n) => Ok(n),
            IdRepr::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id: {:?}", s))),
        }
    }
}

/// Deserialize an id given as a number or a numeric string
pub fn de_id<'de, D>(deserializer: D) -> Result<EntityId, D::Error>
where
    D: Deserializer<'de>,
{
    IdRepr::deserialize(deserializer)?.into_id()
}

/// Optional variant of [`de_id`]; `null` maps to `None`
pub fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IdRepr>::deserialize(deserializer)? {
        Some(repr) => repr.into_id().map(Some),
        None => Ok(None),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CodeRepr {
    Text(String),
    Number(serde_json::Number),
}

impl CodeRepr {
    fn into_code(self) -> String {
        match self {
            CodeRepr::Text(s) => s,
            CodeRepr::Number(n) => n.to_string(),
        }
    }
}

/// Deserialize an error code given as a string or a number
pub fn de_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    CodeRepr::deserialize(deserializer).map(CodeRepr::into_code)
}

/// Optional variant of [`de_code`]; `null` maps to `None`
pub fn de_opt_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<CodeRepr>::deserialize(deserializer)?.map(CodeRepr::into_code))
}

/// Strip a `{"data": ...}` envelope if present
pub fn unwrap_payload(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode a collection payload
///
/// A payload that is not an array (after unwrapping the envelope) is a
/// contract violation and fails immediately.
pub fn decode_collection<T: DeserializeOwned>(value: Value, location: &str) -> SourceResult<Vec<T>> {
    match unwrap_payload(value) {
        Value::Array(items) => {
            serde_json::from_value(Value::Array(items)).map_err(|source| SourceError::Decode {
                location: location.to_string(),
                source,
            })
        }
        other => Err(SourceError::InvalidFormat {
            location: location.to_string(),
            message: format!("expected an array, found {}", value_kind(&other)),
        }),
    }
}

/// Decode a collection entry by entry, dropping entries of unknown shape
///
/// Only a payload that is not an array fails. Each dropped entry is logged at
/// debug with its position.
pub fn decode_entries<T: DeserializeOwned>(value: Value, location: &str) -> SourceResult<Vec<T>> {
    let items = match unwrap_payload(value) {
        Value::Array(items) => items,
        other => {
            return Err(SourceError::InvalidFormat {
                location: location.to_string(),
                message: format!("expected an array, found {}", value_kind(&other)),
            })
        }
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("Skipping entry {} of {}: {}", index, location, e);
                None
            }
        })
        .collect();

    if decoded.len() < total {
        log::debug!("Decoded {} of {} entries from {}", decoded.len(), total, location);
    }
    Ok(decoded)
}

/// Decode a single entity payload
pub fn decode_entity<T: DeserializeOwned>(value: Value, location: &str) -> SourceResult<T> {
    match unwrap_payload(value) {
        Value::Object(map) => {
            serde_json::from_value(Value::Object(map)).map_err(|source| SourceError::Decode {
                location: location.to_string(),
                source,
            })
        }
        other => Err(SourceError::InvalidFormat {
            location: location.to_string(),
            message: format!("expected an object, found {}", value_kind(&other)),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Calendar day of an API date or timestamp
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS` and any
/// other string starting with a valid `YYYY-MM-DD`.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    static DAY_PREFIX: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let day_regex = DAY_PREFIX.get_or_init(|| regex::Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").unwrap());

    let caps = day_regex.captures(raw.trim())?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
