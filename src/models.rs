//! Payload types for the live departures endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a physical stop, e.g. a UK ATCO code such as `490004733D`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopCode(String);

impl StopCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for StopCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<&str> for StopCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

/// Decoded body of `/uk/bus/stop/<code>/live.json`.
///
/// Every field is optional at this level so that an `error` payload, which
/// carries nothing else, still decodes. Required structure is checked by
/// [`crate::schedule::build_schedule`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveResponse {
    pub name: Option<String>,
    /// Sub-collection name (`"all"`, or one per operator) to its departures.
    pub departures: Option<BTreeMap<String, Vec<RawDeparture>>>,
    /// `Some` whenever the key is present, whatever its value.
    #[serde(default, deserialize_with = "present_error")]
    pub error: Option<String>,
}

/// Any `error` value rejects the payload, so non-strings (including `null`)
/// are kept as their JSON text rather than read as absent.
fn present_error<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let message = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(message) => message,
        other => other.to_string(),
    };
    Ok(Some(message))
}

/// One scheduled bus as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawDeparture {
    pub line: String,
    pub direction: String,
    #[serde(default)]
    pub expected_departure_date: Option<String>,
    pub best_departure_estimate: String,
}

impl RawDeparture {
    /// Key shared by every departure of the same line and direction.
    pub fn route_key(&self) -> String {
        format!("{} to {}", self.line, self.direction)
    }
}
