//! Queue event wire model.
//!
//! Events are JSON objects with a `type` discriminator (`kind` is read when
//! `type` is absent). Typed fields cover the alpha-token shape and the pre-rendered
//! `message` used by every other kind; any other top-level key is kept in
//! [`Event::metadata`] and written back unchanged on serialization.

use crate::error::ParseError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Event discriminator values as they appear on the wire.
pub mod wire {
    pub const ALPHA_NEW_TOKEN: &str = "alpha_new_token";
    pub const MONITORING_ALERT: &str = "monitoring_alert";
    pub const BUSINESS_UPDATE: &str = "business_update";
    pub const SCHEDULED_CONTENT: &str = "scheduled_content";
    pub const GENERIC: &str = "generic";
    pub const TEST: &str = "test";
    pub const UNKNOWN: &str = "unknown";
}

/// Kind of an event, derived from its discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AlphaNewToken,
    MonitoringAlert,
    BusinessUpdate,
    ScheduledContent,
    Generic,
    Test,
    Unknown,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 7] = [
        EventKind::AlphaNewToken,
        EventKind::MonitoringAlert,
        EventKind::BusinessUpdate,
        EventKind::ScheduledContent,
        EventKind::Generic,
        EventKind::Test,
        EventKind::Unknown,
    ];

    /// Canonical discriminator string.
    pub fn wire_name(self) -> &'static str {
        match self {
            EventKind::AlphaNewToken => wire::ALPHA_NEW_TOKEN,
            EventKind::MonitoringAlert => wire::MONITORING_ALERT,
            EventKind::BusinessUpdate => wire::BUSINESS_UPDATE,
            EventKind::ScheduledContent => wire::SCHEDULED_CONTENT,
            EventKind::Generic => wire::GENERIC,
            EventKind::Test => wire::TEST,
            EventKind::Unknown => wire::UNKNOWN,
        }
    }

    /// Map a raw discriminator to a kind.
    ///
    /// Matching ignores case, treats `-` and spaces as `_`, and splits
    /// CamelCase, so `ALPHA_NEW_TOKEN`, `alpha-new-token` and `AlphaNewToken`
    /// all resolve to [`EventKind::AlphaNewToken`]. Anything else is
    /// [`EventKind::Unknown`].
    pub fn from_discriminator(raw: &str) -> Self {
        match normalize_discriminator(raw).as_str() {
            wire::ALPHA_NEW_TOKEN => EventKind::AlphaNewToken,
            wire::MONITORING_ALERT => EventKind::MonitoringAlert,
            wire::BUSINESS_UPDATE => EventKind::BusinessUpdate,
            wire::SCHEDULED_CONTENT => EventKind::ScheduledContent,
            wire::GENERIC => EventKind::Generic,
            wire::TEST => EventKind::Test,
            _ => EventKind::Unknown,
        }
    }

    /// Whether events of this kind carry their text pre-rendered in `message`.
    pub fn is_message_kind(self) -> bool {
        !matches!(self, EventKind::AlphaNewToken)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

fn normalize_discriminator(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for c in raw.trim().chars() {
        match c {
            '-' | ' ' | '_' => {
                out.push('_');
                prev_lower = false;
            }
            c if c.is_ascii_uppercase() => {
                if prev_lower {
                    out.push('_');
                }
                out.push(c.to_ascii_lowercase());
                prev_lower = false;
            }
            c => {
                out.push(c);
                prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            }
        }
    }
    out
}

/// Token amount: producers send either a JSON number or a string.
///
/// Any other JSON value is kept as-is so the event still parses; it is
/// present for validation and renders through the raw-text fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(Number),
    Text(String),
    Other(Value),
}

impl Amount {
    /// An empty string counts as absent.
    pub fn is_empty(&self) -> bool {
        matches!(self, Amount::Text(s) if s.is_empty())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{}", n),
            Amount::Text(s) => f.write_str(s),
            Amount::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount::Number(value.into())
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Number::from_f64(value)
            .map(Amount::Number)
            .unwrap_or_else(|| Amount::Text(value.to_string()))
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_string())
    }
}

/// An event as carried on the queue.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    /// Raw `type` exactly as received.
    #[serde(
        rename = "type",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub discriminator: Option<String>,

    /// Raw `kind`. Only consulted when `type` is missing or empty.
    #[serde(
        rename = "kind",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind_alias: Option<String>,

    /// Pre-rendered post text (generic and legacy kinds).
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub explorer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Amount>,

    #[serde(
        alias = "detectedAt",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub detected_at: Option<String>,

    /// Unix seconds at which the producer pushed the event.
    #[serde(alias = "queueTimestamp", skip_serializing_if = "Option::is_none")]
    pub queue_timestamp: Option<f64>,

    /// Producer-assigned trace id.
    #[serde(
        alias = "queueId",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub queue_id: Option<String>,

    /// Every other top-level field. Carried for logging, never rendered
    /// unless a template names one of its scalar keys.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Accept strings, numbers and booleans for text fields; `null` is absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Event {
    /// A generic event carrying only pre-rendered text.
    pub fn generic(message: impl Into<String>) -> Self {
        Self {
            discriminator: Some(wire::GENERIC.to_string()),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// An empty event of the given kind.
    pub fn of_kind(kind: EventKind) -> Self {
        Self {
            discriminator: Some(kind.wire_name().to_string()),
            ..Default::default()
        }
    }

    /// The effective discriminator: `type`, falling back to `kind`.
    pub fn raw_discriminator(&self) -> Option<&str> {
        self.discriminator
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.kind_alias.as_deref())
    }

    /// Kind derived from the discriminator.
    pub fn kind(&self) -> EventKind {
        classify(self)
    }

    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Short human-readable preview for log lines.
    pub fn preview(&self, max_chars: usize) -> String {
        let text = match (&self.message, &self.name, &self.symbol) {
            (Some(message), _, _) if !message.is_empty() => message.clone(),
            (_, Some(name), Some(symbol)) => format!("{} ({})", name, symbol),
            (_, Some(name), None) => name.clone(),
            _ => String::new(),
        };
        text.chars().take(max_chars).collect()
    }
}

/// Decode a raw queue payload.
///
/// Fails only on malformed encoding; semantic checks belong to
/// [`crate::validate`].
pub fn parse(raw: &[u8]) -> Result<Event, ParseError> {
    let value: Value = serde_json::from_slice(raw)?;
    if !value.is_object() {
        return Err(ParseError::NotAnObject(json_type_name(&value)));
    }
    Ok(serde_json::from_value(value)?)
}

/// Read the discriminator. Missing or unrecognised values map to
/// [`EventKind::Unknown`].
pub fn classify(event: &Event) -> EventKind {
    event
        .raw_discriminator()
        .map(EventKind::from_discriminator)
        .unwrap_or(EventKind::Unknown)
}
