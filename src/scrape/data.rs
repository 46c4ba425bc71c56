//! Data structures exchanged with the agent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// The single-byte request code telling the agent which payload to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Ask for the one-time process metadata
    MetaRequest,
    /// Ask for a runtime statistics snapshot
    StatsRequest,
}

impl Signal {
    /// Wire code for [`Signal::MetaRequest`].
    pub const META_BYTE: u8 = 0x01;
    /// Wire code for [`Signal::StatsRequest`].
    pub const STATS_BYTE: u8 = 0x02;

    /// The byte written on the wire for this signal.
    pub fn as_byte(self) -> u8 {
        match self {
            Signal::MetaRequest => Self::META_BYTE,
            Signal::StatsRequest => Self::STATS_BYTE,
        }
    }

    /// Decode a wire byte, as an agent would.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            Self::META_BYTE => Some(Signal::MetaRequest),
            Self::STATS_BYTE => Some(Signal::StatsRequest),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::MetaRequest => f.write_str("meta"),
            Signal::StatsRequest => f.write_str("stats"),
        }
    }
}

/// Static metadata about the diagnosed process.
///
/// The agent owns the schema: `pid` and `name` are picked out when present,
/// every other top-level field is preserved in `attributes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Process identifier
    #[serde(default)]
    pub pid: u32,
    /// Process or command name
    #[serde(default)]
    pub name: String,
    /// Remaining static attributes reported by the agent
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Meta {
    /// Look up an attribute that is not one of the typed fields.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// A point-in-time runtime snapshot of the diagnosed process.
///
/// Must decode from a JSON object; its fields are kept as reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stats {
    fields: Map<String, Value>,
}

impl Stats {
    /// Build a snapshot from already-decoded fields.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Raw value of a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field as an unsigned integer, if it is one.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.fields.get(key).and_then(Value::as_u64)
    }

    /// Field as a float; integers are widened.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    /// All fields in key order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
