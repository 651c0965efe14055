use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{"data": ...}` wrapper used by every OneApi admin endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OneApiEnvelope<T> {
    pub data: T,
}

/// A OneApi channel, kept as the raw JSON object the gateway returned.
///
/// Channel updates are a read-modify-write of the whole object, so every
/// field (including nulls and fields this crate knows nothing about) must
/// survive untouched. Only typed accessors are offered on top.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct OneApiChannel {
    fields: Map<String, Value>,
}

impl OneApiChannel {
    pub fn id(&self) -> Option<i64> {
        self.fields.get("id").and_then(Value::as_i64)
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    pub fn key(&self) -> Option<&str> {
        self.fields.get("key").and_then(Value::as_str)
    }

    /// Replaces `key` and leaves every other field as-is.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.fields.insert("key".to_string(), Value::String(key.into()));
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}
