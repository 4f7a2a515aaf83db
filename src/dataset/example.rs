//! Read-only views over training examples and their messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field holding the ordered message list of an example.
pub const MESSAGES_FIELD: &str = "messages";

/// One training sample, kept as raw JSON so every field round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Example(Value);

impl Example {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns the raw message list, if the example has one.
    pub fn messages(&self) -> Option<&[Value]> {
        self.0
            .get(MESSAGES_FIELD)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Iterates over the well-formed (object) messages, in order.
    pub fn message_views(&self) -> impl Iterator<Item = Message<'_>> {
        self.messages()
            .unwrap_or_default()
            .iter()
            .filter_map(Message::from_value)
    }
}

impl From<Value> for Example {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Borrowed view of a single message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Message<'a> {
    role: Option<&'a str>,
    content: Option<&'a Value>,
}

impl<'a> Message<'a> {
    /// Builds a view over a message object; returns `None` for non-objects.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            role: object.get("role").and_then(Value::as_str),
            content: object.get("content"),
        })
    }

    pub fn role(&self) -> Option<&'a str> {
        self.role
    }

    pub fn content(&self) -> Option<&'a Value> {
        self.content
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == Some(role)
    }
}
