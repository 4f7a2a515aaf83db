//! Workflow payload extraction from assistant messages.
//!
//! Each training example carries its workflow as a JSON string in the
//! content of an assistant message. Extraction finds the first message with
//! the designated role and re-parses its content. Every failure along the
//! way is reported as [`PayloadLookup::Absent`] with a reason; nothing is
//! raised past this boundary.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::dataset::Example;

/// Role whose message content holds the workflow.
pub const ASSISTANT_ROLE: &str = "assistant";

/// Placeholder label for nodes without a usable type.
pub const UNKNOWN_NODE_TYPE: &str = "unknown";

/// Why no payload could be extracted from an example.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AbsentReason {
    #[error("example has no message list")]
    NoMessages,
    #[error("no message with the designated role")]
    NoAssistantMessage,
    #[error("designated message has no content")]
    MissingContent,
    #[error("designated message content is not a string")]
    NonStringContent,
    #[error("content is not valid JSON: {0}")]
    MalformedContent(String),
    #[error("content parsed to {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Result of a payload lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadLookup {
    /// Content parsed to a JSON object
    Found(Payload),
    /// Nothing usable; the reason says where it went wrong
    Absent(AbsentReason),
}

impl PayloadLookup {
    /// Returns true if a payload was found
    pub fn is_found(&self) -> bool {
        matches!(self, PayloadLookup::Found(_))
    }

    /// Returns the payload for the Found case
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            PayloadLookup::Found(payload) => Some(payload),
            PayloadLookup::Absent(_) => None,
        }
    }

    /// Consumes the lookup, returning the payload if found
    pub fn into_payload(self) -> Option<Payload> {
        match self {
            PayloadLookup::Found(payload) => Some(payload),
            PayloadLookup::Absent(_) => None,
        }
    }

    /// Converts the lookup into a Result carrying the absence reason
    pub fn into_result(self) -> Result<Payload, AbsentReason> {
        match self {
            PayloadLookup::Found(payload) => Ok(payload),
            PayloadLookup::Absent(reason) => Err(reason),
        }
    }
}

/// A parsed workflow payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Workflow name, when present.
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// Nodes of the workflow. A missing or non-list `nodes` field reads as empty.
    pub fn nodes(&self) -> Vec<Node<'_>> {
        self.fields
            .get("nodes")
            .and_then(Value::as_array)
            .map(|nodes| nodes.iter().map(Node::new).collect())
            .unwrap_or_default()
    }
}

/// Borrowed view of one workflow node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<'a> {
    raw: &'a Value,
}

impl<'a> Node<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    /// The node's `type` label, if it is a string.
    pub fn node_type(&self) -> Option<&'a str> {
        self.raw.get("type").and_then(Value::as_str)
    }

    /// The type label, or [`UNKNOWN_NODE_TYPE`] when missing.
    pub fn type_label(&self) -> &'a str {
        self.node_type().unwrap_or(UNKNOWN_NODE_TYPE)
    }
}

/// Extracts payloads using a configurable role.
#[derive(Debug, Clone)]
pub struct PayloadExtractor {
    role: String,
}

impl Default for PayloadExtractor {
    fn default() -> Self {
        Self::new(ASSISTANT_ROLE)
    }
}

impl PayloadExtractor {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Looks up the payload of `example`.
    ///
    /// Only the first message with the designated role is considered, even
    /// if later messages share it. Non-object entries in the message list
    /// are skipped.
    pub fn extract(&self, example: &Example) -> PayloadLookup {
        if example.messages().is_none() {
            return PayloadLookup::Absent(AbsentReason::NoMessages);
        }

        let Some(message) = example.message_views().find(|m| m.has_role(&self.role)) else {
            return PayloadLookup::Absent(AbsentReason::NoAssistantMessage);
        };

        let content = match message.content() {
            None | Some(Value::Null) => return PayloadLookup::Absent(AbsentReason::MissingContent),
            Some(Value::String(content)) => content,
            Some(_) => return PayloadLookup::Absent(AbsentReason::NonStringContent),
        };

        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(fields)) => PayloadLookup::Found(Payload::new(fields)),
            Ok(other) => PayloadLookup::Absent(AbsentReason::NotAnObject(kind_of(&other))),
            Err(e) => PayloadLookup::Absent(AbsentReason::MalformedContent(e.to_string())),
        }
    }
}

/// Extracts the payload with the default assistant role.
pub fn extract(example: &Example) -> PayloadLookup {
    PayloadExtractor::default().extract(example)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
