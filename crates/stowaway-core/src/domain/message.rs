//! Request / response shapes of the three intercepted queue operations.
//!
//! Fields that the transport treats as required are `Option`s here: a `None`
//! is forwarded untouched so the transport reports the problem itself.

use serde::{Deserialize, Serialize};

use super::attributes::MessageAttributes;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub body: Option<String>,
    #[serde(default)]
    pub attributes: MessageAttributes,
}

impl SendMessageRequest {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            attributes: MessageAttributes::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: MessageAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageOutput {
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveMessageRequest {
    /// Message attribute names to return. `"All"` or `".*"` selects everything.
    #[serde(default)]
    pub attribute_names: Vec<String>,
    pub max_messages: u32,
}

impl ReceiveMessageRequest {
    pub fn new(max_messages: u32) -> Self {
        Self {
            attribute_names: Vec::new(),
            max_messages,
        }
    }

    pub fn with_attribute_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attribute_names = names.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub message_id: String,
    pub body: String,
    #[serde(default)]
    pub attributes: MessageAttributes,
    pub receipt_handle: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveMessageOutput {
    pub messages: Vec<ReceivedMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteMessageRequest {
    pub receipt_handle: Option<String>,
}

impl DeleteMessageRequest {
    pub fn new(receipt_handle: impl Into<String>) -> Self {
        Self {
            receipt_handle: Some(receipt_handle.into()),
        }
    }
}
