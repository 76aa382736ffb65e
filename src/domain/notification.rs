//! Storage-event notifications delivered by a push subscription.
//!
//! The request body is an envelope whose `message.data` is base64-encoded JSON
//! describing the object that was written to the raw bucket. Only the object
//! `name` is consumed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::staging::is_valid_file_name;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("message data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("message data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("message data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("attribute 'name' missing from message")]
    MissingName,

    #[error("object name {0:?} is not a plain file name")]
    InvalidName(String),
}

/// Push request body.
#[derive(Debug, Clone, Deserialize)]
pub struct PushEnvelope {
    pub message: PushMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Base64-encoded JSON of the storage event.
    pub data: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub publish_time: Option<String>,
}

impl PushEnvelope {
    /// Decode `message.data` and return the raw object name it refers to.
    ///
    /// The name is returned exactly as sent.
    pub fn object_name(&self) -> Result<String, NotificationError> {
        let bytes = STANDARD.decode(self.message.data.trim())?;
        let json = String::from_utf8(bytes)?;
        // Any JSON is accepted; only a string `name` on an object counts.
        let event: Value = serde_json::from_str(&json)?;

        let name = match event.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(NotificationError::MissingName),
        };
        if !is_valid_file_name(&name) {
            return Err(NotificationError::InvalidName(name));
        }
        Ok(name)
    }
}
