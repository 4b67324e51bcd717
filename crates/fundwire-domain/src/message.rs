//! Raw input messages as fetched from a chat source

use serde::{Deserialize, Serialize};

/// Tagged-entity bundle attached to a message before extraction.
///
/// Produced by the external keyword/entity collaborator; all vectors may be
/// empty when the analyzer found nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEntities {
    /// Company names mentioned in the text
    #[serde(default)]
    pub companies: Vec<String>,
    /// Protocol names mentioned in the text
    #[serde(default)]
    pub protocols: Vec<String>,
    /// Thematic tags
    #[serde(default)]
    pub themes: Vec<String>,
    /// Notable keywords
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// One announcement message, read-only input to extraction.
///
/// Consumed once per extraction attempt and never mutated, with the single
/// exception of `entities`, which the orchestrator may fill in from the
/// analyzer collaborator before handing the message to an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// Message id within its channel
    pub id: i64,
    /// Timestamp string as provided by the source
    pub date: String,
    /// Sender identifier
    pub sender_id: String,
    /// Sender display name
    #[serde(default)]
    pub sender_name: String,
    /// Message text
    pub text: String,
    /// Optional tagged-entity bundle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<MessageEntities>,
}

impl RawMessage {
    /// Convenience constructor used by tests and example inputs.
    pub fn new(id: i64, date: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            date: date.into(),
            sender_id: String::new(),
            sender_name: String::new(),
            text: text.into(),
            entities: None,
        }
    }
}
