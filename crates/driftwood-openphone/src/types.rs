use serde::{Deserialize, Serialize};

/// A message accepted by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub from: Option<String>,
}

impl SentMessage {
    pub fn status(&self) -> MessageStatus {
        self.status
            .as_deref()
            .map(MessageStatus::from)
            .unwrap_or(MessageStatus::Other(String::new()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageStatus {
    Queued,
    Sent,
    Delivered,
    Undelivered,
    Other(String),
}

impl MessageStatus {
    /// Queued and sent messages may still be delivered.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Queued | Self::Sent)
    }
}

impl From<&str> for MessageStatus {
    fn from(value: &str) -> Self {
        match value {
            "queued" => Self::Queued,
            "sent" => Self::Sent,
            "delivered" => Self::Delivered,
            "undelivered" => Self::Undelivered,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendRequest<'a> {
    pub content: &'a str,
    pub from: &'a str,
    pub to: [String; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Option<T>,
}
