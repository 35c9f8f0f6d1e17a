use serde::{Deserialize, Serialize};

/// Chat message in the OpenAI wire shape (`{"role": "user", "content": ...}`)
///
/// Every prompt this crate sends is a single user turn, so that is the only role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "user")]
    Human { content: String },
}

impl Message {
    pub fn human(content: impl Into<String>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    /// Get role as string
    pub fn role(&self) -> &str {
        match self {
            Self::Human { .. } => "user",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Human { content } => content,
        }
    }
}
