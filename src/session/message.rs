use serde::{Deserialize, Serialize};

/// Outbound result for one inbound chunk.
///
/// Serialized as `{"type": "partial" | "final", "text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResultMessage {
    /// Revisable hypothesis for the utterance in progress
    Partial { text: String },
    /// Committed text for a completed utterance (may be empty)
    Final { text: String },
}

impl ResultMessage {
    pub fn text(&self) -> &str {
        match self {
            Self::Partial { text } | Self::Final { text } => text,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Final { .. })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
