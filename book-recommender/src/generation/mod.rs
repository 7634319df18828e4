//! Outbound text generation: request/reply wire types and the client seams.

pub mod bedrock;
pub mod credentials;
pub mod signing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;

pub use bedrock::{BedrockClient, BedrockConnector};
pub use credentials::{AwsCredentials, CredentialSource, ProcessEnv};

pub const ANTHROPIC_BEDROCK_VERSION: &str = "bedrock-2023-05-31";
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20241022-v2:0";

/// Fixed model invocation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_tokens: 2000,
            temperature: 0.8,
            top_p: 0.999,
            top_k: 250,
        }
    }
}

/// One prompt plus the parameters it is sent with.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model_id: String,
    pub body: InvokeBody,
}

impl GenerationRequest {
    pub fn new(settings: &GenerationSettings, prompt: impl Into<String>) -> Self {
        Self {
            model_id: settings.model_id.clone(),
            body: InvokeBody {
                anthropic_version: ANTHROPIC_BEDROCK_VERSION.to_string(),
                max_tokens: settings.max_tokens,
                temperature: settings.temperature,
                top_p: settings.top_p,
                top_k: settings.top_k,
                stop_sequences: Vec::new(),
                messages: vec![Message {
                    role: "user".to_string(),
                    content: vec![MessageContent::Text {
                        text: prompt.into(),
                    }],
                }],
            },
        }
    }

    pub fn prompt(&self) -> &str {
        self.body
            .messages
            .first()
            .and_then(|m| m.content.first())
            .map(|MessageContent::Text { text }| text.as_str())
            .unwrap_or_default()
    }
}

/// Anthropic Messages body as accepted by the Bedrock `invoke` operation.
#[derive(Debug, Clone, Serialize)]
pub struct InvokeBody {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub stop_sequences: Vec<String>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<MessageContent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
}

/// Raw reply from the generation service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationReply {
    #[serde(default)]
    pub content: Option<Vec<ContentBlock>>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl GenerationReply {
    /// Reply holding the given blocks and nothing else.
    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            content: Some(blocks),
            ..Self::default()
        }
    }

    /// Reply with a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_blocks(vec![ContentBlock::Text { text: text.into() }])
    }
}

/// A tagged element of the reply's content; only `text` is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

/// A connected client able to run one generation call.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply>;
}

/// Produces a fresh [`TextGenerator`] for each request.
///
/// Connecting is where credentials are resolved, so a missing credential
/// surfaces as a configuration error before anything is sent.
pub trait GeneratorFactory: Send + Sync {
    fn connect(&self) -> Result<Arc<dyn TextGenerator>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_bedrock_messages_format() {
        let request = GenerationRequest::new(&GenerationSettings::default(), "hello");
        let body = serde_json::to_value(&request.body).unwrap();

        assert_eq!(body["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["top_k"], 250);
        assert_eq!(body["stop_sequences"], serde_json::json!([]));
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["type"], "text");
        assert_eq!(body["messages"][0]["content"][0]["text"], "hello");
        assert!(body.get("model_id").is_none());
        assert_eq!(request.prompt(), "hello");
    }

    #[test]
    fn unknown_block_kinds_decode_as_other() {
        let reply: GenerationReply = serde_json::from_str(
            r#"{
                "id": "msg_01",
                "model": "claude",
                "role": "assistant",
                "content": [
                    {"type": "image", "source": {"data": "..."}},
                    {"type": "text", "text": "{}"}
                ],
                "usage": {"input_tokens": 12, "output_tokens": 34}
            }"#,
        )
        .unwrap();

        let blocks = reply.content.unwrap();
        assert_eq!(blocks[0], ContentBlock::Other);
        assert_eq!(blocks[1], ContentBlock::Text { text: "{}".into() });
        assert_eq!(reply.usage.unwrap().output_tokens, 34);
    }
}
