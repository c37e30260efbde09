//! services/bot/src/adapters/interpreter_llm.rs
//!
//! This module contains the adapter for the interpretation LLM.
//! It implements the `InterpretationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use tarot_core::ports::{InterpretationService, PortError, PortResult};
use tracing::debug;

const MAX_COMPLETION_TOKENS: u32 = 1200;
const TEMPERATURE: f32 = 0.9;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `InterpretationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiInterpreterAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiInterpreterAdapter {
    /// Creates a new `OpenAiInterpreterAdapter`. Calls exceeding `timeout` fail.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }
}

//=========================================================================================
// `InterpretationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl InterpretationService for OpenAiInterpreterAdapter {
    async fn generate(&self, system_persona: &str, prompt: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_persona)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(TEMPERATURE)
            .max_completion_tokens(MAX_COMPLETION_TOKENS)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::Generation(format!("No response within {}s", self.timeout.as_secs()))
            })?
            .map_err(|e: OpenAIError| PortError::Generation(e.to_string()))?;

        if let Some(usage) = &response.usage {
            debug!(total_tokens = usage.total_tokens, "Interpretation generated.");
        }

        // Extract the text content from the first choice in the response.
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        content.ok_or_else(|| {
            PortError::Generation("Interpretation LLM response contained no text content.".to_string())
        })
    }
}
