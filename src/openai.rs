// SPDX-License-Identifier: MIT
//!
//! OpenAI chat completion API wrapper
//!

use crate::config::Config;
use crate::error::{Error, Result};
use crate::trans::{Prompt, Translator};

#[derive(Clone)]
pub struct OpenAi {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAi {
    /// New client, fails when API key is not configured
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key()?.to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one chat completion request, returns trimmed message content
    pub async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let req = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };
        log::trace!("Prompt:\n{}", prompt.user);

        // Make chat completion request
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        // Returns error
        if !status.is_success() {
            return Err(Error::Upstream(error_message(status, &body)));
        }

        // Parse response
        let chat_resp = serde_json::from_str::<ChatResponse>(&body)
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;
        let content = chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                Error::MalformedResponse("missing choices[0].message.content".to_string())
            })?;
        log::trace!("Completion:\n{}", content);

        Ok(content.trim().to_string())
    }
}

impl Translator for OpenAi {
    async fn translate(&self, text: &str, terms: &[String]) -> Result<String> {
        self.complete(&Prompt::new(text, terms)).await
    }
}

/// Pick `error.message` from API error JSON, or the raw body
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse { error }) => format!("HTTP {}: {}", status.as_u16(), error.message),
        Err(_) => {
            let body = body.trim();
            let snippet: String = body.chars().take(400).collect();
            format!("HTTP {}: {}", status.as_u16(), snippet)
        }
    }
}

/// Chat completion request JSON
#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat completion response JSON
#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(serde::Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// API error JSON, `{"error": {"message": ...}}`
#[derive(serde::Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    message: String,
}
