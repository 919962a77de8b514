//! Conversation with a hosted chat-completion model.

use crate::config::schema::ChatConfig;
use async_trait::async_trait;
use sam_common::{ClassifiedCommand, CommandKind};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("I can't process this request because the OpenAI API key is not configured.")]
    MissingApiKey,
    #[error("Error from OpenAI API: {0}")]
    Api(String),
    #[error("Error communicating with OpenAI API: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Error communicating with OpenAI API: the response contained no message")]
    EmptyResponse,
    #[error("Error communicating with OpenAI API: invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Complete the conversation and return the assistant's reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError>;
}

pub struct OpenAiBackend {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiBackend {
    pub fn new(http: reqwest::Client, config: &ChatConfig) -> Self {
        Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let api_key = self.api_key.as_deref().ok_or(ChatError::MissingApiKey)?;

        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        info!(model = %self.model, messages = messages.len(), "requesting chat completion");
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::Api(describe_failure(status, &text)));
        }

        let value: serde_json::Value = serde_json::from_str(&text)?;
        value["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or(ChatError::EmptyResponse)
    }
}

/// Error text for a non-success completion. Proxies and gateways answer
/// with HTML or plain text, so fall back to the status and a body excerpt.
fn describe_failure(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && (value.get("message").is_some() || value.get("error").is_some())
    {
        return crate::services::error_message(&value);
    }
    let excerpt: String = body.trim().chars().take(200).collect();
    if excerpt.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {excerpt}")
    }
}

/// Recent user/assistant messages, oldest first, capped at `2 * max_turns`.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: VecDeque<ChatMessage>,
    max_messages: usize,
}

impl Conversation {
    pub fn new(max_turns: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            max_messages: max_turns * 2,
        }
    }

    pub fn record(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.messages.push_back(ChatMessage::user(user));
        self.messages.push_back(ChatMessage::assistant(assistant));
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

const ANALYZE_PROMPT: &str = "You classify requests for a personal assistant. \
Answer with a single JSON object and nothing else, shaped as \
{\"command_type\": \"...\", \"parameters\": {...}}. \
Valid command types and their parameters: \
website {website}; youtube, google, amazon, github, stackoverflow {query}; \
weather {location}; news {}; note_save {note}; note_read {}; help {}; clear {}; exit {}; \
scroll {direction: up|down, amount}; click {target}; extract {}; screenshot {}; \
chat {message}. Use chat when nothing else fits.";

pub struct ChatClient {
    backend: Box<dyn ChatBackend>,
    conversation: Conversation,
    system_prompt: String,
}

impl ChatClient {
    pub fn new(backend: Box<dyn ChatBackend>, system_prompt: impl Into<String>, max_turns: usize) -> Self {
        Self {
            backend,
            conversation: Conversation::new(max_turns),
            system_prompt: system_prompt.into(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &ChatConfig) -> Self {
        Self::new(
            Box::new(OpenAiBackend::new(http, config)),
            config.system_prompt.clone(),
            config.max_history_turns,
        )
    }

    pub fn history(&self) -> &Conversation {
        &self.conversation
    }

    /// Send `query` with the system prompt and recent history. History only
    /// grows when the model answers.
    pub async fn ask(&mut self, query: &str) -> Result<String, ChatError> {
        let mut messages = Vec::with_capacity(self.conversation.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(self.conversation.messages().cloned());
        messages.push(ChatMessage::user(query));

        let answer = self.backend.complete(&messages).await?;
        self.conversation.record(query, answer.clone());
        Ok(answer)
    }

    pub fn clear_history(&mut self) {
        self.conversation.clear();
    }

    /// Ask the model which command `text` is. Anything unusable becomes
    /// `chat` carrying the text.
    pub async fn analyze_command(&self, text: &str) -> ClassifiedCommand {
        let messages = [ChatMessage::system(ANALYZE_PROMPT), ChatMessage::user(text)];
        match self.backend.complete(&messages).await {
            Ok(answer) => parse_analysis(&answer).unwrap_or_else(|| {
                debug!(answer = %answer, "unusable command analysis");
                ClassifiedCommand::chat(text)
            }),
            Err(e) => {
                warn!(error = %e, "command analysis failed");
                ClassifiedCommand::chat(text)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct Analysis {
    command_type: String,
    #[serde(default)]
    parameters: BTreeMap<String, serde_json::Value>,
}

/// Read the model's `{"command_type", "parameters"}` answer, tolerating code
/// fences and prose around the object.
pub fn parse_analysis(answer: &str) -> Option<ClassifiedCommand> {
    let start = answer.find('{')?;
    let end = answer.rfind('}')?;
    if end < start {
        return None;
    }
    let analysis: Analysis = serde_json::from_str(&answer[start..=end]).ok()?;
    let kind: CommandKind = analysis.command_type.parse().ok()?;

    let mut command = ClassifiedCommand::new(kind);
    for (name, value) in analysis.parameters {
        let value = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        command = command.with_param(name, value);
    }
    Some(command)
}
