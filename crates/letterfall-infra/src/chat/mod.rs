// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! OpenAI-compatible chat client used as a [`WordSource`].

mod history;

pub use history::{normalize_reply, ChatHistory, ChatMessage, MAX_HISTORY, MAX_REPLY_CHARS};

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use letterfall_core::word::WordSource;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Tokens that end a completion early.
pub const STOP_TOKENS: [&str; 4] = [".", "!", "?", "\n"];

/// Connection and prompting settings for [`ChatClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// API root, `/chat/completions` is appended.
    pub base_url: String,
    /// Bearer token, omitted from the request when `None`.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// First message of every conversation.
    pub system_prompt: String,
    /// Returned whenever the backend cannot be reached or answers garbage.
    pub fallback: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.6,
            system_prompt:
                "talk in lower case only, no punctuation, max 30 chars, no numbers. be concise."
                    .to_string(),
            fallback: "connection error".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    stop: &'a [&'a str],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

/// Chat backend that keeps a rolling conversation and turns every answer
/// into a short lowercase word list.
#[derive(Debug)]
pub struct ChatClient {
    client: Client,
    config: ChatConfig,
    history: Mutex<ChatHistory>,
}

impl ChatClient {
    /// Builds the HTTP client for the given settings.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            history: Mutex::new(ChatHistory::new(config.system_prompt.clone())),
            config,
        })
    }

    /// Current settings.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// A copy of the conversation so far.
    pub fn history(&self) -> ChatHistory {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = CompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            stop: &STOP_TOKENS,
        };

        let mut builder = self.client.post(url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .await
            .context("failed to reach chat backend")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable>".to_string());
            bail!("chat request failed ({status}): {body}");
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .context("failed to deserialize chat response")?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("chat response has no choices")
    }
}

#[async_trait]
impl WordSource for ChatClient {
    async fn reply(&self, prompt: &str) -> String {
        // The guard must not live across the await below.
        let messages = {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            history.push_user(prompt);
            history.messages().to_vec()
        };

        match self.complete(&messages).await {
            Ok(raw) => {
                let reply = normalize_reply(&raw);
                log::info!("Chat backend replied \"{reply}\"");
                // The model keeps its own words in context, not the letters we spawn.
                self.history
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push_assistant(raw);
                reply
            }
            Err(e) => {
                log::warn!("Chat request failed, using fallback: {e:#}");
                self.config.fallback.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Serves one canned HTTP response and hands back the request body.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            let header_end = loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
            let length: usize = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|v| v.trim().parse().unwrap())
                .unwrap_or(0);
            while request.len() < header_end + length {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request[header_end..]).into_owned()
        });
        (base_url, handle)
    }

    fn client_for(base_url: String) -> ChatClient {
        ChatClient::new(ChatConfig {
            base_url,
            api_key: Some("test-key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn normalizes_the_reply_but_remembers_the_raw_text() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Hello There, Friend!"}}]}"#,
        )
        .await;
        let client = client_for(base_url);

        assert_eq!(client.reply("hi").await, "hello there friend");

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent["model"], "llama-3.1-8b-instant");
        assert_eq!(sent["stop"].as_array().unwrap().len(), 4);
        assert_eq!(sent["messages"][0]["role"], "system");
        assert_eq!(sent["messages"][1]["content"], "hi");

        let history = client.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history.messages()[2].role, "assistant");
        assert_eq!(history.messages()[2].content, "Hello There, Friend!");
    }

    #[tokio::test]
    async fn error_status_yields_the_fallback() {
        let (base_url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let client = client_for(base_url);

        assert_eq!(client.reply("hi").await, "connection error");
        server.await.unwrap();
        assert_eq!(client.history().len(), 2);
    }

    #[tokio::test]
    async fn unreachable_backend_yields_the_fallback() {
        let client = ChatClient::new(ChatConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            fallback: "offline".to_string(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.reply("anyone there").await, "offline");
    }
}
