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

use serde::{Deserialize, Serialize};

/// Upper bound on the conversation length, system prompt included.
pub const MAX_HISTORY: usize = 10;

/// Longest reply kept after normalisation.
pub const MAX_REPLY_CHARS: usize = 30;

/// One message of the chat-completions wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Rolling conversation that always starts with the system prompt.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    /// A history holding only the system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::new("system", system_prompt)],
        }
    }

    /// Appends a user message. It stays even if no reply ever comes.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new("user", content));
    }

    /// Appends an assistant reply, then drops the oldest exchange once the
    /// history grows past [`MAX_HISTORY`].
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new("assistant", content));
        if self.messages.len() > MAX_HISTORY {
            self.messages.drain(1..3);
        }
    }

    /// Messages in send order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages, system prompt included.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always `false`: the system prompt is never dropped.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Lowercases a reply, keeps letters and whitespace, and shortens it to
/// [`MAX_REPLY_CHARS`] at a word boundary when one exists.
pub fn normalize_reply(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_whitespace())
        .collect();
    let chars: Vec<char> = cleaned.trim().chars().collect();
    if chars.len() <= MAX_REPLY_CHARS {
        return chars.into_iter().collect();
    }
    let cut = match chars[..=MAX_REPLY_CHARS].iter().rposition(|&c| c == ' ') {
        Some(space) if space > 0 => space,
        _ => MAX_REPLY_CHARS,
    };
    chars[..cut].iter().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_case_digits_and_punctuation() {
        assert_eq!(normalize_reply("  Hello, World 42!  "), "hello world");
        assert_eq!(normalize_reply("?!."), "");
    }

    #[test]
    fn cuts_long_replies_at_the_last_space() {
        let reply = normalize_reply("the quick brown fox jumps over the lazy dog");
        assert_eq!(reply, "the quick brown fox jumps over");
        assert!(reply.len() <= MAX_REPLY_CHARS);

        let reply = normalize_reply("the quick brown fox jumped overhead");
        assert_eq!(reply, "the quick brown fox jumped");
    }

    #[test]
    fn hard_cuts_a_single_long_word() {
        let word = "a".repeat(45);
        assert_eq!(normalize_reply(&word), "a".repeat(30));
    }

    #[test]
    fn history_drops_the_oldest_exchange() {
        let mut history = ChatHistory::new("be brief");
        for turn in 0..4 {
            history.push_user(format!("q{turn}"));
            history.push_assistant(format!("a{turn}"));
        }
        assert_eq!(history.len(), 9);

        history.push_user("q4");
        history.push_assistant("a4");
        assert_eq!(history.len(), 9);
        assert_eq!(history.messages()[0].role, "system");
        assert_eq!(history.messages()[1].content, "q1");
        assert_eq!(history.messages()[8].content, "a4");
    }

    #[test]
    fn unanswered_prompts_stay_in_the_history() {
        let mut history = ChatHistory::new("be brief");
        history.push_user("hello");
        assert_eq!(history.len(), 2);
        assert_eq!(history.messages()[1].role, "user");
    }
}
