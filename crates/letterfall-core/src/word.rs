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

//! Contract for whatever produces the next word to spell.

use async_trait::async_trait;

/// An asynchronous "text in, text out" source of words.
///
/// Implementations never fail: transport errors are absorbed and replaced by
/// a fallback reply so the simulation always has something to spell.
#[async_trait]
pub trait WordSource: Send + Sync {
    /// Replies to `prompt`.
    async fn reply(&self, prompt: &str) -> String;
}

/// A source that always answers with the same text.
#[derive(Debug, Clone)]
pub struct FixedReply(pub String);

#[async_trait]
impl WordSource for FixedReply {
    async fn reply(&self, _prompt: &str) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_reply_ignores_prompt() {
        let source = FixedReply("hello".into());
        assert_eq!(source.reply("anything").await, "hello");
    }
}
