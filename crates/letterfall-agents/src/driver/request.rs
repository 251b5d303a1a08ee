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

//! A word being fetched from a [`WordSource`] in the background.

use std::sync::Arc;

use letterfall_core::word::WordSource;
use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Outcome of polling a [`WordRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPoll {
    /// Still waiting on the source.
    Pending,
    /// The source answered.
    Ready(String),
    /// The task ended without answering.
    Abandoned,
}

/// Handle on a reply being produced on a Tokio runtime.
#[derive(Debug)]
pub struct WordRequest {
    prompt: String,
    receiver: oneshot::Receiver<String>,
}

impl WordRequest {
    /// Starts asking `source` on the given runtime.
    pub fn spawn(source: Arc<dyn WordSource>, prompt: impl Into<String>, runtime: &Handle) -> Self {
        let prompt = prompt.into();
        let (sender, receiver) = oneshot::channel();
        let task_prompt = prompt.clone();
        runtime.spawn(async move {
            let reply = source.reply(&task_prompt).await;
            // The driver may have moved on to another request.
            let _ = sender.send(reply);
        });
        log::debug!("Requested a reply to \"{prompt}\"");
        Self { prompt, receiver }
    }

    /// The text the source was asked about.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Checks for the reply without blocking.
    pub fn poll(&mut self) -> RequestPoll {
        match self.receiver.try_recv() {
            Ok(reply) => RequestPoll::Ready(reply),
            Err(TryRecvError::Empty) => RequestPoll::Pending,
            Err(TryRecvError::Closed) => RequestPoll::Abandoned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterfall_core::word::FixedReply;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn resolves_once_the_source_answers() {
        let source: Arc<dyn WordSource> = Arc::new(FixedReply("hello".to_string()));
        let mut request = WordRequest::spawn(source, "hi", &Handle::current());
        assert_eq!(request.prompt(), "hi");

        let mut outcome = RequestPoll::Pending;
        for _ in 0..200 {
            outcome = request.poll();
            if outcome != RequestPoll::Pending {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(outcome, RequestPoll::Ready("hello".to_string()));
    }
}
