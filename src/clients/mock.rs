use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::{core::LowLevelClient, error::AIError};

/// A scripted reply for `MockClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    Success(String),
    Failure(String),
}

/// Shared control surface of a `MockClient`: queue replies and inspect the
/// prompts that reached the "service".
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<String>>,
    fallback: Mutex<Option<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockHandle {
    pub fn push(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    pub fn push_success(&self, text: impl Into<String>) {
        self.push(MockResponse::Success(text.into()));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.push(MockResponse::Failure(message.into()));
    }

    /// Reply used once the queue is empty.
    pub fn set_fallback(&self, text: impl Into<String>) {
        *lock(&self.fallback) = Some(text.into());
    }

    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        lock(&self.prompts).last().cloned()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }
}

/// Mock client for tests and offline runs. Replies are consumed in order; an
/// exhausted queue answers with the fallback, or an empty string.
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::default(),
            fallback: Mutex::default(),
        });
        (Self { handle: Arc::clone(&handle) }, handle)
    }
}

#[async_trait]
impl LowLevelClient for MockClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        debug!(prompt_len = prompt.len(), "Mock client received prompt");
        lock(&self.handle.prompts).push(prompt);

        match lock(&self.handle.responses).pop_front() {
            Some(MockResponse::Success(text)) => Ok(text),
            Some(MockResponse::Failure(message)) => Err(AIError::Mock(message)),
            None => Ok(lock(&self.handle.fallback).clone().unwrap_or_default()),
        }
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
