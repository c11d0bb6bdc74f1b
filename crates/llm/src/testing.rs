//! Scripted in-process backend shared by the workspace's tests and offline demos

use crate::providers::{BackendResponse, ChatMessage, GenerationParams, LlmBackend, TokenUsage};
use async_trait::async_trait;
use common::{ProviderError, ProviderErrorKind, ProviderResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Script {
    Reply(String),
    Fail(ProviderErrorKind),
}

/// One observed `generate` call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub params: GenerationParams,
}

/// Backend returning canned replies or failures per model id
#[derive(Debug)]
pub struct ScriptedBackend {
    name: String,
    scripts: HashMap<String, Script>,
    delays: HashMap<String, Duration>,
    fallback: Option<Script>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::named("scripted")
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scripts: HashMap::new(),
            delays: HashMap::new(),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(mut self, model: impl Into<String>, content: impl Into<String>) -> Self {
        self.scripts.insert(model.into(), Script::Reply(content.into()));
        self
    }

    pub fn with_failure(mut self, model: impl Into<String>, kind: ProviderErrorKind) -> Self {
        self.scripts.insert(model.into(), Script::Fail(kind));
        self
    }

    pub fn with_delay(mut self, model: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(model.into(), delay);
        self
    }

    /// Reply used for models with no script of their own
    pub fn with_default_reply(mut self, content: impl Into<String>) -> Self {
        self.fallback = Some(Script::Reply(content.into()));
        self
    }

    pub fn with_default_failure(mut self, kind: ProviderErrorKind) -> Self {
        self.fallback = Some(Script::Fail(kind));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, model: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.model == model).count()
    }

    pub fn called_models(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.model.clone()).collect()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        model: &str,
        params: &GenerationParams,
    ) -> ProviderResult<BackendResponse> {
        self.calls.lock().push(RecordedCall {
            model: model.to_string(),
            messages: messages.to_vec(),
            params: params.clone(),
        });

        if let Some(delay) = self.delays.get(model) {
            tokio::time::sleep(*delay).await;
        }

        let script = self.scripts.get(model).or(self.fallback.as_ref());
        match script {
            Some(Script::Reply(content)) => {
                let prompt_words: usize = messages
                    .iter()
                    .map(|m| m.content.split_whitespace().count())
                    .sum();
                let usage = TokenUsage::new(
                    prompt_words as u32,
                    content.split_whitespace().count() as u32,
                );
                Ok(BackendResponse {
                    content: content.clone(),
                    usage,
                    provider: self.name.clone(),
                    model: model.to_string(),
                })
            }
            Some(Script::Fail(kind)) => Err(ProviderError::new(
                self.name.clone(),
                *kind,
                format!("scripted failure for '{}'", model),
            )),
            None => Err(ProviderError::not_configured(self.name.clone(), model)),
        }
    }
}
