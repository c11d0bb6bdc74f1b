//! Chat pipeline: emotion analysis, style adaptation and escalation run
//! alongside orchestration for conversational requests.

use crate::config::RoutingConfig;
use crate::selector::{ModelSelector, OrchestrationContext, OrchestrationResult};
use async_trait::async_trait;
use common::OrchestrationError;
use empathy::{
    adapt_communication, should_escalate, CommunicationAdaptation, EmotionAnalysis,
    EmotionAnalyzer,
};
use llm::{ChatMessage, MessageRole};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Supplies prior messages of a conversation, oldest first
#[async_trait]
pub trait ConversationHistory: Send + Sync {
    async fn recent_messages(&self, conversation_id: &str, limit: usize) -> anyhow::Result<Vec<ChatMessage>>;
}

#[derive(Debug, Default)]
pub struct InMemoryHistory {
    conversations: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, conversation_id: &str, message: ChatMessage) {
        self.conversations
            .write()
            .entry(conversation_id.to_string())
            .or_default()
            .push(message);
    }
}

#[async_trait]
impl ConversationHistory for InMemoryHistory {
    async fn recent_messages(&self, conversation_id: &str, limit: usize) -> anyhow::Result<Vec<ChatMessage>> {
        let conversations = self.conversations.read();
        let messages = conversations.get(conversation_id).cloned().unwrap_or_default();
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }
}

/// Everything produced for one chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub orchestration: OrchestrationResult,
    pub emotion: EmotionAnalysis,
    pub adaptation: CommunicationAdaptation,
    pub escalate: bool,
}

pub struct ChatEngine {
    selector: Arc<ModelSelector>,
    analyzer: EmotionAnalyzer,
    history: Option<Arc<dyn ConversationHistory>>,
    history_limit: usize,
}

impl ChatEngine {
    pub fn new(selector: Arc<ModelSelector>, analyzer: EmotionAnalyzer) -> Self {
        Self {
            selector,
            analyzer,
            history: None,
            history_limit: 20,
        }
    }

    pub fn with_history(mut self, history: Arc<dyn ConversationHistory>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    async fn load_history(&self, conversation_id: Option<&str>) -> Vec<ChatMessage> {
        let (Some(history), Some(id)) = (&self.history, conversation_id) else {
            return Vec::new();
        };

        match history.recent_messages(id, self.history_limit).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Could not load history for {}: {}", id, e);
                Vec::new()
            }
        }
    }

    pub async fn respond(
        &self,
        conversation_id: Option<&str>,
        user_message: &str,
        config: &RoutingConfig,
        context: Option<&OrchestrationContext>,
    ) -> Result<ChatTurn, OrchestrationError> {
        let history = self.load_history(conversation_id).await;

        let emotion = self.analyzer.analyze(user_message).await;
        let adaptation = adapt_communication(&emotion);
        let escalate = should_escalate(user_message, &emotion, Some(&history));
        debug!("Chat emotion: {}", emotion.summary());

        let mut messages = history
            .into_iter()
            .filter(|m| m.role != MessageRole::System)
            .collect::<Vec<_>>();
        messages.push(ChatMessage::system(style_hint(&emotion, &adaptation)));
        messages.push(ChatMessage::user(user_message));

        let orchestration = self.selector.orchestrate(&messages, config, context).await?;

        Ok(ChatTurn {
            orchestration,
            emotion,
            adaptation,
            escalate,
        })
    }
}

fn style_hint(emotion: &EmotionAnalysis, adaptation: &CommunicationAdaptation) -> String {
    let style = serde_json::to_string(adaptation).unwrap_or_default();
    format!(
        "User emotional state: {}. Adapt your reply to this communication style: {}",
        emotion.summary(),
        style
    )
}
