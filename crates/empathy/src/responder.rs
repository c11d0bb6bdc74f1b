use crate::emotion::EmotionAnalysis;
use crate::lexicon::Emotion;
use llm::{ChatMessage, GenerationParams, LlmBackend};
use std::sync::Arc;
use tracing::warn;

/// Generates replies that acknowledge the user's emotional state
pub struct EmpatheticResponder {
    backend: Arc<dyn LlmBackend>,
    model: String,
    params: GenerationParams,
}

impl EmpatheticResponder {
    pub fn new(backend: Arc<dyn LlmBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            params: GenerationParams::new(0.7, 500),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Backend reply guided by the analysis, or a fixed per-emotion reply if the backend fails
    pub async fn generate_empathetic_response(
        &self,
        user_message: &str,
        analysis: &EmotionAnalysis,
        context: Option<&str>,
    ) -> String {
        let prompt = build_prompt(user_message, analysis, context);
        let messages = [ChatMessage::user(prompt)];

        match self.backend.generate(&messages, &self.model, &self.params).await {
            Ok(response) if !response.content.trim().is_empty() => response.content,
            Ok(_) => {
                warn!("Empty empathetic reply from {}, using fallback", self.model);
                fallback_response(analysis.primary_emotion).to_string()
            }
            Err(e) => {
                warn!("Empathetic reply failed, using fallback: {}", e);
                fallback_response(analysis.primary_emotion).to_string()
            }
        }
    }
}

fn build_prompt(user_message: &str, analysis: &EmotionAnalysis, context: Option<&str>) -> String {
    let tones = if analysis.tone_indicators.is_empty() {
        "none".to_string()
    } else {
        analysis
            .tone_indicators
            .iter()
            .map(|(tone, terms)| format!("{:?}: {}", tone, terms.join(", ")).to_lowercase())
            .collect::<Vec<_>>()
            .join("; ")
    };

    format!(
        "Generate an empathetic response to this user message:\n\n\
         User Message: \"{user_message}\"\n\n\
         Emotion Analysis:\n\
         - Primary Emotion: {}\n\
         - Sentiment: {}\n\
         - Intensity: {}\n\
         - Tone Indicators: {tones}\n\n\
         Context: {}\n\n\
         Acknowledge the user's emotional state, validate it, and be supportive and helpful. \
         Match tone and language to the emotion and intensity.",
        analysis.primary_emotion,
        analysis.sentiment,
        analysis.intensity,
        context.unwrap_or("General conversation"),
    )
}

/// Fixed reply per primary emotion
pub fn fallback_response(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Happy => "I'm so glad to hear that! Your positive energy is wonderful. What's making you feel this way?",
        Emotion::Sad => "I'm sorry to hear you're feeling this way. It's okay to feel sad, and I'm here to listen and support you.",
        Emotion::Angry => "I can understand why you'd feel angry about this. Your frustration is completely valid, and I'm here to help.",
        Emotion::Fear => "I can sense that you're feeling anxious or scared. It's completely normal to feel this way, and I'm here to help.",
        _ => "I understand what you're sharing. How can I best help you with this situation?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::EmotionAnalyzer;
    use common::ProviderErrorKind;
    use llm::testing::ScriptedBackend;

    #[tokio::test]
    async fn test_backend_reply_is_used() {
        let backend = Arc::new(ScriptedBackend::new().with_reply("gpt-4o", "That sounds hard."));
        let responder = EmpatheticResponder::new(backend.clone(), "gpt-4o");
        let analysis = EmotionAnalyzer::analyze_keywords("I feel so down");

        let reply = responder
            .generate_empathetic_response("I feel so down", &analysis, Some("support chat"))
            .await;
        assert_eq!(reply, "That sounds hard.");

        let prompt = &backend.calls()[0].messages[0].content;
        assert!(prompt.contains("Primary Emotion: sad"));
        assert!(prompt.contains("Context: support chat"));
    }

    #[tokio::test]
    async fn test_fallback_per_emotion() {
        let backend = Arc::new(ScriptedBackend::new().with_default_failure(ProviderErrorKind::Network));
        let responder = EmpatheticResponder::new(backend, "gpt-4o");

        let angry = EmotionAnalyzer::analyze_keywords("I'm furious");
        let reply = responder.generate_empathetic_response("I'm furious", &angry, None).await;
        assert_eq!(reply, fallback_response(Emotion::Angry));

        let surprised = EmotionAnalyzer::analyze_keywords("I'm shocked");
        let reply = responder.generate_empathetic_response("I'm shocked", &surprised, None).await;
        assert_eq!(reply, fallback_response(Emotion::Neutral));
    }
}
