use crate::emotion::EmotionAnalysis;
use crate::lexicon::{Emotion, Intensity, Sentiment};
use llm::{ChatMessage, MessageRole};
use serde::Serialize;
use tracing::info;

const ESCALATION_KEYWORDS: &[&str] = &["help", "emergency", "urgent", "desperate"];
const NEGATIVE_HISTORY_KEYWORDS: &[&str] = &["angry", "frustrated", "upset", "disappointed"];
const HISTORY_WINDOW: usize = 5;
const NEGATIVE_HISTORY_THRESHOLD: usize = 3;
const LONG_MESSAGE_CHARS: usize = 500;

/// Which escalation checks fired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationChecks {
    pub intense_distress: bool,
    pub intense_negativity: bool,
    pub keyword: bool,
    pub long_negative_message: bool,
    pub negative_history: bool,
}

impl EscalationChecks {
    pub fn any(&self) -> bool {
        self.intense_distress
            || self.intense_negativity
            || self.keyword
            || self.long_negative_message
            || self.negative_history
    }
}

/// Decides whether a conversation should be handed to a human
pub struct EscalationPolicy;

impl EscalationPolicy {
    /// Evaluate every check; no short-circuiting
    pub fn evaluate(
        message: &str,
        analysis: &EmotionAnalysis,
        history: Option<&[ChatMessage]>,
    ) -> EscalationChecks {
        let lower = message.to_lowercase();
        let high = analysis.intensity == Intensity::High;
        let negative = analysis.sentiment == Sentiment::Negative;

        EscalationChecks {
            intense_distress: matches!(analysis.primary_emotion, Emotion::Angry | Emotion::Fear)
                && high,
            intense_negativity: negative && high,
            keyword: ESCALATION_KEYWORDS.iter().any(|k| lower.contains(k)),
            long_negative_message: message.chars().count() > LONG_MESSAGE_CHARS && negative,
            negative_history: history.map(negative_history).unwrap_or(false),
        }
    }

    pub fn should_escalate(
        message: &str,
        analysis: &EmotionAnalysis,
        history: Option<&[ChatMessage]>,
    ) -> bool {
        let checks = Self::evaluate(message, analysis, history);
        if checks.any() {
            info!("🚨 Escalation recommended: {:?}", checks);
        }
        checks.any()
    }
}

/// Among the last five entries, user messages carrying negative keywords
fn negative_history(history: &[ChatMessage]) -> bool {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let negative = history[start..]
        .iter()
        .filter(|m| m.role == MessageRole::User)
        .filter(|m| {
            let lower = m.content.to_lowercase();
            NEGATIVE_HISTORY_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .count();
    negative >= NEGATIVE_HISTORY_THRESHOLD
}

pub fn should_escalate(
    message: &str,
    analysis: &EmotionAnalysis,
    history: Option<&[ChatMessage]>,
) -> bool {
    EscalationPolicy::should_escalate(message, analysis, history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::EmotionAnalyzer;

    #[test]
    fn test_keywords_always_escalate() {
        let message = "I need help, this is an emergency";
        assert!(should_escalate(message, &EmotionAnalysis::neutral(), None));
        assert!(should_escalate("HELP", &EmotionAnalysis::neutral(), None));
    }

    #[test]
    fn test_calm_message_does_not_escalate() {
        let analysis = EmotionAnalyzer::analyze_keywords("Thanks, that works fine");
        assert!(!should_escalate("Thanks, that works fine", &analysis, None));
    }

    #[test]
    fn test_high_intensity_fear() {
        let text = "I'm scared, terrified and anxious";
        let analysis = EmotionAnalyzer::analyze_keywords(text);
        let checks = EscalationPolicy::evaluate(text, &analysis, None);
        assert!(checks.intense_distress);
        assert!(checks.intense_negativity);
        assert!(checks.any());
    }

    #[test]
    fn test_long_negative_message() {
        let text = format!("I am sad. {}", "x".repeat(500));
        let analysis = EmotionAnalyzer::analyze_keywords(&text);
        let checks = EscalationPolicy::evaluate(&text, &analysis, None);
        assert!(checks.long_negative_message);
        assert!(!checks.intense_negativity);
    }

    #[test]
    fn test_negative_history_window() {
        let history = vec![
            ChatMessage::user("I'm upset"),
            ChatMessage::assistant("Sorry to hear that"),
            ChatMessage::user("Still frustrated"),
            ChatMessage::assistant("Let me check"),
            ChatMessage::user("So disappointed"),
        ];
        let neutral = EmotionAnalysis::neutral();
        assert!(should_escalate("ok", &neutral, Some(&history)));

        // Only the last five entries count, and assistant entries never do
        let mut padded = history.clone();
        padded.push(ChatMessage::assistant("angry frustrated upset"));
        assert!(!should_escalate("ok", &neutral, Some(&padded)));
    }
}
