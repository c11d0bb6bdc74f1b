use crate::lexicon::{matched_terms, Emotion, Intensity, Sentiment};
use crate::overlay::{build_prompt, parse_overlay, DEFAULT_OVERLAY_CONFIDENCE};
use crate::tone::{ToneAnalyzer, ToneIndicators};
use llm::{ChatMessage, GenerationParams, LlmBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Confidence attached to keyword-only analyses
pub const KEYWORD_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionAnalysis {
    pub primary_emotion: Emotion,
    pub secondary_emotions: Vec<Emotion>,
    pub sentiment: Sentiment,
    pub intensity: Intensity,
    pub confidence: f64,
    pub keywords_found: Vec<String>,
    pub tone_indicators: ToneIndicators,
}

impl EmotionAnalysis {
    pub fn neutral() -> Self {
        Self {
            primary_emotion: Emotion::Neutral,
            secondary_emotions: Vec::new(),
            sentiment: Sentiment::Neutral,
            intensity: Intensity::Low,
            confidence: KEYWORD_CONFIDENCE,
            keywords_found: Vec::new(),
            tone_indicators: ToneIndicators::new(),
        }
    }

    /// One-line summary suitable for a system hint
    pub fn summary(&self) -> String {
        format!(
            "primary emotion: {}, sentiment: {}, intensity: {}",
            self.primary_emotion, self.sentiment, self.intensity
        )
    }
}

/// Language-model opinion layered over the keyword analysis
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.3,
            max_tokens: 300,
        }
    }
}

/// Two-tier emotion analysis: keyword lexicon, then an optional model overlay
#[derive(Clone, Default)]
pub struct EmotionAnalyzer {
    overlay: Option<(Arc<dyn LlmBackend>, OverlaySettings)>,
}

impl EmotionAnalyzer {
    /// Keyword tier only
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overlay(backend: Arc<dyn LlmBackend>, settings: OverlaySettings) -> Self {
        Self {
            overlay: Some((backend, settings)),
        }
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Never fails: overlay problems fall back to the keyword result
    pub async fn analyze(&self, text: &str) -> EmotionAnalysis {
        let base = Self::analyze_keywords(text);

        let Some((backend, settings)) = &self.overlay else {
            return base;
        };

        let messages = [ChatMessage::user(build_prompt(text))];
        let params = GenerationParams::new(settings.temperature, settings.max_tokens);

        let response = match backend.generate(&messages, &settings.model, &params).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Emotion overlay unavailable, using keyword analysis: {}", e);
                return base;
            }
        };

        match parse_overlay(&response.content) {
            Ok(fields) => {
                debug!("Emotion overlay fields: {:?}", fields);
                EmotionAnalysis {
                    primary_emotion: fields.primary_emotion.unwrap_or(base.primary_emotion),
                    secondary_emotions: fields.secondary_emotions.unwrap_or(base.secondary_emotions),
                    sentiment: fields.sentiment.unwrap_or(base.sentiment),
                    intensity: fields.intensity.unwrap_or(base.intensity),
                    confidence: fields.confidence.unwrap_or(DEFAULT_OVERLAY_CONFIDENCE),
                    keywords_found: base.keywords_found,
                    tone_indicators: base.tone_indicators,
                }
            }
            Err(e) => {
                warn!("Could not parse emotion overlay, using keyword analysis: {}", e);
                base
            }
        }
    }

    /// Keyword tier. Pure; a category's count is the number of its terms present.
    pub fn analyze_keywords(text: &str) -> EmotionAnalysis {
        let lower = text.to_lowercase();

        let mut counts: Vec<(Emotion, usize)> = Vec::new();
        let mut keywords_found: Vec<String> = Vec::new();

        for emotion in Emotion::ALL {
            let found = matched_terms(&lower, emotion.keywords());
            if !found.is_empty() {
                counts.push((emotion, found.len()));
                keywords_found.extend(found.into_iter().map(str::to_string));
            }
        }

        let (primary_emotion, max_count) = counts
            .iter()
            .fold(None, |best: Option<(Emotion, usize)>, &(e, c)| match best {
                Some((_, bc)) if c <= bc => best,
                _ => Some((e, c)),
            })
            .unwrap_or((Emotion::Neutral, 0));

        let secondary_emotions = counts
            .iter()
            .map(|(e, _)| *e)
            .filter(|e| *e != primary_emotion)
            .collect();

        EmotionAnalysis {
            primary_emotion,
            secondary_emotions,
            sentiment: primary_emotion.sentiment(),
            intensity: Intensity::from_match_count(max_count),
            confidence: KEYWORD_CONFIDENCE,
            keywords_found,
            tone_indicators: ToneAnalyzer::analyze(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::ToneCategory;
    use common::ProviderErrorKind;
    use llm::testing::ScriptedBackend;

    #[test]
    fn test_happy_medium() {
        let analysis = EmotionAnalyzer::analyze_keywords("I am so happy and excited today");
        assert_eq!(analysis.primary_emotion, Emotion::Happy);
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.intensity, Intensity::Medium);
        assert_eq!(analysis.keywords_found, vec!["happy", "excited"]);
        assert_eq!(analysis.confidence, KEYWORD_CONFIDENCE);
    }

    #[test]
    fn test_no_keywords_is_neutral() {
        let analysis = EmotionAnalyzer::analyze_keywords("The report is attached.");
        assert_eq!(analysis.primary_emotion, Emotion::Neutral);
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert_eq!(analysis.intensity, Intensity::Low);
        assert!(analysis.secondary_emotions.is_empty());
    }

    #[test]
    fn test_ties_follow_declaration_order() {
        // one sad term, one angry term
        let analysis = EmotionAnalyzer::analyze_keywords("I'm miserable and furious");
        assert_eq!(analysis.primary_emotion, Emotion::Sad);
        assert_eq!(analysis.secondary_emotions, vec![Emotion::Angry]);
        assert_eq!(analysis.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_high_intensity_and_tones() {
        let analysis =
            EmotionAnalyzer::analyze_keywords("I'm ANGRY, furious and frustrated. Fix it ASAP");
        assert_eq!(analysis.primary_emotion, Emotion::Angry);
        assert_eq!(analysis.intensity, Intensity::High);
        assert!(analysis.tone_indicators.contains_key(&ToneCategory::Urgent));
    }

    #[tokio::test]
    async fn test_overlay_overrides_fields() {
        let backend = Arc::new(ScriptedBackend::new().with_reply(
            "gpt-4o",
            "Primary emotion: fear\nSentiment: negative\nIntensity: high\nConfidence: 0.9",
        ));
        let analyzer = EmotionAnalyzer::with_overlay(backend.clone(), OverlaySettings::default());

        let analysis = analyzer.analyze("I am so happy and excited today").await;
        assert_eq!(analysis.primary_emotion, Emotion::Fear);
        assert_eq!(analysis.intensity, Intensity::High);
        assert_eq!(analysis.confidence, 0.9);
        // untouched by the overlay
        assert_eq!(analysis.secondary_emotions, Vec::<Emotion>::new());
        assert_eq!(analysis.keywords_found, vec!["happy", "excited"]);

        let call = &backend.calls()[0];
        assert!((call.params.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_overlay_without_confidence_defaults() {
        let backend = Arc::new(ScriptedBackend::new().with_reply("gpt-4o", "Sentiment: neutral"));
        let analyzer = EmotionAnalyzer::with_overlay(backend, OverlaySettings::default());

        let analysis = analyzer.analyze("I am happy").await;
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert_eq!(analysis.primary_emotion, Emotion::Happy);
        assert_eq!(analysis.confidence, DEFAULT_OVERLAY_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_overlay_failures_are_absorbed() {
        let text = "I'm worried and nervous";
        let expected = EmotionAnalyzer::analyze_keywords(text);

        let failing = Arc::new(ScriptedBackend::new().with_failure("gpt-4o", ProviderErrorKind::Timeout));
        let analyzer = EmotionAnalyzer::with_overlay(failing, OverlaySettings::default());
        assert_eq!(analyzer.analyze(text).await, expected);

        let rambling = Arc::new(ScriptedBackend::new().with_reply("gpt-4o", "They seem worried."));
        let analyzer = EmotionAnalyzer::with_overlay(rambling, OverlaySettings::default());
        assert_eq!(analyzer.analyze(text).await, expected);
    }
}
