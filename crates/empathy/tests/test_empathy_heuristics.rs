use empathy::{
    adapt_communication, analyze_tone, should_escalate, Emotion, EmotionAnalysis,
    EmotionAnalyzer, Intensity, Pace, Sentiment, ToneCategory,
};
use llm::ChatMessage;
use proptest::prelude::*;
use rstest::*;

#[rstest]
#[case("I am so happy and excited today", Emotion::Happy, Sentiment::Positive, Intensity::Medium)]
#[case("I'm sad, depressed and miserable", Emotion::Sad, Sentiment::Negative, Intensity::High)]
#[case("I was shocked", Emotion::Surprise, Sentiment::Positive, Intensity::Low)]
#[case("That's disgusting, I'm appalled", Emotion::Disgust, Sentiment::Negative, Intensity::Low)]
#[case("It's fine, pretty normal", Emotion::Neutral, Sentiment::Neutral, Intensity::Medium)]
#[case("Meeting moved to 3pm", Emotion::Neutral, Sentiment::Neutral, Intensity::Low)]
fn test_keyword_analysis_cases(
    #[case] text: &str,
    #[case] emotion: Emotion,
    #[case] sentiment: Sentiment,
    #[case] intensity: Intensity,
) {
    let analysis = EmotionAnalyzer::analyze_keywords(text);
    assert_eq!(analysis.primary_emotion, emotion);
    assert_eq!(analysis.sentiment, sentiment);
    assert_eq!(analysis.intensity, intensity);
}

#[rstest]
#[case("I need help, this is an emergency", true)]
#[case("I'm desperate", true)]
#[case("Could you summarise this article?", false)]
fn test_escalation_keywords(#[case] message: &str, #[case] expected: bool) {
    let analysis = EmotionAnalyzer::analyze_keywords(message);
    assert_eq!(should_escalate(message, &analysis, None), expected);
}

#[tokio::test]
async fn test_analyzer_without_overlay_matches_keyword_tier() {
    let analyzer = EmotionAnalyzer::new();
    let text = "Ugh, seriously? I'm annoyed and irritated, fix it quickly";
    let analysis = analyzer.analyze(text).await;

    assert_eq!(analysis, EmotionAnalyzer::analyze_keywords(text));
    assert_eq!(analysis.primary_emotion, Emotion::Angry);
    assert!(analysis.tone_indicators.contains_key(&ToneCategory::Frustrated));

    let style = adapt_communication(&analysis);
    assert_eq!(style.pace, Pace::Faster);
}

#[test]
fn test_history_check_runs_even_for_calm_message() {
    let history: Vec<ChatMessage> = ["angry", "upset again", "so frustrated"]
        .iter()
        .map(|t| ChatMessage::user(*t))
        .collect();
    assert!(should_escalate(
        "ok",
        &EmotionAnalysis::neutral(),
        Some(&history)
    ));
}

proptest! {
    #[test]
    fn test_tone_analysis_is_idempotent(text in "[a-zA-Z' ,.!?]{0,120}") {
        prop_assert_eq!(analyze_tone(&text), analyze_tone(&text));
    }

    #[test]
    fn test_keyword_analysis_invariants(text in "[a-zA-Z' ,.!?]{0,200}") {
        let first = EmotionAnalyzer::analyze_keywords(&text);
        let second = EmotionAnalyzer::analyze_keywords(&text);
        prop_assert_eq!(&first, &second);

        prop_assert!((0.0..=1.0).contains(&first.confidence));
        prop_assert!(!first.secondary_emotions.contains(&first.primary_emotion));
        prop_assert_eq!(first.sentiment, first.primary_emotion.sentiment());
        for terms in first.tone_indicators.values() {
            prop_assert!(!terms.is_empty());
        }
    }

    #[test]
    fn test_async_analysis_never_panics(text in "\\PC{0,200}") {
        let analysis = tokio_test::block_on(EmotionAnalyzer::new().analyze(&text));
        prop_assert!((0.0..=1.0).contains(&analysis.confidence));
    }
}
