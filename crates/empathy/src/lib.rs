//! Emotion, tone, communication-style and escalation heuristics.

pub mod adaptation;
pub mod emotion;
pub mod escalation;
pub mod lexicon;
pub mod overlay;
pub mod responder;
pub mod tone;

pub use adaptation::{adapt_communication, CommunicationAdaptation, Directness, Formality, Level, Pace};
pub use emotion::{EmotionAnalysis, EmotionAnalyzer, OverlaySettings};
pub use escalation::{should_escalate, EscalationChecks, EscalationPolicy};
pub use lexicon::{Emotion, Intensity, Sentiment, ToneCategory};
pub use responder::EmpatheticResponder;
pub use tone::{ToneAnalyzer, ToneIndicators};

/// Lexicon tone indicators for `text`
pub fn analyze_tone(text: &str) -> ToneIndicators {
    ToneAnalyzer::analyze(text)
}
