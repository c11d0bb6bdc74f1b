use llm::ChatMessage;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CODE_MARKERS: &[&str] = &["```", "function", "class", "def ", "import "];
const MATH_SYMBOLS: &[&str] = &["∑", "∫", "√", "π", "∞"];
const CREATIVE_KEYWORDS: &[&str] = &["creative", "story", "poem", "imagine", "design"];
const ANALYTICAL_KEYWORDS: &[&str] = &["analyze", "compare", "evaluate", "assess"];
const TECHNICAL_KEYWORDS: &[&str] = &["technical", "programming", "algorithm", "system"];
const VISION_KEYWORDS: &[&str] = &["image", "picture", "visual", "diagram"];

/// Above this many characters a request needs a long-context model
pub const LONG_CONTEXT_THRESHOLD: usize = 4000;

/// Request features used to match needs against model capabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSignals {
    /// Characters in the joined message text
    pub length: usize,
    pub has_code: bool,
    pub has_math: bool,
    pub is_creative: bool,
    pub is_analytical: bool,
    pub is_technical: bool,
    pub requires_vision: bool,
    pub requires_long_context: bool,
}

/// Stateless keyword-based signal extraction
pub struct ContentAnalyzer;

impl ContentAnalyzer {
    /// Extract signals from the space-joined content of every message. Pure and infallible.
    pub fn analyze(messages: &[ChatMessage]) -> ContentSignals {
        let combined = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let lower = combined.to_lowercase();
        let length = combined.chars().count();

        let signals = ContentSignals {
            length,
            has_code: contains_any(&lower, CODE_MARKERS),
            has_math: contains_any(&combined, MATH_SYMBOLS) || lower.contains("equation"),
            is_creative: contains_any(&lower, CREATIVE_KEYWORDS),
            is_analytical: contains_any(&lower, ANALYTICAL_KEYWORDS),
            is_technical: contains_any(&lower, TECHNICAL_KEYWORDS),
            requires_vision: contains_any(&lower, VISION_KEYWORDS),
            requires_long_context: length > LONG_CONTEXT_THRESHOLD,
        };

        debug!("🎯 Content signals: {:?}", signals);
        signals
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}
