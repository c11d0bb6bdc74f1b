//! Free-text emotion opinion from a language model: prompt construction and
//! best-effort parsing of its labeled lines.

use crate::lexicon::{Emotion, Intensity, Sentiment};
use common::{ParseError, ParseResult};
use std::str::FromStr;

/// Confidence assumed when the overlay answered but gave no usable number
pub const DEFAULT_OVERLAY_CONFIDENCE: f64 = 0.8;

/// Fields the overlay managed to supply; absent fields keep the keyword result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayFields {
    pub primary_emotion: Option<Emotion>,
    pub secondary_emotions: Option<Vec<Emotion>>,
    pub sentiment: Option<Sentiment>,
    pub intensity: Option<Intensity>,
    pub confidence: Option<f64>,
}

impl OverlayFields {
    fn is_empty(&self) -> bool {
        self.primary_emotion.is_none()
            && self.secondary_emotions.is_none()
            && self.sentiment.is_none()
            && self.intensity.is_none()
            && self.confidence.is_none()
    }
}

pub fn build_prompt(text: &str) -> String {
    format!(
        "Analyze the emotional content of this text and provide a detailed analysis:\n\n\
         Text: \"{text}\"\n\n\
         Answer with one labeled line per field:\n\
         Primary emotion: one of happy, sad, angry, fear, surprise, disgust, neutral\n\
         Secondary emotions: comma-separated list, or none\n\
         Sentiment: positive, negative or neutral\n\
         Intensity: low, medium or high\n\
         Confidence: a number between 0 and 1"
    )
}

const PRIMARY: &str = "primary emotion:";
const SECONDARY: &str = "secondary emotions:";
const SENTIMENT: &str = "sentiment:";
const INTENSITY: &str = "intensity:";
const CONFIDENCE: &str = "confidence:";

/// Locate the fixed label prefixes line by line; the first label found on a line wins
pub fn parse_overlay(response: &str) -> ParseResult<OverlayFields> {
    let mut fields = OverlayFields::default();
    let mut first_invalid: Option<(String, String)> = None;

    let mut reject = |field: &str, value: &str| {
        if first_invalid.is_none() {
            first_invalid = Some((field.to_string(), value.to_string()));
        }
    };

    for raw in response.lines() {
        let line = raw.trim().to_lowercase();

        if let Some(value) = value_after(&line, PRIMARY) {
            match first_word(value).and_then(|w| Emotion::from_str(&w).ok()) {
                Some(e) => fields.primary_emotion = Some(e),
                None => reject("primary emotion", value),
            }
        } else if let Some(value) = value_after(&line, SECONDARY) {
            match parse_emotion_list(value) {
                Some(list) => fields.secondary_emotions = Some(list),
                None => reject("secondary emotions", value),
            }
        } else if let Some(value) = value_after(&line, SENTIMENT) {
            match first_word(value).and_then(|w| Sentiment::from_str(&w).ok()) {
                Some(s) => fields.sentiment = Some(s),
                None => reject("sentiment", value),
            }
        } else if let Some(value) = value_after(&line, INTENSITY) {
            match first_word(value).and_then(|w| Intensity::from_str(&w).ok()) {
                Some(i) => fields.intensity = Some(i),
                None => reject("intensity", value),
            }
        } else if let Some(value) = value_after(&line, CONFIDENCE) {
            match parse_confidence(value) {
                Some(c) => fields.confidence = Some(c),
                None => reject("confidence", value),
            }
        }
    }

    if !fields.is_empty() {
        return Ok(fields);
    }

    match first_invalid {
        Some((field, value)) => Err(ParseError::InvalidValue { field, value }),
        None => Err(ParseError::NoLabeledFields),
    }
}

fn value_after<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.find(label).map(|idx| line[idx + label.len()..].trim())
}

fn first_word(value: &str) -> Option<String> {
    value
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .map(str::to_string)
}

/// "none" yields an empty list; unknown entries are skipped
fn parse_emotion_list(value: &str) -> Option<Vec<Emotion>> {
    let cleaned = value.trim_matches(|c: char| !c.is_alphanumeric());
    if cleaned.is_empty() || cleaned == "none" {
        return Some(Vec::new());
    }

    let list: Vec<Emotion> = value
        .split(|c: char| c == ',' || c == ';' || c == '/')
        .flat_map(|part| part.split(" and "))
        .filter_map(|part| first_word(part).and_then(|w| Emotion::from_str(&w).ok()))
        .collect();

    (!list.is_empty()).then_some(list)
}

/// Fractions and percentages; "85%" reads as 0.85
fn parse_confidence(value: &str) -> Option<f64> {
    let raw = value.split_whitespace().next()?;
    let token = raw.trim_end_matches(|c: char| !c.is_ascii_digit());
    let mut parsed: f64 = token.parse().ok()?;
    if raw[token.len()..].starts_with('%') {
        parsed /= 100.0;
    }
    parsed.is_finite().then(|| parsed.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let response = "1. Primary Emotion: Sad\n\
                        2. Secondary Emotions: fear, angry\n\
                        3. Sentiment: Negative\n\
                        4. Intensity: High\n\
                        5. Confidence: 0.92\n\
                        6. Key emotional indicators: 'down'";
        let fields = parse_overlay(response).unwrap();

        assert_eq!(fields.primary_emotion, Some(Emotion::Sad));
        assert_eq!(fields.secondary_emotions, Some(vec![Emotion::Fear, Emotion::Angry]));
        assert_eq!(fields.sentiment, Some(Sentiment::Negative));
        assert_eq!(fields.intensity, Some(Intensity::High));
        assert_eq!(fields.confidence, Some(0.92));
    }

    #[test]
    fn test_markdown_labels_and_none_list() {
        let response = "**Primary emotion:** happy.\n**Secondary emotions:** None";
        let fields = parse_overlay(response).unwrap();
        assert_eq!(fields.primary_emotion, Some(Emotion::Happy));
        assert_eq!(fields.secondary_emotions, Some(vec![]));
        assert_eq!(fields.confidence, None);
    }

    #[test]
    fn test_unparseable_confidence_is_dropped() {
        let fields = parse_overlay("Sentiment: positive\nConfidence: very high").unwrap();
        assert_eq!(fields.sentiment, Some(Sentiment::Positive));
        assert_eq!(fields.confidence, None);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let fields = parse_overlay("confidence: 7.5").unwrap();
        assert_eq!(fields.confidence, Some(1.0));
        let fields = parse_overlay("confidence: 0.85.").unwrap();
        assert_eq!(fields.confidence, Some(0.85));
    }

    #[test]
    fn test_percent_confidence_is_scaled() {
        let fields = parse_overlay("Confidence: 85%").unwrap();
        assert_eq!(fields.confidence, Some(0.85));
        let fields = parse_overlay("Confidence: 60% sure").unwrap();
        assert_eq!(fields.confidence, Some(0.6));
    }

    #[test]
    fn test_no_labels_is_error() {
        assert_eq!(
            parse_overlay("The user seems quite happy overall."),
            Err(ParseError::NoLabeledFields)
        );
    }

    #[test]
    fn test_only_invalid_values_is_error() {
        let err = parse_overlay("Primary emotion: ecstatic").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidValue {
                field: "primary emotion".to_string(),
                value: "ecstatic".to_string()
            }
        );
    }

    #[test]
    fn test_prompt_mentions_text() {
        assert!(build_prompt("hello world").contains("\"hello world\""));
    }
}
