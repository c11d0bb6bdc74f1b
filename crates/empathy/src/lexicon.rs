//! Fixed vocabularies behind the emotion and tone heuristics

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Fear,
    Surprise,
    Disgust,
    Neutral,
}

impl Emotion {
    /// Declaration order, which is also the tie-break order
    pub const ALL: [Emotion; 7] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Disgust,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
            Emotion::Disgust => "disgust",
            Emotion::Neutral => "neutral",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Emotion::Happy => &[
                "happy", "joy", "excited", "glad", "cheerful", "delighted", "pleased", "thrilled",
            ],
            Emotion::Sad => &[
                "sad", "unhappy", "depressed", "down", "miserable", "gloomy", "melancholy",
            ],
            Emotion::Angry => &[
                "angry", "mad", "furious", "irritated", "annoyed", "frustrated", "upset",
            ],
            Emotion::Fear => &[
                "afraid", "scared", "terrified", "anxious", "worried", "nervous", "fearful",
            ],
            Emotion::Surprise => &[
                "surprised", "amazed", "astonished", "shocked", "startled", "stunned",
            ],
            Emotion::Disgust => &["disgusted", "revolted", "sickened", "repulsed", "appalled"],
            Emotion::Neutral => &["okay", "fine", "normal", "average", "standard"],
        }
    }

    pub fn sentiment(&self) -> Sentiment {
        match self {
            Emotion::Happy | Emotion::Surprise => Sentiment::Positive,
            Emotion::Sad | Emotion::Angry | Emotion::Fear | Emotion::Disgust => Sentiment::Negative,
            Emotion::Neutral => Sentiment::Neutral,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Emotion::ALL
            .iter()
            .find(|e| e.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown emotion '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        })
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(format!("unknown sentiment '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    /// ≥3 matches is high, 2 is medium, anything less is low
    pub fn from_match_count(count: usize) -> Self {
        match count {
            c if c >= 3 => Intensity::High,
            2 => Intensity::Medium,
            _ => Intensity::Low,
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        })
    }
}

impl FromStr for Intensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "high" => Ok(Intensity::High),
            other => Err(format!("unknown intensity '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneCategory {
    Urgent,
    Frustrated,
    Confused,
    Grateful,
    Apologetic,
}

impl ToneCategory {
    pub const ALL: [ToneCategory; 5] = [
        ToneCategory::Urgent,
        ToneCategory::Frustrated,
        ToneCategory::Confused,
        ToneCategory::Grateful,
        ToneCategory::Apologetic,
    ];

    pub fn indicators(&self) -> &'static [&'static str] {
        match self {
            ToneCategory::Urgent => &["asap", "urgent", "immediately", "right now", "quickly", "hurry"],
            ToneCategory::Frustrated => &["ugh", "seriously", "again", "this is ridiculous", "why is this"],
            ToneCategory::Confused => &["i don't understand", "confused", "what do you mean", "huh", "explain"],
            ToneCategory::Grateful => &["thank you", "thanks", "appreciate", "grateful", "helpful"],
            ToneCategory::Apologetic => &["sorry", "apologies", "my fault", "i apologize", "forgive me"],
        }
    }
}

/// Lowercase-insensitive substring presence of each term, in lexicon order
pub fn matched_terms(text_lower: &str, terms: &[&'static str]) -> Vec<&'static str> {
    terms
        .iter()
        .filter(|t| text_lower.contains(&t.to_lowercase()))
        .copied()
        .collect()
}
