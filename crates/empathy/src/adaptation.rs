use crate::emotion::EmotionAnalysis;
use crate::lexicon::{Emotion, Intensity, ToneCategory};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    Neutral,
    Simpler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pace {
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "slower")]
    Slower,
    #[serde(rename = "calm")]
    Calm,
    #[serde(rename = "calmer")]
    Calmer,
    #[serde(rename = "energetic")]
    Energetic,
    #[serde(rename = "more energetic")]
    MoreEnergetic,
    #[serde(rename = "faster")]
    Faster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directness {
    #[serde(rename = "balanced")]
    Balanced,
    #[serde(rename = "gentle")]
    Gentle,
    #[serde(rename = "diplomatic")]
    Diplomatic,
    #[serde(rename = "enthusiastic")]
    Enthusiastic,
    #[serde(rename = "more direct")]
    MoreDirect,
    #[serde(rename = "clearer")]
    Clearer,
}

/// Communication style to use when replying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationAdaptation {
    pub formality: Formality,
    pub pace: Pace,
    pub empathy_level: Level,
    pub directness: Directness,
    pub support_level: Level,
}

impl Default for CommunicationAdaptation {
    fn default() -> Self {
        Self {
            formality: Formality::Neutral,
            pace: Pace::Normal,
            empathy_level: Level::Medium,
            directness: Directness::Balanced,
            support_level: Level::Medium,
        }
    }
}

impl CommunicationAdaptation {
    /// Emotion overrides, then intensity, then tone; later stages win
    pub fn from_analysis(analysis: &EmotionAnalysis) -> Self {
        let mut style = Self::default();
        let emotion = analysis.primary_emotion;

        match emotion {
            Emotion::Sad | Emotion::Fear => {
                style.empathy_level = Level::High;
                style.support_level = Level::High;
                style.pace = Pace::Slower;
                style.directness = Directness::Gentle;
            }
            Emotion::Angry => {
                style.empathy_level = Level::High;
                style.pace = Pace::Calm;
                style.directness = Directness::Diplomatic;
                style.support_level = Level::High;
            }
            Emotion::Happy => {
                style.pace = Pace::Energetic;
                style.empathy_level = Level::Medium;
                style.directness = Directness::Enthusiastic;
            }
            _ => {}
        }

        if analysis.intensity == Intensity::High {
            style.empathy_level = Level::High;
            style.support_level = Level::High;
            style.pace = if matches!(emotion, Emotion::Angry | Emotion::Fear) {
                Pace::Calmer
            } else {
                Pace::MoreEnergetic
            };
        }

        if analysis.tone_indicators.contains_key(&ToneCategory::Urgent) {
            style.pace = Pace::Faster;
            style.directness = Directness::MoreDirect;
        }

        if analysis.tone_indicators.contains_key(&ToneCategory::Confused) {
            style.pace = Pace::Slower;
            style.directness = Directness::Clearer;
            style.formality = Formality::Simpler;
        }

        style
    }
}

/// Map an emotion analysis to a communication style
pub fn adapt_communication(analysis: &EmotionAnalysis) -> CommunicationAdaptation {
    CommunicationAdaptation::from_analysis(analysis)
}
