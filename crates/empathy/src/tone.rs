use crate::lexicon::{matched_terms, ToneCategory};
use std::collections::BTreeMap;

/// Tone category -> matched indicator terms; categories without matches are absent
pub type ToneIndicators = BTreeMap<ToneCategory, Vec<String>>;

/// Lexicon tone-indicator extraction. Pure and idempotent.
pub struct ToneAnalyzer;

impl ToneAnalyzer {
    pub fn analyze(text: &str) -> ToneIndicators {
        let lower = text.to_lowercase();

        ToneCategory::ALL
            .iter()
            .filter_map(|tone| {
                let found = matched_terms(&lower, tone.indicators());
                (!found.is_empty())
                    .then(|| (*tone, found.into_iter().map(str::to_string).collect()))
            })
            .collect()
    }
}
