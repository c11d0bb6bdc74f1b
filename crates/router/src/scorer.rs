use crate::content::ContentSignals;

const ANALYSIS_MARKERS: &[&str] = &["analysis", "therefore", "conclusion"];

/// Scores a backend response against the request's content signals
pub struct ResponseScorer;

impl ResponseScorer {
    /// Base 0.5 plus fixed bonuses, capped at 1.0
    pub fn score(response: &str, signals: &ContentSignals) -> f64 {
        let mut score: f64 = 0.5;

        let length = response.chars().count();
        if (100..=1000).contains(&length) {
            score += 0.2;
        }

        if signals.has_code && response.contains("```") {
            score += 0.3;
        }

        if signals.is_creative && response.split_whitespace().count() > 50 {
            score += 0.2;
        }

        if signals.is_analytical {
            let lower = response.to_lowercase();
            if ANALYSIS_MARKERS.iter().any(|m| lower.contains(m)) {
                score += 0.2;
            }
        }

        score.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_score() {
        assert_eq!(ResponseScorer::score("short", &ContentSignals::default()), 0.5);
    }

    #[test]
    fn test_length_window() {
        let signals = ContentSignals::default();
        assert!((ResponseScorer::score(&"a".repeat(100), &signals) - 0.7).abs() < 1e-9);
        assert!((ResponseScorer::score(&"a".repeat(1000), &signals) - 0.7).abs() < 1e-9);
        assert_eq!(ResponseScorer::score(&"a".repeat(1001), &signals), 0.5);
    }

    #[test]
    fn test_code_block_bonus() {
        let signals = ContentSignals {
            has_code: true,
            ..Default::default()
        };
        let plain = "fn reverse(s: &str) -> String { s.chars().rev().collect() }";
        let fenced = format!("```rust\n{}\n```", plain);

        assert!(ResponseScorer::score(&fenced, &signals) >= ResponseScorer::score(plain, &signals));
        assert!((ResponseScorer::score(&fenced, &signals) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_capped() {
        let signals = ContentSignals {
            has_code: true,
            is_creative: true,
            is_analytical: true,
            ..Default::default()
        };
        let response = format!("```\ncode\n``` therefore {}", "word ".repeat(60));
        assert_eq!(ResponseScorer::score(&response, &signals), 1.0);
    }

    #[test]
    fn test_analysis_markers_case_insensitive() {
        let signals = ContentSignals {
            is_analytical: true,
            ..Default::default()
        };
        assert!((ResponseScorer::score("In Conclusion, yes.", &signals) - 0.7).abs() < 1e-9);
    }
}
