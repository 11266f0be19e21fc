use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered confidence buckets, lowest first so `Ord` follows strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::VeryLow => "VERY_LOW",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::VeryHigh => "VERY_HIGH",
        };
        f.write_str(label)
    }
}

/// Lower bounds of the four upper buckets; anything below `low` is `VeryLow`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceCuts {
    pub very_high: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for ConfidenceCuts {
    fn default() -> Self {
        Self {
            very_high: 0.80,
            high: 0.70,
            medium: 0.60,
            low: 0.50,
        }
    }
}

impl ConfidenceCuts {
    pub fn classify(&self, probability: f64) -> Confidence {
        if probability >= self.very_high {
            Confidence::VeryHigh
        } else if probability >= self.high {
            Confidence::High
        } else if probability >= self.medium {
            Confidence::Medium
        } else if probability >= self.low {
            Confidence::Low
        } else {
            Confidence::VeryLow
        }
    }

    /// Classifies the emitted whole percent, so equal percents always share a label.
    pub fn classify_percent(&self, percent: u8) -> Confidence {
        self.classify(f64::from(percent) / 100.0)
    }

    pub fn is_strictly_decreasing(&self) -> bool {
        self.very_high <= 1.0
            && self.very_high > self.high
            && self.high > self.medium
            && self.medium > self.low
            && self.low > 0.0
    }
}

/// Probability as a whole percent, 0..=100. Non-finite input maps to 0.
pub fn probability_percent(p: f64) -> u8 {
    if !p.is_finite() {
        return 0;
    }
    (p * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cut_points() {
        let cuts = ConfidenceCuts::default();
        assert_eq!(cuts.classify(0.85), Confidence::VeryHigh);
        assert_eq!(cuts.classify(0.80), Confidence::VeryHigh);
        assert_eq!(cuts.classify(0.73), Confidence::High);
        assert_eq!(cuts.classify(0.60), Confidence::Medium);
        assert_eq!(cuts.classify(0.55), Confidence::Low);
        assert_eq!(cuts.classify(0.10), Confidence::VeryLow);
    }

    #[test]
    fn classification_never_decreases_with_probability() {
        let cuts = ConfidenceCuts::default();
        let mut last = Confidence::VeryLow;
        for i in 0..=1000 {
            let c = cuts.classify(i as f64 / 1000.0);
            assert!(c >= last);
            last = c;
        }
    }

    #[test]
    fn label_follows_the_rounded_percent() {
        let cuts = ConfidenceCuts::default();
        assert_eq!(probability_percent(0.796), 80);
        assert_eq!(cuts.classify_percent(probability_percent(0.796)), Confidence::VeryHigh);
        assert_eq!(cuts.classify_percent(80), cuts.classify(0.80));
        assert_eq!(cuts.classify_percent(70), Confidence::High);
        assert_eq!(cuts.classify_percent(69), Confidence::Medium);
        assert_eq!(cuts.classify_percent(0), Confidence::VeryLow);
    }

    #[test]
    fn wire_names_are_screaming_snake() {
        assert_eq!(serde_json::to_string(&Confidence::VeryHigh).unwrap(), "\"VERY_HIGH\"");
        assert_eq!(Confidence::Medium.to_string(), "MEDIUM");
    }
}
