use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::probability::DistributionModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Over,
    Under,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Over => "OVER",
            Self::Under => "UNDER",
        })
    }
}

/// Which lines a direction may be offered on, relative to the current total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineConstraint {
    Any,
    /// `line <= current + margin`
    NearCurrent { margin: f64 },
    /// `line > current`
    AboveCurrent,
}

impl LineConstraint {
    fn allows(&self, line: f64, current: f64) -> bool {
        match *self {
            Self::Any => true,
            Self::NearCurrent { margin } => line <= current + margin,
            Self::AboveCurrent => line > current,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRule {
    pub threshold: f64,
    pub constraint: LineConstraint,
}

impl LineRule {
    pub fn at(threshold: f64) -> Self {
        Self {
            threshold,
            constraint: LineConstraint::Any,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRules {
    pub over: LineRule,
    pub under: LineRule,
}

impl SelectionRules {
    pub fn symmetric(threshold: f64) -> Self {
        Self {
            over: LineRule::at(threshold),
            under: LineRule::at(threshold),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCandidate {
    pub line: f64,
    pub direction: Direction,
    pub probability: f64,
}

/// Scans `lines` in order and keeps the most probable accepted (line, direction).
/// A later candidate only replaces the incumbent when strictly more probable.
pub fn select_line(
    model: &DistributionModel,
    lines: &[f64],
    rules: &SelectionRules,
    current_total: f64,
) -> Option<LineCandidate> {
    let mut best: Option<LineCandidate> = None;

    for &line in lines {
        let p = model.over_under(line);
        trace!(line, over = p.over, under = p.under, "candidate line");

        for (direction, probability, rule) in [
            (Direction::Over, p.over, &rules.over),
            (Direction::Under, p.under, &rules.under),
        ] {
            if probability < rule.threshold || !rule.constraint.allows(line, current_total) {
                continue;
            }
            if best.is_some_and(|b| probability <= b.probability) {
                continue;
            }
            best = Some(LineCandidate {
                line,
                direction,
                probability,
            });
        }
    }

    best
}
