//! Over/under probability surrogates.
//!
//! Two cheap, uncalibrated distributions sit behind one [`DistributionModel`]:
//! a weighted scenario set around the projection and a tanh-shaped CDF. Both
//! return complementary over/under probabilities for a line.

use serde::{Deserialize, Serialize};

/// One point of a scenario set: `factor * projection` carries `weight`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPoint {
    pub factor: f64,
    pub weight: f64,
}

/// A concrete outcome value and its weight, after scaling by the projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub value: f64,
    pub probability: f64,
}

pub fn default_scenario_points() -> Vec<ScenarioPoint> {
    vec![
        ScenarioPoint { factor: 0.75, weight: 0.15 },
        ScenarioPoint { factor: 0.90, weight: 0.35 },
        ScenarioPoint { factor: 1.10, weight: 0.35 },
        ScenarioPoint { factor: 1.35, weight: 0.15 },
    ]
}

/// Tanh CDF stand-in: `P(under) = 0.5 * (1 + tanh(z * steepness))` with
/// `z = (line - projection) / spread`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TanhCurve {
    /// Spread as a share of the projection.
    pub spread_fraction: f64,
    /// Spread added regardless of the projection.
    pub spread_absolute: f64,
    /// Lower bound on the spread; must be positive.
    pub spread_floor: f64,
    pub steepness: f64,
}

impl Default for TanhCurve {
    fn default() -> Self {
        Self {
            spread_fraction: 0.15,
            spread_absolute: 0.0,
            spread_floor: 0.5,
            steepness: 0.8,
        }
    }
}

impl TanhCurve {
    pub fn spread(&self, projection: f64) -> f64 {
        (self.spread_fraction * projection + self.spread_absolute).max(self.spread_floor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverUnder {
    pub over: f64,
    pub under: f64,
}

impl OverUnder {
    fn from_over(over: f64) -> Self {
        let over = if over.is_finite() { over.clamp(0.0, 1.0) } else { 0.5 };
        Self {
            over,
            under: 1.0 - over,
        }
    }

    fn from_under(under: f64) -> Self {
        let under = if under.is_finite() { under.clamp(0.0, 1.0) } else { 0.5 };
        Self {
            over: 1.0 - under,
            under,
        }
    }
}

/// The implied distribution of a category's final total.
#[derive(Debug, Clone, PartialEq)]
pub enum DistributionModel {
    Scenarios(Vec<Scenario>),
    Tanh { projection: f64, curve: TanhCurve },
}

impl DistributionModel {
    pub fn scenarios(projection: f64, points: &[ScenarioPoint]) -> Self {
        Self::Scenarios(
            points
                .iter()
                .map(|p| Scenario {
                    value: projection * p.factor,
                    probability: p.weight,
                })
                .collect(),
        )
    }

    pub fn tanh(projection: f64, curve: TanhCurve) -> Self {
        Self::Tanh { projection, curve }
    }

    pub fn over_under(&self, line: f64) -> OverUnder {
        match self {
            Self::Scenarios(scenarios) => {
                let over = scenarios
                    .iter()
                    .filter(|s| s.value > line)
                    .map(|s| s.probability)
                    .sum::<f64>();
                OverUnder::from_over(over)
            }
            Self::Tanh { projection, curve } => {
                let z = (line - projection) / curve.spread(*projection);
                OverUnder::from_under(0.5 * (1.0 + (z * curve.steepness).tanh()))
            }
        }
    }

    /// Probability-weighted mean for scenario sets, the centre for the curve.
    pub fn expected_value(&self) -> f64 {
        match self {
            Self::Scenarios(scenarios) => weighted_mean(scenarios),
            Self::Tanh { projection, .. } => *projection,
        }
    }

    pub fn scenario_list(&self) -> Option<&[Scenario]> {
        match self {
            Self::Scenarios(scenarios) => Some(scenarios),
            Self::Tanh { .. } => None,
        }
    }
}

/// Probability-weighted mean of a scenario set.
pub fn weighted_mean(scenarios: &[Scenario]) -> f64 {
    scenarios.iter().map(|s| s.value * s.probability).sum()
}
