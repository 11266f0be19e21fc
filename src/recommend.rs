use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::confidence::Confidence;
pub use crate::confidence::probability_percent;
use crate::line_select::Direction;
use crate::probability::weighted_mean;
use crate::projection::MatchContext;
use crate::strategy::{Category, ProjectionResult};

/// Signal families shown to the user. Fouls and cards both report as
/// `CardPrediction`; [`Market`] tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BetType {
    CornerHighActivity,
    CardPrediction,
    GoalImminent,
    BothTeamsScore,
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CornerHighActivity => "CORNER_HIGH_ACTIVITY",
            Self::CardPrediction => "CARD_PREDICTION",
            Self::GoalImminent => "GOAL_IMMINENT",
            Self::BothTeamsScore => "BOTH_TEAMS_SCORE",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    Corners,
    Fouls,
    Goals,
    Cards,
    BothTeamsScore,
}

impl From<Category> for Market {
    fn from(category: Category) -> Self {
        match category {
            Category::Corners => Self::Corners,
            Category::Fouls => Self::Fouls,
            Category::Goals => Self::Goals,
            Category::Cards => Self::Cards,
        }
    }
}

impl Market {
    pub fn bet_type(self) -> BetType {
        match self {
            Self::Corners => BetType::CornerHighActivity,
            Self::Fouls | Self::Cards => BetType::CardPrediction,
            Self::Goals => BetType::GoalImminent,
            Self::BothTeamsScore => BetType::BothTeamsScore,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetRecommendation {
    pub bet_type: BetType,
    pub market: Market,
    pub description: String,
    /// Bucket of the emitted `probability`, not of the unrounded value.
    pub confidence: Confidence,
    /// Whole percent, 0..=100.
    pub probability: u8,
    pub reasoning: Vec<String>,
    pub threshold_reached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stats: Option<BTreeMap<String, f64>>,
    /// Line and direction for over/under markets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<f64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

fn context_fact(category: Category, ctx: &MatchContext<'_>) -> String {
    match category {
        Category::Corners => format!("Elapsed: {}'", ctx.elapsed),
        Category::Fouls => {
            let diff = ctx.score.diff();
            if diff != 0 {
                format!("Raised intensity (score diff {diff:+})")
            } else {
                format!("Level score ({}-{})", ctx.score.home, ctx.score.away)
            }
        }
        Category::Goals => format!("Current score: {}-{}", ctx.score.home, ctx.score.away),
        Category::Cards => format!(
            "So far: {} yellow, {} red",
            ctx.snapshot.cards.yellow, ctx.snapshot.cards.red
        ),
    }
}

/// Turns an accepted line into a user-facing recommendation.
pub fn assemble(
    result: &ProjectionResult,
    ctx: &MatchContext<'_>,
    cfg: &EngineConfig,
) -> Option<BetRecommendation> {
    let pick = result.recommendation?;
    let category = result.category;
    let (acceptance, strong) = thresholds(category, pick.direction, cfg);
    if pick.probability < acceptance {
        return None;
    }

    let percent = probability_percent(pick.probability);
    let unit = category.unit();
    let noun = unit.to_lowercase();
    let current = category.current_total(ctx);

    let scenario_mean = result.scenarios.as_deref().map(weighted_mean);
    let projection_line = match scenario_mean {
        Some(mean) => format!(
            "Projection: {:.1} {noun} (scenario mean {mean:.1})",
            result.projected_total
        ),
        None => format!("Projection: {:.1} {noun}", result.projected_total),
    };

    let reasoning = vec![
        projection_line,
        format!("Line: {} {}", pick.direction, pick.line),
        format!("Probability: {percent}%"),
        context_fact(category, ctx),
    ];

    let mut stats = BTreeMap::new();
    stats.insert(noun.clone(), current);
    stats.insert(format!("{noun}_per_10min"), round2(ctx.pace_per_10(current)));
    stats.insert("projected".to_string(), round2(result.projected_total));
    if let Some(mean) = scenario_mean {
        stats.insert("scenario_mean".to_string(), round2(mean));
    }

    let market = Market::from(category);
    Some(BetRecommendation {
        bet_type: market.bet_type(),
        market,
        description: format!("{} {} {unit}", pick.direction, pick.line),
        confidence: cfg.confidence.classify_percent(percent),
        probability: percent,
        reasoning,
        threshold_reached: pick.probability >= strong,
        current_stats: Some(stats),
        line: Some(pick.line),
        direction: Some(pick.direction),
    })
}

/// Both-teams-to-score heuristic: needs shots on target from both sides and at
/// least one side still to score; bonuses for balance and unrewarded pressure.
pub fn both_teams_score(ctx: &MatchContext<'_>, cfg: &EngineConfig) -> Option<BetRecommendation> {
    let b = &cfg.btts;
    if ctx.elapsed < b.min_minute {
        return None;
    }

    let sot = ctx.snapshot.shots_on_target;
    if sot.home < b.min_shots_on_target || sot.away < b.min_shots_on_target {
        return None;
    }

    let home_scored = ctx.score.home > 0;
    let away_scored = ctx.score.away > 0;
    if home_scored && away_scored {
        return None;
    }

    let possession = ctx.snapshot.possession;
    let mut probability = b.base;
    let mut reasoning = Vec::new();

    if possession.gap() < b.balanced_gap {
        probability += b.balanced_bonus;
        reasoning.push(format!(
            "Balanced match ({:.0}%-{:.0}%)",
            possession.home, possession.away
        ));
    }
    if sot.home >= b.pressure_shots_on_target && !home_scored {
        probability += b.pressure_bonus;
        reasoning.push(format!("Home: {} shots on target without scoring", sot.home));
    }
    if sot.away >= b.pressure_shots_on_target && !away_scored {
        probability += b.pressure_bonus;
        reasoning.push(format!("Away: {} shots on target without scoring", sot.away));
    }

    let probability = probability.clamp(0.0, 1.0);
    if probability < b.acceptance || reasoning.is_empty() {
        return None;
    }
    let percent = probability_percent(probability);

    let mut stats = BTreeMap::new();
    stats.insert("home_shots_on_target".to_string(), sot.home as f64);
    stats.insert("away_shots_on_target".to_string(), sot.away as f64);
    stats.insert("possession_gap".to_string(), round2(possession.gap()));

    let market = Market::BothTeamsScore;
    Some(BetRecommendation {
        bet_type: market.bet_type(),
        market,
        description: "Both teams to score".to_string(),
        confidence: cfg.confidence.classify_percent(percent),
        probability: percent,
        reasoning,
        threshold_reached: probability >= b.strong,
        current_stats: Some(stats),
        line: None,
        direction: None,
    })
}

/// Stable sort, highest probability first; equal entries keep assembly order.
pub fn rank(recommendations: &mut [BetRecommendation]) {
    recommendations.sort_by(|a, b| b.probability.cmp(&a.probability));
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
