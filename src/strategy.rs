//! Per-category strategies.
//!
//! Each line market (corners, fouls, goals, cards) is one pure function from a
//! [`MatchContext`] to a [`ProjectionResult`], registered in [`STRATEGY_TABLE`]
//! under its [`Category`] tag. Strategies can be tuned and tested on their own;
//! the assembler only sees the uniform result.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::confidence::{Confidence, probability_percent};
use crate::line_select::{Direction, LineConstraint, LineRule, SelectionRules, select_line};
use crate::probability::{DistributionModel, Scenario};
use crate::projection::{self, MatchContext};

/// Bumped whenever a strategy's math or its defaults change meaning.
pub const STRATEGY_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Corners,
    Fouls,
    Goals,
    Cards,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Corners,
        Category::Fouls,
        Category::Goals,
        Category::Cards,
    ];

    pub fn unit(self) -> &'static str {
        match self {
            Self::Corners => "Corners",
            Self::Fouls => "Fouls",
            Self::Goals => "Goals",
            Self::Cards => "Cards",
        }
    }

    pub fn strategy(self) -> Option<Strategy> {
        STRATEGY_TABLE
            .iter()
            .find(|(category, _)| *category == self)
            .map(|(_, strategy)| *strategy)
    }

    /// Current cumulative count for this category.
    pub fn current_total(self, ctx: &MatchContext<'_>) -> f64 {
        let snap = &ctx.snapshot;
        let total = match self {
            Self::Corners => snap.corners.total(),
            Self::Fouls => snap.fouls.total(),
            Self::Goals => ctx.score.total(),
            Self::Cards => snap.cards.total(),
        };
        total as f64
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unit().to_lowercase())
    }
}

/// The accepted line for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePick {
    pub line: f64,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub probability: f64,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub category: Category,
    pub projected_total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<Vec<Scenario>>,
    pub recommendation: Option<LinePick>,
}

impl ProjectionResult {
    pub fn zero(category: Category) -> Self {
        Self {
            category,
            projected_total: 0.0,
            scenarios: None,
            recommendation: None,
        }
    }
}

pub type Strategy = fn(&MatchContext<'_>, &EngineConfig) -> ProjectionResult;

pub static STRATEGY_TABLE: [(Category, Strategy); 4] = [
    (Category::Corners, corners_strategy),
    (Category::Fouls, fouls_strategy),
    (Category::Goals, goals_strategy),
    (Category::Cards, cards_strategy),
];

/// Runs the registered strategy for `category`. No time played means no projection.
pub fn project(category: Category, ctx: &MatchContext<'_>, cfg: &EngineConfig) -> ProjectionResult {
    if ctx.is_degenerate() {
        return ProjectionResult::zero(category);
    }
    let Some(strategy) = category.strategy() else {
        return ProjectionResult::zero(category);
    };
    let result = strategy(ctx, cfg);
    match &result.recommendation {
        Some(pick) => debug!(
            %category,
            projected = result.projected_total,
            line = pick.line,
            direction = %pick.direction,
            probability = pick.probability,
            "line accepted"
        ),
        None => debug!(%category, projected = result.projected_total, "no line accepted"),
    }
    result
}

pub fn project_all(ctx: &MatchContext<'_>, cfg: &EngineConfig) -> Vec<ProjectionResult> {
    Category::ALL
        .iter()
        .map(|category| project(*category, ctx, cfg))
        .collect()
}

fn finish(
    category: Category,
    projected_total: f64,
    model: DistributionModel,
    lines: &[f64],
    rules: &SelectionRules,
    ctx: &MatchContext<'_>,
    cfg: &EngineConfig,
) -> ProjectionResult {
    let recommendation =
        select_line(&model, lines, rules, category.current_total(ctx)).map(|c| LinePick {
            line: c.line,
            direction: c.direction,
            probability: c.probability,
            confidence: cfg.confidence.classify_percent(probability_percent(c.probability)),
        });
    ProjectionResult {
        category,
        projected_total,
        scenarios: model.scenario_list().map(|s| s.to_vec()),
        recommendation,
    }
}

fn corners_strategy(ctx: &MatchContext<'_>, cfg: &EngineConfig) -> ProjectionResult {
    let c = &cfg.corners;
    let blended = projection::project_corners(ctx, c);
    let model = DistributionModel::scenarios(blended, &c.scenarios);
    let rules = SelectionRules::symmetric(c.acceptance);
    finish(Category::Corners, blended, model, &c.lines, &rules, ctx, cfg)
}

fn fouls_strategy(ctx: &MatchContext<'_>, cfg: &EngineConfig) -> ProjectionResult {
    let f = &cfg.fouls;
    let projected = projection::project_fouls(ctx, f);
    let model = DistributionModel::tanh(projected, f.curve);
    let rules = SelectionRules::symmetric(f.acceptance);
    finish(Category::Fouls, projected, model, &f.lines, &rules, ctx, cfg)
}

fn goals_strategy(ctx: &MatchContext<'_>, cfg: &EngineConfig) -> ProjectionResult {
    let g = &cfg.goals;
    let projected = projection::project_goals(ctx, g);
    let model = DistributionModel::tanh(projected, g.curve);
    // Over bets only close to the live score, under bets only on lines not yet passed.
    let rules = SelectionRules {
        over: LineRule {
            threshold: g.over_acceptance,
            constraint: LineConstraint::NearCurrent {
                margin: g.over_max_margin,
            },
        },
        under: LineRule {
            threshold: g.under_acceptance,
            constraint: LineConstraint::AboveCurrent,
        },
    };
    finish(Category::Goals, projected, model, &g.lines, &rules, ctx, cfg)
}

fn cards_strategy(ctx: &MatchContext<'_>, cfg: &EngineConfig) -> ProjectionResult {
    let k = &cfg.cards;
    let projected = projection::project_cards(ctx, k);
    let model = DistributionModel::tanh(projected, k.curve);
    let rules = SelectionRules::symmetric(k.acceptance);
    finish(Category::Cards, projected, model, &k.lines, &rules, ctx, cfg)
}
