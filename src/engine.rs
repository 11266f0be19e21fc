//! Entry point: snapshot + minute + score + priors in, ranked recommendations out.
//!
//! The engine is a pure function of its inputs and the [`EngineConfig`]; it keeps
//! no state between calls, so independent matches can be analyzed from any thread.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EngineConfig, MIN_MINUTE_FLOOR};
use crate::priors::PriorData;
use crate::projection::MatchContext;
use crate::recommend::{self, BetRecommendation};
use crate::snapshot::{CurrentScore, StatSnapshot};
use crate::strategy::{self, ProjectionResult};

/// One match at one minute, as read from case files and batch inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub stats: StatSnapshot,
    #[serde(alias = "timeElapsed")]
    pub minute: i32,
    #[serde(default)]
    pub score: CurrentScore,
    #[serde(default)]
    pub priors: Option<PriorData>,
}

impl MatchInput {
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("unnamed")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub projections: Vec<ProjectionResult>,
    pub recommendations: Vec<BetRecommendation>,
}

/// Ranked recommendations for one match. Empty before `cfg.min_minute`.
pub fn analyze_match(
    stats: &StatSnapshot,
    elapsed: i32,
    score: CurrentScore,
    priors: Option<&PriorData>,
    cfg: &EngineConfig,
) -> Vec<BetRecommendation> {
    analyze_detailed(stats, elapsed, score, priors, cfg).recommendations
}

/// Like [`analyze_match`] but also returns every category's projection.
pub fn analyze_detailed(
    stats: &StatSnapshot,
    elapsed: i32,
    score: CurrentScore,
    priors: Option<&PriorData>,
    cfg: &EngineConfig,
) -> MatchAnalysis {
    let priors = priors.map(PriorData::sanitized).unwrap_or_default();
    let ctx = MatchContext::new(stats, elapsed, score, &priors, cfg.full_match_minutes);

    let projections = strategy::project_all(&ctx, cfg);

    let min_minute = cfg.min_minute.max(MIN_MINUTE_FLOOR);
    if elapsed < min_minute {
        debug!(elapsed, min_minute, "below eligibility floor");
        return MatchAnalysis {
            projections,
            recommendations: Vec::new(),
        };
    }

    let mut recommendations: Vec<BetRecommendation> = projections
        .iter()
        .filter_map(|result| recommend::assemble(result, &ctx, cfg))
        .collect();
    recommendations.extend(recommend::both_teams_score(&ctx, cfg));
    recommend::rank(&mut recommendations);

    MatchAnalysis {
        projections,
        recommendations,
    }
}

pub fn analyze_input(input: &MatchInput, cfg: &EngineConfig) -> MatchAnalysis {
    analyze_detailed(
        &input.stats,
        input.minute,
        input.score,
        input.priors.as_ref(),
        cfg,
    )
}
