use std::env;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineConfig;
use crate::engine::{self, MatchInput};
use crate::recommend::BetRecommendation;
use crate::strategy::{ProjectionResult, STRATEGY_VERSION};

pub const PARALLELISM_ENV: &str = "INPLAY_PARALLELISM";

/// Engine output for one match, tagged with the strategy version that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub match_id: Option<String>,
    pub minute: i32,
    pub strategy_version: u32,
    pub projections: Vec<ProjectionResult>,
    pub recommendations: Vec<BetRecommendation>,
}

pub fn report(input: &MatchInput, cfg: &EngineConfig) -> MatchReport {
    let analysis = engine::analyze_input(input, cfg);
    MatchReport {
        match_id: input.id.clone(),
        minute: input.minute,
        strategy_version: STRATEGY_VERSION,
        projections: analysis.projections,
        recommendations: analysis.recommendations,
    }
}

/// Analyzes independent matches in parallel. Reports come back in input order.
pub fn analyze_batch(inputs: &[MatchInput], cfg: &EngineConfig) -> Vec<MatchReport> {
    let pool = build_batch_pool();
    let reports = with_batch_pool(&pool, || {
        inputs
            .par_iter()
            .map(|input| report(input, cfg))
            .collect::<Vec<_>>()
    });
    let signals: usize = reports.iter().map(|r| r.recommendations.len()).sum();
    info!(matches = reports.len(), signals, "batch analyzed");
    reports
}

fn build_batch_pool() -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(batch_parallelism())
        .build()
        .ok()
}

fn with_batch_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match pool.as_ref() {
        Some(pool) => pool.install(action),
        None => action(),
    }
}

pub fn batch_parallelism() -> usize {
    env::var(PARALLELISM_ENV)
        .ok()
        .and_then(|val| val.trim().parse::<usize>().ok())
        .unwrap_or(4)
        .clamp(1, 32)
}
