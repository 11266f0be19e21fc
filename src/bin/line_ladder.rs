use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use inplay_signals::config::EngineConfig;
use inplay_signals::engine::MatchInput;
use inplay_signals::priors::PriorData;
use inplay_signals::probability::DistributionModel;
use inplay_signals::projection::MatchContext;
use inplay_signals::strategy::{self, Category};

// Prints every candidate line's over/under probability for each category of one
// match snapshot, marking the line the engine would pick. Offline tuning aid.
fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/ladder_case.json"));

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("read case {}", path.display()))?;
    let input: MatchInput = serde_json::from_str(&raw).context("parse case")?;
    let cfg = EngineConfig::from_env().context("load engine config")?;

    let priors = input
        .priors
        .as_ref()
        .map(PriorData::sanitized)
        .unwrap_or_default();
    let ctx = MatchContext::new(
        &input.stats,
        input.minute,
        input.score,
        &priors,
        cfg.full_match_minutes,
    );

    println!(
        "{} at {}' ({}-{})",
        input.label(),
        input.minute,
        ctx.score.home,
        ctx.score.away
    );

    for category in Category::ALL {
        let result = strategy::project(category, &ctx, &cfg);
        let model = match &result.scenarios {
            Some(scenarios) => DistributionModel::Scenarios(scenarios.clone()),
            None => {
                let curve = match category {
                    Category::Fouls => cfg.fouls.curve,
                    Category::Goals => cfg.goals.curve,
                    Category::Cards => cfg.cards.curve,
                    Category::Corners => continue,
                };
                DistributionModel::tanh(result.projected_total, curve)
            }
        };
        let lines = match category {
            Category::Corners => &cfg.corners.lines,
            Category::Fouls => &cfg.fouls.lines,
            Category::Goals => &cfg.goals.lines,
            Category::Cards => &cfg.cards.lines,
        };

        println!();
        println!(
            "{} now {:.0}, projected {:.2}, mean {:.2}",
            category.unit(),
            category.current_total(&ctx),
            result.projected_total,
            model.expected_value()
        );
        for &line in lines {
            let p = model.over_under(line);
            let marker = match result.recommendation {
                Some(pick) if pick.line == line => {
                    format!("  <- {} {}", pick.direction, pick.confidence)
                }
                _ => String::new(),
            };
            println!(
                "  {:>5.1}  over {:>5.1}%  under {:>5.1}%{marker}",
                line,
                p.over * 100.0,
                p.under * 100.0
            );
        }
    }

    Ok(())
}
