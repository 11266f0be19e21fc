use crate::config::{CardsConfig, CornersConfig, FoulsConfig, GoalsConfig};
use crate::priors::PriorData;
use crate::snapshot::{CurrentScore, StatSnapshot};

/// Everything a strategy reads for one match at one minute.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub snapshot: StatSnapshot,
    pub elapsed: i32,
    pub score: CurrentScore,
    pub priors: &'a PriorData,
    pub full_match_minutes: f64,
}

impl<'a> MatchContext<'a> {
    /// Sanitizes the snapshot and score; the caller's values are left untouched.
    pub fn new(
        snapshot: &StatSnapshot,
        elapsed: i32,
        score: CurrentScore,
        priors: &'a PriorData,
        full_match_minutes: f64,
    ) -> Self {
        Self {
            snapshot: snapshot.sanitized(),
            elapsed,
            score: score.sanitized(),
            priors,
            full_match_minutes,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.elapsed <= 0
    }

    /// Uniform per-minute rate extrapolated to the full match, scaled by `intensity`.
    pub fn extrapolate(&self, current: f64, intensity: f64) -> f64 {
        project_to_full_match(current, self.elapsed, intensity, self.full_match_minutes)
    }

    /// Events per ten minutes so far.
    pub fn pace_per_10(&self, current: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        current / (self.elapsed as f64).min(self.full_match_minutes) * 10.0
    }
}

/// `current / min(elapsed, full) * full * intensity`, or 0 when no time has elapsed.
pub fn project_to_full_match(current: f64, elapsed: i32, intensity: f64, full: f64) -> f64 {
    if elapsed <= 0 {
        return 0.0;
    }
    let minutes_played = (elapsed as f64).min(full);
    current / minutes_played * full * intensity
}

/// H2H weight for corners: fixtures that usually stay under 10.5 lean harder on history.
pub fn corners_h2h_weight(priors: &PriorData, cfg: &CornersConfig) -> f64 {
    if priors.h2h.corners_under_rate() > cfg.under_rate_trigger {
        cfg.h2h_weight_strong
    } else {
        cfg.h2h_weight_weak
    }
}

pub fn project_corners(ctx: &MatchContext<'_>, cfg: &CornersConfig) -> f64 {
    if ctx.is_degenerate() {
        return 0.0;
    }
    let current = ctx.snapshot.corners.total() as f64;
    let linear = ctx.extrapolate(current, 1.0);
    let intensity_adjusted = ctx.extrapolate(current, cfg.intensity);
    let h2h_weight = corners_h2h_weight(ctx.priors, cfg);

    linear * cfg.linear_weight
        + intensity_adjusted * (cfg.extrapolation_weight - h2h_weight)
        + ctx.priors.h2h.avg_corners * h2h_weight
}

/// Tight games and trailing sides both foul more; the larger multiplier wins.
pub fn foul_intensity(score: CurrentScore, cfg: &FoulsConfig) -> f64 {
    let margin = (i64::from(score.home) - i64::from(score.away)).abs();
    let mut intensity = 1.0_f64;
    if margin <= i64::from(cfg.tight_margin) {
        intensity = intensity.max(cfg.tight_multiplier);
    }
    if margin >= 1 {
        intensity = intensity.max(cfg.trailing_multiplier);
    }
    intensity
}

pub fn project_fouls(ctx: &MatchContext<'_>, cfg: &FoulsConfig) -> f64 {
    if ctx.is_degenerate() {
        return 0.0;
    }
    let current = ctx.snapshot.fouls.total() as f64;
    let projected = ctx.extrapolate(current, foul_intensity(ctx.score, cfg));
    projected * cfg.projection_weight + ctx.priors.season_fouls() * cfg.season_weight
}

/// Expected goals implied by the projected shots on target.
pub fn shots_expected_goals(ctx: &MatchContext<'_>, cfg: &GoalsConfig) -> f64 {
    let sot = ctx.snapshot.shots_on_target.total() as f64;
    ctx.extrapolate(sot, cfg.shots_on_target_intensity) * cfg.conversion_rate
}

pub fn project_goals(ctx: &MatchContext<'_>, cfg: &GoalsConfig) -> f64 {
    if ctx.is_degenerate() {
        return 0.0;
    }
    ctx.score.total() as f64 * cfg.current_weight
        + shots_expected_goals(ctx, cfg) * cfg.shots_weight
        + ctx.priors.h2h.avg_goals * cfg.h2h_weight
        + ctx.priors.season_goals() * cfg.season_weight
}

/// Cards per foul: observed ratio averaged with the baseline. With no fouls the
/// observed side falls back to the baseline too.
pub fn card_ratio(snapshot: &StatSnapshot, cfg: &CardsConfig) -> f64 {
    let fouls = snapshot.fouls.total();
    let observed = if fouls > 0 {
        snapshot.cards.total() as f64 / fouls as f64
    } else {
        cfg.baseline_ratio
    };
    (observed + cfg.baseline_ratio) / 2.0
}

pub fn project_cards(ctx: &MatchContext<'_>, cfg: &CardsConfig) -> f64 {
    if ctx.is_degenerate() {
        return 0.0;
    }
    let fouls = ctx.snapshot.fouls.total() as f64;
    ctx.extrapolate(fouls, cfg.fouls_intensity) * card_ratio(&ctx.snapshot, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::priors::HeadToHead;
    use crate::snapshot::{CardCounts, HomeAway};

    fn ctx<'a>(
        snapshot: StatSnapshot,
        elapsed: i32,
        score: CurrentScore,
        priors: &'a PriorData,
    ) -> MatchContext<'a> {
        MatchContext::new(&snapshot, elapsed, score, priors, 90.0)
    }

    #[test]
    fn linear_projection_caps_minutes_at_full_match() {
        assert!((project_to_full_match(9.0, 70, 1.0, 90.0) - 11.571428).abs() < 1e-5);
        // Injury time: 95' counts as 90'.
        assert!((project_to_full_match(9.0, 95, 1.0, 90.0) - 9.0).abs() < 1e-12);
        assert_eq!(project_to_full_match(9.0, 0, 1.0, 90.0), 0.0);
        assert_eq!(project_to_full_match(9.0, -4, 1.22, 90.0), 0.0);
    }

    #[test]
    fn corners_blend_uses_strong_h2h_weight_for_low_corner_fixtures() {
        let cfg = EngineConfig::default();
        let priors = PriorData::default();
        let snap = StatSnapshot {
            corners: HomeAway::new(5, 4),
            ..StatSnapshot::default()
        };
        let c = ctx(snap, 70, CurrentScore::default(), &priors);
        assert_eq!(corners_h2h_weight(&priors, &cfg.corners), 0.35);
        let blended = project_corners(&c, &cfg.corners);
        assert!((blended - 11.8647).abs() < 1e-3, "blended {blended}");
    }

    #[test]
    fn corners_blend_uses_weak_h2h_weight_otherwise() {
        let cfg = EngineConfig::default();
        let priors = PriorData {
            h2h: HeadToHead {
                under_10_5_corners: 2,
                ..HeadToHead::default()
            },
            ..PriorData::default()
        };
        assert_eq!(corners_h2h_weight(&priors, &cfg.corners), 0.25);
    }

    #[test]
    fn foul_intensity_by_score_state() {
        let cfg = EngineConfig::default().fouls;
        assert_eq!(foul_intensity(CurrentScore::new(0, 0), &cfg), 1.20);
        assert_eq!(foul_intensity(CurrentScore::new(1, 0), &cfg), 1.25);
        assert_eq!(foul_intensity(CurrentScore::new(0, 3), &cfg), 1.25);
        assert_eq!(foul_intensity(CurrentScore::new(-5, i32::MAX), &cfg), 1.25);
    }

    #[test]
    fn goals_blend_four_signals() {
        let cfg = EngineConfig::default();
        let priors = PriorData::default();
        let snap = StatSnapshot {
            shots_on_target: HomeAway::new(4, 2),
            ..StatSnapshot::default()
        };
        let c = ctx(snap, 60, CurrentScore::new(1, 1), &priors);
        // sot 6 -> 6/60*90*1.15 = 10.35 -> xG 1.5525
        let expected = 2.0 * 0.40 + 1.5525 * 0.30 + 2.4 * 0.15 + 2.6 * 0.15;
        assert!((project_goals(&c, &cfg.goals) - expected).abs() < 1e-9);
    }

    #[test]
    fn card_ratio_falls_back_without_fouls() {
        let cfg = EngineConfig::default().cards;
        let none = StatSnapshot {
            cards: CardCounts { yellow: 2, red: 0 },
            ..StatSnapshot::default()
        };
        assert!((card_ratio(&none, &cfg) - 0.12).abs() < 1e-12);

        let some = StatSnapshot {
            fouls: HomeAway::new(10, 10),
            cards: CardCounts { yellow: 4, red: 0 },
            ..StatSnapshot::default()
        };
        assert!((card_ratio(&some, &cfg) - 0.16).abs() < 1e-12);
    }

    #[test]
    fn degenerate_time_projects_zero_everywhere() {
        let cfg = EngineConfig::default();
        let priors = PriorData::default();
        let snap = StatSnapshot {
            corners: HomeAway::new(5, 4),
            fouls: HomeAway::new(8, 9),
            ..StatSnapshot::default()
        };
        let c = ctx(snap, 0, CurrentScore::new(1, 0), &priors);
        assert_eq!(project_corners(&c, &cfg.corners), 0.0);
        assert_eq!(project_fouls(&c, &cfg.fouls), 0.0);
        assert_eq!(project_goals(&c, &cfg.goals), 0.0);
        assert_eq!(project_cards(&c, &cfg.cards), 0.0);
        assert_eq!(c.pace_per_10(9.0), 0.0);
    }
}
