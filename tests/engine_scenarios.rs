use std::fs;
use std::path::PathBuf;

use inplay_signals::batch::{self, MatchReport};
use inplay_signals::confidence::Confidence;
use inplay_signals::config::EngineConfig;
use inplay_signals::engine::{MatchInput, analyze_detailed, analyze_match};
use inplay_signals::line_select::Direction;
use inplay_signals::projection;
use inplay_signals::recommend::{BetRecommendation, BetType, Market};
use inplay_signals::snapshot::{CurrentScore, HomeAway, StatSnapshot};
use inplay_signals::strategy::{Category, STRATEGY_VERSION};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn cases() -> Vec<MatchInput> {
    serde_json::from_str(&read_fixture("match_cases.json")).expect("cases should parse")
}

fn case(id: &str) -> MatchInput {
    cases()
        .into_iter()
        .find(|c| c.id.as_deref() == Some(id))
        .unwrap_or_else(|| panic!("missing case {id}"))
}

fn run(id: &str) -> MatchReport {
    batch::report(&case(id), &EngineConfig::default())
}

fn pick(report: &MatchReport, market: Market) -> &BetRecommendation {
    report
        .recommendations
        .iter()
        .find(|r| r.market == market)
        .unwrap_or_else(|| panic!("{:?} has no {market:?} pick", report.match_id))
}

fn projected(report: &MatchReport, category: Category) -> f64 {
    report
        .projections
        .iter()
        .find(|p| p.category == category)
        .map(|p| p.projected_total)
        .expect("every category is projected")
}

fn assert_pick(
    rec: &BetRecommendation,
    line: f64,
    direction: Direction,
    probability: u8,
    confidence: Confidence,
) {
    assert_eq!(rec.line, Some(line), "{}", rec.description);
    assert_eq!(rec.direction, Some(direction), "{}", rec.description);
    assert_eq!(rec.probability, probability, "{}", rec.description);
    assert_eq!(rec.confidence, confidence, "{}", rec.description);
}

#[test]
fn corners_pressure_recommends_over() {
    let report = run("corners-pressure");
    assert_eq!(report.strategy_version, STRATEGY_VERSION);

    let corners = &report.projections[0];
    assert_eq!(corners.category, Category::Corners);
    assert!((corners.projected_total - 11.87).abs() < 0.01);
    let over_10_5: f64 = corners
        .scenarios
        .as_ref()
        .expect("scenarios")
        .iter()
        .filter(|s| s.value > 10.5)
        .map(|s| s.probability)
        .sum();
    assert!((over_10_5 - 0.85).abs() < 1e-9);

    let rec = report
        .recommendations
        .iter()
        .find(|r| r.bet_type == BetType::CornerHighActivity)
        .expect("corner recommendation");
    assert_eq!(rec.direction, Some(Direction::Over));
    assert!(rec.line.expect("line") <= 10.5);
    assert!(rec.probability >= 70);
    assert!(rec.threshold_reached);
    assert!(rec.description.starts_with("OVER ") && rec.description.ends_with(" Corners"));
    assert_eq!(rec.reasoning.last().map(String::as_str), Some("Elapsed: 70'"));
    let stats = rec.current_stats.as_ref().expect("stats excerpt");
    assert_eq!(stats["corners"], 9.0);
    assert_eq!(stats["scenario_mean"], 12.04);
    assert!(rec.reasoning[0].contains("scenario mean 12.0"));
}

#[test]
fn same_snapshot_before_floor_is_silent() {
    let report = run("corners-too-early");
    assert!(report.recommendations.is_empty());
    assert!(report.projections.iter().any(|p| p.projected_total > 0.0));
}

#[test]
fn btts_open_game_scores_seventy_three() {
    let report = run("btts-open-game");
    let btts = report
        .recommendations
        .iter()
        .find(|r| r.market == Market::BothTeamsScore)
        .expect("btts recommendation");
    assert_eq!(btts.probability, 73);
    assert_eq!(btts.confidence, Confidence::High);
    assert_eq!(btts.bet_type, BetType::BothTeamsScore);
    assert!(btts.threshold_reached);
    assert!(btts.line.is_none());
}

#[test]
fn kickoff_projects_nothing() {
    let report = run("kickoff");
    assert_eq!(report.minute, 0);
    assert!(report.recommendations.is_empty());
    assert_eq!(report.projections.len(), 4);
    for projection in &report.projections {
        assert_eq!(projection.projected_total, 0.0);
        assert!(projection.recommendation.is_none());
    }
}

#[test]
fn malformed_feed_is_sanitized_not_rejected() {
    let input = case("malformed-feed");
    let recs = analyze_match(
        &input.stats,
        input.minute,
        input.score,
        input.priors.as_ref(),
        &EngineConfig::default(),
    );
    for rec in &recs {
        assert!(rec.probability <= 100);
    }
    if let Some(corners) = recs.iter().find(|r| r.market == Market::Corners) {
        let stats = corners.current_stats.as_ref().expect("stats excerpt");
        assert_eq!(stats["corners"], 6.0);
    }
}

#[test]
fn every_case_is_ranked() {
    let cfg = EngineConfig::default();
    for report in batch::analyze_batch(&cases(), &cfg) {
        let probs: Vec<u8> = report.recommendations.iter().map(|r| r.probability).collect();
        assert!(
            probs.windows(2).all(|w| w[0] >= w[1]),
            "{:?} not ranked: {probs:?}",
            report.match_id
        );
    }
}

#[test]
fn raised_floor_from_config_file_silences_minute_38() {
    let cfg = EngineConfig::from_json_str(&read_fixture("engine_config.json")).expect("config");
    assert_eq!(cfg.min_minute, 40);
    let mut input = case("corners-pressure");
    input.minute = 38;
    assert!(batch::report(&input, &cfg).recommendations.is_empty());
    input.minute = 40;
    assert!(!batch::report(&input, &cfg).recommendations.is_empty());
}

#[test]
fn trailing_side_fouls_more_than_a_level_game() {
    let level = run("fouls-level");
    assert!((projected(&level, Category::Fouls) - 22.4).abs() < 1e-9);
    let rec = pick(&level, Market::Fouls);
    assert_pick(rec, 18.5, Direction::Over, 86, Confidence::VeryHigh);
    assert_eq!(rec.bet_type, BetType::CardPrediction);
    assert!(rec.threshold_reached);

    let trailing = run("fouls-trailing");
    assert!((projected(&trailing, Category::Fouls) - 22.94).abs() < 1e-9);
    let rec = pick(&trailing, Market::Fouls);
    assert_pick(rec, 18.5, Direction::Over, 89, Confidence::VeryHigh);
    assert!(rec.threshold_reached);
}

#[test]
fn goals_over_is_capped_near_the_live_score() {
    let input = case("goals-siege");
    let mut cfg = EngineConfig::default();
    cfg.goals.lines = vec![2.5, 3.5, 4.5];

    let capped = batch::report(&input, &cfg);
    assert!((projected(&capped, Category::Goals) - 3.855).abs() < 1e-9);
    // OVER 2.5 is the likeliest pick but sits 2.5 goals above a 0-0 score.
    let rec = pick(&capped, Market::Goals);
    assert_pick(rec, 4.5, Direction::Under, 76, Confidence::High);
    assert!(rec.threshold_reached);

    cfg.goals.over_max_margin = 3.0;
    let widened = batch::report(&input, &cfg);
    let rec = pick(&widened, Market::Goals);
    assert_pick(rec, 2.5, Direction::Over, 91, Confidence::VeryHigh);
    assert!(rec.threshold_reached);
}

#[test]
fn cards_without_fouls_fall_back_to_baseline_ratio() {
    let cfg = EngineConfig::default();
    let input = case("cards-no-fouls");
    assert_eq!(projection::card_ratio(&input.stats, &cfg.cards), 0.12);

    let report = batch::report(&input, &cfg);
    assert_eq!(projected(&report, Category::Cards), 0.0);
    let rec = pick(&report, Market::Cards);
    assert_pick(rec, 5.5, Direction::Under, 100, Confidence::VeryHigh);
    assert!(rec.threshold_reached);
    assert_eq!(rec.current_stats.as_ref().expect("stats excerpt")["cards"], 2.0);
}

#[test]
fn heated_game_blends_observed_and_baseline_card_ratio() {
    let cfg = EngineConfig::default();
    let input = case("cards-heated");
    let ratio = projection::card_ratio(&input.stats, &cfg.cards);
    assert!((ratio - (5.0 / 24.0 + 0.12) / 2.0).abs() < 1e-12);

    let report = batch::report(&input, &cfg);
    assert!((projected(&report, Category::Cards) - 7.092).abs() < 1e-9);
    let rec = pick(&report, Market::Cards);
    assert_pick(rec, 2.5, Direction::Over, 96, Confidence::VeryHigh);
    assert!(rec.threshold_reached);
}

#[test]
fn impossible_priors_cannot_drag_corners_below_zero() {
    let report = run("poisoned-priors");
    let corners = projected(&report, Category::Corners);
    assert!(corners >= 0.0);
    assert!((corners - 8.54).abs() < 0.01, "projected {corners}");

    // Nine corners are already in, so an UNDER below 9 can never win.
    for rec in report.recommendations.iter().filter(|r| r.market == Market::Corners) {
        if rec.direction == Some(Direction::Under) {
            assert!(rec.line.expect("line") > 9.0, "{}", rec.description);
        }
    }
    let rec = pick(&report, Market::Corners);
    assert_pick(rec, 6.5, Direction::Over, 85, Confidence::VeryHigh);
}

#[test]
fn saturated_counters_do_not_overflow() {
    let cfg = EngineConfig::default();
    let snap = StatSnapshot {
        corners: HomeAway::new(i32::MAX, 1),
        shots_on_target: HomeAway::new(i32::MAX, i32::MAX),
        ..StatSnapshot::default()
    };
    let analysis = analyze_detailed(&snap, 60, CurrentScore::new(i32::MAX, 1), None, &cfg);
    for p in &analysis.projections {
        assert!(p.projected_total.is_finite());
    }

    let raw = r#"{"id":"huge-fouls","minute":60,"stats":{
        "fouls":{"home":2000000000,"away":2000000000},
        "cards":{"yellow":2000000000,"red":2000000000}}}"#;
    let input: MatchInput = serde_json::from_str(raw).expect("input should parse");
    let report = batch::report(&input, &cfg);
    for p in &report.projections {
        assert!(p.projected_total.is_finite() && p.projected_total >= 0.0);
    }
    for rec in analysis.recommendations.iter().chain(&report.recommendations) {
        assert!(rec.probability <= 100);
    }
}
