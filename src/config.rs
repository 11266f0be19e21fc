use std::env;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::confidence::ConfidenceCuts;
use crate::probability::{ScenarioPoint, TanhCurve, default_scenario_points};

pub const CONFIG_PATH_ENV: &str = "INPLAY_CONFIG";
pub const MIN_MINUTE_ENV: &str = "INPLAY_MIN_MINUTE";

/// Hard eligibility floor. Configuration may raise it, never lower it.
pub const MIN_MINUTE_FLOOR: i32 = 35;
const MAX_MINUTE: i32 = 120;

static DEFAULT_CONFIG: Lazy<EngineConfig> = Lazy::new(EngineConfig::default);

/// Shared, immutable default configuration.
pub fn default_config() -> &'static EngineConfig {
    &DEFAULT_CONFIG
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Every tunable of the engine. All fields default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// No recommendation is emitted before this minute.
    pub min_minute: i32,
    pub full_match_minutes: f64,
    pub confidence: ConfidenceCuts,
    pub corners: CornersConfig,
    pub fouls: FoulsConfig,
    pub goals: GoalsConfig,
    pub cards: CardsConfig,
    pub btts: BttsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_minute: MIN_MINUTE_FLOOR,
            full_match_minutes: 90.0,
            confidence: ConfidenceCuts::default(),
            corners: CornersConfig::default(),
            fouls: FoulsConfig::default(),
            goals: GoalsConfig::default(),
            cards: CardsConfig::default(),
            btts: BttsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornersConfig {
    pub intensity: f64,
    pub linear_weight: f64,
    /// Weight shared between the intensity projection and the H2H average.
    pub extrapolation_weight: f64,
    pub h2h_weight_strong: f64,
    pub h2h_weight_weak: f64,
    /// H2H under-10.5 rate above which the strong H2H weight applies.
    pub under_rate_trigger: f64,
    pub scenarios: Vec<ScenarioPoint>,
    pub lines: Vec<f64>,
    pub acceptance: f64,
    pub strong: f64,
}

impl Default for CornersConfig {
    fn default() -> Self {
        Self {
            intensity: 1.22,
            linear_weight: 0.25,
            extrapolation_weight: 0.75,
            h2h_weight_strong: 0.35,
            h2h_weight_weak: 0.25,
            under_rate_trigger: 0.60,
            scenarios: default_scenario_points(),
            lines: vec![6.5, 7.5, 8.5, 9.5, 10.5, 11.5],
            acceptance: 0.70,
            strong: 0.75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoulsConfig {
    pub tight_multiplier: f64,
    pub trailing_multiplier: f64,
    /// Largest absolute goal difference still treated as a tight game.
    pub tight_margin: i32,
    pub projection_weight: f64,
    pub season_weight: f64,
    pub curve: TanhCurve,
    pub lines: Vec<f64>,
    pub acceptance: f64,
    pub strong: f64,
}

impl Default for FoulsConfig {
    fn default() -> Self {
        Self {
            tight_multiplier: 1.20,
            trailing_multiplier: 1.25,
            tight_margin: 1,
            projection_weight: 0.6,
            season_weight: 0.4,
            curve: TanhCurve {
                spread_fraction: 0.15,
                spread_absolute: 0.0,
                spread_floor: 0.5,
                steepness: 0.8,
            },
            lines: vec![18.5, 19.5, 20.5, 21.5, 22.5, 23.5, 24.5],
            acceptance: 0.70,
            strong: 0.75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalsConfig {
    pub current_weight: f64,
    pub shots_weight: f64,
    pub h2h_weight: f64,
    pub season_weight: f64,
    pub shots_on_target_intensity: f64,
    /// Goals per shot on target.
    pub conversion_rate: f64,
    pub curve: TanhCurve,
    pub lines: Vec<f64>,
    pub over_acceptance: f64,
    /// OVER lines must sit within this many goals of the current total.
    pub over_max_margin: f64,
    pub under_acceptance: f64,
    pub strong: f64,
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            current_weight: 0.40,
            shots_weight: 0.30,
            h2h_weight: 0.15,
            season_weight: 0.15,
            shots_on_target_intensity: 1.15,
            conversion_rate: 0.15,
            curve: TanhCurve {
                spread_fraction: 0.0,
                spread_absolute: 0.8,
                spread_floor: 0.1,
                steepness: 0.7,
            },
            lines: vec![0.5, 1.5, 2.5, 3.5, 4.5],
            over_acceptance: 0.72,
            over_max_margin: 1.5,
            under_acceptance: 0.72,
            strong: 0.75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardsConfig {
    pub fouls_intensity: f64,
    /// Cards per foul used as the baseline and as the fallback when no fouls are recorded.
    pub baseline_ratio: f64,
    pub curve: TanhCurve,
    pub lines: Vec<f64>,
    pub acceptance: f64,
    pub strong: f64,
}

impl Default for CardsConfig {
    fn default() -> Self {
        Self {
            fouls_intensity: 1.2,
            baseline_ratio: 0.12,
            curve: TanhCurve {
                spread_fraction: 0.25,
                spread_absolute: 0.0,
                spread_floor: 0.5,
                steepness: 0.6,
            },
            lines: vec![2.5, 3.5, 4.5, 5.5],
            acceptance: 0.68,
            strong: 0.72,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BttsConfig {
    pub min_minute: i32,
    pub min_shots_on_target: i32,
    pub base: f64,
    /// Possession gap (percentage points) below which the match counts as balanced.
    pub balanced_gap: f64,
    pub balanced_bonus: f64,
    pub pressure_shots_on_target: i32,
    pub pressure_bonus: f64,
    pub acceptance: f64,
    pub strong: f64,
}

impl Default for BttsConfig {
    fn default() -> Self {
        Self {
            min_minute: 45,
            min_shots_on_target: 2,
            base: 0.55,
            balanced_gap: 15.0,
            balanced_bonus: 0.10,
            pressure_shots_on_target: 3,
            pressure_bonus: 0.08,
            acceptance: 0.65,
            strong: 0.70,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Defaults, or the file named by `INPLAY_CONFIG`, then env overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = match opt_env(CONFIG_PATH_ENV) {
            Some(path) => Self::from_path(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(minute) = min_minute_override(opt_env(MIN_MINUTE_ENV)) {
            cfg.min_minute = minute;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.full_match_minutes.is_finite() && self.full_match_minutes > 0.0) {
            return invalid("full_match_minutes must be positive");
        }
        if !(MIN_MINUTE_FLOOR..=MAX_MINUTE).contains(&self.min_minute) {
            return invalid(format!(
                "min_minute must be within {MIN_MINUTE_FLOOR}..={MAX_MINUTE}, got {}",
                self.min_minute
            ));
        }
        if !self.confidence.is_strictly_decreasing() {
            return invalid("confidence cut points must be strictly decreasing within (0, 1]");
        }

        let c = &self.corners;
        check_probability("corners.acceptance", c.acceptance)?;
        check_probability("corners.strong", c.strong)?;
        check_lines("corners.lines", &c.lines)?;
        if c.h2h_weight_strong > c.extrapolation_weight
            || c.h2h_weight_weak > c.extrapolation_weight
        {
            return invalid("corners h2h weights cannot exceed extrapolation_weight");
        }
        if c.scenarios.is_empty() {
            return invalid("corners.scenarios cannot be empty");
        }
        let weight_sum: f64 = c.scenarios.iter().map(|s| s.weight).sum();
        if (weight_sum - 1.0).abs() > 1e-6 || c.scenarios.iter().any(|s| s.weight < 0.0) {
            return invalid("corners.scenarios weights must be non-negative and sum to 1");
        }

        let f = &self.fouls;
        check_probability("fouls.acceptance", f.acceptance)?;
        check_probability("fouls.strong", f.strong)?;
        check_lines("fouls.lines", &f.lines)?;
        check_curve("fouls.curve", &f.curve)?;

        let g = &self.goals;
        check_probability("goals.over_acceptance", g.over_acceptance)?;
        check_probability("goals.under_acceptance", g.under_acceptance)?;
        check_probability("goals.strong", g.strong)?;
        check_lines("goals.lines", &g.lines)?;
        check_curve("goals.curve", &g.curve)?;

        let k = &self.cards;
        check_probability("cards.acceptance", k.acceptance)?;
        check_probability("cards.strong", k.strong)?;
        check_lines("cards.lines", &k.lines)?;
        check_curve("cards.curve", &k.curve)?;

        let b = &self.btts;
        check_probability("btts.acceptance", b.acceptance)?;
        check_probability("btts.strong", b.strong)?;
        check_probability("btts.base", b.base)?;
        Ok(())
    }
}

fn invalid<T>(msg: impl Into<String>) -> Result<T, ConfigError> {
    Err(ConfigError::Invalid(msg.into()))
}

fn check_probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        invalid(format!("{name} must be in (0, 1], got {value}"))
    }
}

fn check_lines(name: &str, lines: &[f64]) -> Result<(), ConfigError> {
    if lines.is_empty() {
        return invalid(format!("{name} cannot be empty"));
    }
    if lines.iter().any(|l| !l.is_finite()) || lines.windows(2).any(|w| w[0] >= w[1]) {
        return invalid(format!("{name} must be finite and strictly ascending"));
    }
    Ok(())
}

fn check_curve(name: &str, curve: &TanhCurve) -> Result<(), ConfigError> {
    if !(curve.spread_floor > 0.0 && curve.steepness > 0.0) {
        return invalid(format!("{name} needs a positive spread_floor and steepness"));
    }
    Ok(())
}

fn min_minute_override(raw: Option<String>) -> Option<i32> {
    raw.and_then(|val| val.trim().parse::<i32>().ok())
        .map(|minute| minute.clamp(MIN_MINUTE_FLOOR, MAX_MINUTE))
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}
