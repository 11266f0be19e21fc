use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Season averages for one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPriors {
    pub avg_corners: f64,
    pub avg_fouls: f64,
    pub avg_shots: f64,
    pub avg_goals: f64,
    pub avg_conceded: f64,
}

impl TeamPriors {
    fn sanitized(&self, fallback: &Self) -> Self {
        Self {
            avg_corners: non_negative(self.avg_corners, fallback.avg_corners),
            avg_fouls: non_negative(self.avg_fouls, fallback.avg_fouls),
            avg_shots: non_negative(self.avg_shots, fallback.avg_shots),
            avg_goals: non_negative(self.avg_goals, fallback.avg_goals),
            avg_conceded: non_negative(self.avg_conceded, fallback.avg_conceded),
        }
    }

    pub fn home_defaults() -> Self {
        Self {
            avg_corners: 5.2,
            avg_fouls: 11.5,
            avg_shots: 12.3,
            avg_goals: 1.4,
            avg_conceded: 1.2,
        }
    }

    pub fn away_defaults() -> Self {
        Self {
            avg_corners: 4.8,
            avg_fouls: 12.1,
            avg_shots: 10.8,
            avg_goals: 1.1,
            avg_conceded: 1.5,
        }
    }
}

/// Aggregates over previous meetings of the same two sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHead {
    pub avg_corners: f64,
    pub avg_fouls: f64,
    pub avg_goals: f64,
    pub games_played: u32,
    #[serde(rename = "under10_5Corners")]
    pub under_10_5_corners: u32,
    #[serde(rename = "over2_5Goals")]
    pub over_2_5_goals: u32,
}

impl Default for HeadToHead {
    fn default() -> Self {
        Self {
            avg_corners: 9.5,
            avg_fouls: 24.0,
            avg_goals: 2.4,
            games_played: 5,
            under_10_5_corners: 4,
            over_2_5_goals: 3,
        }
    }
}

/// Final totals of one earlier meeting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PastMeeting {
    pub corners: u32,
    pub fouls: u32,
    pub goals: u32,
}

// Meetings needed before the observed averages fully replace the defaults.
const MIN_MEETINGS: f64 = 5.0;

impl HeadToHead {
    /// Share of meetings that finished under 10.5 corners; 0 with no history.
    pub fn corners_under_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        (self.under_10_5_corners as f64 / self.games_played as f64).clamp(0.0, 1.0)
    }

    /// Averages forced finite and non-negative, threshold counts capped at `games_played`.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            avg_corners: non_negative(self.avg_corners, d.avg_corners),
            avg_fouls: non_negative(self.avg_fouls, d.avg_fouls),
            avg_goals: non_negative(self.avg_goals, d.avg_goals),
            games_played: self.games_played,
            under_10_5_corners: self.under_10_5_corners.min(self.games_played),
            over_2_5_goals: self.over_2_5_goals.min(self.games_played),
        }
    }

    pub fn from_meetings(meetings: &[PastMeeting]) -> Self {
        let d = Self::default();
        if meetings.is_empty() {
            return d;
        }

        let n = meetings.len() as f64;
        let mut corners = 0.0;
        let mut fouls = 0.0;
        let mut goals = 0.0;
        let mut under_corners = 0u32;
        let mut over_goals = 0u32;
        for m in meetings {
            corners += m.corners as f64;
            fouls += m.fouls as f64;
            goals += m.goals as f64;
            if (m.corners as f64) < 10.5 {
                under_corners += 1;
            }
            if (m.goals as f64) > 2.5 {
                over_goals += 1;
            }
        }

        // Shrink small samples toward defaults to avoid wild swings.
        let w = (n / MIN_MEETINGS).clamp(0.0, 1.0);
        Self {
            avg_corners: (1.0 - w) * d.avg_corners + w * corners / n,
            avg_fouls: (1.0 - w) * d.avg_fouls + w * fouls / n,
            avg_goals: (1.0 - w) * d.avg_goals + w * goals / n,
            games_played: meetings.len() as u32,
            under_10_5_corners: under_corners,
            over_2_5_goals: over_goals,
        }
    }
}

/// Historical context for one fixture. Every part is optional on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorData {
    #[serde(default = "TeamPriors::home_defaults")]
    pub home_team: TeamPriors,
    #[serde(default = "TeamPriors::away_defaults")]
    pub away_team: TeamPriors,
    #[serde(default)]
    pub h2h: HeadToHead,
}

impl Default for PriorData {
    fn default() -> Self {
        Self {
            home_team: TeamPriors::home_defaults(),
            away_team: TeamPriors::away_defaults(),
            h2h: HeadToHead::default(),
        }
    }
}

impl PriorData {
    /// Copy safe to project from: negative averages become 0, non-finite ones the defaults.
    pub fn sanitized(&self) -> Self {
        Self {
            home_team: self.home_team.sanitized(&TeamPriors::home_defaults()),
            away_team: self.away_team.sanitized(&TeamPriors::away_defaults()),
            h2h: self.h2h.sanitized(),
        }
    }

    pub fn season_fouls(&self) -> f64 {
        self.home_team.avg_fouls + self.away_team.avg_fouls
    }

    /// Average of goals-for and goals-against across both sides.
    pub fn season_goals(&self) -> f64 {
        (self.home_team.avg_goals
            + self.home_team.avg_conceded
            + self.away_team.avg_goals
            + self.away_team.avg_conceded)
            / 2.0
    }
}

fn non_negative(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { fallback }
}

/// Reads a JSON map of fixture id -> priors.
pub fn load_priors_file(path: &Path) -> Result<HashMap<String, PriorData>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read priors file {}", path.display()))?;
    serde_json::from_str::<HashMap<String, PriorData>>(&raw).context("parse priors file")
}
