use serde::{Deserialize, Serialize};

/// One cumulative counter split by side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeAway {
    #[serde(default)]
    pub home: i32,
    #[serde(default)]
    pub away: i32,
}

impl HomeAway {
    pub fn new(home: i32, away: i32) -> Self {
        Self { home, away }
    }

    /// Saturates instead of overflowing on absurd feeds.
    pub fn total(&self) -> i32 {
        self.home.saturating_add(self.away)
    }

    fn clamped(&self) -> Self {
        Self {
            home: self.home.max(0),
            away: self.away.max(0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCounts {
    #[serde(default)]
    pub yellow: i32,
    #[serde(default)]
    pub red: i32,
}

impl CardCounts {
    pub fn total(&self) -> i32 {
        self.yellow.saturating_add(self.red)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Possession {
    pub home: f64,
    pub away: f64,
}

impl Default for Possession {
    fn default() -> Self {
        Self {
            home: 50.0,
            away: 50.0,
        }
    }
}

impl Possession {
    pub fn gap(&self) -> f64 {
        (self.home - self.away).abs()
    }

    fn clamped(&self) -> Self {
        Self {
            home: clamp_pct(self.home),
            away: clamp_pct(self.away),
        }
    }
}

/// Cumulative in-match counters at one moment, as delivered by the live-data
/// provider. Counters are signed so that malformed negatives survive parsing and
/// can be clamped by [`StatSnapshot::sanitized`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSnapshot {
    #[serde(default)]
    pub corners: HomeAway,
    #[serde(default)]
    pub cards: CardCounts,
    #[serde(default)]
    pub shots: HomeAway,
    #[serde(default)]
    pub shots_on_target: HomeAway,
    #[serde(default)]
    pub possession: Possession,
    #[serde(default)]
    pub fouls: HomeAway,
}

impl StatSnapshot {
    /// Copy with negative counters clamped to zero and possession forced into 0..=100.
    pub fn sanitized(&self) -> Self {
        Self {
            corners: self.corners.clamped(),
            cards: CardCounts {
                yellow: self.cards.yellow.max(0),
                red: self.cards.red.max(0),
            },
            shots: self.shots.clamped(),
            shots_on_target: self.shots_on_target.clamped(),
            possession: self.possession.clamped(),
            fouls: self.fouls.clamped(),
        }
    }

    /// Builds a snapshot from provider statistic rows ("Corner kicks", "Ball possession", ...).
    /// Rows whose cells don't parse are skipped; unmatched counters stay at their defaults.
    pub fn from_stat_rows(rows: &[StatRow]) -> Self {
        let mut out = Self::default();
        for row in rows {
            let name = row.name.trim().to_lowercase();
            let (Some(h), Some(a)) = (parse_stat_cell(&row.home), parse_stat_cell(&row.away))
            else {
                continue;
            };
            let counter = HomeAway::new(h.round() as i32, a.round() as i32);

            // First match wins, so "shots on target" must not be caught by the plain shots rule.
            if name.contains("corner") {
                out.corners = counter;
            } else if name == "total shots" || name == "shots" {
                out.shots = counter;
            } else if name.contains("shots on target") {
                out.shots_on_target = counter;
            } else if name.contains("possession") {
                out.possession = Possession { home: h, away: a };
            } else if name.contains("foul") {
                out.fouls = counter;
            } else if name.contains("yellow") {
                out.cards.yellow = counter.total();
            } else if name.contains("red") {
                out.cards.red = counter.total();
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentScore {
    #[serde(default)]
    pub home: i32,
    #[serde(default)]
    pub away: i32,
}

impl CurrentScore {
    pub fn new(home: i32, away: i32) -> Self {
        Self { home, away }
    }

    pub fn total(&self) -> i32 {
        self.home.saturating_add(self.away)
    }

    /// Positive when the home side leads.
    pub fn diff(&self) -> i32 {
        self.home.saturating_sub(self.away)
    }

    pub fn sanitized(&self) -> Self {
        Self {
            home: self.home.max(0),
            away: self.away.max(0),
        }
    }
}

/// A single provider statistic line, raw cell text included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatRow {
    #[serde(default)]
    pub group: Option<String>,
    pub name: String,
    pub home: String,
    pub away: String,
}

pub fn parse_stat_cell(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    let s = s.trim_end_matches('%').replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn clamp_pct(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 100.0) } else { 50.0 }
}
