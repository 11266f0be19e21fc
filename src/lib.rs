pub mod batch;
pub mod confidence;
pub mod config;
pub mod engine;
pub mod fake_feed;
pub mod line_select;
pub mod priors;
pub mod probability;
pub mod projection;
pub mod recommend;
pub mod snapshot;
pub mod strategy;

pub use config::{ConfigError, EngineConfig};
pub use engine::{MatchAnalysis, MatchInput, analyze_match};
pub use recommend::{BetRecommendation, BetType};
