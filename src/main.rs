use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use inplay_signals::batch::{self, MatchReport};
use inplay_signals::config::EngineConfig;
use inplay_signals::engine::MatchInput;
use inplay_signals::fake_feed;
use inplay_signals::priors::load_priors_file;
use inplay_signals::strategy::STRATEGY_VERSION;

/// A case file holds one match or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CaseFile {
    Many(Vec<MatchInput>),
    One(MatchInput),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportEnvelope {
    generated_at: String,
    strategy_version: u32,
    source: String,
    reports: Vec<MatchReport>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cfg = EngineConfig::from_env().context("load engine config")?;
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let demo = args.iter().any(|a| a == "--demo");
    let case_path = case_path_arg(&args).filter(|_| !demo);

    let (source, mut inputs) = match case_path {
        Some(path) => {
            let inputs = read_cases(&path)?;
            (path.display().to_string(), inputs)
        }
        None => {
            let seed = fake_feed::demo_seed();
            let step = fake_feed::demo_step();
            info!(seed, step, "running synthetic demo match");
            (format!("demo:{seed}"), fake_feed::demo_inputs(seed, step))
        }
    };

    if let Some(priors_path) = flag_value(&args, "--priors") {
        attach_priors(&mut inputs, Path::new(&priors_path))?;
    }

    info!(matches = inputs.len(), min_minute = cfg.min_minute, "analyzing");
    let reports = batch::analyze_batch(&inputs, &cfg);

    let envelope = ReportEnvelope {
        generated_at: Utc::now().to_rfc3339(),
        strategy_version: STRATEGY_VERSION,
        source,
        reports,
    };
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn read_cases(path: &Path) -> Result<Vec<MatchInput>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read case file {}", path.display()))?;
    let cases: CaseFile = serde_json::from_str(&raw)
        .with_context(|| format!("parse case file {}", path.display()))?;
    Ok(match cases {
        CaseFile::Many(list) => list,
        CaseFile::One(input) => vec![input],
    })
}

/// Fills in priors by match id for inputs that carry none.
fn attach_priors(inputs: &mut [MatchInput], path: &Path) -> Result<()> {
    let priors = load_priors_file(path)?;
    for input in inputs.iter_mut().filter(|i| i.priors.is_none()) {
        match input.id.as_deref().and_then(|id| priors.get(id)) {
            Some(found) => input.priors = Some(*found),
            None => warn!(id = input.label(), "no priors for match, using defaults"),
        }
    }
    Ok(())
}

fn case_path_arg(args: &[String]) -> Option<PathBuf> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--priors" {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        let trimmed = arg.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    None
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
