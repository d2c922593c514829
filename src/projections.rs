use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calculate::LATEST_ELOS_FN;
use crate::config::LeagueConfig;
use crate::elo::{self, EloConfig};
use crate::records::{self, CLEAN_RESULTS_FN, MatchRecord};
use crate::store::RatingStore;

pub const GAME_PROJECTIONS_FN: &str = "game_projections.json";

const UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureProjection {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub elo_home: i32,
    pub elo_away: i32,
    pub expected_win_home: f64,
    pub expected_win_away: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectionsFile {
    pub generated_at: String,
    pub snapshot_date: Option<NaiveDate>,
    pub fixtures: Vec<FixtureProjection>,
}

/// Win probabilities for the next not-yet-final fixtures, read against a
/// ratings snapshot. Teams the snapshot has never seen project from the base
/// rating.
pub fn upcoming_projections(
    matches: &[MatchRecord],
    store: &RatingStore,
    cfg: &EloConfig,
    limit: usize,
) -> Vec<FixtureProjection> {
    matches
        .iter()
        .filter(|r| !r.is_final())
        .take(limit)
        .map(|r| {
            let elo_home = store.rating_or_base(&r.home_team, cfg);
            let elo_away = store.rating_or_base(&r.away_team, cfg);
            let (expected_win_home, expected_win_away) =
                elo::expected_result(elo_home, elo_away, cfg);
            FixtureProjection {
                date: r.date,
                home_team: r.home_team.clone(),
                away_team: r.away_team.clone(),
                elo_home,
                elo_away,
                expected_win_home,
                expected_win_away,
            }
        })
        .collect()
}

/// Load the latest snapshot plus the clean results and write projections for
/// the next fixtures.
pub fn build_projections(config: &LeagueConfig, cfg: &EloConfig) -> Result<PathBuf> {
    let store = RatingStore::load(&config.elos_output_path.join(LATEST_ELOS_FN))?;
    let mut matches = records::read_clean_results(&config.clean_output_path.join(CLEAN_RESULTS_FN))?;
    matches.sort_by_key(|r| r.date);

    let file = ProjectionsFile {
        generated_at: Utc::now().to_rfc3339(),
        snapshot_date: store.date,
        fixtures: upcoming_projections(&matches, &store, cfg, UPCOMING_LIMIT),
    };

    let output_path = config.elos_output_path.join(GAME_PROJECTIONS_FN);
    let tmp = output_path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(&file).context("serialize projections")?;
    fs::write(&tmp, json).context("write projections")?;
    fs::rename(&tmp, &output_path).context("swap projections")?;
    Ok(output_path)
}
