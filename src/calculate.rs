use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::config::LeagueConfig;
use crate::elo::EloConfig;
use crate::error::PipelineError;
use crate::records::{self, CLEAN_RESULTS_FN, ScoredMatch};
use crate::store::RatingStore;
use crate::stream;

pub const RESULTS_ELOS_FN: &str = "league_all_results_with_elos.csv";
pub const NEW_RESULTS_ELOS_FN: &str = "league_new_results_with_elos.csv";
pub const LATEST_ELOS_FN: &str = "latest_elos.json";

#[derive(Debug)]
pub struct RatingRun {
    pub results_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub matches_rated: usize,
}

/// Full replay: every clean result from scratch, producing the rated CSV and
/// the latest-ratings snapshot.
pub fn calculate(config: &LeagueConfig, cfg: &EloConfig) -> Result<RatingRun> {
    let input_path = config.clean_output_path.join(CLEAN_RESULTS_FN);
    let mut matches = records::read_clean_results(&input_path)?;
    // The clean file is written sorted; re-sort anyway since everything
    // downstream depends on it.
    matches.sort_by_key(|r| r.date);

    let Some(first) = matches.first() else {
        return Err(PipelineError::EmptyResults {
            path: input_path.display().to_string(),
        }
        .into());
    };

    let mut store = RatingStore::new(first.season);
    let scored = stream::process_matches(&matches, &mut store, cfg)?;
    write_rating_outputs(config, &scored, &store, RESULTS_ELOS_FN)
}

/// Incremental continuation: extend an existing snapshot with results dated
/// strictly after it, so re-running on unchanged data is a no-op.
pub fn update(config: &LeagueConfig, cfg: &EloConfig) -> Result<RatingRun> {
    let snapshot_path = config.elos_output_path.join(LATEST_ELOS_FN);
    let mut store = RatingStore::load(&snapshot_path)?;

    let input_path = config.clean_output_path.join(CLEAN_RESULTS_FN);
    let mut matches = records::read_clean_results(&input_path)?;
    matches.sort_by_key(|r| r.date);
    let fresh: Vec<_> = match store.date {
        Some(cutoff) => matches.into_iter().filter(|r| r.date > cutoff).collect(),
        None => matches,
    };
    info!(fresh = fresh.len(), "processing results newer than snapshot");

    let scored = stream::process_matches(&fresh, &mut store, cfg)?;
    write_rating_outputs(config, &scored, &store, NEW_RESULTS_ELOS_FN)
}

fn write_rating_outputs(
    config: &LeagueConfig,
    scored: &[ScoredMatch],
    store: &RatingStore,
    results_fn: &str,
) -> Result<RatingRun> {
    fs::create_dir_all(&config.elos_output_path)?;
    let results_path = config.elos_output_path.join(results_fn);
    records::write_scored_results(&results_path, scored)?;

    let snapshot_path = config.elos_output_path.join(LATEST_ELOS_FN);
    store.save(&snapshot_path)?;

    let matches_rated = scored.iter().filter(|m| m.elo_after_home.is_some()).count();
    info!(
        matches_rated,
        teams = store.teams.len(),
        "rating run complete"
    );
    Ok(RatingRun {
        results_path,
        snapshot_path,
        matches_rated,
    })
}
