use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::elo::{self, EloConfig};
use crate::error::PipelineError;

/// Running rating state for one league. Persisted as `latest_elos.json`:
/// `{"date": "YYYY-MM-DD"|null, "current_season": int, "teams": {name: rating}}`.
///
/// Team keys use sorted order so the snapshot file is byte-stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingStore {
    pub date: Option<NaiveDate>,
    pub current_season: i32,
    pub teams: BTreeMap<String, i32>,
}

impl RatingStore {
    pub fn new(starting_season: i32) -> Self {
        Self {
            date: None,
            current_season: starting_season,
            teams: BTreeMap::new(),
        }
    }

    /// Current rating for a team, seeding newcomers at the base rating.
    pub fn get_or_seed(&mut self, team: &str, cfg: &EloConfig) -> i32 {
        if let Some(rating) = self.teams.get(team) {
            return *rating;
        }
        self.teams.insert(team.to_string(), cfg.base_rating);
        cfg.base_rating
    }

    pub fn set(&mut self, team: &str, rating: i32) {
        self.teams.insert(team.to_string(), rating);
    }

    pub fn rating_or_base(&self, team: &str, cfg: &EloConfig) -> i32 {
        self.teams.get(team).copied().unwrap_or(cfg.base_rating)
    }

    /// Season-boundary check, applied before reading any pre-match rating.
    /// Advancing reverts every tracked rating toward the mean; a season index
    /// moving backwards is a fatal ordering violation and leaves the store
    /// untouched.
    pub fn maybe_advance_season(
        &mut self,
        match_season: i32,
        cfg: &EloConfig,
    ) -> Result<(), PipelineError> {
        if match_season > self.current_season {
            self.revert_all(cfg);
            self.current_season = match_season;
        } else if match_season < self.current_season {
            return Err(PipelineError::OrderingViolation {
                match_season,
                current_season: self.current_season,
            });
        }
        Ok(())
    }

    pub fn revert_all(&mut self, cfg: &EloConfig) {
        for rating in self.teams.values_mut() {
            *rating = elo::revert_to_mean(*rating, cfg);
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read ratings snapshot {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid ratings snapshot {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).context("serialize ratings snapshot")?;
        fs::write(&tmp, json).context("write ratings snapshot")?;
        fs::rename(&tmp, path).context("swap ratings snapshot")?;
        Ok(())
    }
}

pub const REVERTED_ELOS_FN: &str = "latest_elos_reverted.json";

/// Revert every rating in a snapshot file toward the mean, for starting a new
/// season by hand. The season index is left alone; the first processed match
/// of the new season advances it.
pub fn revert_snapshot(input: &Path, output_dir: &Path, cfg: &EloConfig) -> Result<PathBuf> {
    let mut store = RatingStore::load(input)?;
    store.revert_all(cfg);
    let output_path = output_dir.join(REVERTED_ELOS_FN);
    store.save(&output_path)?;
    Ok(output_path)
}
