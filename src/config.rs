use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Placeholder spliced into `url` for leagues that put the season id in the
/// path instead of a query parameter.
pub const SEASON_ID_PLACEHOLDER: &str = "<season_id>";

/// League configuration, loaded from a JSON file (`league.config` by
/// default). Every recognized option is declared here; a missing required
/// field fails at load time, not when a pipeline stage trips over it.
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    /// Schedule feed endpoint.
    pub url: String,
    /// Season id is part of the url path (`<season_id>` placeholder).
    #[serde(default)]
    pub url_contains_id: bool,
    /// Season id goes in the `season_id` query parameter.
    #[serde(default)]
    pub param_id: bool,
    /// Fixed query parameters sent with every schedule request.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Directory for raw `season_<id>.json` payloads.
    pub output_path: PathBuf,
    /// Directory for the combined clean results CSV.
    pub clean_output_path: PathBuf,
    /// Directory for rating outputs (rated CSV, snapshot, charts, projections).
    pub elos_output_path: PathBuf,
    /// Key path from the feed payload root down to the match list.
    #[serde(default)]
    pub matches_path: Vec<String>,
    /// Season id -> season metadata, for labeling cleaned rows.
    #[serde(default)]
    pub seasons: BTreeMap<String, SeasonInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonInfo {
    pub year: i32,
    #[serde(rename = "type")]
    pub fixture_type: String,
}

impl LeagueConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read league config {}", path.display()))?;
        let config: LeagueConfig = serde_json::from_str(&raw)
            .with_context(|| format!("invalid league config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.url_contains_id && self.param_id {
            bail!("league config sets both url_contains_id and param_id");
        }
        if self.url_contains_id && !self.url.contains(SEASON_ID_PLACEHOLDER) {
            bail!("url_contains_id is set but url has no {SEASON_ID_PLACEHOLDER} placeholder");
        }
        Ok(())
    }
}
