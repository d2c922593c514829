use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::calculate::RESULTS_ELOS_FN;
use crate::config::LeagueConfig;
use crate::records::{self, ScoredMatch};

pub const CHART_DATA_FN: &str = "chartable_elos.json";

/// team -> (date -> post-match rating), both maps in sorted order.
pub type ChartSeries = BTreeMap<String, BTreeMap<String, i32>>;

/// Per-team rating-over-time series from rated results. Both sides of every
/// final match contribute their post-match rating under the match date;
/// dates a team didn't play simply don't appear.
pub fn chartable_series(scored: &[ScoredMatch]) -> ChartSeries {
    let mut out = ChartSeries::new();
    for m in scored {
        if !m.is_final() {
            continue;
        }
        let (Some(after_home), Some(after_away)) = (m.elo_after_home, m.elo_after_away) else {
            continue;
        };
        let date = m.date.to_string();
        out.entry(m.home_team.clone())
            .or_default()
            .insert(date.clone(), after_home);
        out.entry(m.away_team.clone())
            .or_default()
            .insert(date, after_away);
    }
    out
}

/// Read the rated results CSV and write the chartable JSON next to it.
pub fn build_chart_data(config: &LeagueConfig) -> Result<PathBuf> {
    let input_path = config.elos_output_path.join(RESULTS_ELOS_FN);
    let scored = records::read_scored_results(&input_path)?;
    let series = chartable_series(&scored);

    let output_path = config.elos_output_path.join(CHART_DATA_FN);
    let tmp = output_path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(&series).context("serialize chart data")?;
    fs::write(&tmp, json).context("write chart data")?;
    fs::rename(&tmp, &output_path).context("swap chart data")?;
    Ok(output_path)
}
