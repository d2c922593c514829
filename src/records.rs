use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const CLEAN_RESULTS_FN: &str = "league_all_results.csv";

/// One row of the combined results file, post-cleaning: names normalized,
/// rows in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub status: String,
    pub away_team: String,
    pub away_score: u32,
    pub home_team: String,
    pub home_score: u32,
    pub venue: String,
    pub season: i32,
    pub fixture_type: String,
}

impl MatchRecord {
    /// Only rows the feed marked final carry a usable result.
    pub fn is_final(&self) -> bool {
        status_is_final(&self.status)
    }
}

/// A match record plus the rating context computed while replaying it.
/// Non-final rows pass through with the rating columns left empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub date: NaiveDate,
    pub status: String,
    pub away_team: String,
    pub away_score: u32,
    pub home_team: String,
    pub home_score: u32,
    pub venue: String,
    pub season: i32,
    pub fixture_type: String,
    pub elo_before_home: Option<i32>,
    pub elo_before_away: Option<i32>,
    pub elo_after_home: Option<i32>,
    pub elo_after_away: Option<i32>,
    pub expected_win_home: Option<f64>,
    pub expected_win_away: Option<f64>,
}

impl ScoredMatch {
    pub fn passthrough(record: MatchRecord) -> Self {
        Self {
            date: record.date,
            status: record.status,
            away_team: record.away_team,
            away_score: record.away_score,
            home_team: record.home_team,
            home_score: record.home_score,
            venue: record.venue,
            season: record.season,
            fixture_type: record.fixture_type,
            elo_before_home: None,
            elo_before_away: None,
            elo_after_home: None,
            elo_after_away: None,
            expected_win_home: None,
            expected_win_away: None,
        }
    }

    pub fn is_final(&self) -> bool {
        status_is_final(&self.status)
    }
}

pub fn status_is_final(status: &str) -> bool {
    status.to_lowercase().contains("final")
}

/// Stable team identity: trimmed, lowercased, spaces to underscores. The feed
/// strips the accent from Montréal; put it back so the team never splits into
/// two keys.
pub fn normalize_team_name(name: &str) -> String {
    let name = name.trim().replace(' ', "_").to_lowercase();
    if name == "montreal" {
        return standardize_montreal(&name);
    }
    name
}

fn standardize_montreal(name: &str) -> String {
    name.replace('e', "é")
}

pub fn read_clean_results(path: &Path) -> Result<Vec<MatchRecord>> {
    let file =
        File::open(path).with_context(|| format!("open results file {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for row in reader.deserialize() {
        let record: MatchRecord =
            row.with_context(|| format!("invalid results row in {}", path.display()))?;
        out.push(record);
    }
    Ok(out)
}

pub fn write_clean_results(path: &Path, records: &[MatchRecord]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for record in records {
        writer.serialize(record).context("write results row")?;
    }
    writer.flush().context("flush results file")?;
    Ok(())
}

pub fn read_scored_results(path: &Path) -> Result<Vec<ScoredMatch>> {
    let file =
        File::open(path).with_context(|| format!("open rated results {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for row in reader.deserialize() {
        let record: ScoredMatch =
            row.with_context(|| format!("invalid rated row in {}", path.display()))?;
        out.push(record);
    }
    Ok(out)
}

pub fn write_scored_results(path: &Path, records: &[ScoredMatch]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for record in records {
        writer.serialize(record).context("write rated row")?;
    }
    writer.flush().context("flush rated results")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spacing_and_case() {
        assert_eq!(normalize_team_name(" New York "), "new_york");
        assert_eq!(normalize_team_name("Boston"), "boston");
        assert_eq!(normalize_team_name("ST. LOUIS PARK"), "st._louis_park");
    }

    #[test]
    fn montreal_regains_its_accent() {
        assert_eq!(normalize_team_name("Montreal"), "montréal");
        assert_eq!(normalize_team_name(" montreal "), "montréal");
        // Already-accented input is left alone.
        assert_eq!(normalize_team_name("Montréal"), "montréal");
    }

    #[test]
    fn final_marker_is_case_insensitive() {
        assert!(status_is_final("Final"));
        assert!(status_is_final("Final OT"));
        assert!(status_is_final("FINAL SO"));
        assert!(!status_is_final("7:00 pm EST"));
        assert!(!status_is_final(""));
    }
}
