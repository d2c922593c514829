use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{LeagueConfig, SeasonInfo};
use crate::records::{self, CLEAN_RESULTS_FN, MatchRecord, normalize_team_name};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Combine every fetched `season_<id>.json` into one clean,
/// chronologically-sorted results CSV.
pub fn combine_seasons(config: &LeagueConfig) -> Result<PathBuf> {
    let entries = fs::read_dir(&config.output_path)
        .with_context(|| format!("read raw seasons dir {}", config.output_path.display()))?;

    let mut all = Vec::new();
    for entry in entries {
        let entry = entry.context("read raw seasons dir entry")?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let Some(season_id) = season_id_from_filename(&file_name) else {
            continue;
        };
        let season = config.seasons.get(&season_id).ok_or_else(|| {
            anyhow!("season {season_id} from {file_name} is not declared in config seasons")
        })?;

        let raw = fs::read_to_string(entry.path())
            .with_context(|| format!("read season file {file_name}"))?;
        let payload: Value =
            serde_json::from_str(&raw).with_context(|| format!("invalid json in {file_name}"))?;
        let rows = clean_season(&payload, season)
            .with_context(|| format!("clean season file {file_name}"))?;
        info!(season_id, rows = rows.len(), "cleaned season file");
        all.extend(rows);
    }

    if all.is_empty() {
        return Err(anyhow!(
            "no season files found under {}",
            config.output_path.display()
        ));
    }

    // The rating engine depends on strict date order. Season breaks date
    // ties so output doesn't depend on directory iteration order.
    all.sort_by_key(|r| (r.date, r.season));

    fs::create_dir_all(&config.clean_output_path)
        .with_context(|| format!("create {}", config.clean_output_path.display()))?;
    let output_path = config.clean_output_path.join(CLEAN_RESULTS_FN);
    records::write_clean_results(&output_path, &all)?;
    Ok(output_path)
}

/// Extract the season id from a raw season filename (`season_<id>.json`).
pub fn season_id_from_filename(filename: &str) -> Option<String> {
    let id = filename.strip_prefix("season_")?.strip_suffix(".json")?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Map one season's raw feed payload onto clean match records. Rows missing a
/// required field are rejected here, before anything reaches the rating
/// engine.
pub fn clean_season(payload: &Value, season: &SeasonInfo) -> Result<Vec<MatchRecord>> {
    let games = payload
        .as_array()
        .ok_or_else(|| anyhow!("season payload is not a match array"))?;

    let mut out = Vec::with_capacity(games.len());
    for game in games {
        match parse_raw_game(game, season) {
            Some(record) => out.push(record),
            None => warn!(game = %game, "dropping malformed schedule row"),
        }
    }
    Ok(out)
}

fn parse_raw_game(v: &Value, season: &SeasonInfo) -> Option<MatchRecord> {
    let status = string_field(v, "game_status")?;
    let home_team = normalize_team_name(&string_field(v, "home_team_city")?);
    let away_team = normalize_team_name(&string_field(v, "visiting_team_city")?);
    let date = parse_feed_date(&string_field(v, "date_played")?)?;
    let venue = string_field(v, "venue_name").unwrap_or_default();

    let home_score = count_field(v, "home_goal_count");
    let away_score = count_field(v, "visiting_goal_count");
    let (home_score, away_score) = match (home_score, away_score) {
        (Some(h), Some(a)) => (h, a),
        // A final result without scores is malformed; an unplayed game just
        // has no score yet.
        _ if records::status_is_final(&status) => return None,
        _ => (0, 0),
    };

    Some(MatchRecord {
        date,
        status,
        away_team,
        away_score,
        home_team,
        home_score,
        venue,
        season: season.year,
        fixture_type: season.fixture_type.clone(),
    })
}

fn string_field(v: &Value, key: &str) -> Option<String> {
    let s = v.get(key)?.as_str()?.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

fn count_field(v: &Value, key: &str) -> Option<u32> {
    let value = v.get(key)?;
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value.as_str()?.trim().parse::<u32>().ok()
}

fn parse_feed_date(raw: &str) -> Option<NaiveDate> {
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn season() -> SeasonInfo {
        serde_json::from_value(serde_json::json!({"year": 2024, "type": "regular"})).unwrap()
    }

    #[test]
    fn season_id_from_filename_works() {
        assert_eq!(season_id_from_filename("season_5.json"), Some("5".into()));
        assert_eq!(season_id_from_filename("season_12.json"), Some("12".into()));
        assert_eq!(season_id_from_filename("season_.json"), None);
        assert_eq!(season_id_from_filename("notes.txt"), None);
    }

    #[test]
    fn cleans_string_and_numeric_scores() {
        let payload = serde_json::json!([
            {
                "game_status": "Final",
                "home_team_city": "Toronto",
                "visiting_team_city": "Montreal",
                "home_goal_count": "3",
                "visiting_goal_count": 2,
                "venue_name": "Coca-Cola Coliseum",
                "date_played": "2024-01-01"
            }
        ]);
        let rows = clean_season(&payload, &season()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].home_team, "toronto");
        assert_eq!(rows[0].away_team, "montréal");
        assert_eq!(rows[0].home_score, 3);
        assert_eq!(rows[0].away_score, 2);
        assert_eq!(rows[0].season, 2024);
        assert_eq!(rows[0].fixture_type, "regular");
    }

    #[test]
    fn unplayed_games_keep_zero_scores() {
        let payload = serde_json::json!([
            {
                "game_status": "7:00 pm EST",
                "home_team_city": "Boston",
                "visiting_team_city": "New York",
                "venue_name": "Tsongas Center",
                "date_played": "2024/02/07"
            }
        ]);
        let rows = clean_season(&payload, &season()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_final());
        assert_eq!((rows[0].home_score, rows[0].away_score), (0, 0));
    }

    #[test]
    fn final_without_scores_is_dropped() {
        let payload = serde_json::json!([
            {
                "game_status": "Final",
                "home_team_city": "Boston",
                "visiting_team_city": "New York",
                "date_played": "2024-02-07"
            }
        ]);
        let rows = clean_season(&payload, &season()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn date_formats_tolerated() {
        assert_eq!(
            parse_feed_date("2024-03-09"),
            NaiveDate::from_ymd_opt(2024, 3, 9)
        );
        assert_eq!(
            parse_feed_date("2024/03/09"),
            NaiveDate::from_ymd_opt(2024, 3, 9)
        );
        assert_eq!(
            parse_feed_date("03/09/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 9)
        );
        assert_eq!(parse_feed_date("yesterday"), None);
    }
}
