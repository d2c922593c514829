use std::fs;
use std::path::PathBuf;

use league_elo::calculate;
use league_elo::chart_data;
use league_elo::clean;
use league_elo::config::LeagueConfig;
use league_elo::elo::EloConfig;
use league_elo::projections::{self, ProjectionsFile};
use league_elo::records;
use league_elo::store::RatingStore;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

/// A league config rooted in a throwaway directory, with the fixture seasons
/// copied in as if `getseason` had fetched them.
fn staged_config(tag: &str) -> (LeagueConfig, PathBuf) {
    let root = std::env::temp_dir().join(format!("league_elo_{tag}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&root);
    let raw_dir = root.join("raw");
    fs::create_dir_all(&raw_dir).expect("create raw dir");
    for season in ["season_5.json", "season_6.json"] {
        fs::copy(fixture_path(season), raw_dir.join(season)).expect("stage season fixture");
    }

    let config: LeagueConfig = serde_json::from_value(serde_json::json!({
        "url": "https://stats.example.com/feed",
        "param_id": true,
        "output_path": raw_dir,
        "clean_output_path": root.join("clean"),
        "elos_output_path": root.join("output"),
        "seasons": {
            "5": {"year": 2024, "type": "regular"},
            "6": {"year": 2025, "type": "regular"}
        }
    }))
    .expect("valid test config");
    (config, root)
}

#[test]
fn cleandata_combines_and_normalizes() {
    let (config, root) = staged_config("clean");

    let clean_path = clean::combine_seasons(&config).unwrap();
    let rows = records::read_clean_results(&clean_path).unwrap();

    assert_eq!(rows.len(), 5);
    // Chronological across season files.
    assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
    // Names are normalized before anything touches the store.
    assert_eq!(rows[0].home_team, "toronto");
    assert_eq!(rows[0].away_team, "montréal");
    assert_eq!(rows[1].away_team, "new_york");
    // Season labeling comes from the config's seasons table.
    assert_eq!(rows[0].season, 2024);
    assert_eq!(rows[4].season, 2025);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn calculate_produces_rated_csv_and_snapshot() {
    let (config, root) = staged_config("calc");
    clean::combine_seasons(&config).unwrap();

    let run = calculate::calculate(&config, &EloConfig::default()).unwrap();
    assert_eq!(run.matches_rated, 4);

    let scored = records::read_scored_results(&run.results_path).unwrap();
    assert_eq!(scored.len(), 5);
    // Opening night: both sides seeded, home favored, home lost by one.
    assert_eq!(scored[0].elo_before_home, Some(1300));
    assert_eq!(scored[0].elo_after_home, Some(1297));
    assert_eq!(scored[0].elo_after_away, Some(1303));
    // The unplayed March game passes through blank.
    assert!(scored[3].elo_before_home.is_none());

    let store = RatingStore::load(&run.snapshot_path).unwrap();
    assert_eq!(store.current_season, 2025);
    assert_eq!(store.date.map(|d| d.to_string()), Some("2025-01-04".into()));
    assert_eq!(store.teams.len(), 5);
    assert!(store.teams.contains_key("montréal"));
    for rating in store.teams.values() {
        assert!((1200..=1400).contains(rating));
    }

    let _ = fs::remove_dir_all(root);
}

#[test]
fn update_on_unchanged_data_is_a_no_op() {
    let (config, root) = staged_config("update");
    clean::combine_seasons(&config).unwrap();

    let first = calculate::calculate(&config, &EloConfig::default()).unwrap();
    let before = RatingStore::load(&first.snapshot_path).unwrap();

    let second = calculate::update(&config, &EloConfig::default()).unwrap();
    assert_eq!(second.matches_rated, 0);
    let after = RatingStore::load(&second.snapshot_path).unwrap();
    assert_eq!(before, after);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn chartable_series_covers_every_final_appearance() {
    let (config, root) = staged_config("chart");
    clean::combine_seasons(&config).unwrap();
    calculate::calculate(&config, &EloConfig::default()).unwrap();

    let chart_path = chart_data::build_chart_data(&config).unwrap();
    let raw = fs::read_to_string(chart_path).unwrap();
    let series: chart_data::ChartSeries = serde_json::from_str(&raw).unwrap();

    // toronto played finals on three dates across two seasons.
    assert_eq!(series["toronto"].len(), 3);
    assert_eq!(series["toronto"]["2024-01-01"], 1297);
    // The unplayed game contributes nothing for either side.
    assert_eq!(series["montréal"].len(), 1);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn projections_cover_the_next_unplayed_fixtures() {
    let (config, root) = staged_config("proj");
    clean::combine_seasons(&config).unwrap();
    calculate::calculate(&config, &EloConfig::default()).unwrap();

    let path = projections::build_projections(&config, &EloConfig::default()).unwrap();
    let raw = fs::read_to_string(path).unwrap();
    let file: ProjectionsFile = serde_json::from_str(&raw).unwrap();

    assert_eq!(file.fixtures.len(), 1);
    let fixture = &file.fixtures[0];
    assert_eq!(fixture.home_team, "montréal");
    assert_eq!(fixture.away_team, "boston");
    assert!((fixture.expected_win_home + fixture.expected_win_away - 1.0).abs() < 1e-9);
    assert_eq!(file.snapshot_date.map(|d| d.to_string()), Some("2025-01-04".into()));

    let _ = fs::remove_dir_all(root);
}
