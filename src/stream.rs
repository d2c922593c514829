use tracing::debug;

use crate::elo::{self, EloConfig};
use crate::error::PipelineError;
use crate::records::{MatchRecord, ScoredMatch};
use crate::store::RatingStore;

/// Replay a date-ordered match stream through the rating engine.
///
/// Per match: skip non-final rows, run the season-boundary check, read
/// pre-match ratings (seeding newcomers), compute expected outcomes and new
/// ratings, write both sides back, stamp the store date. Output order mirrors
/// input order; the same store and input always produce the same output.
pub fn process_matches(
    matches: &[MatchRecord],
    store: &mut RatingStore,
    cfg: &EloConfig,
) -> Result<Vec<ScoredMatch>, PipelineError> {
    let mut out = Vec::with_capacity(matches.len());

    for record in matches {
        if !record.is_final() {
            out.push(ScoredMatch::passthrough(record.clone()));
            continue;
        }

        store.maybe_advance_season(record.season, cfg)?;

        let elo_before_home = store.get_or_seed(&record.home_team, cfg);
        let elo_before_away = store.get_or_seed(&record.away_team, cfg);

        let (expected_win_home, expected_win_away) =
            elo::expected_result(elo_before_home, elo_before_away, cfg);

        let (elo_after_home, elo_after_away) = elo::calculate_elo(
            elo_before_home,
            elo_before_away,
            expected_win_home,
            expected_win_away,
            record.home_score,
            record.away_score,
            cfg,
        );

        store.set(&record.home_team, elo_after_home);
        store.set(&record.away_team, elo_after_away);
        store.date = Some(record.date);

        debug!(
            date = %record.date,
            home = %record.home_team,
            away = %record.away_team,
            elo_after_home,
            elo_after_away,
            "rated match"
        );

        out.push(ScoredMatch {
            date: record.date,
            status: record.status.clone(),
            away_team: record.away_team.clone(),
            away_score: record.away_score,
            home_team: record.home_team.clone(),
            home_score: record.home_score,
            venue: record.venue.clone(),
            season: record.season,
            fixture_type: record.fixture_type.clone(),
            elo_before_home: Some(elo_before_home),
            elo_before_away: Some(elo_before_away),
            elo_after_home: Some(elo_after_home),
            elo_after_away: Some(elo_after_away),
            expected_win_home: Some(expected_win_home),
            expected_win_away: Some(expected_win_away),
        });
    }

    Ok(out)
}
