/// Rating math tunables. K = 6 is what 538 uses for NHL; weighting playoff
/// fixtures more heavily is a matter of constructing a different config, not
/// a separate code path.
#[derive(Debug, Clone, Copy)]
pub struct EloConfig {
    pub k: f64,
    pub home_adv_pts: f64,
    pub base_rating: i32,
    /// Season reversion removes 1/`reversion_denominator` of the distance
    /// back to `base_rating`.
    pub reversion_denominator: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            k: 6.0,
            home_adv_pts: 50.0,
            base_rating: 1300,
            reversion_denominator: 3.0,
        }
    }
}

/// Expected score for (home, away) before the match. Home advantage is added
/// to the home rating before the power-of-ten transform, so the two halves
/// always sum to 1.
pub fn expected_result(elo_home: i32, elo_away: i32, cfg: &EloConfig) -> (f64, f64) {
    let scale_home = 10f64.powf((elo_home as f64 + cfg.home_adv_pts) / 400.0);
    let scale_away = 10f64.powf(elo_away as f64 / 400.0);
    let expected_home = scale_home / (scale_home + scale_away);
    (expected_home, 1.0 - expected_home)
}

/// Points each side took from one fixture: 1 for winning, 0.5 each for a tie.
fn actual_result(home_score: u32, away_score: u32) -> (f64, f64) {
    if home_score > away_score {
        (1.0, 0.0)
    } else if home_score < away_score {
        (0.0, 1.0)
    } else {
        (0.5, 0.5)
    }
}

/// Margin-of-victory multiplier, per 538's NHL methodology. The log curve is
/// undefined at margin zero, so a tie gets a neutral 1.0 and the update is
/// scaled by K and the expected-outcome gap alone.
pub fn margin_multiplier(home_score: u32, away_score: u32) -> f64 {
    let margin = home_score.abs_diff(away_score);
    if margin == 0 {
        return 1.0;
    }
    0.6686 * f64::from(margin).ln() + 0.8048
}

/// New integer ratings for both sides from one final fixture.
pub fn calculate_elo(
    elo_home: i32,
    elo_away: i32,
    expected_win_home: f64,
    expected_win_away: f64,
    home_score: u32,
    away_score: u32,
    cfg: &EloConfig,
) -> (i32, i32) {
    let (actual_win_home, actual_win_away) = actual_result(home_score, away_score);
    let movm = margin_multiplier(home_score, away_score);

    let elo_new_home = elo_home as f64 + cfg.k * movm * (actual_win_home - expected_win_home);
    let elo_new_away = elo_away as f64 + cfg.k * movm * (actual_win_away - expected_win_away);

    (elo_new_home.round() as i32, elo_new_away.round() as i32)
}

/// Pull a season-ending rating partway back to the baseline, to account for
/// roster turnover, coaching changes and the like.
pub fn revert_to_mean(rating: i32, cfg: &EloConfig) -> i32 {
    let difference = f64::from(rating - cfg.base_rating);
    (f64::from(rating) - difference / cfg.reversion_denominator).round() as i32
}
