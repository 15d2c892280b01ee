// Current-season vs historical baseline blending.

/// Weight given to the current-season rate after `games_played` of
/// `season_games`: the fraction of the season already played, capped at 1.
///
/// Returns 0.0 for a zero-length season.
pub fn current_season_weight(games_played: u32, season_games: u32) -> f64 {
    if season_games == 0 {
        return 0.0;
    }
    (games_played as f64 / season_games as f64).min(1.0)
}

/// Linear interpolation between the historical baseline and the observed
/// current-season rate, keyed by [`current_season_weight`].
///
/// Early in the season the baseline dominates; by the final game the
/// observed rate is used as-is.
pub fn blend_rate(current: f64, baseline: f64, games_played: u32, season_games: u32) -> f64 {
    let w = current_season_weight(games_played, season_games);
    w * current + (1.0 - w) * baseline
}
