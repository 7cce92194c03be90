use crate::config::settings::RankingSettings;

/// Recomputes a player's ranking from their lifetime record.
///
/// The score blends win rate with volume of play so that a newcomer with
/// one lucky win does not outrank a veteran, scaled by the ranking the
/// player started with. Clamped at zero; rankings never go negative.
pub fn calculate_ranking(
    games_played: i64,
    games_won: i64,
    initial_ranking: i64,
    settings: &RankingSettings,
) -> i64 {
    let win_percentage = if games_played > 0 {
        games_won as f64 / games_played as f64
    } else {
        0.0
    };
    let raw = (win_percentage * settings.win_factor
        + games_played as f64 * settings.games_played_factor)
        * initial_ranking as f64;
    raw.round().max(0.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> RankingSettings {
        RankingSettings::default()
    }

    #[test]
    fn test_no_games_means_zero_ranking() {
        assert_eq!(calculate_ranking(0, 0, 1000, &settings()), 0);
    }

    #[test]
    fn test_perfect_record() {
        // 100% wins over 10 games: (1.0 * 0.7 + 10 * 0.3) * 1000 = 3700
        assert_eq!(calculate_ranking(10, 10, 1000, &settings()), 3700);
    }

    #[test]
    fn test_all_losses_still_reward_volume() {
        // (0.0 * 0.7 + 4 * 0.3) * 1000 = 1200
        assert_eq!(calculate_ranking(4, 0, 1000, &settings()), 1200);
    }

    #[test]
    fn test_half_ranks_round_up() {
        // (0.0 * 0.7 + 1 * 0.3) * 1005 = 301.5, rounds away from zero
        assert_eq!(calculate_ranking(1, 0, 1005, &settings()), 302);
    }

    #[test]
    fn test_never_negative() {
        assert!(calculate_ranking(0, 0, -500, &settings()) >= 0);
        assert!(calculate_ranking(3, 1, -1000, &settings()) >= 0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let first = calculate_ranking(7, 3, 1000, &settings());
        let second = calculate_ranking(7, 3, 1000, &settings());
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_settings() {
        let custom = RankingSettings {
            win_factor: 1.0,
            games_played_factor: 0.0,
            default_initial_ranking: 1000,
        };
        // Pure win rate: (0.5 * 1.0 + 0) * 800 = 400
        assert_eq!(calculate_ranking(2, 1, 800, &custom), 400);
    }
}
