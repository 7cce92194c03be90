#[derive(Clone, Copy)]
pub struct RankingSettings {
    pub win_factor: f64,
    pub games_played_factor: f64,
    pub default_initial_ranking: i64,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            win_factor: 0.7,
            games_played_factor: 0.3,
            default_initial_ranking: 1000,
        }
    }
}

#[derive(Clone, Copy)]
pub struct MatchmakingSettings {
    pub max_distance_km: f64,
    pub ranking_difference_range: i64,
}

impl Default for MatchmakingSettings {
    fn default() -> Self {
        Self {
            max_distance_km: 20.0,
            ranking_difference_range: 200,
        }
    }
}

#[derive(Clone, Copy)]
pub struct AppConfig {
    pub ranking: RankingSettings,
    pub matchmaking: MatchmakingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            ranking: RankingSettings::default(),
            matchmaking: MatchmakingSettings::default(),
        }
    }
}

// Config travels by value (it is a handful of numbers) so handlers and
// services can hold their own copy instead of sharing a global.
