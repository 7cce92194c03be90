use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub games_played: i64,
    pub games_won: i64,
    pub initial_ranking: i64,
    pub ranking: i64,
    pub profile_completion: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Open,
    Waiting,
    Closed,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Open => "open",
            GameStatus::Waiting => "waiting",
            GameStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<GameStatus> {
        match value {
            "open" => Some(GameStatus::Open),
            "waiting" => Some(GameStatus::Waiting),
            "closed" => Some(GameStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Game {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: GameStatus,
    pub winner_ids: Vec<Uuid>,
    pub created_at: NaiveDateTime,
}

// DTOs for joined queries
#[derive(Debug, Clone, Serialize)]
pub struct GameWithPlayers {
    #[serde(flatten)]
    pub game: Game,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerWithGames {
    #[serde(flatten)]
    pub player: Player,
    pub games: Vec<Game>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSortColumn {
    Name,
    Ranking,
}

impl PlayerSortColumn {
    pub fn parse(value: &str) -> Option<PlayerSortColumn> {
        match value {
            "name" => Some(PlayerSortColumn::Name),
            "ranking" => Some(PlayerSortColumn::Ranking),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            PlayerSortColumn::Name => "name",
            PlayerSortColumn::Ranking => "ranking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSortColumn {
    Title,
    CreatedAt,
}

impl GameSortColumn {
    pub fn parse(value: &str) -> Option<GameSortColumn> {
        match value {
            "title" => Some(GameSortColumn::Title),
            "created_at" => Some(GameSortColumn::CreatedAt),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            GameSortColumn::Title => "title",
            GameSortColumn::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<SortOrder> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub name_contains: Option<String>,
    pub email_contains: Option<String>,
    pub email_not_contains: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sort_by: Option<PlayerSortColumn>,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Default)]
pub struct GameFilter {
    pub title_contains: Option<String>,
    pub status: Option<GameStatus>,
    pub sort_by: Option<GameSortColumn>,
    pub sort_order: SortOrder,
}
