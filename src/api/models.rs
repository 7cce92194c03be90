use serde::{Deserialize, Serialize};

use crate::database::models::{Game, Player};
use crate::pagination::PageContext;

// Request bodies. Unknown fields are rejected so typos surface as 400s
// instead of silently dropped input.

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePlayerRequest {
    pub name: String,
    pub email: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePlayerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateGameRequest {
    pub title: String,
    pub description: Option<String>,
    pub player_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateGameRequest {
    pub description: Option<String>,
    pub add_player_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportResultRequest {
    pub winner_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchmakingRequest {
    pub player_id: String,
}

// Response payloads.

#[derive(Debug, Serialize)]
pub struct PlayerListData {
    pub players: Vec<Player>,
    pub page_context: PageContext,
}

#[derive(Debug, Serialize)]
pub struct GameListData {
    pub games: Vec<Game>,
    pub page_context: PageContext,
}

/// Carrier for matchmaking outcomes that did not produce a game.
#[derive(Debug, Serialize)]
pub struct MessageData {
    pub message: String,
}
