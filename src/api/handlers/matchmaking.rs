use axum::extract::State;
use axum::response::Response;
use axum::Json;
use std::sync::Arc;

use crate::api::envelope;
use crate::api::models::{MatchmakingRequest, MessageData};
use crate::api::validation;
use crate::database;
use crate::errors::ApiError;
use crate::services::matchmaking::{MatchmakingOutcome, MatchmakingService};

use super::AppState;

/// Every outcome is a 200: either the created game or a message
/// explaining why no game was formed.
pub async fn request_matchmaking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MatchmakingRequest>,
) -> Result<Response, ApiError> {
    let player_id = validation::parse_uuid("body.player_id", &body.player_id)?;

    let mut conn = database::get_connection(&state.pool)?;
    let service = MatchmakingService::new(state.config.matchmaking);
    let outcome = service.request_match(&mut conn, player_id)?;

    Ok(match outcome {
        MatchmakingOutcome::GameCreated(found) => envelope::ok("Matchmaking game created", found),
        other => envelope::ok(
            "No game was formed",
            MessageData {
                message: other.message(),
            },
        ),
    })
}
