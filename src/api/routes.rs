use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;

use crate::api::handlers::{games, matchmaking, ping, players, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .nest("/api/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/players",
            post(players::create_player).get(players::list_players),
        )
        .route(
            "/players/:id",
            get(players::get_player)
                .patch(players::update_player)
                .delete(players::delete_player),
        )
        .route("/games", post(games::create_game).get(games::list_games))
        .route(
            "/games/:id",
            get(games::get_game)
                .patch(games::update_game)
                .delete(games::delete_game),
        )
        .route("/games/:id/report", patch(games::report_result))
        .route(
            "/games/matchmaking/request",
            post(matchmaking::request_matchmaking),
        )
}
