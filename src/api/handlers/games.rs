use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use std::sync::Arc;

use crate::api::envelope;
use crate::api::models::{CreateGameRequest, GameListData, ReportResultRequest, UpdateGameRequest};
use crate::api::validation::{self, Validator};
use crate::database::games::GamePatch;
use crate::database::models::{GameFilter, GameSortColumn, GameStatus, GameWithPlayers, SortOrder};
use crate::database::{self, games};
use crate::errors::ApiError;
use crate::pagination::PageRequest;
use crate::services::results::ResultService;

use super::{AppState, ListParams};

pub async fn create_game(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateGameRequest>,
) -> Result<Response, ApiError> {
    let mut validator = Validator::new();
    validator.text("body.title", &body.title, 1, 100);
    if let Some(ref description) = body.description {
        validator.text("body.description", description, 1, 255);
    }
    validator.finish()?;
    let player_ids = validation::parse_id_list("body.player_ids", &body.player_ids)?;

    let mut conn = database::get_connection(&state.pool)?;
    let game = games::create(&mut conn, &body.title, body.description.as_deref(), &player_ids)?;
    let players = games::participants(&conn, game.id)?;

    Ok(envelope::created(
        "Game created successfully",
        GameWithPlayers { game, players },
    ))
}

pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = validation::parse_uuid("params.id", &id)?;

    let conn = database::get_connection(&state.pool)?;
    match games::find_with_players(&conn, id)? {
        Some(game) => Ok(envelope::ok("Game retrieved successfully", game)),
        None => Err(ApiError::NotFound(format!("Game with id {id} not found"))),
    }
}

pub async fn list_games(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let mut validator = Validator::new();

    let status = match params.status.as_deref() {
        Some(value) => {
            let parsed = GameStatus::parse(value);
            if parsed.is_none() {
                validator.add("query.status", "must be one of: open, waiting, closed");
            }
            parsed
        }
        None => None,
    };
    let sort_by = match params.sort.as_deref() {
        Some(value) => {
            let parsed = GameSortColumn::parse(value);
            if parsed.is_none() {
                validator.add("query._sort", "must be one of: title, created_at");
            }
            parsed
        }
        None => None,
    };
    let sort_order = match params.order.as_deref() {
        Some(value) => {
            let parsed = SortOrder::parse(value);
            if parsed.is_none() {
                validator.add("query._order", "must be one of: asc, desc");
            }
            parsed.unwrap_or_default()
        }
        None => SortOrder::default(),
    };
    validator.finish()?;

    let page = PageRequest::new(params.page, params.per_page);
    let filter = GameFilter {
        title_contains: params.title,
        status,
        sort_by,
        sort_order,
    };

    let conn = database::get_connection(&state.pool)?;
    let (games, total) = games::list(&conn, &filter, page)?;

    Ok(envelope::ok(
        "Games retrieved successfully",
        GameListData {
            games,
            page_context: page.context(total),
        },
    ))
}

pub async fn update_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateGameRequest>,
) -> Result<Response, ApiError> {
    let id = validation::parse_uuid("params.id", &id)?;

    let mut validator = Validator::new();
    if let Some(ref description) = body.description {
        validator.text("body.description", description, 1, 255);
    }
    validator.finish()?;

    let add_player_ids = match body.add_player_ids {
        Some(ref raw) => Some(validation::parse_id_list("body.add_player_ids", raw)?),
        None => None,
    };
    let patch = GamePatch {
        description: body.description,
        add_player_ids,
    };

    let mut conn = database::get_connection(&state.pool)?;
    let game = games::update(&mut conn, id, &patch)?;

    Ok(envelope::ok("Game updated successfully", game))
}

pub async fn delete_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = validation::parse_uuid("params.id", &id)?;

    let mut conn = database::get_connection(&state.pool)?;
    let game = games::delete(&mut conn, id)?;

    Ok(envelope::ok("Game deleted permanently", game))
}

pub async fn report_result(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ReportResultRequest>,
) -> Result<Response, ApiError> {
    let game_id = validation::parse_uuid("params.id", &id)?;
    let winner_ids = validation::parse_id_list("body.winner_ids", &body.winner_ids)?;

    let mut conn = database::get_connection(&state.pool)?;
    let service = ResultService::new(state.config.ranking);
    let game = service.report_result(&mut conn, game_id, &winner_ids)?;
    let players = games::participants(&conn, game.id)?;

    Ok(envelope::ok(
        "Game result reported successfully",
        GameWithPlayers { game, players },
    ))
}
