use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use std::sync::Arc;

use crate::api::envelope;
use crate::api::models::{CreatePlayerRequest, PlayerListData, UpdatePlayerRequest};
use crate::api::validation::{self, Validator};
use crate::database::models::{PlayerFilter, PlayerSortColumn, SortOrder};
use crate::database::players::PlayerPatch;
use crate::database::{self, players};
use crate::errors::ApiError;
use crate::pagination::PageRequest;

use super::{AppState, ListParams};

pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePlayerRequest>,
) -> Result<Response, ApiError> {
    let mut validator = Validator::new();
    validator.text("body.name", &body.name, 1, 100);
    if let Some(ref email) = body.email {
        validator.email("body.email", email);
    }
    if let Some(ref description) = body.description {
        validator.text("body.description", description, 1, 255);
    }
    if let Some(latitude) = body.latitude {
        validator.latitude("body.latitude", latitude);
    }
    if let Some(longitude) = body.longitude {
        validator.longitude("body.longitude", longitude);
    }
    validator.finish()?;

    let conn = database::get_connection(&state.pool)?;
    let player = players::insert(
        &conn,
        &body.name,
        body.email.as_deref(),
        body.description.as_deref(),
        body.latitude,
        body.longitude,
        state.config.ranking.default_initial_ranking,
    )?;

    Ok(envelope::created("Player created successfully", player))
}

pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = validation::parse_uuid("params.id", &id)?;

    let conn = database::get_connection(&state.pool)?;
    match players::find_with_games(&conn, id)? {
        Some(player) => Ok(envelope::ok("Player retrieved successfully", player)),
        None => Err(ApiError::NotFound(format!("Player with id {id} not found"))),
    }
}

pub async fn list_players(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let mut validator = Validator::new();
    if let Some(ref email) = params.email {
        validator.email("query.email", email);
    }
    if let Some(ref not_email) = params.not_email {
        validator.email("query.not_email", not_email);
    }
    if let Some(latitude) = params.latitude {
        validator.latitude("query.latitude", latitude);
    }
    if let Some(longitude) = params.longitude {
        validator.longitude("query.longitude", longitude);
    }

    let sort_by = match params.sort.as_deref() {
        Some(value) => {
            let parsed = PlayerSortColumn::parse(value);
            if parsed.is_none() {
                validator.add("query._sort", "must be one of: name, ranking");
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
    let filter = PlayerFilter {
        name_contains: params.name,
        email_contains: params.email,
        email_not_contains: params.not_email,
        latitude: params.latitude,
        longitude: params.longitude,
        sort_by,
        sort_order,
    };

    let conn = database::get_connection(&state.pool)?;
    let (players, total) = players::list(&conn, &filter, page)?;

    Ok(envelope::ok(
        "Players retrieved successfully",
        PlayerListData {
            players,
            page_context: page.context(total),
        },
    ))
}

pub async fn update_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePlayerRequest>,
) -> Result<Response, ApiError> {
    let id = validation::parse_uuid("params.id", &id)?;

    let mut validator = Validator::new();
    if let Some(ref name) = body.name {
        validator.text("body.name", name, 1, 100);
    }
    if let Some(ref email) = body.email {
        validator.email("body.email", email);
    }
    if let Some(ref description) = body.description {
        validator.text("body.description", description, 1, 255);
    }
    if let Some(latitude) = body.latitude {
        validator.latitude("body.latitude", latitude);
    }
    if let Some(longitude) = body.longitude {
        validator.longitude("body.longitude", longitude);
    }
    validator.finish()?;

    let patch = PlayerPatch {
        name: body.name,
        email: body.email,
        description: body.description,
        latitude: body.latitude,
        longitude: body.longitude,
    };

    let conn = database::get_connection(&state.pool)?;
    match players::update(&conn, id, &patch)? {
        Some(player) => Ok(envelope::ok("Player updated successfully", player)),
        None => Err(ApiError::NotFound(format!("Player with id {id} not found"))),
    }
}

pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = validation::parse_uuid("params.id", &id)?;

    let conn = database::get_connection(&state.pool)?;
    match players::delete(&conn, id)? {
        Some(player) => Ok(envelope::ok("Player deleted permanently", player)),
        None => Err(ApiError::NotFound(format!("Player with id {id} not found"))),
    }
}
