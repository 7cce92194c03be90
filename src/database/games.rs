use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, ToSql};
use uuid::Uuid;

use crate::errors::DomainError;
use crate::pagination::PageRequest;

use super::models::{Game, GameFilter, GameStatus, GameWithPlayers, Player};
use super::players::{parse_player_row, PLAYER_COLUMNS};

pub(crate) const GAME_COLUMNS: &str = "id, title, description, status, winner_ids, created_at";

/// A game seats at most two players.
pub const MAX_GAME_PLAYERS: usize = 2;

pub fn create(
    conn: &mut Connection,
    title: &str,
    description: Option<&str>,
    player_ids: &[Uuid],
) -> Result<Game, DomainError> {
    let tx = conn
        .transaction()
        .context("Failed to start game creation transaction")?;

    for &player_id in player_ids {
        if super::players::find_by_id(&tx, player_id)?.is_none() {
            return Err(DomainError::PlayerNotFound(player_id));
        }
    }

    let sql = format!(
        "INSERT INTO games (id, title, description) VALUES (?1, ?2, ?3) RETURNING {GAME_COLUMNS}"
    );
    let game = tx
        .query_row(&sql, params![Uuid::new_v4(), title, description], parse_game_row)
        .context("Failed to insert game")?;

    attach_players(&tx, game.id, player_ids)?;

    tx.commit().context("Failed to commit game creation")?;
    Ok(game)
}

pub fn find_by_id(conn: &Connection, id: Uuid) -> Result<Option<Game>> {
    let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_game_row)
        .optional()
        .context("Failed to query game by id")
}

pub fn find_with_players(conn: &Connection, id: Uuid) -> Result<Option<GameWithPlayers>> {
    let game = match find_by_id(conn, id)? {
        Some(game) => game,
        None => return Ok(None),
    };
    let players = participants(conn, id)?;

    Ok(Some(GameWithPlayers { game, players }))
}

/// Players seated at a game, in the order they were attached.
pub fn participants(conn: &Connection, game_id: Uuid) -> Result<Vec<Player>> {
    let sql = format!(
        "SELECT {PLAYER_COLUMNS} FROM players \
         JOIN game_players ON game_players.player_id = players.id \
         WHERE game_players.game_id = ?1 \
         ORDER BY game_players.rowid"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![game_id], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_for_player(conn: &Connection, player_id: Uuid) -> Result<Vec<Game>> {
    let sql = format!(
        "SELECT {GAME_COLUMNS} FROM games \
         JOIN game_players ON game_players.game_id = games.id \
         WHERE game_players.player_id = ?1 \
         ORDER BY game_players.rowid"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![player_id], parse_game_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

#[derive(Debug, Clone, Default)]
pub struct GamePatch {
    pub description: Option<String>,
    pub add_player_ids: Option<Vec<Uuid>>,
}

pub fn update(conn: &mut Connection, id: Uuid, patch: &GamePatch) -> Result<Game, DomainError> {
    let tx = conn
        .transaction()
        .context("Failed to start game update transaction")?;

    let game = match find_by_id(&tx, id)? {
        Some(game) => game,
        None => return Err(DomainError::GameNotFound(id)),
    };
    if game.status == GameStatus::Closed {
        return Err(DomainError::GameClosed(id));
    }

    if let Some(ref description) = patch.description {
        tx.execute(
            "UPDATE games SET description = ?1 WHERE id = ?2",
            params![description, id],
        )
        .context("Failed to update game description")?;
    }

    if let Some(ref add_ids) = patch.add_player_ids {
        for &player_id in add_ids {
            if super::players::find_by_id(&tx, player_id)?.is_none() {
                return Err(DomainError::PlayerNotFound(player_id));
            }
        }

        let current = participants(&tx, id)?;
        let mut incoming = add_ids.clone();
        incoming.sort_unstable();
        incoming.dedup();
        let new_members = incoming
            .iter()
            .filter(|pid| !current.iter().any(|p| p.id == **pid))
            .count();
        if current.len() + new_members > MAX_GAME_PLAYERS {
            return Err(DomainError::GameFull(id));
        }

        attach_players(&tx, id, add_ids)?;
    }

    let updated = find_by_id(&tx, id)?.context("Game disappeared during update")?;
    tx.commit().context("Failed to commit game update")?;

    Ok(updated)
}

pub fn delete(conn: &mut Connection, id: Uuid) -> Result<Game, DomainError> {
    let tx = conn
        .transaction()
        .context("Failed to start game delete transaction")?;

    let game = match find_by_id(&tx, id)? {
        Some(game) => game,
        None => return Err(DomainError::GameNotFound(id)),
    };
    if game.status == GameStatus::Closed {
        return Err(DomainError::GameClosed(id));
    }

    tx.execute("DELETE FROM games WHERE id = ?1", params![id])
        .context("Failed to delete game")?;
    tx.commit().context("Failed to commit game delete")?;

    Ok(game)
}

pub fn list(conn: &Connection, filter: &GameFilter, page: PageRequest) -> Result<(Vec<Game>, i64)> {
    let title_pattern = filter.title_contains.as_ref().map(|v| format!("%{v}%"));
    let status = filter.status.map(|s| s.as_str());

    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<&dyn ToSql> = Vec::new();

    if let Some(ref pattern) = title_pattern {
        clauses.push("title LIKE ?");
        params.push(pattern);
    }
    if let Some(ref status) = status {
        clauses.push("status = ?");
        params.push(status);
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM games{where_sql}"),
            params_from_iter(params.iter()),
            |row| row.get(0),
        )
        .context("Failed to count games")?;

    let order_sql = match filter.sort_by {
        Some(column) => format!(" ORDER BY {} {}", column.as_sql(), filter.sort_order.as_sql()),
        None => String::new(),
    };

    let limit = page.per_page;
    let offset = page.offset();
    params.push(&limit);
    params.push(&offset);

    let sql = format!("SELECT {GAME_COLUMNS} FROM games{where_sql}{order_sql} LIMIT ? OFFSET ?");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), parse_game_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((rows, total))
}

/// Records the winners and moves the game to its terminal state. The
/// closed-game check belongs to the caller, which runs this inside a
/// wider transaction.
pub fn set_result(conn: &Connection, id: Uuid, winner_ids: &[Uuid]) -> Result<Game> {
    let winner_json = serde_json::to_string(winner_ids).context("Failed to encode winner ids")?;
    let sql = format!(
        "UPDATE games SET winner_ids = ?1, status = ?2 WHERE id = ?3 RETURNING {GAME_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![winner_json, GameStatus::Closed.as_str(), id],
        parse_game_row,
    )
    .context("Failed to close game with result")
}

fn attach_players(conn: &Connection, game_id: Uuid, player_ids: &[Uuid]) -> Result<()> {
    for &player_id in player_ids {
        conn.execute(
            "INSERT OR IGNORE INTO game_players (game_id, player_id) VALUES (?1, ?2)",
            params![game_id, player_id],
        )
        .context("Failed to attach player to game")?;
    }
    Ok(())
}

fn parse_game_row(row: &rusqlite::Row) -> rusqlite::Result<Game> {
    let status: String = row.get(3)?;
    let status = GameStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("unknown game status: {status}").into(),
        )
    })?;

    let winner_json: String = row.get(4)?;
    let winner_ids = serde_json::from_str(&winner_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Game {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status,
        winner_ids,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::{get_connection, memory_pool, DbConn};
    use crate::database::models::{GameSortColumn, SortOrder};
    use crate::database::players;

    fn test_conn() -> DbConn {
        let pool = memory_pool();
        get_connection(&pool).unwrap()
    }

    fn insert_player(conn: &Connection, name: &str) -> Player {
        players::insert(conn, name, None, None, None, None, 1000).unwrap()
    }

    #[test]
    fn test_create_attaches_players_in_order() {
        let mut conn = test_conn();
        let ana = insert_player(&conn, "Ana");
        let bob = insert_player(&conn, "Bob");

        let game = create(&mut conn, "Friday night", None, &[ana.id, bob.id]).unwrap();

        assert_eq!(game.status, GameStatus::Open);
        assert!(game.winner_ids.is_empty());

        let seated = participants(&conn, game.id).unwrap();
        assert_eq!(seated.len(), 2);
        assert_eq!(seated[0].id, ana.id);
        assert_eq!(seated[1].id, bob.id);
    }

    #[test]
    fn test_create_rejects_unknown_player_and_rolls_back() {
        let mut conn = test_conn();
        let ana = insert_player(&conn, "Ana");
        let ghost = Uuid::new_v4();

        let err = create(&mut conn, "Friday night", None, &[ana.id, ghost]).unwrap_err();
        assert!(matches!(err, DomainError::PlayerNotFound(id) if id == ghost));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_find_with_players() {
        let mut conn = test_conn();
        let ana = insert_player(&conn, "Ana");
        let game = create(&mut conn, "Solo warmup", Some("practice"), &[ana.id]).unwrap();

        let found = find_with_players(&conn, game.id).unwrap().unwrap();
        assert_eq!(found.game.id, game.id);
        assert_eq!(found.players.len(), 1);

        assert!(find_with_players(&conn, Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_update_changes_description() {
        let mut conn = test_conn();
        let ana = insert_player(&conn, "Ana");
        let game = create(&mut conn, "Friday night", None, &[ana.id]).unwrap();

        let patch = GamePatch {
            description: Some("rescheduled".to_string()),
            ..GamePatch::default()
        };
        let updated = update(&mut conn, game.id, &patch).unwrap();
        assert_eq!(updated.description.as_deref(), Some("rescheduled"));
    }

    #[test]
    fn test_update_attaches_new_players_up_to_capacity() {
        let mut conn = test_conn();
        let ana = insert_player(&conn, "Ana");
        let bob = insert_player(&conn, "Bob");
        let cat = insert_player(&conn, "Cat");
        let game = create(&mut conn, "Friday night", None, &[ana.id]).unwrap();

        let patch = GamePatch {
            add_player_ids: Some(vec![bob.id]),
            ..GamePatch::default()
        };
        update(&mut conn, game.id, &patch).unwrap();
        assert_eq!(participants(&conn, game.id).unwrap().len(), 2);

        // A full game refuses a third seat.
        let overflow = GamePatch {
            add_player_ids: Some(vec![cat.id]),
            ..GamePatch::default()
        };
        let err = update(&mut conn, game.id, &overflow).unwrap_err();
        assert!(matches!(err, DomainError::GameFull(id) if id == game.id));

        // Re-attaching an existing participant is a no-op, not overflow.
        let repeat = GamePatch {
            add_player_ids: Some(vec![bob.id]),
            ..GamePatch::default()
        };
        update(&mut conn, game.id, &repeat).unwrap();
        assert_eq!(participants(&conn, game.id).unwrap().len(), 2);
    }

    #[test]
    fn test_update_rejects_missing_and_closed_games() {
        let mut conn = test_conn();
        let ana = insert_player(&conn, "Ana");
        let game = create(&mut conn, "Friday night", None, &[ana.id]).unwrap();

        let patch = GamePatch::default();
        let err = update(&mut conn, Uuid::new_v4(), &patch).unwrap_err();
        assert!(matches!(err, DomainError::GameNotFound(_)));

        set_result(&conn, game.id, &[ana.id]).unwrap();
        let err = update(&mut conn, game.id, &patch).unwrap_err();
        assert!(matches!(err, DomainError::GameClosed(id) if id == game.id));
    }

    #[test]
    fn test_delete_removes_game_and_memberships() {
        let mut conn = test_conn();
        let ana = insert_player(&conn, "Ana");
        let game = create(&mut conn, "Friday night", None, &[ana.id]).unwrap();

        let deleted = delete(&mut conn, game.id).unwrap();
        assert_eq!(deleted.id, game.id);
        assert!(find_by_id(&conn, game.id).unwrap().is_none());

        let memberships: i64 = conn
            .query_row("SELECT COUNT(*) FROM game_players", [], |row| row.get(0))
            .unwrap();
        assert_eq!(memberships, 0);
    }

    #[test]
    fn test_delete_rejects_closed_game() {
        let mut conn = test_conn();
        let ana = insert_player(&conn, "Ana");
        let game = create(&mut conn, "Friday night", None, &[ana.id]).unwrap();
        set_result(&conn, game.id, &[ana.id]).unwrap();

        let err = delete(&mut conn, game.id).unwrap_err();
        assert!(matches!(err, DomainError::GameClosed(id) if id == game.id));
        assert!(find_by_id(&conn, game.id).unwrap().is_some());
    }

    #[test]
    fn test_list_filters_by_title_and_status() {
        let mut conn = test_conn();
        let ana = insert_player(&conn, "Ana");
        let open = create(&mut conn, "Friday night", None, &[ana.id]).unwrap();
        create(&mut conn, "Sunday morning", None, &[ana.id]).unwrap();
        set_result(&conn, open.id, &[ana.id]).unwrap();

        let by_title = GameFilter {
            title_contains: Some("friday".to_string()),
            ..GameFilter::default()
        };
        let (games, total) = list(&conn, &by_title, PageRequest::new(None, None)).unwrap();
        assert_eq!(total, 1);
        assert_eq!(games[0].title, "Friday night");

        let by_status = GameFilter {
            status: Some(GameStatus::Closed),
            ..GameFilter::default()
        };
        let (games, total) = list(&conn, &by_status, PageRequest::new(None, None)).unwrap();
        assert_eq!(total, 1);
        assert_eq!(games[0].id, open.id);
    }

    #[test]
    fn test_list_sorts_by_title() {
        let mut conn = test_conn();
        let ana = insert_player(&conn, "Ana");
        create(&mut conn, "Beta", None, &[ana.id]).unwrap();
        create(&mut conn, "Alpha", None, &[ana.id]).unwrap();

        let filter = GameFilter {
            sort_by: Some(GameSortColumn::Title),
            sort_order: SortOrder::Asc,
            ..GameFilter::default()
        };
        let (games, _) = list(&conn, &filter, PageRequest::new(None, None)).unwrap();
        assert_eq!(games[0].title, "Alpha");
        assert_eq!(games[1].title, "Beta");
    }

    #[test]
    fn test_set_result_closes_and_records_winners() {
        let mut conn = test_conn();
        let ana = insert_player(&conn, "Ana");
        let bob = insert_player(&conn, "Bob");
        let game = create(&mut conn, "Friday night", None, &[ana.id, bob.id]).unwrap();

        let closed = set_result(&conn, game.id, &[ana.id]).unwrap();
        assert_eq!(closed.status, GameStatus::Closed);
        assert_eq!(closed.winner_ids, vec![ana.id]);

        let reloaded = find_by_id(&conn, game.id).unwrap().unwrap();
        assert_eq!(reloaded.status, GameStatus::Closed);
        assert_eq!(reloaded.winner_ids, vec![ana.id]);
    }

    #[test]
    fn test_list_for_player_only_returns_their_games() {
        let mut conn = test_conn();
        let ana = insert_player(&conn, "Ana");
        let bob = insert_player(&conn, "Bob");
        let shared = create(&mut conn, "Shared", None, &[ana.id, bob.id]).unwrap();
        create(&mut conn, "Bob solo", None, &[bob.id]).unwrap();

        let games = list_for_player(&conn, ana.id).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, shared.id);
    }
}
