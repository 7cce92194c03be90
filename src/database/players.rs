use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, ToSql};
use uuid::Uuid;

use crate::pagination::PageRequest;

use super::models::{Player, PlayerFilter, PlayerWithGames};

pub(crate) const PLAYER_COLUMNS: &str = "id, name, email, description, latitude, longitude, \
     games_played, games_won, initial_ranking, ranking, profile_completion, created_at";

const PROFILE_FIELDS: i64 = 5;

/// Share of optional profile fields that carry a value, as a 0-100
/// percentage. Empty strings count as absent.
pub fn profile_completion(
    name: &str,
    email: Option<&str>,
    description: Option<&str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> i64 {
    let mut completed = 0;
    if !name.is_empty() {
        completed += 1;
    }
    if email.is_some_and(|v| !v.is_empty()) {
        completed += 1;
    }
    if description.is_some_and(|v| !v.is_empty()) {
        completed += 1;
    }
    if latitude.is_some() {
        completed += 1;
    }
    if longitude.is_some() {
        completed += 1;
    }
    completed * 100 / PROFILE_FIELDS
}

pub fn insert(
    conn: &Connection,
    name: &str,
    email: Option<&str>,
    description: Option<&str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    initial_ranking: i64,
) -> Result<Player> {
    let completion = profile_completion(name, email, description, latitude, longitude);
    let sql = format!(
        "INSERT INTO players (id, name, email, description, latitude, longitude, initial_ranking, ranking, profile_completion) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) \
         RETURNING {PLAYER_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            Uuid::new_v4(),
            name,
            email,
            description,
            latitude,
            longitude,
            initial_ranking,
            initial_ranking,
            completion
        ],
        parse_player_row,
    )
    .context("Failed to insert new player")
}

pub fn find_by_id(conn: &Connection, id: Uuid) -> Result<Option<Player>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn find_with_games(conn: &Connection, id: Uuid) -> Result<Option<PlayerWithGames>> {
    let player = match find_by_id(conn, id)? {
        Some(player) => player,
        None => return Ok(None),
    };
    let games = super::games::list_for_player(conn, id)?;

    Ok(Some(PlayerWithGames { player, games }))
}

#[derive(Debug, Clone, Default)]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub fn update(conn: &Connection, id: Uuid, patch: &PlayerPatch) -> Result<Option<Player>> {
    let current = match find_by_id(conn, id)? {
        Some(player) => player,
        None => return Ok(None),
    };

    // Absent patch fields keep their stored values; profile completion is
    // recomputed over the merged record.
    let name = patch.name.as_deref().unwrap_or(&current.name);
    let email = patch.email.as_deref().or(current.email.as_deref());
    let description = patch.description.as_deref().or(current.description.as_deref());
    let latitude = patch.latitude.or(current.latitude);
    let longitude = patch.longitude.or(current.longitude);
    let completion = profile_completion(name, email, description, latitude, longitude);

    let sql = format!(
        "UPDATE players SET name = ?1, email = ?2, description = ?3, latitude = ?4, longitude = ?5, profile_completion = ?6 \
         WHERE id = ?7 \
         RETURNING {PLAYER_COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![name, email, description, latitude, longitude, completion, id],
        parse_player_row,
    )
    .optional()
    .context("Failed to update player")
}

pub fn delete(conn: &Connection, id: Uuid) -> Result<Option<Player>> {
    let sql = format!("DELETE FROM players WHERE id = ?1 RETURNING {PLAYER_COLUMNS}");

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to delete player")
}

pub fn list(
    conn: &Connection,
    filter: &PlayerFilter,
    page: PageRequest,
) -> Result<(Vec<Player>, i64)> {
    let name_pattern = filter.name_contains.as_ref().map(|v| format!("%{v}%"));
    let email_pattern = filter.email_contains.as_ref().map(|v| format!("%{v}%"));
    let not_email_pattern = filter.email_not_contains.as_ref().map(|v| format!("%{v}%"));

    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<&dyn ToSql> = Vec::new();

    if let Some(ref pattern) = name_pattern {
        clauses.push("name LIKE ?");
        params.push(pattern);
    }
    if let Some(ref pattern) = email_pattern {
        clauses.push("email LIKE ?");
        params.push(pattern);
    }
    if let Some(ref pattern) = not_email_pattern {
        // NOT LIKE never matches NULL, so players without an email drop
        // out of the result as well.
        clauses.push("email NOT LIKE ?");
        params.push(pattern);
    }
    if let Some(ref latitude) = filter.latitude {
        clauses.push("latitude = ?");
        params.push(latitude);
    }
    if let Some(ref longitude) = filter.longitude {
        clauses.push("longitude = ?");
        params.push(longitude);
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM players{where_sql}"),
            params_from_iter(params.iter()),
            |row| row.get(0),
        )
        .context("Failed to count players")?;

    let order_sql = match filter.sort_by {
        Some(column) => format!(" ORDER BY {} {}", column.as_sql(), filter.sort_order.as_sql()),
        None => String::new(),
    };

    let limit = page.per_page;
    let offset = page.offset();
    params.push(&limit);
    params.push(&offset);

    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players{where_sql}{order_sql} LIMIT ? OFFSET ?");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok((rows, total))
}

/// Whole candidate pool for matchmaking, optionally excluding players
/// whose email contains the requester's.
pub fn list_candidates(conn: &Connection, exclude_email: Option<&str>) -> Result<Vec<Player>> {
    let exclude_pattern = exclude_email.map(|email| format!("%{email}%"));

    let mut sql = format!("SELECT {PLAYER_COLUMNS} FROM players");
    let mut params: Vec<&dyn ToSql> = Vec::new();
    if let Some(ref pattern) = exclude_pattern {
        sql.push_str(" WHERE email NOT LIKE ?");
        params.push(pattern);
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn increment_counters(conn: &Connection, id: Uuid, won: bool) -> Result<Player> {
    let sql = format!(
        "UPDATE players SET games_played = games_played + 1, games_won = games_won + ?1 \
         WHERE id = ?2 \
         RETURNING {PLAYER_COLUMNS}"
    );

    conn.query_row(&sql, params![i64::from(won), id], parse_player_row)
        .context("Failed to update player game counters")
}

pub fn update_ranking(conn: &Connection, id: Uuid, ranking: i64) -> Result<Player> {
    let sql = format!("UPDATE players SET ranking = ?1 WHERE id = ?2 RETURNING {PLAYER_COLUMNS}");

    conn.query_row(&sql, params![ranking, id], parse_player_row)
        .context("Failed to update player ranking")
}

pub(crate) fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        description: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        games_played: row.get(6)?,
        games_won: row.get(7)?,
        initial_ranking: row.get(8)?,
        ranking: row.get(9)?,
        profile_completion: row.get(10)?,
        created_at: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::{get_connection, memory_pool, DbConn};
    use crate::database::models::{PlayerSortColumn, SortOrder};

    fn test_conn() -> DbConn {
        let pool = memory_pool();
        get_connection(&pool).unwrap()
    }

    fn insert_named(conn: &Connection, name: &str, email: Option<&str>) -> Player {
        insert(conn, name, email, None, None, None, 1000).unwrap()
    }

    #[test]
    fn test_profile_completion_counts_populated_fields() {
        assert_eq!(profile_completion("Ana", None, None, None, None), 20);
        assert_eq!(
            profile_completion("Ana", Some("ana@example.com"), None, None, None),
            40
        );
        assert_eq!(
            profile_completion(
                "Ana",
                Some("ana@example.com"),
                Some("plays daily"),
                Some(52.2),
                Some(21.0)
            ),
            100
        );
        // Empty strings do not count as populated.
        assert_eq!(profile_completion("", Some(""), Some(""), None, None), 0);
    }

    #[test]
    fn test_insert_starts_at_initial_ranking() {
        let conn = test_conn();
        let player = insert(
            &conn,
            "Ana",
            Some("ana@example.com"),
            None,
            Some(52.2297),
            Some(21.0122),
            1000,
        )
        .unwrap();

        assert_eq!(player.ranking, 1000);
        assert_eq!(player.initial_ranking, 1000);
        assert_eq!(player.games_played, 0);
        assert_eq!(player.games_won, 0);
        assert_eq!(player.profile_completion, 80);
    }

    #[test]
    fn test_find_by_id() {
        let conn = test_conn();
        let player = insert_named(&conn, "Ana", None);

        let found = find_by_id(&conn, player.id).unwrap().unwrap();
        assert_eq!(found.id, player.id);
        assert_eq!(found.name, "Ana");

        assert!(find_by_id(&conn, Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_update_merges_missing_fields() {
        let conn = test_conn();
        let player = insert_named(&conn, "Ana", Some("ana@example.com"));

        let patch = PlayerPatch {
            description: Some("plays daily".to_string()),
            ..PlayerPatch::default()
        };
        let updated = update(&conn, player.id, &patch).unwrap().unwrap();

        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.email.as_deref(), Some("ana@example.com"));
        assert_eq!(updated.description.as_deref(), Some("plays daily"));
        assert_eq!(updated.profile_completion, 60);
    }

    #[test]
    fn test_update_missing_player_returns_none() {
        let conn = test_conn();
        let patch = PlayerPatch::default();
        assert!(update(&conn, Uuid::new_v4(), &patch).unwrap().is_none());
    }

    #[test]
    fn test_delete_is_hard() {
        let conn = test_conn();
        let player = insert_named(&conn, "Ana", None);

        let deleted = delete(&conn, player.id).unwrap().unwrap();
        assert_eq!(deleted.id, player.id);
        assert!(find_by_id(&conn, player.id).unwrap().is_none());
        assert!(delete(&conn, player.id).unwrap().is_none());
    }

    #[test]
    fn test_list_filters_by_name_substring() {
        let conn = test_conn();
        insert_named(&conn, "Alice", None);
        insert_named(&conn, "Alina", None);
        insert_named(&conn, "Bob", None);

        let filter = PlayerFilter {
            name_contains: Some("ali".to_string()),
            ..PlayerFilter::default()
        };
        let (players, total) = list(&conn, &filter, PageRequest::new(None, None)).unwrap();

        assert_eq!(total, 2);
        assert!(players.iter().all(|p| p.name.to_lowercase().contains("ali")));
    }

    #[test]
    fn test_list_not_email_excludes_players_without_email() {
        let conn = test_conn();
        insert_named(&conn, "Ana", Some("ana@example.com"));
        insert_named(&conn, "Bob", Some("bob@example.com"));
        insert_named(&conn, "Cat", None);

        let filter = PlayerFilter {
            email_not_contains: Some("ana@example.com".to_string()),
            ..PlayerFilter::default()
        };
        let (players, total) = list(&conn, &filter, PageRequest::new(None, None)).unwrap();

        assert_eq!(total, 1);
        assert_eq!(players[0].name, "Bob");
    }

    #[test]
    fn test_list_paginates_with_total() {
        let conn = test_conn();
        for i in 0..5 {
            insert_named(&conn, &format!("Player {i}"), None);
        }

        let filter = PlayerFilter::default();
        let (first, total) = list(&conn, &filter, PageRequest::new(Some(1), Some(2))).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(total, 5);

        let (last, _) = list(&conn, &filter, PageRequest::new(Some(3), Some(2))).unwrap();
        assert_eq!(last.len(), 1);
    }

    #[test]
    fn test_list_sorts_by_ranking() {
        let conn = test_conn();
        let low = insert_named(&conn, "Low", None);
        let high = insert_named(&conn, "High", None);
        update_ranking(&conn, low.id, 100).unwrap();
        update_ranking(&conn, high.id, 900).unwrap();

        let filter = PlayerFilter {
            sort_by: Some(PlayerSortColumn::Ranking),
            sort_order: SortOrder::Desc,
            ..PlayerFilter::default()
        };
        let (players, _) = list(&conn, &filter, PageRequest::new(None, None)).unwrap();

        assert_eq!(players[0].name, "High");
        assert_eq!(players[1].name, "Low");
    }

    #[test]
    fn test_list_candidates_excludes_matching_email() {
        let conn = test_conn();
        insert_named(&conn, "Ana", Some("ana@example.com"));
        insert_named(&conn, "Bob", Some("bob@example.com"));
        insert_named(&conn, "Cat", None);

        let candidates = list_candidates(&conn, Some("ana@example.com")).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Bob");

        // No email to exclude: the whole pool comes back.
        let all = list_candidates(&conn, None).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_increment_counters() {
        let conn = test_conn();
        let player = insert_named(&conn, "Ana", None);

        let after_win = increment_counters(&conn, player.id, true).unwrap();
        assert_eq!(after_win.games_played, 1);
        assert_eq!(after_win.games_won, 1);

        let after_loss = increment_counters(&conn, player.id, false).unwrap();
        assert_eq!(after_loss.games_played, 2);
        assert_eq!(after_loss.games_won, 1);
    }

    #[test]
    fn test_update_ranking() {
        let conn = test_conn();
        let player = insert_named(&conn, "Ana", None);

        let updated = update_ranking(&conn, player.id, 3700).unwrap();
        assert_eq!(updated.ranking, 3700);
        // The baseline never moves.
        assert_eq!(updated.initial_ranking, 1000);
    }
}
