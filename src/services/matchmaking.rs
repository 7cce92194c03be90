use log::info;
use rusqlite::Connection;
use uuid::Uuid;

use crate::config::settings::MatchmakingSettings;
use crate::database::models::GameWithPlayers;
use crate::database::{games, players};
use crate::errors::DomainError;
use crate::geo;

const MATCHMAKING_DESCRIPTION: &str =
    "Matchmaking found for players with a similar ranking who are geographically close.";

/// Terminal outcomes of a matchmaking request. Every variant is a
/// normal result the caller handles, not an error.
#[derive(Debug)]
pub enum MatchmakingOutcome {
    PlayerNotFound { player_id: Uuid },
    LocationMissing { player_name: String },
    GameCreated(GameWithPlayers),
    NoMatchFound { player_name: String },
}

impl MatchmakingOutcome {
    pub fn message(&self) -> String {
        match self {
            MatchmakingOutcome::PlayerNotFound { player_id } => {
                format!("Player with id {player_id} not found.")
            }
            MatchmakingOutcome::LocationMissing { player_name } => format!(
                "Location for player {player_name} is not set. Distance matchmaking is unavailable."
            ),
            MatchmakingOutcome::GameCreated(found) => {
                format!("Game {} created", found.game.id)
            }
            MatchmakingOutcome::NoMatchFound { player_name } => format!(
                "No compatible players found for {player_name} right now. Try again later."
            ),
        }
    }
}

pub struct MatchmakingService {
    config: MatchmakingSettings,
}

impl MatchmakingService {
    pub fn new(config: MatchmakingSettings) -> Self {
        Self { config }
    }

    /// Pairs the requesting player with the first candidate inside the
    /// distance and ranking windows, creating an open game for the two
    /// of them. Scans the whole pool; candidates without coordinates
    /// are skipped, as is the requester's own row.
    pub fn request_match(
        &self,
        conn: &mut Connection,
        player_id: Uuid,
    ) -> Result<MatchmakingOutcome, DomainError> {
        let requester = match players::find_by_id(conn, player_id)? {
            Some(player) => player,
            None => return Ok(MatchmakingOutcome::PlayerNotFound { player_id }),
        };
        let (Some(latitude), Some(longitude)) = (requester.latitude, requester.longitude) else {
            return Ok(MatchmakingOutcome::LocationMissing {
                player_name: requester.name,
            });
        };

        let candidates = players::list_candidates(conn, requester.email.as_deref())?;
        for candidate in candidates {
            if candidate.id == requester.id {
                continue;
            }
            let (Some(cand_latitude), Some(cand_longitude)) =
                (candidate.latitude, candidate.longitude)
            else {
                continue;
            };

            let distance = geo::distance_km(latitude, longitude, cand_latitude, cand_longitude);
            if distance > self.config.max_distance_km {
                continue;
            }
            let ranking_difference = (requester.ranking - candidate.ranking).abs();
            if ranking_difference > self.config.ranking_difference_range {
                continue;
            }

            info!(
                "Matched {} with {} ({distance:.1} km apart, ranking difference {ranking_difference})",
                requester.name, candidate.name
            );

            let title = format!("Game between {} and {}", requester.name, candidate.name);
            let game = games::create(
                conn,
                &title,
                Some(MATCHMAKING_DESCRIPTION),
                &[requester.id, candidate.id],
            )?;
            let players = games::participants(conn, game.id)?;

            return Ok(MatchmakingOutcome::GameCreated(GameWithPlayers {
                game,
                players,
            }));
        }

        Ok(MatchmakingOutcome::NoMatchFound {
            player_name: requester.name,
        })
    }
}
