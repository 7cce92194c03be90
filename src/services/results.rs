use anyhow::Context;
use rusqlite::Connection;
use uuid::Uuid;

use crate::config::settings::RankingSettings;
use crate::database::models::{Game, GameStatus};
use crate::database::{games, players};
use crate::errors::DomainError;
use crate::ranking::calculate_ranking;

pub struct ResultService {
    config: RankingSettings,
}

impl ResultService {
    pub fn new(config: RankingSettings) -> Self {
        Self { config }
    }

    /// Applies a reported result: every participant's counters and ranking
    /// move, then the game closes with the winners frozen. All writes share
    /// one transaction, so a failure leaves nothing half-applied.
    pub fn report_result(
        &self,
        conn: &mut Connection,
        game_id: Uuid,
        winner_ids: &[Uuid],
    ) -> Result<Game, DomainError> {
        let tx = conn
            .transaction()
            .context("Failed to start result transaction")?;

        let game = match games::find_by_id(&tx, game_id)? {
            Some(game) => game,
            None => return Err(DomainError::GameNotFound(game_id)),
        };
        if game.status == GameStatus::Closed {
            return Err(DomainError::GameClosed(game_id));
        }

        let participants = games::participants(&tx, game_id)?;
        for &winner_id in winner_ids {
            if !participants.iter().any(|p| p.id == winner_id) {
                return Err(DomainError::WinnerNotParticipant {
                    game: game_id,
                    player: winner_id,
                });
            }
        }

        for participant in &participants {
            let won = winner_ids.contains(&participant.id);
            let updated = players::increment_counters(&tx, participant.id, won)?;
            let ranking = calculate_ranking(
                updated.games_played,
                updated.games_won,
                updated.initial_ranking,
                &self.config,
            );
            players::update_ranking(&tx, participant.id, ranking)?;
        }

        let closed = games::set_result(&tx, game_id, winner_ids)?;
        tx.commit().context("Failed to commit result report")?;

        Ok(closed)
    }
}
