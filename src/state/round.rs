use super::{GameError, GameResult, GameStore};
use crate::types::*;

impl Game {
    /// Find a round that still accepts polls and votes
    pub(crate) fn open_round_mut(&mut self, round_name: &str) -> GameResult<&mut Round> {
        let round = self
            .rounds
            .get_mut(round_name)
            .ok_or_else(|| GameError::NoSuchRound {
                game_id: self.id.clone(),
                round_name: round_name.to_string(),
            })?;

        if round.finalized {
            return Err(GameError::RoundFinalized {
                game_id: self.id.clone(),
                round_name: round_name.to_string(),
            });
        }
        Ok(round)
    }
}

impl GameStore {
    /// Add the next round to a game
    pub async fn add_round(&self, game_id: &str, round_name: &str) -> GameResult<()> {
        let game = self.game(game_id).await?;
        let mut game = game.write().await;

        if game.rounds.contains_key(round_name) {
            return Err(GameError::RoundExists {
                game_id: game_id.to_string(),
                round_name: round_name.to_string(),
            });
        }

        game.rounds_order.push(round_name.to_string());
        game.rounds.insert(round_name.to_string(), Round::default());
        tracing::info!(game_id, round_name, "Round added");
        Ok(())
    }

    /// Open a new poll in a round; earlier polls in the round are closed by it
    pub async fn add_poll(&self, game_id: &str, round_name: &str) -> GameResult<()> {
        let game = self.game(game_id).await?;
        let mut game = game.write().await;

        let round = game.open_round_mut(round_name)?;
        round.polls.push(Poll::new());
        tracing::info!(game_id, round_name, poll_no = round.polls.len(), "Poll opened");
        Ok(())
    }

    /// Accept the current poll and close the round for good
    pub async fn finalize_round(&self, game_id: &str, round_name: &str) -> GameResult<()> {
        let game = self.game(game_id).await?;
        let mut game = game.write().await;

        let round = game.open_round_mut(round_name)?;
        if round.polls.is_empty() {
            return Err(GameError::NoActivePoll {
                game_id: game_id.to_string(),
                round_name: round_name.to_string(),
            });
        }

        round.finalized = true;
        tracing::info!(game_id, round_name, "Round finalized");
        Ok(())
    }
}
