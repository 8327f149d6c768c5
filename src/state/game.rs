use super::{GameError, GameResult, GameStore};
use crate::cards::Card;
use crate::types::*;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

impl GameStore {
    /// Register a game with its moderator as the first player
    pub async fn add_game(
        &self,
        game_id: &str,
        moderator_id: &str,
        moderator_name: &str,
        cards: Vec<Card>,
    ) -> GameResult<()> {
        let mut games = self.games.write().await;

        match games.entry(game_id.to_string()) {
            Entry::Occupied(_) => Err(GameError::GameExists {
                game_id: game_id.to_string(),
            }),
            Entry::Vacant(slot) => {
                let game = Game::new(
                    game_id.to_string(),
                    moderator_id.to_string(),
                    moderator_name.to_string(),
                    cards,
                );
                slot.insert(Arc::new(RwLock::new(game)));
                tracing::info!(game_id, moderator_name, "Game created");
                Ok(())
            }
        }
    }

    /// Copy out all public data of a game
    pub async fn serialize_game(&self, game_id: &str) -> GameResult<GameSnapshot> {
        let game = self.game(game_id).await?;
        let snapshot = game.read().await.snapshot();
        Ok(snapshot)
    }

    /// Check if a client is the moderator of the game
    pub async fn client_owns_game(&self, game_id: &str, client_id: &str) -> GameResult<bool> {
        let game = self.game(game_id).await?;
        let owns = game.read().await.moderator_id == client_id;
        Ok(owns)
    }

    /// Number of games created since startup (games are never removed)
    pub async fn games_count(&self) -> usize {
        self.games.read().await.len()
    }
}
