use super::{GameError, GameResult, GameStore};
use crate::types::*;

impl GameStore {
    /// Register a client as a player in a game under a display name
    pub async fn add_player(&self, game_id: &str, player_id: &str, player_name: &str) -> GameResult<()> {
        let game = self.game(game_id).await?;
        let mut game = game.write().await;

        if let Some(existing) = game.player_by_id(player_id) {
            return Err(GameError::PlayerAlreadyRegistered {
                game_id: game_id.to_string(),
                player_name: existing.name.clone(),
            });
        }

        if game.player_by_name(player_name).is_some() {
            return Err(GameError::PlayerNameTaken {
                game_id: game_id.to_string(),
                player_name: player_name.to_string(),
            });
        }

        game.players.push(Player {
            id: player_id.to_string(),
            name: player_name.to_string(),
        });
        tracing::info!(game_id, player_name, "Player joined");
        Ok(())
    }
}
