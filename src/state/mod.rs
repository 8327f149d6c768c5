mod error;
mod game;
mod player;
mod round;
mod vote;

pub use error::{GameError, GameResult};

use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory store owning every game, round, poll and registration.
///
/// The outer lock only guards the game index. Each operation then holds its
/// game's own lock for its whole duration, so operations on one game are atomic
/// and operations on different games do not wait on each other.
#[derive(Clone, Default)]
pub struct GameStore {
    games: Arc<RwLock<HashMap<GameId, Arc<RwLock<Game>>>>>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn game(&self, game_id: &str) -> GameResult<Arc<RwLock<Game>>> {
        self.games
            .read()
            .await
            .get(game_id)
            .cloned()
            .ok_or_else(|| GameError::NoSuchGame {
                game_id: game_id.to_string(),
            })
    }
}
