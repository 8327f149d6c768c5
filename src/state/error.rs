use crate::cards::Card;
use crate::types::{ClientId, GameId, PlayerName, RoundName};

/// Result type for game store operations
pub type GameResult<T> = Result<T, GameError>;

/// Rejected game store operations. A failed operation leaves the store untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("The game with ID '{game_id}' already exists.")]
    GameExists { game_id: GameId },

    #[error("The game with ID '{game_id}' does not exist.")]
    NoSuchGame { game_id: GameId },

    #[error("The round '{round_name}' already exists in the game '{game_id}'.")]
    RoundExists { game_id: GameId, round_name: RoundName },

    #[error("The round '{round_name}' was not found in the game '{game_id}'.")]
    NoSuchRound { game_id: GameId, round_name: RoundName },

    #[error("The round '{round_name}' of the game '{game_id}' has no active poll.")]
    NoActivePoll { game_id: GameId, round_name: RoundName },

    #[error("The round '{round_name}' of the game '{game_id}' has already been finalized.")]
    RoundFinalized { game_id: GameId, round_name: RoundName },

    #[error("The estimation '{estimation}' is not available in the game '{game_id}'.")]
    IllegalEstimation { game_id: GameId, estimation: Card },

    #[error("There is already a player with the name '{player_name}' in the game '{game_id}'.")]
    PlayerNameTaken { game_id: GameId, player_name: PlayerName },

    #[error("The player is already registered in the game '{game_id}' as '{player_name}'.")]
    PlayerAlreadyRegistered { game_id: GameId, player_name: PlayerName },

    #[error("The client is not a player in the game '{game_id}'.")]
    PlayerNotInGame { game_id: GameId, player_id: ClientId },
}
