use crate::cards::Card;
use serde::Serialize;
use std::collections::HashMap;

/// Opaque ID types for type safety
pub type GameId = String;
pub type ClientId = String;
pub type RoundName = String;
pub type PlayerName = String;

/// One round of vote-casting: display name -> estimation.
pub type Poll = HashMap<PlayerName, Card>;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: ClientId,
    pub name: PlayerName,
}

#[derive(Debug, Clone, Default)]
pub struct Round {
    pub polls: Vec<Poll>,
    pub finalized: bool,
}

impl Round {
    /// The poll currently accepting votes, if any.
    pub fn active_poll_mut(&mut self) -> Option<&mut Poll> {
        if self.finalized {
            return None;
        }
        self.polls.last_mut()
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    pub id: GameId,
    pub cards: Vec<Card>,
    pub moderator_id: ClientId,
    /// Registered players in join order; the moderator is always first.
    pub players: Vec<Player>,
    pub rounds_order: Vec<RoundName>,
    pub rounds: HashMap<RoundName, Round>,
}

impl Game {
    pub fn new(id: GameId, moderator_id: ClientId, moderator_name: PlayerName, cards: Vec<Card>) -> Self {
        Self {
            id,
            cards,
            players: vec![Player {
                id: moderator_id.clone(),
                name: moderator_name,
            }],
            moderator_id,
            rounds_order: Vec::new(),
            rounds: HashMap::new(),
        }
    }

    pub fn player_by_id(&self, client_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == client_id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn accepts(&self, estimation: &Card) -> bool {
        self.cards.contains(estimation)
    }

    /// Copy out the public state. Client identifiers are never included.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.players.iter().map(|p| p.name.clone()).collect(),
            cards: self.cards.clone(),
            rounds_order: self.rounds_order.clone(),
            rounds: self
                .rounds
                .iter()
                .map(|(name, round)| {
                    (
                        name.clone(),
                        RoundSnapshot {
                            polls: round.polls.clone(),
                            finalized: round.finalized,
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Public, fully copied view of a game.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GameSnapshot {
    pub players: Vec<PlayerName>,
    pub cards: Vec<Card>,
    pub rounds_order: Vec<RoundName>,
    pub rounds: HashMap<RoundName, RoundSnapshot>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoundSnapshot {
    pub polls: Vec<Poll>,
    pub finalized: bool,
}
