use super::{GameError, GameResult, GameStore};
use crate::cards::Card;

impl GameStore {
    /// Cast (or change) a player's vote in the round's active poll.
    ///
    /// Checks run in a fixed order so the reported error is deterministic:
    /// game and round existence, round not finalized, active poll present,
    /// estimation is one of the game's cards, voter is a registered player.
    /// Votes are keyed by the voter's display name.
    pub async fn cast_vote(
        &self,
        game_id: &str,
        round_name: &str,
        voter_id: &str,
        estimation: Card,
    ) -> GameResult<()> {
        let game = self.game(game_id).await?;
        let mut game = game.write().await;

        let has_poll = !game.open_round_mut(round_name)?.polls.is_empty();
        if !has_poll {
            return Err(GameError::NoActivePoll {
                game_id: game_id.to_string(),
                round_name: round_name.to_string(),
            });
        }

        if !game.accepts(&estimation) {
            tracing::debug!(game_id, %estimation, "Rejected illegal estimation");
            return Err(GameError::IllegalEstimation {
                game_id: game_id.to_string(),
                estimation,
            });
        }

        let voter_name = game
            .player_by_id(voter_id)
            .map(|p| p.name.clone())
            .ok_or_else(|| GameError::PlayerNotInGame {
                game_id: game_id.to_string(),
                player_id: voter_id.to_string(),
            })?;

        let poll = game
            .open_round_mut(round_name)?
            .active_poll_mut()
            .ok_or_else(|| GameError::NoActivePoll {
                game_id: game_id.to_string(),
                round_name: round_name.to_string(),
            })?;
        poll.insert(voter_name, estimation);

        tracing::debug!(game_id, round_name, "Vote cast");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Poll;

    async fn store_with_poll() -> GameStore {
        let store = GameStore::new();
        let cards = ["1", "2", "3", "5", "8", "?"].iter().map(|v| Card::coerce(v)).collect();
        store.add_game("g1", "mod", "Liz", cards).await.unwrap();
        store.add_player("g1", "martin", "Martin").await.unwrap();
        store.add_round("g1", "r").await.unwrap();
        store.add_poll("g1", "r").await.unwrap();
        store
    }

    async fn polls(store: &GameStore) -> Vec<Poll> {
        store.serialize_game("g1").await.unwrap().rounds["r"].polls.clone()
    }

    #[tokio::test]
    async fn test_vote_is_keyed_by_display_name() {
        let store = store_with_poll().await;
        store.cast_vote("g1", "r", "martin", Card::coerce("5")).await.unwrap();

        let polls = polls(&store).await;
        assert_eq!(polls[0].get("Martin"), Some(&Card::coerce("5")));
        assert_eq!(polls[0].len(), 1);
    }

    #[tokio::test]
    async fn test_vote_matches_value_equal_card() {
        let store = store_with_poll().await;
        store.cast_vote("g1", "r", "martin", Card::coerce("5.00")).await.unwrap();
        store.cast_vote("g1", "r", "mod", Card::coerce("?")).await.unwrap();

        let polls = polls(&store).await;
        assert_eq!(polls[0]["Martin"], Card::coerce("5"));
        assert_eq!(polls[0]["Liz"], Card::Label("?".to_string()));
    }

    #[tokio::test]
    async fn test_illegal_estimation_leaves_poll_untouched() {
        let store = store_with_poll().await;
        store.cast_vote("g1", "r", "martin", Card::coerce("3")).await.unwrap();

        let result = store.cast_vote("g1", "r", "martin", Card::coerce("123123")).await;
        assert_eq!(
            result,
            Err(GameError::IllegalEstimation {
                game_id: "g1".to_string(),
                estimation: Card::coerce("123123")
            })
        );

        let result = store.cast_vote("g1", "r", "martin", Card::Label("coffee".into())).await;
        assert!(matches!(result, Err(GameError::IllegalEstimation { .. })));

        assert_eq!(polls(&store).await[0]["Martin"], Card::coerce("3"));
    }

    #[tokio::test]
    async fn test_recast_same_vote_is_idempotent() {
        let store = store_with_poll().await;
        store.cast_vote("g1", "r", "martin", Card::coerce("8")).await.unwrap();
        let once = polls(&store).await;

        store.cast_vote("g1", "r", "martin", Card::coerce("8")).await.unwrap();
        let twice = polls(&store).await;

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_vote_can_be_changed_while_poll_open() {
        let store = store_with_poll().await;
        store.cast_vote("g1", "r", "martin", Card::coerce("8")).await.unwrap();
        store.cast_vote("g1", "r", "martin", Card::coerce("2")).await.unwrap();

        assert_eq!(polls(&store).await[0]["Martin"], Card::coerce("2"));
    }

    #[tokio::test]
    async fn test_votes_go_to_newest_poll_only() {
        let store = store_with_poll().await;
        store.cast_vote("g1", "r", "martin", Card::coerce("1")).await.unwrap();
        let first_poll = polls(&store).await[0].clone();

        store.add_poll("g1", "r").await.unwrap();
        store.cast_vote("g1", "r", "martin", Card::coerce("5")).await.unwrap();
        store.cast_vote("g1", "r", "mod", Card::coerce("3")).await.unwrap();

        let polls = polls(&store).await;
        assert_eq!(polls.len(), 2);
        assert_eq!(polls[0], first_poll);
        assert_eq!(polls[1]["Martin"], Card::coerce("5"));
        assert_eq!(polls[1]["Liz"], Card::coerce("3"));
    }

    #[tokio::test]
    async fn test_vote_with_card_as_served() {
        let store = GameStore::new();
        let cards: Vec<Card> =
            serde_json::from_str(r#"[0.1000000000000000000001, "2", "1e400", "?"]"#).unwrap();
        store.add_game("g1", "mod", "Liz", cards).await.unwrap();
        store.add_round("g1", "r").await.unwrap();
        store.add_poll("g1", "r").await.unwrap();

        let served = store.serialize_game("g1").await.unwrap().cards;
        for card in served {
            let json = serde_json::to_string(&card).unwrap();
            let estimation: Card = serde_json::from_str(&json).unwrap();
            store.cast_vote("g1", "r", "mod", estimation).await.unwrap();
            assert_eq!(polls(&store).await[0]["Liz"], card);
        }
    }

    #[tokio::test]
    async fn test_unregistered_voter() {
        let store = store_with_poll().await;
        let result = store.cast_vote("g1", "r", "stranger", Card::coerce("1")).await;
        assert_eq!(
            result,
            Err(GameError::PlayerNotInGame {
                game_id: "g1".to_string(),
                player_id: "stranger".to_string()
            })
        );
        assert!(polls(&store).await[0].is_empty());
    }

    #[tokio::test]
    async fn test_error_precedence() {
        let store = store_with_poll().await;
        store.add_round("g1", "empty").await.unwrap();

        // Missing game beats everything else
        assert!(matches!(
            store.cast_vote("nope", "r", "stranger", Card::coerce("999")).await,
            Err(GameError::NoSuchGame { .. })
        ));
        assert!(matches!(
            store.cast_vote("g1", "nope", "stranger", Card::coerce("999")).await,
            Err(GameError::NoSuchRound { .. })
        ));
        // No poll yet beats an illegal estimation and an unknown voter
        assert!(matches!(
            store.cast_vote("g1", "empty", "stranger", Card::coerce("999")).await,
            Err(GameError::NoActivePoll { .. })
        ));
        // Illegal estimation beats an unknown voter
        assert!(matches!(
            store.cast_vote("g1", "r", "stranger", Card::coerce("999")).await,
            Err(GameError::IllegalEstimation { .. })
        ));

        // A finalized round is reported before estimation or voter problems
        store.finalize_round("g1", "r").await.unwrap();
        assert!(matches!(
            store.cast_vote("g1", "r", "stranger", Card::coerce("999")).await,
            Err(GameError::RoundFinalized { .. })
        ));
        assert!(matches!(
            store.cast_vote("g1", "r", "martin", Card::coerce("1")).await,
            Err(GameError::RoundFinalized { .. })
        ));
    }
}
