//! HTTP API endpoints.
//!
//! Handlers resolve the client's identity from its session, run one game store
//! operation and answer with a fresh snapshot of the game. Store errors are
//! mapped to status codes here; the store itself knows nothing about HTTP.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

use crate::cards::{coerce_cards, Card};
use crate::identity::{self, random_id};
use crate::session::{SessionHandle, SessionRegistry};
use crate::state::{GameError, GameStore};
use crate::types::{GameId, GameSnapshot};

/// Minimum number of distinct cards a game can be played with
pub const MIN_CARDS: usize = 2;

/// Shared state handed to every handler
pub struct AppState {
    pub store: GameStore,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(sessions: SessionRegistry) -> Self {
        Self {
            store: GameStore::new(),
            sessions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by handlers, rendered as `{"error": ...}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<GameError> for ApiError {
    fn from(e: GameError) -> Self {
        let status = match e {
            GameError::NoSuchGame { .. }
            | GameError::NoSuchRound { .. }
            | GameError::NoActivePoll { .. } => StatusCode::NOT_FOUND,
            GameError::GameExists { .. }
            | GameError::RoundExists { .. }
            | GameError::RoundFinalized { .. }
            | GameError::PlayerNameTaken { .. }
            | GameError::PlayerAlreadyRegistered { .. } => StatusCode::CONFLICT,
            GameError::IllegalEstimation { .. } => StatusCode::BAD_REQUEST,
            GameError::PlayerNotInGame { .. } => StatusCode::UNAUTHORIZED,
        };
        tracing::debug!(%status, "Request rejected: {}", e);
        Self::new(status, e.to_string())
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub games_count: usize,
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub game: GameSnapshot,
}

#[derive(Debug, Serialize)]
pub struct NewGameResponse {
    pub game_id: GameId,
    pub game: GameSnapshot,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewGameRequest {
    pub cards: Option<Vec<Card>>,
    pub moderator_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JoinGameRequest {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewRoundRequest {
    pub round_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VoteRequest {
    pub vote: Option<Card>,
}

/// Parse a JSON body, treating a missing or malformed body as an empty object
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

/// Trim a user-provided name, rejecting it if nothing is left
fn required_name(value: Option<String>, missing: &str) -> Result<String, ApiError> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request(missing))
}

/// Fail with 403 unless the session belongs to the game's moderator
async fn require_moderator(
    store: &GameStore,
    session: &SessionHandle,
    game_id: &str,
) -> Result<(), ApiError> {
    let client_id = identity::resolve(&*session.lock().await);
    let owns = match client_id {
        Some(client_id) => store.client_owns_game(game_id, &client_id).await?,
        None => false,
    };

    if !owns {
        tracing::warn!(game_id, "Moderator action attempted by another client");
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "The user is not the moderator of this game.",
        ));
    }
    Ok(())
}

async fn game_response(store: &GameStore, game_id: &str) -> ApiResult<GameResponse> {
    let game = store.serialize_game(game_id).await?;
    Ok(Json(GameResponse { game }))
}

/// Report the number of games.
///
/// GET /status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        games_count: state.store.games_count().await,
    })
}

/// Create a new game; the requesting client becomes its moderator.
///
/// POST /new_game
pub async fn new_game(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionHandle>,
    body: Bytes,
) -> ApiResult<NewGameResponse> {
    let request: NewGameRequest = parse_body(&body);

    let cards = request
        .cards
        .ok_or_else(|| ApiError::bad_request("No card set provided."))?;
    let moderator_name = required_name(request.moderator_name, "Moderator name not provided.")?;

    let cards = coerce_cards(cards);
    if cards.len() < MIN_CARDS {
        return Err(ApiError::bad_request("Cannot play with less than 2 cards."));
    }

    let moderator_id = identity::resolve_or_assign(&mut *session.lock().await);
    let game_id = random_id();
    state
        .store
        .add_game(&game_id, &moderator_id, &moderator_name, cards)
        .await?;

    let game = state.store.serialize_game(&game_id).await?;
    Ok(Json(NewGameResponse { game_id, game }))
}

/// Fetch the current state of a game.
///
/// GET /game/{game_id}
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> ApiResult<GameResponse> {
    game_response(&state.store, &game_id).await
}

/// Join a game under a display name.
///
/// POST /game/{game_id}/join
pub async fn join_game(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionHandle>,
    Path(game_id): Path<String>,
    body: Bytes,
) -> ApiResult<GameResponse> {
    let request: JoinGameRequest = parse_body(&body);
    let name = required_name(request.name, "Must provide a name.")?;

    let player_id = identity::resolve_or_assign(&mut *session.lock().await);
    state.store.add_player(&game_id, &player_id, &name).await?;

    game_response(&state.store, &game_id).await
}

/// Add a round to the game (moderator only).
///
/// POST /game/{game_id}/new_round
pub async fn new_round(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionHandle>,
    Path(game_id): Path<String>,
    body: Bytes,
) -> ApiResult<GameResponse> {
    let request: NewRoundRequest = parse_body(&body);
    let round_name = required_name(request.round_name, "Must specify the round name.")?;

    require_moderator(&state.store, &session, &game_id).await?;
    state.store.add_round(&game_id, &round_name).await?;

    game_response(&state.store, &game_id).await
}

/// Open a new poll in a round (moderator only).
///
/// POST /game/{game_id}/round/{round_name}/new_poll
pub async fn new_poll(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionHandle>,
    Path((game_id, round_name)): Path<(String, String)>,
) -> ApiResult<GameResponse> {
    require_moderator(&state.store, &session, &game_id).await?;
    state.store.add_poll(&game_id, &round_name).await?;

    game_response(&state.store, &game_id).await
}

/// Accept the current poll and finalize the round (moderator only).
///
/// POST /game/{game_id}/round/{round_name}/finalize
pub async fn finalize_round(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionHandle>,
    Path((game_id, round_name)): Path<(String, String)>,
) -> ApiResult<GameResponse> {
    require_moderator(&state.store, &session, &game_id).await?;
    state.store.finalize_round(&game_id, &round_name).await?;

    game_response(&state.store, &game_id).await
}

/// Vote in the active poll of a round.
///
/// POST /game/{game_id}/round/{round_name}/vote
pub async fn cast_vote(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionHandle>,
    Path((game_id, round_name)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<GameResponse> {
    let request: VoteRequest = parse_body(&body);
    let estimation = request
        .vote
        .ok_or_else(|| ApiError::bad_request("Must provide an estimation."))?;

    // Voting never assigns an identity. A client without one is not a player
    // of any game, which the store reports after its existence checks.
    let voter_id = identity::resolve(&*session.lock().await).unwrap_or_default();
    state
        .store
        .cast_vote(&game_id, &round_name, &voter_id, estimation)
        .await?;

    game_response(&state.store, &game_id).await
}
