use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use connect_four::{
    game::{Column, DropError, DropOutcome, GameConfig, MatchSnapshot, OutcomeStatus, PlayerId},
    room::{RoomConfig, RoomError, RoomId, RoomResponse, RoomStateResponse, manager::RoomMetadata},
};
use serde::{Deserialize, Serialize};

use super::{AppState, request_id::RequestId};
use crate::{logging, metrics};

#[derive(Debug, Default, Deserialize)]
pub struct CreateRoomRequest {
    pub name: Option<String>,
    pub game: Option<GameConfig>,
}

#[derive(Debug, Serialize)]
pub struct CreateRoomResponse {
    pub id: RoomId,
}

#[derive(Debug, Deserialize)]
pub struct DropRequest {
    pub column: Column,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SeatResponse {
    pub player: PlayerId,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

impl From<RoomError> for ErrorResponse {
    fn from(e: RoomError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

fn room_error(e: RoomError) -> ApiError {
    let status = match &e {
        RoomError::NotFound(_) => StatusCode::NOT_FOUND,
        RoomError::InvalidName(_) | RoomError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        RoomError::Closed(_) | RoomError::NoResponse(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(e.into()))
}

/// Status code for a room answer that isn't the one the handler hoped for
fn unexpected_response(response: RoomResponse) -> ApiError {
    match response {
        RoomResponse::RoomFull => api_error(StatusCode::CONFLICT, "Room is full"),
        RoomResponse::NotSeated => api_error(StatusCode::FORBIDDEN, "Not seated in this room"),
        RoomResponse::Error(msg) => api_error(StatusCode::CONFLICT, msg),
        other => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unexpected room response: {:?}", other),
        ),
    }
}

fn rejection_status(rejection: Option<&DropError>) -> StatusCode {
    match rejection {
        Some(DropError::InvalidColumn { .. }) => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::CONFLICT,
        None => StatusCode::OK,
    }
}

/// List open rooms.
///
/// Public. Returns `200 OK` with an array of room summaries, oldest first:
/// ```json
/// [{"id": 1, "name": "Room 1", "rows": 6, "columns": 7, "pieces_to_win": 4,
///   "allow_diagonal": true, "created_at": "2026-01-01T00:00:00Z"}]
/// ```
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomMetadata>> {
    Json(state.room_manager.list_rooms().await)
}

/// Create a room.
///
/// The body is optional; missing fields fall back to the default room name and the standard
/// 6x7, four-in-a-row rules.
///
/// # Errors
///
/// - `400 Bad Request`: blank or overlong name, or board rules out of range
pub async fn create_room(
    State(state): State<AppState>,
    body: Option<Json<CreateRoomRequest>>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), ApiError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let defaults = RoomConfig::default();
    let config = RoomConfig::new(
        request.name.unwrap_or(defaults.name),
        request.game.unwrap_or(defaults.game),
    );

    let id = state.room_manager.create_room(config).await.map_err(room_error)?;
    metrics::active_rooms(state.room_manager.active_room_count().await);

    Ok((StatusCode::CREATED, Json(CreateRoomResponse { id })))
}

/// Room summary: seats, match status and rules.
///
/// # Errors
///
/// - `404 Not Found`: room doesn't exist
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<RoomStateResponse>, ApiError> {
    state
        .room_manager
        .get_room_state(room_id)
        .await
        .map(Json)
        .map_err(room_error)
}

/// Authoritative match snapshot, for clients that need to resync.
pub async fn get_board(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<MatchSnapshot>, ApiError> {
    state
        .room_manager
        .get_snapshot(room_id)
        .await
        .map(Json)
        .map_err(room_error)
}

/// Take a seat. Joining again returns the seat already held.
///
/// # Errors
///
/// - `401 Unauthorized`: missing session header
/// - `404 Not Found`: room doesn't exist
/// - `409 Conflict`: both seats are taken
pub async fn join_room(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<SeatResponse>, ApiError> {
    match state
        .room_manager
        .join_room(room_id, user_id)
        .await
        .map_err(room_error)?
    {
        RoomResponse::Seated { player } => Ok(Json(SeatResponse { player })),
        other => Err(unexpected_response(other)),
    }
}

/// Give up a seat. The match on the board is left as it is.
///
/// # Errors
///
/// - `403 Forbidden`: the user holds no seat here
pub async fn leave_room(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    Path(room_id): Path<RoomId>,
) -> Result<StatusCode, ApiError> {
    match state
        .room_manager
        .leave_room(room_id, user_id)
        .await
        .map_err(room_error)?
    {
        RoomResponse::Success => Ok(StatusCode::OK),
        other => Err(unexpected_response(other)),
    }
}

/// Request a drop for the caller's seat.
///
/// The body names only a column: `{"column": 3}`. The authority's ruling comes back as a drop
/// outcome either way. Accepted drops answer `200 OK` and are also broadcast to every socket in
/// the room; rejected drops answer `400` (column off the board) or `409` (full column, wrong
/// turn, finished match) and change nothing.
///
/// # Errors
///
/// - `403 Forbidden`: the user holds no seat here
/// - `404 Not Found`: room doesn't exist
pub async fn drop_piece(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    Path(room_id): Path<RoomId>,
    request_id: RequestId,
    Json(request): Json<DropRequest>,
) -> Result<(StatusCode, Json<DropOutcome>), ApiError> {
    let response = state
        .room_manager
        .drop_piece(room_id, user_id, request.column)
        .await
        .map_err(room_error)?;

    let RoomResponse::Outcome(outcome) = response else {
        return Err(unexpected_response(response));
    };

    record_outcome(room_id, &outcome);
    log::debug!(
        "[{}] room {} user {} column {}: accepted={}",
        request_id.as_str(),
        room_id,
        user_id,
        request.column,
        outcome.accepted
    );

    Ok((rejection_status(outcome.rejection.as_ref()), Json(outcome)))
}

/// Start a fresh match once the current one is over and return its empty board.
///
/// # Errors
///
/// - `403 Forbidden`: the user holds no seat here
/// - `409 Conflict`: the match is still in progress
pub async fn rematch(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<MatchSnapshot>, ApiError> {
    match state
        .room_manager
        .rematch(room_id, user_id)
        .await
        .map_err(room_error)?
    {
        RoomResponse::Rematched(snapshot) => Ok(Json(snapshot)),
        other => Err(unexpected_response(other)),
    }
}

/// Count a ruling in the drop and match-result metrics, and log finished matches
pub(crate) fn record_outcome(room_id: RoomId, outcome: &DropOutcome) {
    if !outcome.accepted {
        metrics::drops_total("rejected");
        return;
    }

    metrics::drops_total("accepted");
    logging::log_match_finished(room_id, outcome);
    match outcome.status {
        OutcomeStatus::Won { .. } => metrics::games_finished_total("won"),
        OutcomeStatus::Draw => metrics::games_finished_total("draw"),
        OutcomeStatus::Continue { .. } => {}
    }
}
