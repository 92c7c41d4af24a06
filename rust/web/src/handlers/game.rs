use crate::session::{GameConfig, GameStateResponse, SessionError, SessionId, SessionManager};
use crate::settings::{AppSettings, SettingsError, SettingsStore, MAX_MISMATCH_DELAY_MS};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSessionRequest {
    pub seed: Option<u64>,
    pub mismatch_delay_ms: Option<u64>,
}

impl CreateSessionRequest {
    fn into_config(self, defaults: &AppSettings) -> GameConfig {
        GameConfig {
            seed: self.seed,
            mismatch_delay_ms: self
                .mismatch_delay_ms
                .unwrap_or(defaults.mismatch_delay_ms),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub slot: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct RestartRequest {
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    /// RFC 3339, UTC.
    pub created_at: String,
    pub config: GameConfig,
    pub state: GameStateResponse,
}

/// Creates a new game session and deals a fresh table.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/sessions`
///
/// # Request Format
/// ```json
/// {
///   "seed": 12345,              // Optional: fixed layout for reproducible games
///   "mismatch_delay_ms": 1000   // Optional: defaults to the server setting
/// }
/// ```
///
/// # Response Format
/// - **Success (201 Created)**: `SessionResponse` JSON. Every card is face down
///   and carries no identity.
/// - **Error (400 Bad Request)**: `mismatch_delay_ms` out of range
pub async fn create_session(
    sessions: Arc<SessionManager>,
    settings: Arc<SettingsStore>,
    request: CreateSessionRequest,
) -> Response {
    let defaults = match settings.get() {
        Ok(settings) => settings,
        Err(err) => return error_response(err),
    };
    let config = request.into_config(&defaults);
    if config.mismatch_delay_ms > MAX_MISMATCH_DELAY_MS {
        return error_response(SettingsError::InvalidValue(format!(
            "mismatch_delay_ms must be at most {MAX_MISMATCH_DELAY_MS}"
        )));
    }

    let created = sessions
        .create_session(config)
        .and_then(|session_id| assemble(&sessions, session_id));

    match created {
        Ok(body) => success_response(StatusCode::CREATED, body),
        Err(err) => error_response(err),
    }
}

/// Current table for a session.
///
/// # HTTP Method and Path
/// - **Method**: GET
/// - **Path**: `/api/sessions/{session_id}`
///
/// # Response Format
/// - **Success (200 OK)**: `SessionResponse` JSON
/// - **Error (404 Not Found)**: `session_not_found`
/// - **Error (410 Gone)**: `session_expired`
pub async fn get_session(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match assemble(&sessions, session_id) {
        Ok(body) => success_response(StatusCode::OK, body),
        Err(err) => error_response(err),
    }
}

/// Picks the card at `slot`.
///
/// # HTTP Method and Path
/// - **Method**: POST
/// - **Path**: `/api/sessions/{session_id}/selections`
///
/// # Request Format
/// ```json
/// { "slot": 17 }
/// ```
///
/// # Response Format
/// - **Success (200 OK)**: `{"result": {...}, "state": {...}}`. Picks the game
///   does not accept (card already up, pair pending, game over) still succeed
///   with `"outcome": "ignored"`.
/// - **Error (400 Bad Request)**: `invalid_selection` for a slot off the table
pub async fn select_card(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    request: SelectionRequest,
) -> Response {
    match sessions.select(&session_id, request.slot) {
        Ok(body) => success_response(StatusCode::OK, body),
        Err(err) => error_response(err),
    }
}

pub async fn restart_session(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    request: RestartRequest,
) -> Response {
    match sessions.restart(&session_id, request.seed) {
        Ok(state) => success_response(StatusCode::OK, state),
        Err(err) => error_response(err),
    }
}

/// Ends a session. Subscribers get `game_ended` before the stream closes.
pub async fn delete_session(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.delete_session(&session_id) {
        Ok(()) => reply::with_status(warp::reply(), StatusCode::NO_CONTENT).into_response(),
        Err(err) => error_response(err),
    }
}

fn assemble(
    sessions: &SessionManager,
    session_id: SessionId,
) -> Result<SessionResponse, SessionError> {
    let state = sessions.state(&session_id)?;
    let session = sessions.get_session(&session_id)?;
    Ok(SessionResponse {
        created_at: session.created_at().to_rfc3339(),
        config: session.config(),
        session_id,
        state,
    })
}

fn success_response<T>(status: StatusCode, body: T) -> Response
where
    T: Serialize,
{
    reply::with_status(reply::json(&body), status).into_response()
}

fn error_response<E>(err: E) -> Response
where
    E: crate::errors::IntoErrorResponse,
{
    err.into_http_response()
}
