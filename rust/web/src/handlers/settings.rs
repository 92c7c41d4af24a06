use crate::session::SessionManager;
use crate::settings::{SettingsError, SettingsStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSettingsRequest {
    pub mismatch_delay_ms: Option<u64>,
    pub session_timeout_minutes: Option<u64>,
}

pub async fn get_settings(store: Arc<SettingsStore>) -> Response {
    match store.get() {
        Ok(settings) => success_response(StatusCode::OK, settings),
        Err(err) => settings_error(err),
    }
}

/// `PUT /api/settings`. A new delay applies to games created afterwards; a new
/// timeout applies to every live session.
pub async fn update_settings(
    store: Arc<SettingsStore>,
    sessions: Arc<SessionManager>,
    request: UpdateSettingsRequest,
) -> Response {
    let mut current = match store.get() {
        Ok(s) => s,
        Err(err) => return settings_error(err),
    };

    if let Some(delay) = request.mismatch_delay_ms {
        current.mismatch_delay_ms = delay;
    }

    if let Some(timeout) = request.session_timeout_minutes {
        current.session_timeout_minutes = timeout;
    }

    match store.update(current) {
        Ok(settings) => {
            sessions.set_session_ttl(settings.session_timeout());
            tracing::info!(
                mismatch_delay_ms = settings.mismatch_delay_ms,
                session_timeout_minutes = settings.session_timeout_minutes,
                "settings updated"
            );
            success_response(StatusCode::OK, settings)
        }
        Err(err) => settings_error(err),
    }
}

fn success_response<T>(status: StatusCode, body: T) -> Response
where
    T: Serialize,
{
    reply::with_status(reply::json(&body), status).into_response()
}

fn settings_error(err: SettingsError) -> Response {
    use crate::errors::IntoErrorResponse;
    err.into_http_response()
}
