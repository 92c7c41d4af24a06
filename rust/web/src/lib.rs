//! Browser front-end for the pairs engine.
//!
//! One [`SessionManager`] holds a controller per browser session. Card picks
//! arrive over a small JSON API, and rendering instructions flow back to the
//! page as Server-Sent Events produced by [`EventSurface`].

pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod session;
pub mod settings;
pub mod static_handler;
pub mod surface;

pub use errors::{ErrorResponse, ErrorSeverity, IntoErrorResponse};
pub use events::{EventBus, GameEvent, RevealedCard};
pub use logging::{init_logging, init_test_logging, LogEntry, LogFormat, TestLogSubscriber};
pub use middleware::{log_response, with_request_logging};
pub use server::{AppContext, ServerConfig, ServerError, ServerHandle, WebServer};
pub use session::{
    CardView, GameConfig, GameStateResponse, SelectionOutcome, SelectionResponse, SessionError,
    SessionId, SessionManager,
};
pub use settings::{AppSettings, SettingsError, SettingsStore};
pub use static_handler::{StaticError, StaticHandler};
pub use surface::EventSurface;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_provides_shared_components() {
        let ctx = AppContext::new_for_tests();

        assert_eq!(ctx.event_bus().subscriber_count(), 0);
        assert!(ctx.sessions().active_sessions().is_empty());
        assert_eq!(ctx.settings().get().unwrap(), AppSettings::default());
    }
}
