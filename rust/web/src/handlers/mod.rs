pub mod game;
pub mod health;
pub mod settings;
pub mod sse;

pub use game::{
    create_session, delete_session, get_session, restart_session, select_card,
    CreateSessionRequest, RestartRequest, SelectionRequest, SessionResponse,
};
pub use health::health;
pub use settings::{get_settings, update_settings, UpdateSettingsRequest};
pub use sse::stream_events;
