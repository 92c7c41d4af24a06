use crate::events::{EventBus, GameEvent, RevealedCard};
use crate::surface::EventSurface;
use chrono::{DateTime, Utc};
use pairs_engine::deck::Deck;
use pairs_engine::errors::GameError;
use pairs_engine::game::{
    CardFace, Game, IgnoreReason, PendingConceal, Phase, Resolution, Selection,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

pub type SessionId = String;

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<GameSession>>>,
    event_bus: Arc<EventBus>,
    session_ttl: RwLock<Duration>,
}

impl SessionManager {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self::with_ttl(event_bus, DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(event_bus: Arc<EventBus>, ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            event_bus,
            session_ttl: RwLock::new(ttl),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        match self.session_ttl.read() {
            Ok(ttl) => *ttl,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Applies to every live session from the next access on.
    pub fn set_session_ttl(&self, ttl: Duration) {
        match self.session_ttl.write() {
            Ok(mut guard) => *guard = ttl,
            Err(poisoned) => *poisoned.into_inner() = ttl,
        }
    }

    pub fn create_session(&self, config: GameConfig) -> Result<SessionId, SessionError> {
        let id = Uuid::new_v4().to_string();

        tracing::info!(
            session_id = %id,
            seed = ?config.seed,
            mismatch_delay_ms = config.mismatch_delay_ms,
            "creating new game session"
        );

        let session = Arc::new(GameSession::new(id.clone(), config));
        {
            let mut guard = self
                .sessions
                .write()
                .map_err(|_| SessionError::StoragePoisoned)?;
            guard.insert(id.clone(), Arc::clone(&session));
        }

        session.start(&self.event_bus)?;
        Ok(id)
    }

    pub fn get_session(&self, id: &SessionId) -> Result<Arc<GameSession>, SessionError> {
        let guard = self
            .sessions
            .read()
            .map_err(|_| SessionError::StoragePoisoned)?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    pub fn state(&self, session_id: &SessionId) -> Result<GameStateResponse, SessionError> {
        let session = self.live_session(session_id)?;
        session.state_snapshot()
    }

    /// Apply one card pick and broadcast what changed.
    ///
    /// Events go out before the game lock is released. A mismatch schedules
    /// the turn-back on the tokio runtime when one is running, otherwise on a
    /// plain thread.
    pub fn select(
        &self,
        session_id: &SessionId,
        slot: usize,
    ) -> Result<SelectionResponse, SessionError> {
        let session = self.live_session(session_id)?;

        let (selection, state) = {
            let mut game = session.lock_game()?;
            let mut surface = EventSurface::new(session_id.clone());
            let selection = game.select(slot, &mut surface)?;
            // Still under the game lock, so streams see controller order.
            self.event_bus.broadcast_all(session_id, surface.into_events());
            (selection, session.snapshot_of(&game))
        };

        match &selection {
            Selection::Ignored(reason) => tracing::debug!(
                session_id = %session_id,
                slot,
                reason = ?reason,
                "selection ignored"
            ),
            other => tracing::debug!(
                session_id = %session_id,
                slot,
                outcome = ?other,
                "selection applied"
            ),
        }

        if let Some(pending) = selection.pending() {
            self.schedule_conceal(Arc::clone(&session), pending);
        }
        if let Selection::Completed { score, tries, .. } = selection {
            tracing::info!(session_id = %session_id, score, tries, "game completed");
        }

        Ok(SelectionResponse {
            result: SelectionOutcome::from(selection),
            state,
        })
    }

    /// Deal a fresh table in the same session.
    pub fn restart(
        &self,
        session_id: &SessionId,
        seed: Option<u64>,
    ) -> Result<GameStateResponse, SessionError> {
        let session = self.live_session(session_id)?;
        let deck = seed.map_or_else(Deck::shuffled, Deck::new_with_seed);

        let state = {
            let mut game = session.lock_game()?;
            let mut surface = EventSurface::new(session_id.clone());
            game.restart(deck, &mut surface);
            session.set_seed(seed);
            self.event_bus.broadcast_all(session_id, surface.into_events());
            session.snapshot_of(&game)
        };

        tracing::info!(session_id = %session_id, seed = ?state.seed, "game restarted");
        Ok(state)
    }

    pub fn delete_session(&self, session_id: &SessionId) -> Result<(), SessionError> {
        // Announce first; removal drops every subscriber of the session.
        self.get_session(session_id)?;
        self.event_bus.broadcast(
            session_id,
            GameEvent::GameEnded {
                session_id: session_id.clone(),
                reason: "terminated_by_request".into(),
            },
        );
        match self.remove_session(session_id)? {
            Some(_) => {
                tracing::info!(session_id = %session_id, "session deleted");
                Ok(())
            }
            None => Err(SessionError::NotFound(session_id.clone())),
        }
    }

    pub fn cleanup_expired_sessions(&self) {
        let ttl = self.session_ttl();
        let mut expired = Vec::new();
        {
            let mut guard = match self.sessions.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.retain(|id, session| {
                if session.is_expired(ttl) {
                    expired.push(id.clone());
                    false
                } else {
                    true
                }
            });
        }

        for id in expired {
            tracing::info!(session_id = %id, "session expired");
            self.event_bus.broadcast(
                &id,
                GameEvent::GameEnded {
                    session_id: id.clone(),
                    reason: "expired".into(),
                },
            );
            self.event_bus.drop_session(&id);
        }
    }

    pub fn active_sessions(&self) -> Vec<SessionId> {
        match self.sessions.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    fn live_session(&self, session_id: &SessionId) -> Result<Arc<GameSession>, SessionError> {
        let session = self.get_session(session_id)?;
        if session.is_expired(self.session_ttl()) {
            self.expire_session(session_id, "expired due to inactivity")?;
            return Err(SessionError::Expired(session_id.clone()));
        }
        session.touch();
        Ok(session)
    }

    fn schedule_conceal(&self, session: Arc<GameSession>, pending: PendingConceal) {
        let bus = Arc::clone(&self.event_bus);
        let delay = pending.delay();
        tracing::debug!(
            session_id = %session.id,
            epoch = pending.epoch(),
            delay_ms = duration_ms(delay),
            "scheduling conceal"
        );

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    session.conceal(pending, &bus);
                });
            }
            Err(_) => {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    session.conceal(pending, &bus);
                });
            }
        }
    }

    fn expire_session(&self, session_id: &SessionId, reason: &str) -> Result<(), SessionError> {
        if self.get_session(session_id).is_ok() {
            self.event_bus.broadcast(
                session_id,
                GameEvent::GameEnded {
                    session_id: session_id.clone(),
                    reason: reason.to_string(),
                },
            );
        }
        self.remove_session(session_id)?;
        Ok(())
    }

    fn remove_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<Arc<GameSession>>, SessionError> {
        let removed = match self.sessions.write() {
            Ok(mut guard) => guard.remove(session_id),
            Err(_) => return Err(SessionError::StoragePoisoned),
        };
        if removed.is_some() {
            self.event_bus.drop_session(session_id);
        }
        Ok(removed)
    }
}

/// One browser's game: a controller plus bookkeeping.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    game: Mutex<Game>,
    config: Mutex<GameConfig>,
    created_at: DateTime<Utc>,
    last_active: Mutex<Instant>,
}

impl GameSession {
    fn new(id: SessionId, config: GameConfig) -> Self {
        let deck = config.seed.map_or_else(Deck::shuffled, Deck::new_with_seed);
        let game = Game::new(deck).with_mismatch_delay(config.mismatch_delay());
        Self {
            id,
            game: Mutex::new(game),
            config: Mutex::new(config),
            created_at: Utc::now(),
            last_active: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Settings of the table currently dealt. A restart replaces the seed.
    pub fn config(&self) -> GameConfig {
        match self.config.lock() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_seed(&self, seed: Option<u64>) {
        match self.config.lock() {
            Ok(mut config) => config.seed = seed,
            Err(poisoned) => poisoned.into_inner().seed = seed,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn start(&self, bus: &EventBus) -> Result<(), SessionError> {
        let game = self.lock_game()?;
        let mut surface = EventSurface::new(self.id.clone());
        game.start(&mut surface);
        bus.broadcast_all(&self.id, surface.into_events());
        Ok(())
    }

    fn lock_game(&self) -> Result<MutexGuard<'_, Game>, SessionError> {
        self.game.lock().map_err(|_| SessionError::StoragePoisoned)
    }

    /// Delayed half of a mismatch. Runs off the request path.
    fn conceal(&self, pending: PendingConceal, bus: &EventBus) {
        let resolution = match self.lock_game() {
            Ok(mut game) => {
                let mut surface = EventSurface::new(self.id.clone());
                let resolution = game.resolve_mismatch(pending, &mut surface);
                bus.broadcast_all(&self.id, surface.into_events());
                resolution
            }
            Err(err) => {
                tracing::error!(session_id = %self.id, error = %err, "cannot conceal cards");
                return;
            }
        };

        match resolution {
            Resolution::Concealed(pair) => {
                tracing::debug!(
                    session_id = %self.id,
                    epoch = pending.epoch(),
                    slots = ?[pair[0].slot, pair[1].slot],
                    "mismatched cards concealed"
                );
            }
            Resolution::Stale => {
                tracing::debug!(
                    session_id = %self.id,
                    epoch = pending.epoch(),
                    "dropping stale conceal"
                );
            }
        }
    }

    fn state_snapshot(&self) -> Result<GameStateResponse, SessionError> {
        let game = self.lock_game()?;
        Ok(self.snapshot_of(&game))
    }

    fn snapshot_of(&self, game: &Game) -> GameStateResponse {
        let cards = game
            .faces()
            .iter()
            .enumerate()
            .map(|(slot, face)| CardView {
                slot,
                face: *face,
                card: match face {
                    CardFace::Down => None,
                    CardFace::Up | CardFace::Paired => {
                        game.deck().card_at(slot).map(RevealedCard::from)
                    }
                },
            })
            .collect();

        GameStateResponse {
            session_id: self.id.clone(),
            phase: game.phase(),
            score: game.score(),
            tries: game.tries(),
            pairs_found: game.pairs_found(),
            pairs_remaining: game.pairs_remaining(),
            seed: game.deck().seed(),
            mismatch_delay_ms: duration_ms(game.mismatch_delay()),
            cards,
        }
    }

    fn touch(&self) {
        if let Ok(mut guard) = self.last_active.lock() {
            *guard = Instant::now();
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        match self.last_active.lock() {
            Ok(last) => last.elapsed() >= ttl,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
impl GameSession {
    fn force_last_active(&self, instant: Instant) {
        if let Ok(mut guard) = self.last_active.lock() {
            *guard = instant;
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_mismatch_delay_ms")]
    pub mismatch_delay_ms: u64,
}

fn default_mismatch_delay_ms() -> u64 {
    1000
}

impl GameConfig {
    pub fn mismatch_delay(&self) -> Duration {
        Duration::from_millis(self.mismatch_delay_ms)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            mismatch_delay_ms: default_mismatch_delay_ms(),
        }
    }
}

/// One table slot as the browser may see it. Face-down cards carry no identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    pub slot: usize,
    pub face: CardFace,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<RevealedCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateResponse {
    pub session_id: SessionId,
    pub phase: Phase,
    pub score: u32,
    pub tries: u32,
    pub pairs_found: u32,
    pub pairs_remaining: u32,
    /// Seed the current layout was shuffled from, if any.
    pub seed: Option<u64>,
    pub mismatch_delay_ms: u64,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectionOutcome {
    Ignored { reason: IgnoreReason },
    FirstRevealed { slot: usize },
    Matched { slots: [usize; 2], score: u32 },
    Mismatched { slots: [usize; 2], conceal_after_ms: u64 },
    Completed { slots: [usize; 2], score: u32, tries: u32 },
}

impl From<Selection> for SelectionOutcome {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::Ignored(reason) => SelectionOutcome::Ignored { reason },
            Selection::FirstRevealed(card) => SelectionOutcome::FirstRevealed { slot: card.slot },
            Selection::Matched { pair, score } => SelectionOutcome::Matched {
                slots: [pair[0].slot, pair[1].slot],
                score,
            },
            Selection::Mismatched { pair, pending } => SelectionOutcome::Mismatched {
                slots: [pair[0].slot, pair[1].slot],
                conceal_after_ms: duration_ms(pending.delay()),
            },
            Selection::Completed { pair, score, tries } => SelectionOutcome::Completed {
                slots: [pair[0].slot, pair[1].slot],
                score,
                tries,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResponse {
    pub result: SelectionOutcome,
    pub state: GameStateResponse,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
    #[error("Session expired: {0}")]
    Expired(SessionId),
    #[error("Invalid selection: {0}")]
    InvalidSelection(#[from] GameError),
    #[error("Session storage poisoned")]
    StoragePoisoned,
}

impl crate::errors::IntoErrorResponse for SessionError {
    fn status_code(&self) -> warp::http::StatusCode {
        use warp::http::StatusCode;
        match self {
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::Expired(_) => StatusCode::GONE,
            SessionError::InvalidSelection(_) => StatusCode::BAD_REQUEST,
            SessionError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SessionError::NotFound(_) => "session_not_found",
            SessionError::Expired(_) => "session_expired",
            SessionError::InvalidSelection(_) => "invalid_selection",
            SessionError::StoragePoisoned => "session_storage_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            SessionError::NotFound(id) => Some(serde_json::json!({
                "session_id": id
            })),
            SessionError::Expired(id) => Some(serde_json::json!({
                "session_id": id,
                "reason": "Session expired due to inactivity"
            })),
            SessionError::InvalidSelection(GameError::UnknownSlot { slot, len }) => {
                Some(serde_json::json!({ "slot": slot, "slots": len }))
            }
            _ => None,
        }
    }

    fn severity(&self) -> crate::errors::ErrorSeverity {
        use crate::errors::ErrorSeverity;
        match self {
            SessionError::StoragePoisoned => ErrorSeverity::Critical,
            _ => ErrorSeverity::Client,
        }
    }
}
