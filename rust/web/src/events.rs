use crate::session::SessionId;
use pairs_engine::cards::{CardId, Suit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;

// Bounded per subscriber. A subscriber that falls this far behind is dropped.
const EVENT_CHANNEL_BUFFER: usize = 256;

pub type EventSender = mpsc::Sender<GameEvent>;
pub type EventReceiver = mpsc::Receiver<GameEvent>;

pub struct EventSubscription {
    bus: EventBus,
    session_id: SessionId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.session_id, self.subscriber_id);
    }
}

/// Per-session fan-out of game events to browser streams.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<HashMap<SessionId, Vec<(usize, EventSender)>>>,
    next_id: AtomicUsize,
}

impl EventBusInner {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<SessionId, Vec<(usize, EventSender)>>> {
        self.subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, Vec<(usize, EventSender)>>> {
        self.subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, session_id: SessionId) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(session_id.clone());
        EventSubscription {
            bus: self.clone(),
            session_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, session_id: SessionId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.inner
            .write()
            .entry(session_id.clone())
            .or_default()
            .push((id, tx));

        tracing::info!(
            session_id = %session_id,
            subscriber_id = id,
            "client subscribed to game events"
        );

        (id, rx)
    }

    pub fn broadcast(&self, session_id: &SessionId, event: GameEvent) {
        tracing::debug!(
            session_id = %session_id,
            event_type = event.kind(),
            "broadcasting game event"
        );

        let subscribers = self.inner.read().get(session_id).cloned();

        let Some(list) = subscribers else {
            tracing::trace!(session_id = %session_id, "no subscribers for session");
            return;
        };

        let mut failed = Vec::new();
        for (id, sender) in list {
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    session_id = %session_id,
                    subscriber_id = id,
                    error = %e,
                    "dropping subscriber that cannot take events"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(session_id, &failed);
        }
    }

    pub fn broadcast_all(&self, session_id: &SessionId, events: Vec<GameEvent>) {
        for event in events {
            self.broadcast(session_id, event);
        }
    }

    pub fn unsubscribe(&self, session_id: &SessionId, subscriber_id: usize) {
        self.remove_subscribers(session_id, &[subscriber_id]);
    }

    pub fn drop_session(&self, session_id: &SessionId) {
        self.inner.write().remove(session_id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.read().values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, session_id: &SessionId, ids: &[usize]) {
        let mut guard = self.inner.write();
        if let Some(list) = guard.get_mut(session_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(session_id);
            }
        }
    }
}

/// Card face as shown to the player once it is turned up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedCard {
    pub id: CardId,
    pub rank: String,
    pub suit: Suit,
    pub label: String,
}

impl From<CardId> for RevealedCard {
    fn from(card: CardId) -> Self {
        Self {
            id: card,
            rank: card.rank().glyph().to_string(),
            suit: card.suit(),
            label: card.to_string(),
        }
    }
}

/// Rendering instruction streamed to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GameStarted {
        session_id: SessionId,
        slots: usize,
    },
    CardRevealed {
        session_id: SessionId,
        slot: usize,
        card: RevealedCard,
    },
    CardConcealed {
        session_id: SessionId,
        slot: usize,
    },
    CardsPaired {
        session_id: SessionId,
        slots: Vec<usize>,
    },
    Mismatch {
        session_id: SessionId,
        slots: Vec<usize>,
    },
    ScoreChanged {
        session_id: SessionId,
        score: u32,
    },
    TriesChanged {
        session_id: SessionId,
        tries: u32,
    },
    GameCompleted {
        session_id: SessionId,
        score: u32,
        tries: u32,
    },
    GameEnded {
        session_id: SessionId,
        reason: String,
    },
}

impl GameEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::CardRevealed { .. } => "card_revealed",
            GameEvent::CardConcealed { .. } => "card_concealed",
            GameEvent::CardsPaired { .. } => "cards_paired",
            GameEvent::Mismatch { .. } => "mismatch",
            GameEvent::ScoreChanged { .. } => "score_changed",
            GameEvent::TriesChanged { .. } => "tries_changed",
            GameEvent::GameCompleted { .. } => "game_completed",
            GameEvent::GameEnded { .. } => "game_ended",
        }
    }
}
