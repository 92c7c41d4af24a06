use crate::events::{GameEvent, RevealedCard};
use crate::session::SessionId;
use pairs_engine::surface::{CardRef, Surface};

/// Engine surface that turns rendering calls into browser events.
///
/// Events are buffered for one controller call. The caller broadcasts them
/// while it still holds the session's game lock.
#[derive(Debug)]
pub struct EventSurface {
    session_id: SessionId,
    events: Vec<GameEvent>,
}

impl EventSurface {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            events: Vec::new(),
        }
    }

    pub fn into_events(self) -> Vec<GameEvent> {
        self.events
    }

    fn id(&self) -> SessionId {
        self.session_id.clone()
    }

    fn slots(cards: &[CardRef]) -> Vec<usize> {
        cards.iter().map(|c| c.slot).collect()
    }
}

impl Surface for EventSurface {
    fn render_deck(&mut self, slots: usize) {
        let session_id = self.id();
        self.events.push(GameEvent::GameStarted { session_id, slots });
    }

    fn reveal(&mut self, card: CardRef) {
        let session_id = self.id();
        self.events.push(GameEvent::CardRevealed {
            session_id,
            slot: card.slot,
            card: RevealedCard::from(card.card),
        });
    }

    fn conceal(&mut self, card: CardRef) {
        let session_id = self.id();
        self.events.push(GameEvent::CardConcealed {
            session_id,
            slot: card.slot,
        });
    }

    fn mark_paired(&mut self, cards: &[CardRef]) {
        let session_id = self.id();
        self.events.push(GameEvent::CardsPaired {
            session_id,
            slots: Self::slots(cards),
        });
    }

    fn play_mismatch_effect(&mut self, cards: &[CardRef]) {
        let session_id = self.id();
        self.events.push(GameEvent::Mismatch {
            session_id,
            slots: Self::slots(cards),
        });
    }

    fn render_score(&mut self, score: u32) {
        let session_id = self.id();
        self.events
            .push(GameEvent::ScoreChanged { session_id, score });
    }

    fn render_try_count(&mut self, tries: u32) {
        let session_id = self.id();
        self.events
            .push(GameEvent::TriesChanged { session_id, tries });
    }

    fn render_completion(&mut self, score: u32, tries: u32) {
        let session_id = self.id();
        self.events.push(GameEvent::GameCompleted {
            session_id,
            score,
            tries,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairs_engine::deck::Deck;
    use pairs_engine::game::Game;

    #[test]
    fn mismatch_produces_reveal_tries_and_shake_events() {
        let mut surface = EventSurface::new("s".into());
        let mut game = Game::new(Deck::ordered());
        game.select(0, &mut surface).unwrap();
        game.select(1, &mut surface).unwrap();

        let events = surface.into_events();
        let kinds: Vec<&str> = events.iter().map(GameEvent::kind).collect();
        assert_eq!(
            kinds,
            vec!["card_revealed", "card_revealed", "tries_changed", "mismatch"]
        );
    }

    #[test]
    fn start_announces_slot_count_without_identities() {
        let mut surface = EventSurface::new("s".into());
        Game::with_seed(5).start(&mut surface);
        let events = surface.into_events();
        assert_eq!(
            events[0],
            GameEvent::GameStarted {
                session_id: "s".into(),
                slots: 52
            }
        );
        let json = serde_json::to_string(&events).unwrap();
        assert!(!json.contains("\"card\""));
    }
}
