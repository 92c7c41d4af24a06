use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cards::{is_pair, DECK_SIZE};
use crate::deck::Deck;
use crate::errors::GameError;
use crate::surface::{CardRef, Surface};

/// Points awarded per successful pair.
pub const SCORE_PER_MATCH: u32 = 10;

/// Pairs on a full table. The game ends when all of them are found.
pub const TOTAL_PAIRS: u32 = (DECK_SIZE / 2) as u32;

/// How long a mismatched pair stays face-up before it is turned back.
pub const DEFAULT_MISMATCH_DELAY: Duration = Duration::from_millis(1000);

/// Turn-taking state of a game.
///
/// `MatchSucceeded` is only held for the duration of a single `select` call.
/// `MatchFailed` is held until the scheduled [`PendingConceal`] is resolved,
/// and no reveal is accepted meanwhile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingFirstCard,
    AwaitingSecondCard,
    MatchSucceeded,
    MatchFailed,
    GameFinished,
}

impl Phase {
    /// Only the two awaiting phases take new reveals.
    pub fn accepts_input(self) -> bool {
        matches!(self, Phase::AwaitingFirstCard | Phase::AwaitingSecondCard)
    }
}

/// Controller-side view of one card.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardFace {
    Down,
    Up,
    Paired,
}

/// Why a selection changed nothing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    AlreadyFaceUp,
    AlreadyPaired,
    ResolutionPending,
    GameFinished,
}

/// Deferred turn-back of a mismatched pair.
///
/// Returned by [`Game::select`] on a mismatch. The caller waits for
/// [`PendingConceal::delay`] and hands it back to [`Game::resolve_mismatch`].
/// Tokens from an older epoch (an earlier mismatch or a game that has since
/// been restarted) are rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PendingConceal {
    epoch: u64,
    delay: Duration,
}

impl PendingConceal {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Outcome of one card selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Selection {
    Ignored(IgnoreReason),
    FirstRevealed(CardRef),
    Matched {
        pair: [CardRef; 2],
        score: u32,
    },
    Mismatched {
        pair: [CardRef; 2],
        pending: PendingConceal,
    },
    /// Last pair found. The game is over.
    Completed {
        pair: [CardRef; 2],
        score: u32,
        tries: u32,
    },
}

impl Selection {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Selection::Ignored(_))
    }

    pub fn pending(&self) -> Option<PendingConceal> {
        match self {
            Selection::Mismatched { pending, .. } => Some(*pending),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resolution {
    Concealed([CardRef; 2]),
    Stale,
}

/// One game of pairs: the controller state machine.
///
/// # Examples
///
/// ```
/// use pairs_engine::deck::Deck;
/// use pairs_engine::game::{Game, Phase, Selection};
/// use pairs_engine::surface::RecordingSurface;
///
/// let mut surface = RecordingSurface::new();
/// let mut game = Game::new(Deck::ordered());
/// game.start(&mut surface);
///
/// // Slot 0 holds the ace of spades, slot 13 the ace of hearts.
/// game.select(0, &mut surface).unwrap();
/// let outcome = game.select(13, &mut surface).unwrap();
///
/// assert!(matches!(outcome, Selection::Matched { score: 10, .. }));
/// assert_eq!(game.phase(), Phase::AwaitingFirstCard);
/// assert_eq!(game.tries(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    deck: Deck,
    faces: Vec<CardFace>,
    phase: Phase,
    /// Face-up cards awaiting resolution, at most two.
    revealed: Vec<CardRef>,
    score: u32,
    tries: u32,
    pairs_remaining: u32,
    epoch: u64,
    mismatch_delay: Duration,
}

impl Game {
    pub fn new(deck: Deck) -> Self {
        let faces = vec![CardFace::Down; deck.len()];
        Self {
            deck,
            faces,
            phase: Phase::AwaitingFirstCard,
            revealed: Vec::with_capacity(2),
            score: 0,
            tries: 0,
            pairs_remaining: TOTAL_PAIRS,
            epoch: 0,
            mismatch_delay: DEFAULT_MISMATCH_DELAY,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(Deck::new_with_seed(seed))
    }

    pub fn with_mismatch_delay(mut self, delay: Duration) -> Self {
        self.mismatch_delay = delay;
        self
    }

    /// Draw the initial table: face-down deck, zero score, zero tries.
    pub fn start(&self, surface: &mut dyn Surface) {
        surface.render_deck(self.deck.len());
        surface.render_score(self.score);
        surface.render_try_count(self.tries);
    }

    /// Begin a fresh game on `deck` and redraw the table.
    ///
    /// Any [`PendingConceal`] issued before the restart becomes stale.
    pub fn restart(&mut self, deck: Deck, surface: &mut dyn Surface) {
        let epoch = self.epoch + 1;
        let delay = self.mismatch_delay;
        *self = Self::new(deck).with_mismatch_delay(delay);
        self.epoch = epoch;
        self.start(surface);
    }

    /// Handle the player picking the card at `slot`.
    ///
    /// Face-up and paired cards are ignored in every phase, as is any pick
    /// while a resolution is pending or after the game has finished.
    pub fn select(
        &mut self,
        slot: usize,
        surface: &mut dyn Surface,
    ) -> Result<Selection, GameError> {
        let card = self.deck.card_at(slot).ok_or(GameError::UnknownSlot {
            slot,
            len: self.deck.len(),
        })?;

        match self.faces[slot] {
            CardFace::Up => return Ok(Selection::Ignored(IgnoreReason::AlreadyFaceUp)),
            CardFace::Paired => return Ok(Selection::Ignored(IgnoreReason::AlreadyPaired)),
            CardFace::Down => {}
        }

        if !self.phase.accepts_input() {
            let reason = match self.phase {
                Phase::GameFinished => IgnoreReason::GameFinished,
                _ => IgnoreReason::ResolutionPending,
            };
            return Ok(Selection::Ignored(reason));
        }

        let card = CardRef { slot, card };
        self.flip_up(card, surface);
        if self.phase == Phase::AwaitingFirstCard {
            self.phase = Phase::AwaitingSecondCard;
            return Ok(Selection::FirstRevealed(card));
        }

        self.tries += 1;
        surface.render_try_count(self.tries);

        let pair = self.buffered_pair();
        if is_pair(pair[0].card, pair[1].card) {
            self.phase = Phase::MatchSucceeded;
            Ok(self.settle_match(pair, surface))
        } else {
            self.phase = Phase::MatchFailed;
            Ok(self.begin_mismatch(pair, surface))
        }
    }

    /// Turn a mismatched pair back over once its delay has elapsed.
    pub fn resolve_mismatch(
        &mut self,
        pending: PendingConceal,
        surface: &mut dyn Surface,
    ) -> Resolution {
        if self.phase != Phase::MatchFailed || pending.epoch != self.epoch {
            return Resolution::Stale;
        }

        let pair = self.buffered_pair();
        for card in pair {
            self.faces[card.slot] = CardFace::Down;
            surface.conceal(card);
        }
        self.revealed.clear();
        self.phase = Phase::AwaitingFirstCard;
        Resolution::Concealed(pair)
    }

    fn flip_up(&mut self, card: CardRef, surface: &mut dyn Surface) {
        self.faces[card.slot] = CardFace::Up;
        surface.reveal(card);
        self.revealed.push(card);
        debug_assert!(self.revealed.len() <= 2, "revealed buffer overflow");
    }

    fn buffered_pair(&self) -> [CardRef; 2] {
        debug_assert_eq!(self.revealed.len(), 2);
        [self.revealed[0], self.revealed[1]]
    }

    fn settle_match(&mut self, pair: [CardRef; 2], surface: &mut dyn Surface) -> Selection {
        for card in pair {
            self.faces[card.slot] = CardFace::Paired;
        }
        surface.mark_paired(&pair);
        self.revealed.clear();

        self.pairs_remaining -= 1;
        self.score += SCORE_PER_MATCH;
        surface.render_score(self.score);

        if self.pairs_remaining == 0 {
            self.phase = Phase::GameFinished;
            surface.render_completion(self.score, self.tries);
            Selection::Completed {
                pair,
                score: self.score,
                tries: self.tries,
            }
        } else {
            self.phase = Phase::AwaitingFirstCard;
            Selection::Matched {
                pair,
                score: self.score,
            }
        }
    }

    fn begin_mismatch(&mut self, pair: [CardRef; 2], surface: &mut dyn Surface) -> Selection {
        surface.play_mismatch_effect(&pair);
        self.epoch += 1;
        Selection::Mismatched {
            pair,
            pending: PendingConceal {
                epoch: self.epoch,
                delay: self.mismatch_delay,
            },
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    pub fn pairs_found(&self) -> u32 {
        TOTAL_PAIRS - self.pairs_remaining
    }

    pub fn pairs_remaining(&self) -> u32 {
        self.pairs_remaining
    }

    pub fn revealed(&self) -> &[CardRef] {
        &self.revealed
    }

    pub fn face(&self, slot: usize) -> Option<CardFace> {
        self.faces.get(slot).copied()
    }

    pub fn faces(&self) -> &[CardFace] {
        &self.faces
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn mismatch_delay(&self) -> Duration {
        self.mismatch_delay
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::GameFinished
    }
}
