use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, CardId, DECK_SIZE};
use crate::errors::GameError;

/// Uniform random permutation of `0..count` (Fisher–Yates).
///
/// Walks the index from `count - 1` down to 1, drawing `j` uniformly from
/// `[0, index]` and swapping. Linear time, every permutation equally likely
/// given an unbiased `rng`.
pub fn shuffled_identities<R: Rng>(count: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..count).collect();
    for index in (1..count).rev() {
        let j = rng.random_range(0..=index);
        order.swap(index, j);
    }
    order
}

/// The table layout for one game: 52 card identities addressed by slot.
///
/// Fixed for the lifetime of a game. A fresh game gets a fresh `Deck`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<CardId>,
    seed: Option<u64>,
}

impl Deck {
    /// Shuffle a full deck with a ChaCha20 stream seeded from `seed`.
    pub fn new_with_seed(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let base = full_deck();
        let cards = shuffled_identities(DECK_SIZE, &mut rng)
            .into_iter()
            .map(|i| base[i])
            .collect();
        Self {
            cards,
            seed: Some(seed),
        }
    }

    /// Shuffle with a fresh random seed. The seed is kept for replay.
    pub fn shuffled() -> Self {
        Self::new_with_seed(rand::random())
    }

    /// Use a caller-chosen layout. Must be a permutation of all 52 identities.
    pub fn from_order(cards: Vec<CardId>) -> Result<Self, GameError> {
        if cards.len() != DECK_SIZE {
            return Err(GameError::InvalidDeck(format!(
                "expected {} cards, got {}",
                DECK_SIZE,
                cards.len()
            )));
        }
        let mut seen = [false; DECK_SIZE];
        for card in &cards {
            let i = usize::from(card.index());
            if seen[i] {
                return Err(GameError::InvalidDeck(format!("duplicate card {card}")));
            }
            seen[i] = true;
        }
        Ok(Self { cards, seed: None })
    }

    /// Unshuffled layout, ascending identities.
    pub fn ordered() -> Self {
        Self {
            cards: full_deck(),
            seed: None,
        }
    }

    pub fn card_at(&self, slot: usize) -> Option<CardId> {
        self.cards.get(slot).copied()
    }

    pub fn slot_of(&self, card: CardId) -> Option<usize> {
        self.cards.iter().position(|&c| c == card)
    }

    pub fn order(&self) -> &[CardId] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Seed the layout was shuffled from, if it was shuffled at all.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
