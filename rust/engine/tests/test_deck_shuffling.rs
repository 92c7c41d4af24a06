use std::collections::HashSet;

use pairs_engine::cards::{CardId, DECK_SIZE};
use pairs_engine::deck::{shuffled_identities, Deck};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[test]
fn seeded_deck_holds_every_card_once() {
    let deck = Deck::new_with_seed(42);
    let unique: HashSet<CardId> = deck.order().iter().copied().collect();
    assert_eq!(deck.len(), DECK_SIZE);
    assert_eq!(unique.len(), DECK_SIZE);
    assert_eq!(deck.seed(), Some(42));
}

#[test]
fn shuffle_is_deterministic_with_same_seed() {
    let d1 = Deck::new_with_seed(12345);
    let d2 = Deck::new_with_seed(12345);
    assert_eq!(d1.order(), d2.order(), "same seed must yield identical layout");
}

#[test]
fn shuffle_differs_with_different_seed() {
    let d1 = Deck::new_with_seed(1);
    let d2 = Deck::new_with_seed(2);
    assert_ne!(
        d1.order(),
        d2.order(),
        "different seeds should produce different layouts (high probability)"
    );
}

#[test]
fn shuffled_deck_is_not_left_in_order() {
    let deck = Deck::new_with_seed(777);
    assert_ne!(deck.order(), Deck::ordered().order());
}

#[test]
fn every_position_receives_every_value_over_many_shuffles() {
    // Coarse unbiasedness check: with 4000 shuffles of 4 items, each value
    // should land in each position roughly 1000 times.
    let mut rng = ChaCha20Rng::seed_from_u64(2024);
    let mut counts = [[0u32; 4]; 4];
    for _ in 0..4000 {
        let order = shuffled_identities(4, &mut rng);
        for (position, value) in order.into_iter().enumerate() {
            counts[position][value] += 1;
        }
    }
    for row in counts {
        for count in row {
            assert!(
                (850..=1150).contains(&count),
                "position/value frequency {count} is far from 1000"
            );
        }
    }
}
