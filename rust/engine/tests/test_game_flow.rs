use pairs_engine::cards::{CardId, DECK_SIZE};
use pairs_engine::deck::Deck;
use pairs_engine::game::{
    CardFace, Game, IgnoreReason, Phase, Resolution, Selection, SCORE_PER_MATCH, TOTAL_PAIRS,
};
use pairs_engine::surface::{CardRef, RecordingSurface, SurfaceCommand};

fn started(deck: Deck) -> (Game, RecordingSurface) {
    let mut surface = RecordingSurface::new();
    let game = Game::new(deck);
    game.start(&mut surface);
    surface.drain();
    (game, surface)
}

/// Slot pairs that clear a table, two pairs per rank.
fn perfect_pairs(deck: &Deck) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for rank in 0..13u8 {
        let slots: Vec<usize> = (0..4u8)
            .map(|suit| {
                let card = CardId::new(rank + suit * 13).unwrap();
                deck.slot_of(card).unwrap()
            })
            .collect();
        pairs.push((slots[0], slots[1]));
        pairs.push((slots[2], slots[3]));
    }
    pairs
}

#[test]
fn scenario_matching_aces() {
    let (mut game, mut surface) = started(Deck::ordered());

    game.select(0, &mut surface).unwrap();
    assert_eq!(game.phase(), Phase::AwaitingSecondCard);
    assert_eq!(game.revealed().len(), 1);
    assert_eq!(game.revealed()[0].card, CardId::new(0).unwrap());

    let outcome = game.select(13, &mut surface).unwrap();
    assert!(matches!(outcome, Selection::Matched { score: 10, .. }));
    assert_eq!(game.score(), 10);
    assert_eq!(game.tries(), 1);
    assert!(game.revealed().is_empty());
    assert_eq!(game.phase(), Phase::AwaitingFirstCard);
    assert_eq!(game.face(0), Some(CardFace::Paired));
    assert_eq!(game.face(13), Some(CardFace::Paired));
}

#[test]
fn scenario_mismatch_then_conceal() {
    let (mut game, mut surface) = started(Deck::ordered());

    game.select(0, &mut surface).unwrap();
    let outcome = game.select(1, &mut surface).unwrap();
    let pending = outcome.pending().expect("ace and two do not match");

    assert_eq!(game.tries(), 1);
    assert_eq!(game.score(), 0);
    assert_eq!(game.phase(), Phase::MatchFailed);
    assert!(surface
        .commands()
        .iter()
        .any(|c| matches!(c, SurfaceCommand::MismatchEffect { cards } if cards.len() == 2)));
    assert_eq!(pending.delay().as_millis(), 1000);

    surface.drain();
    let resolution = game.resolve_mismatch(pending, &mut surface);
    assert!(matches!(resolution, Resolution::Concealed(_)));
    assert_eq!(game.face(0), Some(CardFace::Down));
    assert_eq!(game.face(1), Some(CardFace::Down));
    assert!(game.revealed().is_empty());
    assert_eq!(game.phase(), Phase::AwaitingFirstCard);
    assert_eq!(surface.commands().len(), 2);
}

#[test]
fn scenario_full_clear_finishes_game() {
    let deck = Deck::new_with_seed(9001);
    let pairs = perfect_pairs(&deck);
    let (mut game, mut surface) = started(deck);

    for (i, (a, b)) in pairs.iter().enumerate() {
        game.select(*a, &mut surface).unwrap();
        let outcome = game.select(*b, &mut surface).unwrap();
        if i + 1 < pairs.len() {
            assert!(matches!(outcome, Selection::Matched { .. }), "pair {i}");
        } else {
            assert_eq!(
                outcome,
                Selection::Completed {
                    pair: [
                        CardRef {
                            slot: *a,
                            card: game.deck().card_at(*a).unwrap()
                        },
                        CardRef {
                            slot: *b,
                            card: game.deck().card_at(*b).unwrap()
                        },
                    ],
                    score: 260,
                    tries: 26,
                }
            );
        }
    }

    assert_eq!(game.score(), TOTAL_PAIRS * SCORE_PER_MATCH);
    assert_eq!(game.pairs_remaining(), 0);
    assert_eq!(game.phase(), Phase::GameFinished);
    assert!(surface
        .commands()
        .contains(&SurfaceCommand::Completion { score: 260, tries: 26 }));

    surface.drain();
    for slot in 0..DECK_SIZE {
        let outcome = game.select(slot, &mut surface).unwrap();
        assert!(outcome.is_ignored());
    }
    assert!(surface.commands().is_empty());
    assert_eq!(game.score(), 260);
    assert_eq!(game.tries(), 26);
}

#[test]
fn mismatches_count_tries_but_not_score() {
    let (mut game, mut surface) = started(Deck::ordered());

    for round in 0..5u32 {
        game.select(0, &mut surface).unwrap();
        let pending = game.select(1, &mut surface).unwrap().pending().unwrap();
        game.resolve_mismatch(pending, &mut surface);
        assert_eq!(game.tries(), round + 1);
        assert_eq!(game.score(), 0);
    }

    game.select(0, &mut surface).unwrap();
    game.select(13, &mut surface).unwrap();
    assert_eq!(game.tries(), 6);
    assert_eq!(game.score(), 10);
}

#[test]
fn selection_after_finish_reports_finished_or_paired() {
    let deck = Deck::ordered();
    let pairs = perfect_pairs(&deck);
    let (mut game, mut surface) = started(deck);
    for (a, b) in pairs {
        game.select(a, &mut surface).unwrap();
        game.select(b, &mut surface).unwrap();
    }
    assert!(game.is_finished());
    assert_eq!(
        game.select(0, &mut surface).unwrap(),
        Selection::Ignored(IgnoreReason::AlreadyPaired)
    );
}
